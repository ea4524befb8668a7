use crate::{
	graph::{Edges, Hierarchy},
	layout::*,
	physics::attraction,
	util::*,
};

pub fn apply_attraction<T: Coord, P>(layout: &mut Layout<T, P>) {
	let settings = &layout.settings;
	match &layout.structure {
		Structure::Graph(edges) => apply_attraction_edges(&mut layout.nodes, edges, settings),
		Structure::Tree(hierarchy) => {
			apply_attraction_tree(&mut layout.nodes, hierarchy, &mut layout.tree_stack, settings)
		}
	}
}

/// Applies `f` to the first node and `-f` to the second, skipping pinned nodes
fn apply_pair<T: Coord, P>(n1: &mut Node<T, P>, n2: &mut Node<T, P>, f: Vec2<T>) {
	if !n1.pinned {
		n1.force += f;
	}
	if !n2.pinned {
		n2.force -= f;
	}
}

pub fn apply_attraction_edges<T: Coord, P>(
	nodes: &mut [Node<T, P>],
	edges: &Edges<T>,
	settings: &Settings<T>,
) {
	for ((n1, n2), weight) in edges.iter() {
		let (n1, n2) = get_2_mut(nodes, n1, n2);
		let f = attraction(n1.pos - n2.pos, settings.spring_k * weight, settings.rest_length);
		apply_pair(n1, n2, f);
	}
}

/// Springs between every node of `hierarchy` and its parent, in preorder
///
/// The spring to a child at depth `level` is `level²` times stiffer and
/// `2·level` times shorter. `stack` is scratch space of `(parent, child, level)`
/// entries; it never holds more entries than there are nodes.
pub fn apply_attraction_tree<T: Coord, P>(
	nodes: &mut [Node<T, P>],
	hierarchy: &Hierarchy,
	stack: &mut Vec<(usize, usize, usize)>,
	settings: &Settings<T>,
) {
	let root = hierarchy.root();
	stack.clear();
	stack.extend(hierarchy.children(root).iter().rev().map(|&child| (root, child, 1)));
	while let Some((parent, child, level)) = stack.pop() {
		let l = T::from_usize(level).unwrap_or_else(T::one);
		let k = settings.spring_k * l * l;
		let rest_length = settings.rest_length / (l + l);
		let (c, p) = get_2_mut(nodes, child, parent);
		let f = attraction(c.pos - p.pos, k, rest_length);
		apply_pair(c, p, f);
		stack.extend(
			hierarchy
				.children(child)
				.iter()
				.rev()
				.map(|&grandchild| (child, grandchild, level + 1)),
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{binary_tree, Edges};

	fn at_points(points: &[(f64, f64)]) -> Vec<Node<f64>> {
		points
			.iter()
			.map(|&(x, y)| Node::at(Vec2::new(x, y), 1.0, ()))
			.collect()
	}

	#[test]
	fn test_edges_newton_third_law() {
		let mut nodes = at_points(&[(0.0, 0.0), (90.0, 0.0), (30.0, 40.0)]);
		let edges = Edges::from_pairs([(0, 1), (2, 1), (0, 2)]).unwrap();
		apply_attraction_edges(&mut nodes, &edges, &Settings::default());
		let net = nodes.iter().fold(Vec2::new(0.0, 0.0), |f, n| f + n.force);
		assert!(net.norm() < 1e-9);
		// Stretched spring pulls node 0 toward node 1
		let mut pair = at_points(&[(0.0, 0.0), (90.0, 0.0)]);
		let edges = Edges::from_pairs([(0, 1)]).unwrap();
		apply_attraction_edges(&mut pair, &edges, &Settings::default());
		assert_eq!(pair[0].force, Vec2::new(300.0, 0.0));
		assert_eq!(pair[1].force, Vec2::new(-300.0, 0.0));
	}

	#[test]
	fn test_edge_weight_scales_stiffness() {
		let mut nodes = at_points(&[(0.0, 0.0), (0.0, 70.0)]);
		let mut edges = Edges::new();
		edges.add_weight(0, 1, 2.0).unwrap();
		edges.add_weight(1, 0, 0.5).unwrap();
		apply_attraction_edges(&mut nodes, &edges, &Settings::default());
		assert!((nodes[0].force.y - 250.0).abs() < 1e-9);
	}

	#[test]
	fn test_pinned_endpoint() {
		let mut nodes = at_points(&[(0.0, 0.0), (90.0, 0.0)]);
		nodes[1].pinned = true;
		let edges = Edges::from_pairs([(0, 1)]).unwrap();
		apply_attraction_edges(&mut nodes, &edges, &Settings::default());
		assert_eq!(nodes[0].force, Vec2::new(300.0, 0.0));
		assert_eq!(nodes[1].force, Vec2::new(0.0, 0.0));
	}

	#[test]
	fn test_tree_levels() {
		// Root 0, children 1 and 4, grandchildren 2, 3, 5, 6
		let hierarchy = binary_tree(2);
		let mut nodes = at_points(&[
			(0.0, 0.0),
			(100.0, 0.0),
			(100.0, 50.0),
			(0.0, 0.0),
			(-20.0, 0.0),
			(0.0, 0.0),
			(0.0, 0.0),
		]);
		// Grandchildren 3, 5 and 6 sit at their rest length
		nodes[3].pos = Vec2::new(100.0, 15.0);
		nodes[5].pos = Vec2::new(-20.0, 15.0);
		nodes[6].pos = Vec2::new(-35.0, 0.0);
		apply_attraction_tree(&mut nodes, &hierarchy, &mut Vec::new(), &Settings::default());

		// Level 1: k = 10, rest = 30
		let root_to_1 = -10.0 * (100.0 - 30.0);
		// Level 2: k = 40, rest = 15
		let one_to_2 = -40.0 * (50.0 - 15.0);
		assert!((nodes[2].force.y - one_to_2).abs() < 1e-9);
		assert!((nodes[1].force.x - root_to_1).abs() < 1e-9);
		assert!((nodes[1].force.y + one_to_2).abs() < 1e-9);
		assert!(nodes[3].force.norm() < 1e-9);
		// Compressed level 1 spring pushes node 4 further out
		assert!(nodes[4].force.x < 0.0);
		let net = nodes.iter().fold(Vec2::new(0.0, 0.0), |f, n| f + n.force);
		assert!(net.norm() < 1e-9);
	}

	#[test]
	fn test_deep_chain() {
		let n = 100_000;
		let hierarchy = Hierarchy::from_edges(n, 0, (1..n).map(|i| (i - 1, i))).unwrap();
		let mut nodes: Vec<Node<f64>> = (0..n)
			.map(|i| Node::at(Vec2::new(i as f64, 0.0), 1.0, ()))
			.collect();
		let mut stack = Vec::with_capacity(n);
		apply_attraction_tree(&mut nodes, &hierarchy, &mut stack, &Settings::default());
		assert!(stack.is_empty());
		assert!(nodes.iter().all(|node| node.force.x.is_finite()));

		// The last spring sits at depth n - 1
		let level = (n - 1) as f64;
		let expected = -10.0 * level * level * (1.0 - 60.0 / (2.0 * level));
		let last = nodes[n - 1].force;
		assert!((last.x - expected).abs() <= 1e-12 * expected.abs(), "{} != {}", last.x, expected);
		assert_eq!(last.y, 0.0);
	}
}
