use crate::{
	layout::*,
	physics::Coulomb,
	trees::{Body, QuadTree},
	util::*,
};

use num_traits::Zero;

/// Root square of the quadtree for the current positions
fn root_square<T: Coord, P>(layout: &Layout<T, P>) -> (Vec2<T>, T) {
	match layout.settings.bounds {
		Bounds::Fixed { center, half_width } => (center, half_width),
		Bounds::Auto => match bounding_box(layout.nodes.iter().map(|node| node.pos)) {
			Some((min, max)) => {
				let two = T::one() + T::one();
				let extent = (max.x - min.x).max(max.y - min.y);
				((min + max) / two, (extent / two).max(T::one()))
			}
			None => (Vec2::zero(), T::one()),
		},
	}
}

pub fn apply_repulsion_bh<T: Coord, P>(layout: &mut Layout<T, P>) {
	let (center, half_width) = root_square(layout);
	let law = Coulomb::from_settings(&layout.settings);
	let theta = layout.settings.theta;

	let mut bump = layout.bump.lock();
	let mut tree = QuadTree::new(&bump, center, half_width);
	for (index, node) in layout.nodes.iter().enumerate() {
		tree.insert(Body {
			index,
			pos: node.pos,
			charge: node.charge,
		});
	}

	for (index, node) in layout.nodes.iter_mut().enumerate() {
		if node.pinned {
			continue;
		}
		let body = Body {
			index,
			pos: node.pos,
			charge: node.charge,
		};
		node.force += tree.net_force(&body, theta, &law);
	}
	std::mem::drop(tree);
	bump.reset();
}

pub fn apply_repulsion_exact<T: Coord, P>(layout: &mut Layout<T, P>) {
	let law = Coulomb::from_settings(&layout.settings);
	let nodes = &mut layout.nodes;
	for i in 0..nodes.len() {
		if nodes[i].pinned {
			continue;
		}
		let (pos, charge) = (nodes[i].pos, nodes[i].charge);
		let f = nodes
			.iter()
			.enumerate()
			.filter(|&(j, _)| j != i)
			.fold(Vec2::zero(), |f, (_, other)| {
				f + law.force(pos - other.pos, charge, other.charge)
			});
		nodes[i].force += f;
	}
}
