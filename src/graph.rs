//! Graph structure: weighted undirected edges and rooted hierarchies
//!
//! Nodes are referred to by their index in the layout's node list.

use crate::{
	error::{check_index, LayoutError, LayoutResult},
	util::*,
};

use itertools::Itertools;
use std::collections::HashMap;

/// Undirected edge, stored as `(n1, n2)` with `n1 < n2`
pub type Edge = (usize, usize);

fn edge_key(n1: usize, n2: usize) -> LayoutResult<Edge> {
	match n1.cmp(&n2) {
		std::cmp::Ordering::Less => Ok((n1, n2)),
		std::cmp::Ordering::Greater => Ok((n2, n1)),
		std::cmp::Ordering::Equal => Err(LayoutError::SelfLoop(n1)),
	}
}

/// Set of undirected weighted edges
///
/// `(a, b)` and `(b, a)` are the same edge. Edges keep their insertion order.
#[derive(Clone, Debug, Default)]
pub struct Edges<T> {
	pairs: Vec<Edge>,
	weights: Vec<T>,
	index: HashMap<Edge, usize>,
}

impl<T: Coord> Edges<T> {
	pub fn new() -> Self {
		Self {
			pairs: Vec::new(),
			weights: Vec::new(),
			index: HashMap::new(),
		}
	}

	/// Builds a set of unit-weight edges, dropping repeated pairs
	pub fn from_pairs(pairs: impl IntoIterator<Item = Edge>) -> LayoutResult<Self> {
		let mut edges = Self::new();
		for (n1, n2) in pairs {
			edges.insert(n1, n2)?;
		}
		Ok(edges)
	}

	/// Adds a unit-weight edge unless the pair is already connected
	///
	/// Returns whether the edge is new.
	pub fn insert(&mut self, n1: usize, n2: usize) -> LayoutResult<bool> {
		let key = edge_key(n1, n2)?;
		if self.index.contains_key(&key) {
			return Ok(false);
		}
		self.push(key, T::one());
		Ok(true)
	}

	/// Adds `weight` to the edge between `n1` and `n2`, creating it if needed
	pub fn add_weight(&mut self, n1: usize, n2: usize, weight: T) -> LayoutResult<()> {
		let key = edge_key(n1, n2)?;
		match self.index.get(&key) {
			Some(&i) => self.weights[i] += weight,
			None => self.push(key, weight),
		}
		Ok(())
	}

	fn push(&mut self, key: Edge, weight: T) {
		self.index.insert(key, self.pairs.len());
		self.pairs.push(key);
		self.weights.push(weight);
	}

	pub fn contains(&self, n1: usize, n2: usize) -> bool {
		self.weight(n1, n2).is_some()
	}

	pub fn weight(&self, n1: usize, n2: usize) -> Option<T> {
		let key = edge_key(n1, n2).ok()?;
		self.index.get(&key).map(|&i| self.weights[i])
	}

	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	pub fn pairs(&self) -> &[Edge] {
		&self.pairs
	}

	pub fn iter(&self) -> impl Iterator<Item = (Edge, T)> + '_ {
		self.pairs.iter().copied().zip(self.weights.iter().copied())
	}

	/// Largest node index referenced by an edge
	pub fn max_index(&self) -> Option<usize> {
		self.pairs.iter().map(|&(_, n2)| n2).max()
	}
}

/// Edges of the complete graph on `n` nodes
pub fn complete_graph<T: Coord>(n: usize) -> Edges<T> {
	let mut edges = Edges::new();
	for (n1, n2) in (0..n).tuple_combinations() {
		edges.push((n1, n2), T::one());
	}
	edges
}

/// Rooted tree over node indices
///
/// Parent links are plain indices, so the hierarchy owns no node state and
/// can sit next to the layout's node list.
#[derive(Clone, Debug)]
pub struct Hierarchy {
	root: usize,
	parents: Vec<Option<usize>>,
	children: Vec<Vec<usize>>,
}

impl Hierarchy {
	/// A hierarchy of `len` detached nodes
	pub fn new(len: usize, root: usize) -> LayoutResult<Self> {
		check_index(root, len)?;
		Ok(Self {
			root,
			parents: vec![None; len],
			children: vec![Vec::new(); len],
		})
	}

	/// Builds a hierarchy from `(parent, child)` pairs, attached in order
	pub fn from_edges(
		len: usize,
		root: usize,
		edges: impl IntoIterator<Item = Edge>,
	) -> LayoutResult<Self> {
		let mut hierarchy = Self::new(len, root)?;
		for (parent, child) in edges {
			hierarchy.attach(parent, child)?;
		}
		Ok(hierarchy)
	}

	/// Makes `child` the last child of `parent`
	///
	/// The child must not have a parent yet, must not be the root and must not
	/// be an ancestor of `parent`.
	pub fn attach(&mut self, parent: usize, child: usize) -> LayoutResult<()> {
		check_index(parent, self.len())?;
		check_index(child, self.len())?;
		let invalid = LayoutError::InvalidAttachment { parent, child };
		if child == self.root || self.parents[child].is_some() {
			return Err(invalid);
		}
		if parent == child {
			return Err(invalid);
		}
		// A childless node cannot be an ancestor of anything but itself
		if !self.children[child].is_empty() {
			let mut ancestor = Some(parent);
			while let Some(a) = ancestor {
				if a == child {
					return Err(invalid);
				}
				ancestor = self.parents[a];
			}
		}
		self.parents[child] = Some(parent);
		self.children[parent].push(child);
		Ok(())
	}

	pub fn root(&self) -> usize {
		self.root
	}

	pub fn len(&self) -> usize {
		self.parents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.parents.is_empty()
	}

	pub fn parent(&self, node: usize) -> Option<usize> {
		self.parents.get(node).copied().flatten()
	}

	pub fn children(&self, node: usize) -> &[usize] {
		self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Nodes reachable from the root, in preorder
	pub fn all_nodes(&self) -> Vec<usize> {
		let mut res = Vec::with_capacity(self.len());
		let mut stack = vec![self.root];
		while let Some(node) = stack.pop() {
			res.push(node);
			stack.extend(self.children[node].iter().rev());
		}
		res
	}

	/// Descendants of the root without children, in preorder
	pub fn leaves(&self) -> Vec<usize> {
		self.all_nodes()
			.into_iter()
			.filter(|&node| node != self.root && self.children[node].is_empty())
			.collect()
	}

	/// `(parent, child)` pairs reachable from the root, in preorder
	pub fn edges(&self) -> Vec<Edge> {
		self.all_nodes()
			.into_iter()
			.flat_map(|parent| self.children[parent].iter().map(move |&child| (parent, child)))
			.collect()
	}

	/// Ancestors of `node` from itself upwards, excluding the root
	///
	/// For a node detached from the root this walks up to its topmost ancestor.
	pub fn lineage(&self, node: usize) -> Vec<usize> {
		let mut res = Vec::new();
		let mut current = Some(node).filter(|&n| n < self.len());
		while let Some(n) = current {
			if n == self.root {
				break;
			}
			res.push(n);
			current = self.parents[n];
		}
		res
	}

	/// Number of edges between `node` and the root, if they are connected
	pub fn depth_of(&self, node: usize) -> Option<usize> {
		let lineage = self.lineage(node);
		match lineage.last() {
			None if node == self.root => Some(0),
			Some(&top) if self.parents[top] == Some(self.root) => Some(lineage.len()),
			_ => None,
		}
	}

	/// Deepest node having both `n1` and `n2` as descendants (or being one of them)
	pub fn last_shared_ancestor(&self, n1: usize, n2: usize) -> Option<usize> {
		self.depth_of(n1)?;
		self.depth_of(n2)?;
		let path1 = self.lineage(n1);
		let path2 = self.lineage(n2);
		path1
			.iter()
			.rev()
			.zip(path2.iter().rev())
			.take_while(|(a1, a2)| a1 == a2)
			.last()
			.map_or(Some(self.root), |(&a, _)| Some(a))
	}

	/// Copy restricted to the nodes at most `levels` edges below the root
	///
	/// Nodes are renumbered in preorder; the second value maps new indices to
	/// old ones.
	pub fn pruned(&self, levels: usize) -> (Hierarchy, Vec<usize>) {
		let mut old_of_new = Vec::new();
		let mut edges = Vec::new();
		let mut stack = vec![(self.root, None, 0)];
		while let Some((node, new_parent, depth)) = stack.pop() {
			let new = old_of_new.len();
			old_of_new.push(node);
			if let Some(new_parent) = new_parent {
				edges.push((new_parent, new));
			}
			if depth < levels {
				stack.extend(self.children[node].iter().rev().map(|&c| (c, Some(new), depth + 1)));
			}
		}
		let mut pruned = Hierarchy {
			root: 0,
			parents: vec![None; old_of_new.len()],
			children: vec![Vec::new(); old_of_new.len()],
		};
		for (parent, child) in edges {
			pruned.parents[child] = Some(parent);
			pruned.children[parent].push(child);
		}
		(pruned, old_of_new)
	}
}

/// Full binary tree with `levels` levels below the root
///
/// Has `2^(levels+1) - 1` nodes numbered in preorder, the root being `0`.
pub fn binary_tree(levels: u32) -> Hierarchy {
	let len = (1usize << (levels + 1)) - 1;
	let mut hierarchy = Hierarchy {
		root: 0,
		parents: vec![None; len],
		children: vec![Vec::new(); len],
	};
	// Preorder: the left subtree of a node at height h occupies the next 2^h - 1 indices
	let mut stack = vec![(0usize, levels)];
	while let Some((node, height)) = stack.pop() {
		if height == 0 {
			continue;
		}
		let left = node + 1;
		let right = node + (1usize << height);
		for child in [left, right] {
			hierarchy.parents[child] = Some(node);
			hierarchy.children[node].push(child);
			stack.push((child, height - 1));
		}
	}
	hierarchy
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_complete_graph() {
		for n in [0usize, 1, 2, 5, 12] {
			let edges = complete_graph::<f64>(n);
			assert_eq!(edges.len(), n * n.saturating_sub(1) / 2);
			for &(n1, n2) in edges.pairs() {
				assert!(n1 < n2);
				assert!(edges.contains(n2, n1));
			}
			let unique: std::collections::HashSet<_> = edges.pairs().iter().collect();
			assert_eq!(unique.len(), edges.len());
		}
	}

	#[test]
	fn test_edges_dedup() {
		let mut edges = Edges::<f64>::new();
		assert_eq!(edges.insert(1, 3), Ok(true));
		assert_eq!(edges.insert(3, 1), Ok(false));
		assert_eq!(edges.insert(0, 1), Ok(true));
		assert_eq!(edges.pairs(), &[(1, 3), (0, 1)]);
		assert_eq!(edges.weight(3, 1), Some(1.0));
		assert_eq!(edges.insert(2, 2), Err(LayoutError::SelfLoop(2)));
		assert_eq!(edges.max_index(), Some(3));
	}

	#[test]
	fn test_edges_weight_accumulation() {
		let mut edges = Edges::<f64>::new();
		edges.add_weight(4, 2, 1.5).unwrap();
		edges.add_weight(2, 4, 2.0).unwrap();
		edges.add_weight(0, 2, 1.0).unwrap();
		assert_eq!(edges.len(), 2);
		assert_eq!(edges.weight(2, 4), Some(3.5));
		assert_eq!(edges.iter().collect::<Vec<_>>(), vec![((2, 4), 3.5), ((0, 2), 1.0)]);
	}

	#[test]
	fn test_binary_tree() {
		let tree = binary_tree(2);
		assert_eq!(tree.len(), 7);
		assert_eq!(tree.children(0), &[1, 4]);
		assert_eq!(tree.children(1), &[2, 3]);
		assert_eq!(tree.children(4), &[5, 6]);
		assert_eq!(tree.all_nodes(), (0..7).collect::<Vec<_>>());
		assert_eq!(tree.leaves(), vec![2, 3, 5, 6]);
		assert_eq!(
			tree.edges(),
			vec![(0, 1), (0, 4), (1, 2), (1, 3), (4, 5), (4, 6)]
		);
		assert_eq!(binary_tree(0).len(), 1);
		assert!(binary_tree(0).edges().is_empty());
	}

	#[test]
	fn test_lineage() {
		let tree = binary_tree(3);
		// 0 -> 1 -> 2 -> 3
		assert_eq!(tree.lineage(3), vec![3, 2, 1]);
		assert_eq!(tree.lineage(0), Vec::<usize>::new());
		assert_eq!(tree.depth_of(3), Some(3));
		assert_eq!(tree.depth_of(0), Some(0));
		assert_eq!(tree.parent(8), Some(0));
	}

	#[test]
	fn test_last_shared_ancestor() {
		let tree = binary_tree(3);
		assert_eq!(tree.last_shared_ancestor(3, 4), Some(2));
		assert_eq!(tree.last_shared_ancestor(3, 6), Some(1));
		assert_eq!(tree.last_shared_ancestor(3, 9), Some(0));
		assert_eq!(tree.last_shared_ancestor(2, 4), Some(2));
		assert_eq!(tree.last_shared_ancestor(5, 5), Some(5));

		let detached = Hierarchy::from_edges(4, 0, [(0, 1), (2, 3)]).unwrap();
		assert_eq!(detached.depth_of(3), None);
		assert_eq!(detached.last_shared_ancestor(1, 3), None);
	}

	#[test]
	fn test_attach_rejects_cycles() {
		let mut tree = Hierarchy::from_edges(4, 0, [(0, 1), (1, 2)]).unwrap();
		assert_eq!(
			tree.attach(3, 1),
			Err(LayoutError::InvalidAttachment { parent: 3, child: 1 })
		);
		assert_eq!(
			tree.attach(2, 0),
			Err(LayoutError::InvalidAttachment { parent: 2, child: 0 })
		);
		let mut detached = Hierarchy::from_edges(4, 0, [(2, 3)]).unwrap();
		assert_eq!(
			detached.attach(3, 2),
			Err(LayoutError::InvalidAttachment { parent: 3, child: 2 })
		);
		assert_eq!(
			detached.attach(1, 1),
			Err(LayoutError::InvalidAttachment { parent: 1, child: 1 })
		);
		assert_eq!(
			tree.attach(0, 7),
			Err(LayoutError::NodeOutOfRange { index: 7, len: 4 })
		);
	}

	#[test]
	fn test_pruned() {
		let tree = binary_tree(3);
		let (pruned, old_of_new) = tree.pruned(1);
		assert_eq!(pruned.len(), 3);
		assert_eq!(old_of_new, vec![0, 1, 8]);
		assert_eq!(pruned.edges(), vec![(0, 1), (0, 2)]);

		let (whole, old_of_new) = tree.pruned(10);
		assert_eq!(whole.edges(), tree.edges());
		assert_eq!(old_of_new, (0..15).collect::<Vec<_>>());
	}
}
