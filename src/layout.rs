use crate::{
	error::{LayoutError, LayoutResult},
	graph::{Edge, Edges, Hierarchy},
	util::*,
};

use num_traits::Zero;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Strategy for the repulsive forces
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum Repulsion {
	/// Barnes-Hut quadtree approximation, `O(n log n)`
	BarnesHut,
	/// Direct pairwise summation, `O(n²)`
	Exact,
}

/// Square region covered by the root of the Barnes-Hut quadtree
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
	feature = "serde",
	derive(Serialize, Deserialize),
	serde(tag = "kind", rename_all = "snake_case")
)]
pub enum Bounds<T> {
	Fixed { center: Vec2<T>, half_width: T },
	/// Smallest square around the current bodies, recomputed every step
	Auto,
}

/// Settings for the graph layout
#[derive(Clone, Debug)]
#[cfg_attr(
	feature = "serde",
	derive(Serialize, Deserialize),
	serde(
		default,
		bound(
			serialize = "T: serde::Serialize",
			deserialize = "T: Coord + serde::Deserialize<'de>"
		)
	)
)]
pub struct Settings<T> {
	/// Barnes-Hut opening threshold
	///
	/// A region is approximated by its center of mass when its half width
	/// divided by its distance is below `theta`. `0.0` never approximates.
	/// Default is `0.25`.
	pub theta: T,
	/// Coulomb constant
	pub coulomb_k: T,
	/// Added to the distance in the Coulomb denominator. Default is `1.0`.
	pub softening: T,
	/// Spring stiffness, multiplied by the edge weight
	pub spring_k: T,
	/// Spring rest length
	pub rest_length: T,
	/// Velocity retained after each step
	pub damping: T,
	/// Round positions to integers after each step
	pub quantize: bool,
	pub repulsion: Repulsion,
	pub bounds: Bounds<T>,
	/// Display-space offset of the smallest coordinates
	pub margin: T,
}

impl<T: Coord> Default for Settings<T> {
	fn default() -> Self {
		Self {
			theta: lit(0.25),
			coulomb_k: lit(100.0),
			softening: T::one(),
			spring_k: lit(10.0),
			rest_length: lit(60.0),
			damping: lit(0.97),
			quantize: true,
			repulsion: Repulsion::BarnesHut,
			bounds: Bounds::Fixed {
				center: Vec2::new(lit(500.0), lit(500.0)),
				half_width: lit(500.0),
			},
			margin: lit(100.0),
		}
	}
}

impl<T: Coord> Settings<T> {
	/// Check whether the settings are valid
	pub fn check(&self) -> LayoutResult<()> {
		let all_finite = [
			self.theta,
			self.coulomb_k,
			self.softening,
			self.spring_k,
			self.rest_length,
			self.damping,
			self.margin,
		]
		.iter()
		.all(|x| finite(*x));
		if !all_finite {
			return Err(LayoutError::InvalidSettings("constants must be finite"));
		}
		if self.theta < T::zero() {
			return Err(LayoutError::InvalidSettings("theta must not be negative"));
		}
		if self.softening < T::zero() {
			return Err(LayoutError::InvalidSettings("softening must not be negative"));
		}
		if self.damping < T::zero() || self.damping > T::one() {
			return Err(LayoutError::InvalidSettings("damping must be in [0, 1]"));
		}
		if let Bounds::Fixed { center, half_width } = self.bounds {
			if !(half_width > T::zero() && finite(half_width)) {
				return Err(LayoutError::InvalidSettings("bounds half width must be positive"));
			}
			if !(finite(center.x) && finite(center.y)) {
				return Err(LayoutError::InvalidSettings("bounds center must be finite"));
			}
		}
		Ok(())
	}
}

/// A vertex of the graph with its simulation state
#[derive(Clone, Debug)]
pub struct Node<T, P = ()> {
	pub pos: Vec2<T>,
	pub velocity: Vec2<T>,
	/// Force accumulated during the current step
	pub force: Vec2<T>,
	pub charge: T,
	/// Position driven from outside, excluded from integration
	pub pinned: bool,
	/// Last display-space position
	///
	/// Written by normalization for free nodes, read back for pinned ones.
	pub display: Vec2<T>,
	/// Opaque data carried along, e.g. a label
	pub payload: P,
}

impl<T: Coord, P> Node<T, P> {
	pub fn new(payload: P) -> Self {
		Node {
			pos: Vec2::zero(),
			velocity: Vec2::zero(),
			force: Vec2::zero(),
			charge: T::one(),
			pinned: false,
			display: Vec2::zero(),
			payload,
		}
	}

	pub fn at(pos: Vec2<T>, charge: T, payload: P) -> Self {
		Node {
			pos,
			charge,
			..Node::new(payload)
		}
	}
}

impl<T: Coord, P: Default> Default for Node<T, P> {
	fn default() -> Self {
		Node::new(P::default())
	}
}

/// How springs connect the nodes
#[derive(Clone, Debug)]
pub enum Structure<T> {
	/// Every edge is a spring of the configured stiffness times its weight
	Graph(Edges<T>),
	/// Parent-child springs, stiffer and shorter deeper in the tree
	Tree(Hierarchy),
}

impl<T: Coord> Structure<T> {
	/// Connected pairs, for drawing
	pub fn edges(&self) -> Vec<Edge> {
		match self {
			Structure::Graph(edges) => edges.pairs().to_vec(),
			Structure::Tree(hierarchy) => hierarchy.edges(),
		}
	}

	pub(crate) fn check(&self, len: usize) -> LayoutResult<()> {
		match self {
			Structure::Graph(edges) => match edges.max_index() {
				Some(index) if index >= len => Err(LayoutError::NodeOutOfRange { index, len }),
				_ => Ok(()),
			},
			Structure::Tree(hierarchy) if hierarchy.len() != len => Err(LayoutError::LengthMismatch {
				expected: len,
				got: hierarchy.len(),
			}),
			Structure::Tree(_) => Ok(()),
		}
	}
}

/// Graph spatialization layout
pub struct Layout<T, P = ()> {
	pub nodes: Vec<Node<T, P>>,
	pub(crate) structure: Structure<T>,
	// Mutex needed here for Layout to be Sync
	pub(crate) bump: parking_lot::Mutex<bumpalo::Bump>,
	pub(crate) fn_repulsion: fn(&mut Self),
	pub(crate) settings: Settings<T>,
	/// Traversal stack for tree springs, sized once to the node count
	pub(crate) tree_stack: Vec<(usize, usize, usize)>,
}
