//! Barnes-Hut quadtree
//!
//! Regions are square. A region is empty, holds a single body, or has been
//! subdivided into up to four child regions, one per quadrant. Subdivided
//! regions carry the total charge and the charge-weighted center of mass of
//! every body below them, so that a far away region can act as a single body.
//!
//! The tree lives in a bump arena and is rebuilt from scratch every step.

use crate::{physics::Coulomb, util::*};

use bumpalo::{boxed::Box as BumpBox, collections::Vec as BumpVec, Bump};
use num_traits::Zero;

/// Maximum tree depth
///
/// Bodies still sharing a quadrant at this depth are kept together in one leaf.
pub const MAX_DEPTH: usize = 32;

/// A body in the Barnes-Hut simulation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body<T> {
	/// Index of the node in the layout
	pub index: usize,
	pub pos: Vec2<T>,
	pub charge: T,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quadrant {
	NorthEast = 0,
	NorthWest = 1,
	SouthEast = 2,
	SouthWest = 3,
}

impl Quadrant {
	/// Quadrant of `pos` around `center`; points on an axis go west or south
	pub fn of<T: Coord>(center: Vec2<T>, pos: Vec2<T>) -> Self {
		match (pos.x > center.x, pos.y > center.y) {
			(true, true) => Quadrant::NorthEast,
			(false, true) => Quadrant::NorthWest,
			(true, false) => Quadrant::SouthEast,
			(false, false) => Quadrant::SouthWest,
		}
	}

	/// Center of this quadrant for a parent centered at `center`
	fn child_center<T: Coord>(self, center: Vec2<T>, child_half_width: T) -> Vec2<T> {
		let (east, north) = match self {
			Quadrant::NorthEast => (true, true),
			Quadrant::NorthWest => (false, true),
			Quadrant::SouthEast => (true, false),
			Quadrant::SouthWest => (false, false),
		};
		let shift = |c: T, positive: bool| {
			if positive {
				c + child_half_width
			} else {
				c - child_half_width
			}
		};
		Vec2::new(shift(center.x, east), shift(center.y, north))
	}
}

enum Content<'b, T> {
	Empty,
	Body(Body<T>),
	/// Coincident bodies at maximum depth
	Bucket(BumpVec<'b, Body<T>>),
	Quadrants([Option<BumpBox<'b, Region<'b, T>>>; 4]),
}

/// A square region of the quadtree
pub struct Region<'b, T> {
	center: Vec2<T>,
	half_width: T,
	charge: T,
	center_of_mass: Vec2<T>,
	content: Content<'b, T>,
}

impl<'b, T: Coord> Region<'b, T> {
	fn new(center: Vec2<T>, half_width: T) -> Self {
		Region {
			center,
			half_width,
			charge: T::zero(),
			center_of_mass: center,
			content: Content::Empty,
		}
	}

	fn leaf(center: Vec2<T>, half_width: T, body: Body<T>) -> Self {
		Region {
			center,
			half_width,
			charge: body.charge,
			center_of_mass: body.pos,
			content: Content::Body(body),
		}
	}

	pub fn center(&self) -> Vec2<T> {
		self.center
	}

	pub fn half_width(&self) -> T {
		self.half_width
	}

	/// Total charge of the bodies in the region
	pub fn charge(&self) -> T {
		self.charge
	}

	pub fn center_of_mass(&self) -> Vec2<T> {
		self.center_of_mass
	}

	/// Whether the region has been split into quadrants
	pub fn is_subdivided(&self) -> bool {
		matches!(self.content, Content::Quadrants(_))
	}

	pub fn child(&self, quadrant: Quadrant) -> Option<&Region<'b, T>> {
		match &self.content {
			Content::Quadrants(children) => children[quadrant as usize].as_deref(),
			_ => None,
		}
	}

	/// Body held directly by an unsubdivided region
	pub fn body(&self) -> Option<&Body<T>> {
		match &self.content {
			Content::Body(body) => Some(body),
			_ => None,
		}
	}

	/// Folds a new body into the aggregate charge and center of mass
	fn add_charge(&mut self, body: &Body<T>) {
		let charge = self.charge + body.charge;
		if !charge.is_zero() {
			self.center_of_mass = (self.center_of_mass * self.charge + body.pos * body.charge) / charge;
		}
		self.charge = charge;
	}

	fn insert(&mut self, body: Body<T>, depth: usize, bump: &'b Bump) {
		match &mut self.content {
			Content::Empty => {
				*self = Region::leaf(self.center, self.half_width, body);
			}
			Content::Body(old) => {
				let old = *old;
				if depth >= MAX_DEPTH {
					tracing::debug!(
						depth,
						first = old.index,
						second = body.index,
						"bodies share a leaf at maximum depth"
					);
					let mut bucket = BumpVec::with_capacity_in(2, bump);
					bucket.push(old);
					bucket.push(body);
					self.content = Content::Bucket(bucket);
					self.add_charge(&body);
				} else {
					self.content = Content::Quadrants([None, None, None, None]);
					self.charge = T::zero();
					self.center_of_mass = self.center;
					self.insert(old, depth, bump);
					self.insert(body, depth, bump);
				}
			}
			Content::Bucket(bucket) => {
				bucket.push(body);
				self.add_charge(&body);
			}
			Content::Quadrants(children) => {
				let quadrant = Quadrant::of(self.center, body.pos);
				let slot = &mut children[quadrant as usize];
				if let Some(child) = slot.as_mut() {
					child.insert(body, depth + 1, bump);
				} else {
					let half_width = self.half_width / (T::one() + T::one());
					let center = quadrant.child_center(self.center, half_width);
					*slot = Some(BumpBox::new_in(Region::leaf(center, half_width, body), bump));
				}
				self.add_charge(&body);
			}
		}
	}

	/// Approximate repulsion felt by `on` from every other body in the region
	fn apply(&self, on: &Body<T>, theta: T, law: &Coulomb<T>) -> Vec2<T> {
		match &self.content {
			Content::Empty => Vec2::zero(),
			Content::Body(body) => pairwise(on, body, law),
			Content::Bucket(bodies) => bodies
				.iter()
				.fold(Vec2::zero(), |f, body| f + pairwise(on, body, law)),
			Content::Quadrants(children) => {
				let delta = on.pos - self.center_of_mass;
				if delta.is_zero() {
					return Vec2::zero();
				}
				if self.half_width / delta.norm() < theta {
					law.force(delta, on.charge, self.charge)
				} else {
					children
						.iter()
						.flatten()
						.fold(Vec2::zero(), |f, child| f + child.apply(on, theta, law))
				}
			}
		}
	}
}

/// Exact repulsion between two bodies; a body does not repel itself
fn pairwise<T: Coord>(on: &Body<T>, other: &Body<T>, law: &Coulomb<T>) -> Vec2<T> {
	if on.index == other.index {
		return Vec2::zero();
	}
	law.force(on.pos - other.pos, on.charge, other.charge)
}

/// Quadtree whose regions are allocated in a bump arena
pub struct QuadTree<'b, T> {
	bump: &'b Bump,
	root: Region<'b, T>,
}

impl<'b, T: Coord> QuadTree<'b, T> {
	/// Create an empty tree covering the square `center ± half_width`
	pub fn new(bump: &'b Bump, center: Vec2<T>, half_width: T) -> Self {
		QuadTree {
			bump,
			root: Region::new(center, half_width),
		}
	}

	pub fn insert(&mut self, body: Body<T>) {
		self.root.insert(body, 0, self.bump)
	}

	pub fn root(&self) -> &Region<'b, T> {
		&self.root
	}

	/// Repulsion on `on` from all the other bodies of the tree
	///
	/// Regions whose half width is less than `theta` times their distance are
	/// replaced by their aggregate body.
	pub fn net_force(&self, on: &Body<T>, theta: T, law: &Coulomb<T>) -> Vec2<T> {
		self.root.apply(on, theta, law)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const LAW: Coulomb<f64> = Coulomb {
		k: 100.0,
		softening: 1.0,
	};

	fn bodies(points: &[(f64, f64)]) -> Vec<Body<f64>> {
		points
			.iter()
			.enumerate()
			.map(|(index, &(x, y))| Body {
				index,
				pos: Vec2::new(x, y),
				charge: 1.0 + index as f64,
			})
			.collect()
	}

	fn direct(on: &Body<f64>, all: &[Body<f64>]) -> Vec2<f64> {
		all.iter()
			.fold(Vec2::zero(), |f, other| f + pairwise(on, other, &LAW))
	}

	fn scattered(n: usize) -> Vec<Body<f64>> {
		// Deterministic, non-symmetric spread over the default square
		let points: Vec<(f64, f64)> = (0..n)
			.map(|i| {
				let i = i as f64;
				((i * 137.508 + 13.7) % 1000.0, (i * 291.113 + 41.9) % 1000.0)
			})
			.collect();
		bodies(&points)
	}

	#[test]
	fn test_quadrant() {
		let c = Vec2::new(500.0, 500.0);
		assert_eq!(Quadrant::of(c, Vec2::new(600.0, 600.0)), Quadrant::NorthEast);
		assert_eq!(Quadrant::of(c, Vec2::new(400.0, 600.0)), Quadrant::NorthWest);
		assert_eq!(Quadrant::of(c, Vec2::new(600.0, 400.0)), Quadrant::SouthEast);
		assert_eq!(Quadrant::of(c, Vec2::new(400.0, 400.0)), Quadrant::SouthWest);
		assert_eq!(Quadrant::of(c, c), Quadrant::SouthWest);
		assert_eq!(
			Quadrant::NorthWest.child_center(c, 250.0),
			Vec2::new(250.0, 750.0)
		);
	}

	#[test]
	fn test_insert_subdivides() {
		let bump = Bump::new();
		let mut tree = QuadTree::new(&bump, Vec2::new(500.0, 500.0), 500.0);
		let all = bodies(&[(100.0, 100.0), (900.0, 900.0), (800.0, 100.0)]);

		tree.insert(all[0]);
		assert!(!tree.root().is_subdivided());
		assert_eq!(tree.root().body(), Some(&all[0]));

		tree.insert(all[1]);
		tree.insert(all[2]);
		let root = tree.root();
		assert!(root.is_subdivided());
		assert_eq!(root.body(), None);
		assert_eq!(root.charge(), 6.0);
		let com = (Vec2::new(100.0, 100.0) * 1.0
			+ Vec2::new(900.0, 900.0) * 2.0
			+ Vec2::new(800.0, 100.0) * 3.0)
			/ 6.0;
		assert!(root.center_of_mass().distance(com) < 1e-9);

		let sw = root.child(Quadrant::SouthWest).unwrap();
		assert_eq!(sw.center(), Vec2::new(250.0, 250.0));
		assert_eq!(sw.half_width(), 250.0);
		assert_eq!(sw.body().map(|b| b.index), Some(0));
		assert_eq!(root.child(Quadrant::NorthEast).and_then(|r| r.body()).map(|b| b.index), Some(1));
		assert_eq!(root.child(Quadrant::SouthEast).and_then(|r| r.body()).map(|b| b.index), Some(2));
		assert!(root.child(Quadrant::NorthWest).is_none());
	}

	#[test]
	fn test_nested_aggregate() {
		let bump = Bump::new();
		let mut tree = QuadTree::new(&bump, Vec2::new(500.0, 500.0), 500.0);
		let all = bodies(&[(100.0, 100.0), (120.0, 130.0), (900.0, 900.0)]);
		for body in &all {
			tree.insert(*body);
		}
		let sw = tree.root().child(Quadrant::SouthWest).unwrap();
		assert!(sw.is_subdivided());
		assert_eq!(sw.charge(), 3.0);
		let com = (Vec2::new(100.0, 100.0) + Vec2::new(120.0, 130.0) * 2.0) / 3.0;
		assert!(sw.center_of_mass().distance(com) < 1e-9);
		assert_eq!(tree.root().charge(), 6.0);
	}

	#[test]
	fn test_matches_direct_sum_without_approximation() {
		let bump = Bump::new();
		let mut tree = QuadTree::new(&bump, Vec2::new(500.0, 500.0), 500.0);
		let all = scattered(200);
		for body in &all {
			tree.insert(*body);
		}
		for body in &all {
			let approx = tree.net_force(body, 0.0, &LAW);
			let exact = direct(body, &all);
			assert!(
				approx.distance(exact) <= 1e-6 * (1.0 + exact.norm()),
				"{:?} != {:?}",
				approx,
				exact
			);
		}
	}

	#[test]
	fn test_approximation_error_bounded() {
		let bump = Bump::new();
		let mut tree = QuadTree::new(&bump, Vec2::new(500.0, 500.0), 500.0);
		let all = scattered(300);
		for body in &all {
			tree.insert(*body);
		}
		let (mut err, mut total) = (0.0, 0.0);
		for body in &all {
			let approx = tree.net_force(body, 0.25, &LAW);
			let exact = direct(body, &all);
			err += approx.distance(exact);
			total += exact.norm();
		}
		assert!(err / total < 0.05, "relative error {}", err / total);
	}

	#[test]
	fn test_far_cluster_is_aggregated() {
		let bump = Bump::new();
		let mut tree = QuadTree::new(&bump, Vec2::new(500.0, 500.0), 500.0);
		let all = bodies(&[(10.0, 10.0), (990.0, 990.0), (980.0, 985.0), (985.0, 970.0)]);
		for body in &all {
			tree.insert(*body);
		}
		let ne = tree.root().child(Quadrant::NorthEast).unwrap();
		let expected = LAW.force(all[0].pos - ne.center_of_mass(), all[0].charge, ne.charge());
		// The NE quadrant is far enough to be replaced by its aggregate, the root is not
		let f = tree.net_force(&all[0], 0.25, &LAW);
		assert!(f.distance(expected) < 1e-12);
	}

	#[test]
	fn test_self_and_coincident_bodies() {
		let bump = Bump::new();
		let mut tree = QuadTree::new(&bump, Vec2::new(500.0, 500.0), 500.0);
		let all = bodies(&[(300.0, 300.0), (300.0, 300.0), (300.0, 300.0)]);
		for body in &all {
			tree.insert(*body);
		}
		assert_eq!(tree.root().charge(), 6.0);
		for body in &all {
			assert_eq!(tree.net_force(body, 0.0, &LAW), Vec2::zero());
			assert_eq!(tree.net_force(body, 0.25, &LAW), Vec2::zero());
		}

		let mut single = QuadTree::new(&bump, Vec2::new(500.0, 500.0), 500.0);
		single.insert(all[0]);
		assert_eq!(single.net_force(&all[0], 0.25, &LAW), Vec2::zero());
	}

	#[test]
	fn test_bucket_interacts_with_outsiders() {
		let bump = Bump::new();
		let mut tree = QuadTree::new(&bump, Vec2::new(500.0, 500.0), 500.0);
		let all = bodies(&[(300.0, 300.0), (300.0, 300.0), (700.0, 300.0)]);
		for body in &all {
			tree.insert(*body);
		}
		let f = tree.net_force(&all[2], 0.0, &LAW);
		let exact = direct(&all[2], &all);
		assert!(f.distance(exact) < 1e-9);
		assert!(f.x > 0.0);
	}
}
