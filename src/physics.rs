//! Force laws between two bodies
//!
//! Both laws take the displacement `delta` pointing from the second body to
//! the first and return the force felt by the first body. The second body
//! feels the negated force.

use crate::{layout::Settings, util::*};

use num_traits::Zero;

/// Coulomb repulsion `k·q1·q2 / (|delta| + 1)²` along `delta`
///
/// The `+1` softening keeps the force finite as bodies get close.
pub fn repulsion<T: Coord>(delta: Vec2<T>, k: T, q1: T, q2: T) -> Vec2<T> {
	repulsion_softened(delta, k, q1, q2, T::one())
}

/// Coulomb repulsion with an explicit softening term added to the distance
pub fn repulsion_softened<T: Coord>(delta: Vec2<T>, k: T, q1: T, q2: T, softening: T) -> Vec2<T> {
	let d = delta.norm() + softening;
	delta.normalized() * (k * q1 * q2 / (d * d))
}

/// Hooke spring force `-k·(delta - rest·unit(delta))`
///
/// Zero at rest length, pulls the first body toward the second when the
/// spring is stretched and pushes it away when compressed.
pub fn attraction<T: Coord>(delta: Vec2<T>, k: T, rest_length: T) -> Vec2<T> {
	(delta - delta.normalized() * rest_length) * -k
}

/// Repulsion law parameterized from settings
#[derive(Clone, Copy, Debug)]
pub struct Coulomb<T> {
	pub k: T,
	pub softening: T,
}

impl<T: Coord> Coulomb<T> {
	pub fn from_settings(settings: &Settings<T>) -> Self {
		Self {
			k: settings.coulomb_k,
			softening: settings.softening,
		}
	}

	/// Force on a body of charge `q1` displaced by `delta` from a body of charge `q2`
	///
	/// Coincident bodies do not interact.
	pub fn force(&self, delta: Vec2<T>, q1: T, q2: T) -> Vec2<T> {
		if delta.is_zero() {
			return Vec2::zero();
		}
		repulsion_softened(delta, self.k, q1, q2, self.softening)
	}
}
