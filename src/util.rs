use num_traits::{cast::FromPrimitive, real::Real, sign::Signed, Zero};
#[cfg(feature = "rand")]
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

/// Scalar type of the simulation
///
/// Implemented for every float-like type, in practice `f32` and `f64`.
pub trait Coord:
	AddAssign<Self>
	+ DivAssign<Self>
	+ FromPrimitive
	+ Real
	+ Signed
	+ SubAssign<Self>
	+ MulAssign<Self>
	+ std::iter::Sum
	+ std::fmt::Debug
	+ Send
	+ Sync
	+ 'static
{
}

impl<T> Coord for T where
	T: AddAssign<T>
		+ DivAssign<T>
		+ FromPrimitive
		+ Real
		+ Signed
		+ SubAssign<T>
		+ MulAssign<T>
		+ std::iter::Sum
		+ std::fmt::Debug
		+ Send
		+ Sync
		+ 'static
{
}

/// Converts a literal constant into the scalar type
pub(crate) fn lit<T: Coord>(value: f64) -> T {
	T::from_f64(value).unwrap_or_else(T::zero)
}

/// False for NaN and infinities
pub(crate) fn finite<T: Coord>(value: T) -> bool {
	(value - value).is_zero()
}

/// Lossy conversion used for error reporting
pub(crate) fn to_f64<T: Coord>(value: T) -> f64 {
	value.to_f64().unwrap_or(f64::NAN)
}

/// 2D vector with value semantics
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec2<T> {
	pub x: T,
	pub y: T,
}

impl<T> Vec2<T> {
	pub const fn new(x: T, y: T) -> Self {
		Self { x, y }
	}
}

impl<T: Coord> Vec2<T> {
	pub fn norm_squared(self) -> T {
		self.x * self.x + self.y * self.y
	}

	pub fn norm(self) -> T {
		self.norm_squared().sqrt()
	}

	/// Unit vector with the same direction
	///
	/// The zero vector has no direction and normalizes to itself.
	pub fn normalized(self) -> Self {
		let norm = self.norm();
		if norm.is_zero() {
			Self::zero()
		} else {
			self / norm
		}
	}

	pub fn distance(self, rhs: Self) -> T {
		(self - rhs).norm()
	}

	/// Rounds both coordinates to the nearest integer, halves away from zero
	pub fn round(self) -> Self {
		Self::new(self.x.round(), self.y.round())
	}

	/// Component-wise product
	pub fn scale(self, factors: Self) -> Self {
		Self::new(self.x * factors.x, self.y * factors.y)
	}
}

impl<T: Coord> std::ops::Add<Vec2<T>> for Vec2<T> {
	type Output = Self;
	fn add(self, rhs: Self) -> Self::Output {
		Self::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl<T: Coord> std::ops::AddAssign<Vec2<T>> for Vec2<T> {
	fn add_assign(&mut self, other: Self) {
		self.x += other.x;
		self.y += other.y;
	}
}

impl<T: Coord> std::ops::Sub<Vec2<T>> for Vec2<T> {
	type Output = Self;
	fn sub(self, rhs: Self) -> Self::Output {
		Self::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl<T: Coord> std::ops::SubAssign<Vec2<T>> for Vec2<T> {
	fn sub_assign(&mut self, other: Self) {
		self.x -= other.x;
		self.y -= other.y;
	}
}

impl<T: Coord> std::ops::Mul<T> for Vec2<T> {
	type Output = Self;
	fn mul(self, rhs: T) -> Self::Output {
		Self::new(self.x * rhs, self.y * rhs)
	}
}

impl<T: Coord> std::ops::MulAssign<T> for Vec2<T> {
	fn mul_assign(&mut self, rhs: T) {
		self.x *= rhs;
		self.y *= rhs;
	}
}

impl<T: Coord> std::ops::Div<T> for Vec2<T> {
	type Output = Self;
	fn div(self, rhs: T) -> Self::Output {
		Self::new(self.x / rhs, self.y / rhs)
	}
}

impl<T: Coord> std::ops::Neg for Vec2<T> {
	type Output = Self;
	fn neg(self) -> Self::Output {
		Self::new(-self.x, -self.y)
	}
}

impl<T: Coord> Zero for Vec2<T> {
	fn zero() -> Self {
		Self::new(T::zero(), T::zero())
	}

	fn is_zero(&self) -> bool {
		self.x.is_zero() && self.y.is_zero()
	}
}

/// Axis-aligned bounding box of a set of points, as `(min, max)`
pub(crate) fn bounding_box<T: Coord>(
	mut points: impl Iterator<Item = Vec2<T>>,
) -> Option<(Vec2<T>, Vec2<T>)> {
	let first = points.next()?;
	Some(points.fold((first, first), |(min, max), p| {
		(
			Vec2::new(min.x.min(p.x), min.y.min(p.y)),
			Vec2::new(max.x.max(p.x), max.y.max(p.y)),
		)
	}))
}

/// Mutable references to two distinct elements, in argument order
pub(crate) fn get_2_mut<T>(s: &mut [T], i1: usize, i2: usize) -> (&mut T, &mut T) {
	assert_ne!(i1, i2);
	if i1 < i2 {
		let (s1, s2) = s.split_at_mut(i2);
		(&mut s1[i1], &mut s2[0])
	} else {
		let (s1, s2) = s.split_at_mut(i1);
		(&mut s2[0], &mut s1[i2])
	}
}

/// Uniform random point with integer coordinates in the square `[0, bound]²`
#[cfg(feature = "rand")]
pub fn sample_square<T, R: Rng>(rng: &mut R, bound: T) -> Vec2<T>
where
	T: Coord + rand::distributions::uniform::SampleUniform,
{
	Vec2::new(
		rng.gen_range(T::zero()..=bound).round(),
		rng.gen_range(T::zero()..=bound).round(),
	)
}
