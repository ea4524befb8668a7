//! Mapping between simulation space and display space

use crate::{
	error::{check_index, LayoutError, LayoutResult},
	layout::Layout,
	util::*,
};

use num_traits::Zero;

/// Per-axis affine map `display = pos * scale + shift`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform<T> {
	pub scale: Vec2<T>,
	pub shift: Vec2<T>,
}

impl<T: Coord> Transform<T> {
	/// Maps the bounding box of `points` onto `width × height`, its corner
	/// with the smallest coordinates landing at `(margin, margin)`
	pub fn fit(
		points: impl IntoIterator<Item = Vec2<T>>,
		width: T,
		height: T,
		margin: T,
	) -> LayoutResult<Self> {
		if !(width > T::zero() && height > T::zero() && finite(width) && finite(height)) {
			return Err(LayoutError::DegenerateTarget {
				width: to_f64(width),
				height: to_f64(height),
			});
		}
		let (min, max) = bounding_box(points.into_iter()).ok_or(LayoutError::EmptyNodeSet)?;
		let extent = max - min;
		if extent.x <= T::zero() || extent.y <= T::zero() {
			return Err(LayoutError::DegenerateBoundingBox {
				width: to_f64(extent.x),
				height: to_f64(extent.y),
			});
		}
		let scale = Vec2::new(width / extent.x, height / extent.y);
		let shift = Vec2::new(margin, margin) - min.scale(scale);
		Ok(Transform { scale, shift })
	}

	pub fn apply(&self, pos: Vec2<T>) -> Vec2<T> {
		pos.scale(self.scale) + self.shift
	}

	pub fn invert(&self, display: Vec2<T>) -> Vec2<T> {
		let d = display - self.shift;
		Vec2::new(d.x / self.scale.x, d.y / self.scale.y)
	}
}

impl<T: Coord, P> Layout<T, P> {
	/// Fits the current positions into a `width × height` window
	///
	/// Free nodes get their display position from their simulation position.
	/// Pinned nodes go the other way: their simulation position is derived
	/// from the display position set by [`Layout::pin`] or [`Layout::drag`].
	/// Returns the display position of every node.
	pub fn normalize_for_display(&mut self, width: T, height: T) -> LayoutResult<Vec<Vec2<T>>> {
		let transform = Transform::fit(
			self.nodes.iter().map(|node| node.pos),
			width,
			height,
			self.settings.margin,
		)?;
		for node in self.nodes.iter_mut() {
			if node.pinned {
				node.pos = transform.invert(node.display);
			} else {
				node.display = transform.apply(node.pos);
			}
		}
		Ok(self.nodes.iter().map(|node| node.display).collect())
	}

	/// Holds a node at a display position, e.g. when it is grabbed
	pub fn pin(&mut self, index: usize, display: Vec2<T>) -> LayoutResult<()> {
		check_index(index, self.nodes.len())?;
		let node = &mut self.nodes[index];
		node.pinned = true;
		node.velocity = Vec2::zero();
		node.force = Vec2::zero();
		node.display = display;
		Ok(())
	}

	/// Moves a pinned node to a new display position
	///
	/// The node must have been grabbed with [`Layout::pin`] first.
	pub fn drag(&mut self, index: usize, display: Vec2<T>) -> LayoutResult<()> {
		check_index(index, self.nodes.len())?;
		let node = &mut self.nodes[index];
		if !node.pinned {
			return Err(LayoutError::NotPinned(index));
		}
		node.display = display;
		Ok(())
	}

	/// Hands a node back to the simulation, at rest
	pub fn release(&mut self, index: usize) -> LayoutResult<()> {
		check_index(index, self.nodes.len())?;
		let node = &mut self.nodes[index];
		node.pinned = false;
		node.velocity = Vec2::zero();
		node.force = Vec2::zero();
		Ok(())
	}

	/// Node whose display position is closest to `display`, within `radius`
	pub fn hit_test(&self, display: Vec2<T>, radius: T) -> Option<usize> {
		self.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (i, node.display.distance(display)))
			.filter(|&(_, d)| d <= radius)
			.min_by(|(_, d1), (_, d2)| d1.partial_cmp(d2).unwrap_or(std::cmp::Ordering::Equal))
			.map(|(i, _)| i)
	}
}
