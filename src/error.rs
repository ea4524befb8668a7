use thiserror::Error;

/// Invalid input handed to the layout engine
///
/// None of these are recoverable by the engine itself: they signal that the
/// caller built a graph or requested a mapping that has no sensible geometry.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum LayoutError {
	#[error("layout has no nodes")]
	EmptyNodeSet,

	/// Node positions collapse onto a line or a point, so no scale factor exists
	#[error("node positions span a degenerate bounding box ({width} x {height})")]
	DegenerateBoundingBox { width: f64, height: f64 },

	#[error("display target must have a positive size, got {width} x {height}")]
	DegenerateTarget { width: f64, height: f64 },

	#[error("node index {index} is out of range for {len} nodes")]
	NodeOutOfRange { index: usize, len: usize },

	#[error("edge ({0}, {0}) is a self-loop")]
	SelfLoop(usize),

	/// Attaching would give the child a second parent or close a cycle
	#[error("node {child} cannot be attached under node {parent}")]
	InvalidAttachment { parent: usize, child: usize },

	#[error("node {0} is not pinned")]
	NotPinned(usize),

	#[error("expected {expected} values, got {got}")]
	LengthMismatch { expected: usize, got: usize },

	#[error("invalid settings: {0}")]
	InvalidSettings(&'static str),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

/// Fails unless `index` addresses one of `len` nodes
pub(crate) fn check_index(index: usize, len: usize) -> LayoutResult<()> {
	if index < len {
		Ok(())
	} else {
		Err(LayoutError::NodeOutOfRange { index, len })
	}
}
