mod display;
pub mod error;
mod forces;
pub mod graph;
mod layout;
pub mod physics;
pub mod trees;
mod util;

pub use display::Transform;
pub use error::{LayoutError, LayoutResult};
pub use graph::{binary_tree, complete_graph, Edge, Edges, Hierarchy};
pub use layout::{Bounds, Layout, Node, Repulsion, Settings, Structure};
#[cfg(feature = "rand")]
pub use util::sample_square;
pub use util::{Coord, Vec2};

use num_traits::Zero;

impl<T: Coord, P> Layout<T, P> {
	/// Instantiates a layout whose springs are the edges of an undirected graph
	///
	/// Nodes keep the positions they are given, see [`Layout::initialize`].
	pub fn from_graph(nodes: Vec<Node<T, P>>, edges: Edges<T>, settings: Settings<T>) -> LayoutResult<Self> {
		Self::new(nodes, Structure::Graph(edges), settings)
	}

	/// Instantiates a layout whose springs link every node of `hierarchy` to its parent
	pub fn from_tree(
		nodes: Vec<Node<T, P>>,
		hierarchy: Hierarchy,
		settings: Settings<T>,
	) -> LayoutResult<Self> {
		Self::new(nodes, Structure::Tree(hierarchy), settings)
	}

	fn new(nodes: Vec<Node<T, P>>, structure: Structure<T>, settings: Settings<T>) -> LayoutResult<Self> {
		if nodes.is_empty() {
			return Err(LayoutError::EmptyNodeSet);
		}
		structure.check(nodes.len())?;
		settings.check()?;

		let nb = nodes.len();
		let tree_stack = match structure {
			Structure::Tree(_) => Vec::with_capacity(nb),
			Structure::Graph(_) => Vec::new(),
		};
		tracing::debug!(
			nodes = nb,
			springs = structure.edges().len(),
			tree = matches!(structure, Structure::Tree(_)),
			repulsion = ?settings.repulsion,
			"new layout"
		);
		Ok(Self {
			nodes,
			structure,
			bump: parking_lot::Mutex::new(bumpalo::Bump::with_capacity(
				(nb + 4 * (nb.checked_ilog2().unwrap_or(0) as usize + 1))
					* std::mem::size_of::<trees::Region<'static, T>>(),
			)),
			fn_repulsion: Self::choose_repulsion(&settings),
			settings,
			tree_stack,
		})
	}

	pub fn get_settings(&self) -> &Settings<T> {
		&self.settings
	}

	/// Changes layout settings
	pub fn set_settings(&mut self, settings: Settings<T>) -> LayoutResult<()> {
		settings.check()?;
		self.fn_repulsion = Self::choose_repulsion(&settings);
		self.settings = settings;
		Ok(())
	}

	pub fn structure(&self) -> &Structure<T> {
		&self.structure
	}

	/// Connected pairs, for drawing
	pub fn edges(&self) -> Vec<Edge> {
		self.structure.edges()
	}

	/// Places every node at a random integer position in `[0, bound]²`
	///
	/// Also sets the charge, clears the pin and zeroes velocity and force.
	#[cfg(feature = "rand")]
	pub fn initialize(&mut self, bound: T, charge: T) -> LayoutResult<()>
	where
		T: rand::distributions::uniform::SampleUniform,
	{
		self.initialize_with(&mut rand::thread_rng(), bound, charge)
	}

	/// Same as [`Layout::initialize`] with a caller-provided generator
	#[cfg(feature = "rand")]
	pub fn initialize_with<R: rand::Rng>(&mut self, rng: &mut R, bound: T, charge: T) -> LayoutResult<()>
	where
		T: rand::distributions::uniform::SampleUniform,
	{
		if !(bound >= T::zero() && util::finite(bound)) {
			return Err(LayoutError::InvalidSettings("initialization bound must be finite and not negative"));
		}
		for node in self.nodes.iter_mut() {
			node.pos = util::sample_square(rng, bound);
			node.velocity = Vec2::zero();
			node.force = Vec2::zero();
			node.charge = charge;
			node.pinned = false;
		}
		Ok(())
	}

	/// Computes one integration step of length `dt`
	pub fn advance(&mut self, dt: T) {
		self.init_iteration();
		self.apply_repulsion();
		self.apply_attraction();
		self.integrate_velocities(dt);
		let moved = self.integrate_positions(dt);
		tracing::trace!(bodies = self.nodes.len(), max_displacement = util::to_f64(moved), "step");
	}

	pub(crate) fn init_iteration(&mut self) {
		for node in self.nodes.iter_mut().filter(|node| !node.pinned) {
			node.force = Vec2::zero();
		}
	}

	pub(crate) fn apply_repulsion(&mut self) {
		(self.fn_repulsion)(self)
	}

	pub(crate) fn apply_attraction(&mut self) {
		forces::attraction::apply_attraction(self)
	}

	fn integrate_velocities(&mut self, dt: T) {
		let damping = self.settings.damping;
		for node in self.nodes.iter_mut().filter(|node| !node.pinned) {
			node.velocity += node.force * dt;
			node.velocity *= damping;
		}
	}

	/// Returns the largest distance travelled by a node
	fn integrate_positions(&mut self, dt: T) -> T {
		let quantize = self.settings.quantize;
		let mut moved = T::zero();
		for node in self.nodes.iter_mut().filter(|node| !node.pinned) {
			let mut pos = node.pos + node.velocity * dt;
			if quantize {
				pos = pos.round();
			}
			moved = moved.max(pos.distance(node.pos));
			node.pos = pos;
			node.force = Vec2::zero();
		}
		moved
	}
}
