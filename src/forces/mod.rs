pub mod attraction;
pub mod repulsion;

use crate::{
	layout::{Layout, Repulsion, Settings},
	util::*,
};

impl<T: Coord, P> Layout<T, P> {
	pub(crate) fn choose_repulsion(settings: &Settings<T>) -> fn(&mut Self) {
		match settings.repulsion {
			Repulsion::BarnesHut => repulsion::apply_repulsion_bh,
			Repulsion::Exact => repulsion::apply_repulsion_exact,
		}
	}
}
