//! Headless layout runner
//!
//! Builds a complete graph or a binary tree, runs the simulation and prints
//! display positions followed by the edges, one per line.

use forcelayout::*;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use std::{fs::File, io::BufReader, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fdl")]
#[command(version, about, long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Number of simulation steps
	#[arg(short, long, global = true, default_value = "500")]
	iterations: usize,

	/// Time step
	#[arg(long, global = true, default_value = "0.05")]
	dt: f64,

	/// Display window width
	#[arg(long, global = true, default_value = "800")]
	width: f64,

	/// Display window height
	#[arg(long, global = true, default_value = "800")]
	height: f64,

	/// YAML settings file, missing keys take their default value
	#[arg(short, long, global = true)]
	settings: Option<PathBuf>,

	/// Seed of the initial positions
	#[arg(long, global = true, default_value = "0")]
	seed: u64,

	/// Hold a node at a display position, as `node,x,y`
	#[arg(long, global = true, value_parser = parse_pin)]
	pin: Option<(usize, f64, f64)>,
}

#[derive(Subcommand)]
enum Commands {
	/// Full binary tree, springs tighten with depth
	Tree {
		/// Levels below the root
		levels: u32,
	},
	/// Every pair of nodes connected
	Complete {
		/// Number of nodes
		n: usize,
	},
}

fn parse_pin(arg: &str) -> Result<(usize, f64, f64), String> {
	let mut parts = arg.split(',');
	match (parts.next(), parts.next(), parts.next(), parts.next()) {
		(Some(node), Some(x), Some(y), None) => Ok((
			node.trim().parse().map_err(|e| format!("bad node: {e}"))?,
			x.trim().parse().map_err(|e| format!("bad x: {e}"))?,
			y.trim().parse().map_err(|e| format!("bad y: {e}"))?,
		)),
		_ => Err(format!("expected `node,x,y`, got `{arg}`")),
	}
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings<f64>> {
	let Some(path) = path else {
		return Ok(Settings::default());
	};
	let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
	let settings = serde_yaml::from_reader(BufReader::new(file))
		.with_context(|| format!("cannot parse settings from {}", path.display()))?;
	Ok(settings)
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let settings = load_settings(cli.settings.as_ref())?;

	let mut layout = match cli.command {
		Commands::Tree { levels } => {
			let hierarchy = binary_tree(levels);
			let nodes = (0..hierarchy.len()).map(Node::new).collect();
			Layout::from_tree(nodes, hierarchy, settings)?
		}
		Commands::Complete { n } => {
			let nodes = (0..n).map(Node::new).collect();
			Layout::from_graph(nodes, complete_graph(n), settings)?
		}
	};

	let mut rng = rand::rngs::StdRng::seed_from_u64(cli.seed);
	layout.initialize_with(&mut rng, 1000.0, 1.0)?;
	layout.normalize_for_display(cli.width, cli.height)?;
	if let Some((node, x, y)) = cli.pin {
		layout.pin(node, Vec2::new(x, y))?;
	}

	for i in 0..cli.iterations {
		eprint!("{}/{}\r", i, cli.iterations);
		layout.advance(cli.dt);
		layout.normalize_for_display(cli.width, cli.height)?;
	}
	eprintln!();

	for node in layout.nodes.iter() {
		println!("{}\t{}\t{}", node.payload, node.display.x, node.display.y);
	}
	for (n1, n2) in layout.edges() {
		println!("{}\t{}", n1, n2);
	}
	Ok(())
}
