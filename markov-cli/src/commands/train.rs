//! Train command implementation.

use std::path::Path;
use std::time::Instant;

use markov_core::{MarkovConfig, SmoothingKind, Trainer};

use crate::{Cli, DEFAULT_ORDER};

pub fn run(cli: &Cli, config: &MarkovConfig, train_file: &Path, ofile: &Path) -> anyhow::Result<()> {
	let order = cli.k_order.unwrap_or(DEFAULT_ORDER);
	let smoothing = config.smoothing(cli.smoothing.unwrap_or(SmoothingKind::None))?;
	let trainer = Trainer::new(order, smoothing)?;

	let start = Instant::now();
	let model = trainer.train_file(train_file, cli.train_format)?;
	tracing::info!(
		seconds = start.elapsed().as_secs_f64(),
		contexts = model.len(),
		"Trained on {}",
		train_file.display()
	);

	model.save(ofile)?;
	Ok(())
}
