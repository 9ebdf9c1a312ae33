//! Guess command implementation: enumerate or sample candidate passwords.

use std::fs::File;
use std::io::{BufWriter, LineWriter, Write};
use std::path::Path;

use anyhow::Context;
use markov_core::io::write_guesses;
use markov_core::{GuessConfig, Guesser, GuesserClass, MarkovConfig, MarkovModel, Sampler};

use super::check_model_matches;
use crate::Cli;

pub fn run(cli: &Cli, config: &MarkovConfig, model_file: &Path, ofile: &Path) -> anyhow::Result<()> {
	let model = MarkovModel::load(model_file)?;
	check_model_matches(cli, &model)?;

	let guess_config = config.guess_config(&cli.prefix);
	let samples = match (cli.sample, config.guesser_class) {
		(Some(samples), _) => Some(samples),
		(None, GuesserClass::GenerateRandom) => Some(config.random_walk_samples),
		(None, _) => None,
	};

	let file = File::create(ofile).with_context(|| format!("Cannot create {}", ofile.display()))?;
	// Without any bound the run ends only when interrupted; keep every line whole
	let written = if samples.is_none() && guess_config.is_unbounded() {
		tracing::warn!("No guess limit or cutoff, output is unbounded");
		emit(&model, guess_config, samples, LineWriter::new(file))
	} else {
		emit(&model, guess_config, samples, BufWriter::new(file))
	}
	.with_context(|| format!("Cannot write {}", ofile.display()))?;

	tracing::info!(guesses = written, "Wrote guesses to {}", ofile.display());
	Ok(())
}

fn emit<W: Write>(
	model: &MarkovModel,
	guess_config: GuessConfig,
	samples: Option<usize>,
	mut writer: W,
) -> anyhow::Result<usize> {
	let written = match samples {
		Some(attempts) => {
			let sampler = Sampler::new(model, guess_config.max_length);
			let mut rng = rand::rng();
			write_guesses(&mut writer, sampler.samples(&mut rng, attempts))?
		}
		None => {
			let guesser = Guesser::new(model, guess_config)?;
			write_guesses(&mut writer, guesser.guesses())?
		}
	};
	writer.flush()?;
	Ok(written)
}
