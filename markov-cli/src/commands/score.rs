//! Score command implementation: probability of every password in a file,
//! and its estimated guess number with the `random_walk` guesser class.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use markov_core::io::{read_passwords, write_estimates, write_scores};
use markov_core::{GuessNumberEstimator, GuesserClass, MarkovConfig, MarkovModel, Sampler};

use super::check_model_matches;
use crate::Cli;

pub fn run(
	cli: &Cli,
	config: &MarkovConfig,
	model_file: &Path,
	password_file: &Path,
	ofile: &Path,
) -> anyhow::Result<()> {
	let model = MarkovModel::load(model_file)?;
	check_model_matches(cli, &model)?;

	let passwords = read_passwords(password_file)?;
	let file = File::create(ofile).with_context(|| format!("Cannot create {}", ofile.display()))?;
	let mut writer = BufWriter::new(file);

	let written = match config.guesser_class {
		GuesserClass::RandomWalk => {
			let sampler = Sampler::new(&model, config.guess_config("").max_length);
			let mut rng = rand::rng();
			let estimator = GuessNumberEstimator::new(&sampler, &mut rng, config.random_walk_samples);
			let estimates = passwords.iter().map(|password| {
				let log_probability = model.log_probability(password);
				(password.as_str(), log_probability.exp(), estimator.estimate(log_probability))
			});
			write_estimates(&mut writer, estimates)
		}
		GuesserClass::Human | GuesserClass::GenerateRandom => {
			let scores = passwords
				.iter()
				.map(|password| (password.as_str(), model.password_probability(password)));
			write_scores(&mut writer, scores)
		}
	}
	.with_context(|| format!("Cannot write {}", ofile.display()))?;
	writer.flush()?;

	tracing::info!(passwords = written, "Wrote probabilities to {}", ofile.display());
	Ok(())
}
