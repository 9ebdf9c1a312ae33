//! Command implementations for the three modes of `markov-model`.

pub mod guess;
pub mod score;
pub mod train;

use anyhow::bail;
use markov_core::MarkovModel;

use crate::Cli;

/// `-k` and `-s` are optional outside training; when given they must agree
/// with the loaded model.
pub fn check_model_matches(cli: &Cli, model: &MarkovModel) -> anyhow::Result<()> {
	if let Some(order) = cli.k_order {
		if order != model.order() {
			bail!(markov_core::MarkovError::Configuration(format!(
				"Model has order {}, but -k {} was given",
				model.order(),
				order
			)));
		}
	}
	if let Some(kind) = cli.smoothing {
		if kind != model.smoothing().kind() {
			bail!(markov_core::MarkovError::Configuration(format!(
				"Model uses {} smoothing, but -s {} was given",
				model.smoothing().kind(),
				kind
			)));
		}
	}
	Ok(())
}
