use rand::Rng;

use super::markov_model::MarkovModel;
use super::sampler::Sampler;

/// Monte Carlo estimate of guess numbers.
///
/// A password's guess number is how many candidates an exhaustive guesser,
/// emitting in decreasing probability order, produces before reaching it.
/// Instead of enumerating, `n` passwords are sampled from the model; each
/// sample `s` of probability `p_s` stands for `1 / (n * p_s)` candidates, so
/// the guess number of a password of probability `p` is estimated by
/// `sum over samples with p_s > p of 1 / (n * p_s)`.
///
/// Walks that fail (dead end, too long) still count in `n`.
#[derive(Clone, Debug, PartialEq)]
pub struct GuessNumberEstimator {
	/// Sample log-probabilities, sorted in decreasing order.
	log_probabilities: Vec<f64>,
	/// `cumulative[i]`: weight of the `i + 1` most probable samples.
	cumulative: Vec<f64>,
	samples: usize,
}

impl GuessNumberEstimator {
	/// Draws `samples` random walks from `sampler`.
	pub fn new<R: Rng + ?Sized>(sampler: &Sampler<'_>, rng: &mut R, samples: usize) -> Self {
		let mut log_probabilities: Vec<f64> =
			sampler.samples(rng, samples).map(|guess| guess.log_probability).collect();
		log_probabilities.sort_by(|a, b| b.total_cmp(a));

		let log_samples = (samples.max(1) as f64).ln();
		let mut total = 0.0;
		let cumulative = log_probabilities
			.iter()
			.map(|lp| {
				total += (-log_samples - lp).exp();
				total
			})
			.collect();

		tracing::debug!(samples, completed = log_probabilities.len(), "Drew random walks");
		Self { log_probabilities, cumulative, samples }
	}

	/// Number of walks drawn, failed ones included.
	pub fn samples(&self) -> usize {
		self.samples
	}

	/// Estimated guess number of a password of log-probability `log_probability`.
	pub fn estimate(&self, log_probability: f64) -> f64 {
		let above = self.log_probabilities.partition_point(|&lp| lp > log_probability);
		match above {
			0 => 0.0,
			n => self.cumulative[n - 1],
		}
	}

	/// Estimated guess number of `password` under `model`.
	pub fn guess_number(&self, model: &MarkovModel, password: &str) -> f64 {
		self.estimate(model.log_probability(password))
	}
}
