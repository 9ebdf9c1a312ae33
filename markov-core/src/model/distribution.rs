use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::alphabet::Alphabet;

/// Tolerance on the sum of a distribution.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Next-symbol probabilities for one context.
///
/// Entries are kept sorted by symbol so every traversal of a model is
/// deterministic. Only symbols with a strictly positive probability are
/// stored; a lookup of any other symbol yields 0.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Distribution {
	probabilities: BTreeMap<char, f64>,
}

impl Distribution {
	/// Normalises non-negative weights into a distribution.
	///
	/// Zero weights are dropped. Returns `None` if nothing carries weight.
	pub(crate) fn from_weights<I>(weights: I) -> Option<Self>
	where
		I: IntoIterator<Item = (char, f64)>,
	{
		let weights: Vec<(char, f64)> = weights.into_iter().filter(|(_, w)| *w > 0.0).collect();
		let total: f64 = weights.iter().map(|(_, w)| w).sum();
		if weights.is_empty() || total <= 0.0 {
			return None;
		}

		Some(Self {
			probabilities: weights.into_iter().map(|(symbol, w)| (symbol, w / total)).collect(),
		})
	}

	/// Uniform distribution over `alphabet + END_CHAR`.
	pub(crate) fn uniform(alphabet: &Alphabet) -> Self {
		let p = 1.0 / alphabet.outcome_count() as f64;
		Self {
			probabilities: alphabet.outcomes().map(|symbol| (symbol, p)).collect(),
		}
	}

	/// Probability of `symbol`, 0 when the symbol has no mass.
	pub fn probability(&self, symbol: char) -> f64 {
		self.probabilities.get(&symbol).copied().unwrap_or(0.0)
	}

	/// `(symbol, probability)` pairs in ascending symbol order.
	pub fn iter(&self) -> impl DoubleEndedIterator<Item = (char, f64)> + '_ {
		self.probabilities.iter().map(|(symbol, p)| (*symbol, *p))
	}

	pub fn len(&self) -> usize {
		self.probabilities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.probabilities.is_empty()
	}

	pub fn total(&self) -> f64 {
		self.probabilities.values().sum()
	}

	/// Draws the next symbol using weighted random sampling.
	///
	/// A uniform draw in `[0, total)` is walked down the cumulative mass.
	/// Returns `None` if the distribution is empty.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<char> {
		let total = self.total();
		if self.probabilities.is_empty() || total <= 0.0 {
			return None;
		}

		let mut r = rng.random_range(0.0..total);

		let mut fallback: Option<char> = None;
		for (symbol, p) in &self.probabilities {
			if r < *p {
				return Some(*symbol);
			}
			r -= p;
			fallback = Some(*symbol);
		}

		// Rounding can leave r just above the last bucket
		fallback
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::alphabet::END_CHAR;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn weights_are_normalised() {
		let dist = Distribution::from_weights([('a', 1.0), ('b', 3.0), ('c', 0.0)]).unwrap();
		assert_eq!(dist.len(), 2);
		assert!((dist.probability('a') - 0.25).abs() < 1e-12);
		assert!((dist.probability('b') - 0.75).abs() < 1e-12);
		assert_eq!(dist.probability('c'), 0.0);
		assert!((dist.total() - 1.0).abs() < SUM_TOLERANCE);
	}

	#[test]
	fn zero_weights_give_no_distribution() {
		assert!(Distribution::from_weights([('a', 0.0)]).is_none());
		assert!(Distribution::from_weights(Vec::new()).is_none());
	}

	#[test]
	fn uniform_covers_end_marker() {
		let alphabet: Alphabet = "ab".chars().collect();
		let dist = Distribution::uniform(&alphabet);
		assert_eq!(dist.len(), 3);
		assert!((dist.probability(END_CHAR) - 1.0 / 3.0).abs() < 1e-12);
	}

	#[test]
	fn sampling_only_returns_supported_symbols() {
		let dist = Distribution::from_weights([('x', 1.0), ('y', 1.0)]).unwrap();
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..100 {
			let symbol = dist.sample(&mut rng).unwrap();
			assert!(symbol == 'x' || symbol == 'y');
		}
		assert!(Distribution::default().sample(&mut rng).is_none());
	}
}
