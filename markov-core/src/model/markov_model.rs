use std::collections::HashMap;
use std::iter;

use serde::{Deserialize, Serialize};

use super::alphabet::{Alphabet, END_CHAR, START_CHAR, is_reserved};
use super::distribution::{Distribution, SUM_TOLERANCE};
use super::ngram_model::NGramCounts;
use super::smoothing::Smoothing;
use crate::error::{MarkovError, Result};

/// A trained, immutable n-gram password model.
///
/// The model maps each context (the last `order - 1` symbols, start-padded)
/// to a smoothed next-symbol `Distribution`. It is produced once by the
/// `Trainer`, persisted with the store functions, and then shared read-only
/// by the `Guesser`, the `Sampler` and scoring.
///
/// # Lookup
/// - an exact context hit returns its distribution
/// - otherwise the smoothing fallback is used (uniform for additive)
/// - backoff models then retry with the context minus its first symbol,
///   down to the empty context
/// - anything left is a zero-probability context
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MarkovModel {
	order: usize,
	smoothing: Smoothing,
	alphabet: Alphabet,
	distributions: HashMap<String, Distribution>,
	fallback: Option<Distribution>,
}

impl MarkovModel {
	/// Applies `smoothing` to a count table.
	pub(crate) fn from_counts(counts: &NGramCounts, smoothing: Smoothing) -> Self {
		let alphabet = counts.alphabet().clone();

		let distributions: HashMap<String, Distribution> = counts
			.states()
			.filter_map(|state| {
				let weights = alphabet
					.outcomes()
					.map(|symbol| (symbol, smoothing.adjusted_frequency(state.count(symbol))));
				Distribution::from_weights(weights).map(|dist| (state.key().to_owned(), dist))
			})
			.collect();

		let fallback = smoothing.has_uniform_fallback().then(|| Distribution::uniform(&alphabet));

		Self {
			order: counts.order(),
			smoothing,
			alphabet,
			distributions,
			fallback,
		}
	}

	/// The n-gram order `k`; contexts are `k - 1` symbols long.
	pub fn order(&self) -> usize {
		self.order
	}

	pub fn smoothing(&self) -> Smoothing {
		self.smoothing
	}

	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	/// Distribution used for contexts missing from the table, if any.
	pub fn fallback(&self) -> Option<&Distribution> {
		self.fallback.as_ref()
	}

	/// Stored contexts and their distributions, in no particular order.
	pub fn contexts(&self) -> impl Iterator<Item = (&str, &Distribution)> {
		self.distributions.iter().map(|(key, dist)| (key.as_str(), dist))
	}

	/// Number of stored contexts.
	pub fn len(&self) -> usize {
		self.distributions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.distributions.is_empty()
	}

	/// Context key reached after generating `prefix`.
	///
	/// The prefix is left-padded with start markers and the last
	/// `order - 1` symbols are kept.
	pub fn context_key(&self, prefix: &str) -> String {
		let width = self.order - 1;
		let chars: Vec<char> = prefix.chars().collect();
		if chars.len() >= width {
			chars[chars.len() - width..].iter().collect()
		} else {
			iter::repeat_n(START_CHAR, width - chars.len()).chain(chars).collect()
		}
	}

	/// Slides `context` one symbol to the right.
	pub(crate) fn advance_context(&self, context: &str, next: char) -> String {
		if self.order == 1 {
			return String::new();
		}
		let mut chars = context.chars();
		if context.chars().count() >= self.order - 1 {
			chars.next();
		}
		chars.chain(iter::once(next)).collect()
	}

	/// Distribution to use after `context` (an exact context key).
	///
	/// Returns `None` for zero-probability contexts, which callers prune.
	pub fn distribution(&self, context: &str) -> Option<&Distribution> {
		if let Some(dist) = self.distributions.get(context) {
			return Some(dist);
		}
		if let Some(fallback) = &self.fallback {
			return Some(fallback);
		}
		if !self.smoothing.counts_suffixes() {
			return None;
		}

		let mut suffix = context;
		while !suffix.is_empty() {
			let mut chars = suffix.chars();
			chars.next();
			suffix = chars.as_str();
			if let Some(dist) = self.distributions.get(suffix) {
				return Some(dist);
			}
		}
		None
	}

	/// P(next | prefix), where `prefix` is plain password text.
	pub fn probability(&self, prefix: &str, next: char) -> f64 {
		self.distribution(&self.context_key(prefix))
			.map_or(0.0, |dist| dist.probability(next))
	}

	/// Natural log of the probability of generating exactly `password`
	/// (every symbol, then the end marker).
	///
	/// Returns `f64::NEG_INFINITY` for passwords the model cannot produce.
	pub fn log_probability(&self, password: &str) -> f64 {
		if password.chars().any(is_reserved) {
			return f64::NEG_INFINITY;
		}

		let mut context = self.context_key("");
		let mut total = 0.0;
		for symbol in password.chars().chain(iter::once(END_CHAR)) {
			let p = self.distribution(&context).map_or(0.0, |dist| dist.probability(symbol));
			if p <= 0.0 {
				return f64::NEG_INFINITY;
			}
			total += p.ln();
			context = self.advance_context(&context, symbol);
		}
		total
	}

	/// Probability of generating exactly `password`.
	pub fn password_probability(&self, password: &str) -> f64 {
		self.log_probability(password).exp()
	}

	/// Checks every structural invariant of a model.
	///
	/// Used on load so that a guesser never runs on an inconsistent model.
	///
	/// # Errors
	/// Returns `MarkovError::ModelLoad` describing the first violation.
	pub fn validate(&self) -> Result<()> {
		if self.order < 1 {
			return Err(MarkovError::ModelLoad(format!("Invalid order {}", self.order)));
		}
		self.smoothing
			.validate()
			.map_err(|e| MarkovError::ModelLoad(e.to_string()))?;

		let width = self.order - 1;
		for (key, dist) in &self.distributions {
			let len = key.chars().count();
			let valid_len = if self.smoothing.counts_suffixes() { len <= width } else { len == width };
			if !valid_len {
				return Err(MarkovError::ModelLoad(format!(
					"Context {:?} does not match order {}",
					key, self.order
				)));
			}
			if key.chars().any(|c| c != START_CHAR && !self.alphabet.contains(c)) {
				return Err(MarkovError::ModelLoad(format!(
					"Context {:?} uses symbols outside the alphabet",
					key
				)));
			}
			self.validate_distribution(key, dist)?;
		}

		if let Some(fallback) = &self.fallback {
			self.validate_distribution("<fallback>", fallback)?;
		}
		Ok(())
	}

	fn validate_distribution(&self, key: &str, dist: &Distribution) -> Result<()> {
		if dist.is_empty() {
			return Err(MarkovError::ModelLoad(format!("Context {:?} has an empty distribution", key)));
		}
		for (symbol, p) in dist.iter() {
			if !self.alphabet.is_outcome(symbol) {
				return Err(MarkovError::ModelLoad(format!(
					"Context {:?} predicts {:?} which is not in the alphabet",
					key, symbol
				)));
			}
			if !p.is_finite() || p <= 0.0 || p > 1.0 {
				return Err(MarkovError::ModelLoad(format!(
					"Context {:?} has invalid probability {} for {:?}",
					key, p, symbol
				)));
			}
		}
		let total = dist.total();
		if (total - 1.0).abs() > SUM_TOLERANCE {
			return Err(MarkovError::ModelLoad(format!(
				"Context {:?} sums to {} instead of 1",
				key, total
			)));
		}
		Ok(())
	}
}
