use std::collections::HashMap;

use crate::error::{MarkovError, Result};

/// Raw transition counts observed after one context.
///
/// A `State` corresponds to a fixed context (`key`, usually k-1 symbols)
/// and stores how often each next symbol followed it in the corpus.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Clone, Debug)]
pub(crate) struct State {
	/// Identifier of the state (the context).
	key: String,
	/// Outgoing transitions indexed by the next symbol.
	/// Example: { 'e' => 42, 'a' => 3 }
	transitions: HashMap<char, u64>,
}

impl State {
	/// Creates a new empty state for the given context.
	pub fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			transitions: HashMap::new(),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Records `weight` occurrences of a transition toward `next`.
	pub fn add_transition(&mut self, next: char, weight: u64) {
		*self.transitions.entry(next).or_insert(0) += weight;
	}

	/// Occurrences of `next` after this context, 0 if never observed.
	pub fn count(&self, next: char) -> u64 {
		self.transitions.get(&next).copied().unwrap_or(0)
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same context. Transition counts are
	/// summed, which makes counting over corpus chunks order independent.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.key != other.key {
			return Err(MarkovError::Configuration(format!(
				"Key mismatch while merging states: {:?} vs {:?}",
				self.key, other.key
			)));
		}

		for (next, occurrence) in &other.transitions {
			*self.transitions.entry(*next).or_insert(0) += *occurrence;
		}

		Ok(())
	}
}

#[cfg(test)]
impl State {
	/// Total number of observations leaving this context.
	pub fn total(&self) -> u64 {
		self.transitions.values().sum()
	}
}
