use std::collections::HashMap;
use std::iter;

use super::alphabet::{Alphabet, END_CHAR, START_CHAR, is_reserved};
use super::state::State;
use crate::error::{MarkovError, Result};

/// Raw n-gram count table built while training.
///
/// # Responsibilities
/// - Pad each password with k-1 start markers and one end marker
/// - Slide a window of size k and count (context, next) pairs
/// - Optionally count every shorter suffix of each context (backoff)
/// - Merge with another table of the same order (parallel counting)
///
/// # Invariants
/// - `order` is always >= 1
/// - Each state key is exactly `order - 1` symbols, or shorter when
///   `with_suffixes` is set
#[derive(Clone, Debug)]
pub(crate) struct NGramCounts {
	/// The order of the model (number of symbols in the n-gram)
	order: usize,

	/// Also count contexts of length 0..order-1
	with_suffixes: bool,

	/// Mapping from a context to its transition counts
	states: HashMap<String, State>,

	/// Characters seen in passwords
	alphabet: Alphabet,

	/// Number of (weighted) passwords counted
	passwords: u64,
}

impl NGramCounts {
	/// Creates a new, empty table of order `order`.
	///
	/// # Errors
	/// Returns an error if `order < 1`.
	pub fn new(order: usize, with_suffixes: bool) -> Result<Self> {
		if order < 1 {
			return Err(MarkovError::Configuration(format!("Order must be >= 1, got {}", order)));
		}
		Ok(Self {
			order,
			with_suffixes,
			states: HashMap::new(),
			alphabet: Alphabet::new(),
			passwords: 0,
		})
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	pub fn passwords(&self) -> u64 {
		self.passwords
	}

	pub fn states(&self) -> impl Iterator<Item = &State> {
		self.states.values()
	}

	/// Counts all n-grams of `password`, each `weight` times.
	///
	/// # Errors
	/// Returns an error if the weight is 0 or the password contains a
	/// start or end marker or a tab, the output column separator.
	pub fn add_password(&mut self, password: &str, weight: u64) -> Result<()> {
		if weight == 0 {
			return Err(MarkovError::InvalidInput(format!(
				"Password {:?} has a zero count",
				password
			)));
		}
		if password.chars().any(is_reserved) {
			return Err(MarkovError::InvalidInput(format!(
				"Password {:?} contains a reserved marker character",
				password
			)));
		}

		if password.contains('\t') {
			return Err(MarkovError::InvalidInput(format!(
				"Password {:?} contains a tab",
				password
			)));
		}

		let width = self.order - 1;
		let padded: Vec<char> = iter::repeat_n(START_CHAR, width)
			.chain(password.chars())
			.chain(iter::once(END_CHAR))
			.collect();

		for c in password.chars() {
			self.alphabet.insert(c);
		}

		// For each window of `order` symbols
		for next_index in width..padded.len() {
			let next = padded[next_index];
			let shortest = if self.with_suffixes { 0 } else { width };
			for len in shortest..=width {
				let context: String = padded[next_index - len..next_index].iter().collect();
				let state = self.states.entry(context).or_insert_with_key(|key| State::new(key));
				state.add_transition(next, weight);
			}
		}

		self.passwords += weight;
		Ok(())
	}

	/// Merges another count table into this one.
	///
	/// # Errors
	/// Returns an error if the orders or the suffix modes differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order || self.with_suffixes != other.with_suffixes {
			return Err(MarkovError::Configuration(format!(
				"Cannot merge count tables: order {} vs {}",
				self.order, other.order
			)));
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		self.alphabet.merge(&other.alphabet);
		self.passwords += other.passwords;

		Ok(())
	}
}
