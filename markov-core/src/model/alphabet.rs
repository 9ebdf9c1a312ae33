use std::collections::BTreeSet;
use std::iter;

use serde::{Deserialize, Serialize};

/// Padding symbol placed before every password (k-1 times).
pub const START_CHAR: char = '\0';

/// Terminal symbol appended to every password.
pub const END_CHAR: char = '\n';

/// Returns `true` for the two marker characters that may not appear in a password.
pub fn is_reserved(c: char) -> bool {
	c == START_CHAR || c == END_CHAR
}

/// Set of characters observed during training.
///
/// The markers are never stored here. The end marker is nevertheless an
/// outcome of every distribution, so the outcome space of a model is
/// `alphabet + END_CHAR`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Alphabet {
	symbols: BTreeSet<char>,
}

impl Alphabet {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn insert(&mut self, symbol: char) {
		self.symbols.insert(symbol);
	}

	pub(crate) fn merge(&mut self, other: &Self) {
		self.symbols.extend(other.symbols.iter().copied());
	}

	pub fn contains(&self, symbol: char) -> bool {
		self.symbols.contains(&symbol)
	}

	/// Number of observed characters (markers excluded).
	pub fn len(&self) -> usize {
		self.symbols.len()
	}

	pub fn is_empty(&self) -> bool {
		self.symbols.is_empty()
	}

	/// Observed characters in ascending order.
	pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
		self.symbols.iter().copied()
	}

	/// Every symbol a distribution may assign mass to: the alphabet, then `END_CHAR`.
	pub fn outcomes(&self) -> impl Iterator<Item = char> + '_ {
		self.iter().chain(iter::once(END_CHAR))
	}

	/// `|alphabet| + 1`
	pub fn outcome_count(&self) -> usize {
		self.symbols.len() + 1
	}

	pub fn is_outcome(&self, symbol: char) -> bool {
		symbol == END_CHAR || self.contains(symbol)
	}
}

impl FromIterator<char> for Alphabet {
	fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
		Self { symbols: iter.into_iter().filter(|c| !is_reserved(*c)).collect() }
	}
}
