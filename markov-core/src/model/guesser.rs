use serde::{Deserialize, Serialize};

use super::alphabet::{END_CHAR, is_reserved};
use super::markov_model::MarkovModel;
use crate::error::{MarkovError, Result};

/// A complete candidate password and its model probability.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Guess {
	pub password: String,
	pub probability: f64,
	/// Natural log of `probability`, exact even when `probability` underflows.
	pub log_probability: f64,
}

/// Limits of one guessing run.
///
/// - `limit`: stop after that many guesses, `None` for exhaustive.
/// - `min_probability`: branches whose path probability falls below are
///   cut; 0 disables the cutoff.
/// - `max_length`: longest password generated, `None` for unbounded.
/// - `prefix`: only candidates starting with this text are generated; the
///   prefix's own path probability is included.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GuessConfig {
	pub limit: Option<usize>,
	pub min_probability: f64,
	pub max_length: Option<usize>,
	pub prefix: String,
}

impl Default for GuessConfig {
	fn default() -> Self {
		Self {
			limit: None,
			min_probability: 1e-8,
			max_length: Some(40),
			prefix: String::new(),
		}
	}
}

impl GuessConfig {
	/// No cutoff at all: the sequence may be infinite.
	pub fn unbounded() -> Self {
		Self {
			limit: None,
			min_probability: 0.0,
			max_length: None,
			prefix: String::new(),
		}
	}

	/// `true` when neither a limit nor a cutoff bounds the run.
	pub fn is_unbounded(&self) -> bool {
		self.limit.is_none() && self.max_length.is_none() && self.min_probability == 0.0
	}

	pub(crate) fn validate(&self) -> Result<()> {
		if !self.min_probability.is_finite() || !(0.0..=1.0).contains(&self.min_probability) {
			return Err(MarkovError::Configuration(format!(
				"Lower probability threshold must be between 0.0 and 1.0, got {}",
				self.min_probability
			)));
		}
		if self.prefix.chars().any(is_reserved) {
			return Err(MarkovError::InvalidInput(format!(
				"Prefix {:?} contains a reserved marker character",
				self.prefix
			)));
		}
		Ok(())
	}
}

/// A pending step of the depth-first traversal.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
enum Frame {
	/// Partial password still to be expanded.
	Expand {
		password: String,
		context: String,
		length: usize,
		log_probability: f64,
	},
	/// Complete candidate waiting to be emitted.
	Emit(Guess),
}

/// Saved position of a guessing run.
///
/// Obtained from `Guesses::checkpoint` and handed back to
/// `Guesser::resume`; it holds the unexplored frontier, so the resumed run
/// emits exactly the guesses the original run had not yet emitted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GuessCursor {
	order: usize,
	emitted: usize,
	stack: Vec<Frame>,
}

impl GuessCursor {
	/// Number of guesses emitted before the checkpoint.
	pub fn emitted(&self) -> usize {
		self.emitted
	}

	/// `true` when nothing remains to be generated.
	pub fn is_exhausted(&self) -> bool {
		self.stack.is_empty()
	}
}

/// Enumerates candidate passwords of a model with their probabilities.
///
/// The candidate space is a tree rooted at the empty password: each node
/// branches on every symbol of nonzero probability after its context, and
/// the end-marker branch is a finished candidate. The tree is walked depth
/// first with an explicit stack, so long passwords never grow the call
/// stack, and the walk can stop after any guess.
///
/// Guesses come out in a deterministic order that is *not* sorted by
/// probability; sort the output externally if needed.
#[derive(Clone, Debug)]
pub struct Guesser<'m> {
	model: &'m MarkovModel,
	config: GuessConfig,
}

impl<'m> Guesser<'m> {
	/// # Errors
	/// Returns an error if the threshold is out of range or the prefix
	/// contains a marker character.
	pub fn new(model: &'m MarkovModel, config: GuessConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { model, config })
	}

	pub fn config(&self) -> &GuessConfig {
		&self.config
	}

	/// Starts a fresh traversal.
	pub fn guesses(&self) -> Guesses<'m> {
		let mut stack = Vec::new();
		if let Some(root) = self.root() {
			stack.push(root);
		}
		tracing::debug!(prefix = %self.config.prefix, reachable = !stack.is_empty(), "Starting guess enumeration");
		self.iterator(stack, 0)
	}

	/// Continues a traversal saved with `Guesses::checkpoint`.
	///
	/// # Errors
	/// Returns `MarkovError::Configuration` if the cursor was produced by a
	/// model of another order.
	pub fn resume(&self, cursor: GuessCursor) -> Result<Guesses<'m>> {
		if cursor.order != self.model.order() {
			return Err(MarkovError::Configuration(format!(
				"Cursor was saved for a {}-gram model, this model has order {}",
				cursor.order,
				self.model.order()
			)));
		}
		tracing::debug!(emitted = cursor.emitted, pending = cursor.stack.len(), "Resuming guess enumeration");
		Ok(self.iterator(cursor.stack, cursor.emitted))
	}

	fn iterator(&self, stack: Vec<Frame>, emitted: usize) -> Guesses<'m> {
		let min_log_probability = if self.config.min_probability > 0.0 {
			self.config.min_probability.ln()
		} else {
			f64::NEG_INFINITY
		};
		Guesses {
			model: self.model,
			stack,
			emitted,
			limit: self.config.limit,
			min_log_probability,
			max_length: self.config.max_length,
		}
	}

	/// Node for the configured prefix, `None` if it is unreachable.
	fn root(&self) -> Option<Frame> {
		let mut context = self.model.context_key("");
		let mut log_probability = 0.0;
		let mut length = 0;
		for symbol in self.config.prefix.chars() {
			let p = self.model.distribution(&context)?.probability(symbol);
			if p <= 0.0 {
				return None;
			}
			log_probability += p.ln();
			context = self.model.advance_context(&context, symbol);
			length += 1;
		}
		Some(Frame::Expand {
			password: self.config.prefix.clone(),
			context,
			length,
			log_probability,
		})
	}
}

/// Lazy sequence of guesses produced by `Guesser`.
///
/// Dropping it cancels the run; everything already yielded stays valid.
#[derive(Clone, Debug)]
pub struct Guesses<'m> {
	model: &'m MarkovModel,
	stack: Vec<Frame>,
	emitted: usize,
	limit: Option<usize>,
	min_log_probability: f64,
	max_length: Option<usize>,
}

impl Guesses<'_> {
	/// Guesses yielded so far, including those before a resume.
	pub fn emitted(&self) -> usize {
		self.emitted
	}

	/// Snapshot of the traversal that `Guesser::resume` can continue.
	pub fn checkpoint(&self) -> GuessCursor {
		GuessCursor {
			order: self.model.order(),
			emitted: self.emitted,
			stack: self.stack.clone(),
		}
	}

	fn expand(&mut self, password: String, context: String, length: usize, log_probability: f64) {
		let model = self.model;
		// Zero-probability context: prune
		let Some(dist) = model.distribution(&context) else {
			return;
		};
		let can_grow = self.max_length.is_none_or(|max| length < max);

		// Pushed in reverse so that children pop in ascending symbol order
		for (symbol, p) in dist.iter().rev() {
			let child_log_probability = log_probability + p.ln();
			if child_log_probability < self.min_log_probability {
				continue;
			}
			if symbol == END_CHAR {
				self.stack.push(Frame::Emit(Guess {
					password: password.clone(),
					probability: child_log_probability.exp(),
					log_probability: child_log_probability,
				}));
			} else if can_grow {
				let mut child = password.clone();
				child.push(symbol);
				self.stack.push(Frame::Expand {
					password: child,
					context: model.advance_context(&context, symbol),
					length: length + 1,
					log_probability: child_log_probability,
				});
			}
		}
	}
}

impl Iterator for Guesses<'_> {
	type Item = Guess;

	fn next(&mut self) -> Option<Guess> {
		if self.limit.is_some_and(|limit| self.emitted >= limit) {
			return None;
		}

		while let Some(frame) = self.stack.pop() {
			match frame {
				Frame::Emit(guess) => {
					self.emitted += 1;
					return Some(guess);
				}
				Frame::Expand { password, context, length, log_probability } => {
					self.expand(password, context, length, log_probability);
				}
			}
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::smoothing::Smoothing;
	use crate::model::trainer::Trainer;

	fn model(order: usize, corpus: &[&str]) -> MarkovModel {
		Trainer::new(order, Smoothing::None).unwrap().train(corpus).unwrap()
	}

	#[test]
	fn acyclic_model_is_enumerated_exhaustively() {
		let model = model(3, &["abc", "abd", "x"]);
		let guesser = Guesser::new(&model, GuessConfig::unbounded()).unwrap();
		let mut passwords: Vec<String> = guesser.guesses().map(|g| g.password).collect();
		passwords.sort();
		assert_eq!(passwords, vec!["abc", "abd", "x"]);
	}

	#[test]
	fn order_is_deterministic() {
		let model = model(2, &["ab", "ba", "abba"]);
		let config = GuessConfig { max_length: Some(6), ..GuessConfig::unbounded() };
		let guesser = Guesser::new(&model, config).unwrap();
		let first: Vec<Guess> = guesser.guesses().collect();
		let second: Vec<Guess> = guesser.guesses().collect();
		assert_eq!(first, second);
	}

	#[test]
	fn limit_stops_the_sequence() {
		let model = model(2, &["ab", "ba", "abba"]);
		let config = GuessConfig { limit: Some(3), ..GuessConfig::default() };
		let guesser = Guesser::new(&model, config).unwrap();
		assert_eq!(guesser.guesses().count(), 3);
	}

	#[test]
	fn unbounded_cyclic_model_is_lazy() {
		// "a" may follow "a" forever
		let model = model(2, &["a", "aa"]);
		let guesser = Guesser::new(&model, GuessConfig::unbounded()).unwrap();
		let first: Vec<String> = guesser.guesses().take(5).map(|g| g.password).collect();
		assert_eq!(first, vec!["a", "aa", "aaa", "aaaa", "aaaaa"]);
	}

	#[test]
	fn max_length_bounds_candidates() {
		let model = model(2, &["a", "aa"]);
		let config = GuessConfig { max_length: Some(3), ..GuessConfig::unbounded() };
		let guesser = Guesser::new(&model, config).unwrap();
		let all: Vec<String> = guesser.guesses().map(|g| g.password).collect();
		assert_eq!(all, vec!["a", "aa", "aaa"]);
	}

	#[test]
	fn probability_cutoff_prunes_branches() {
		let model = model(2, &["a", "aa"]);
		let config = GuessConfig { min_probability: 0.1, ..GuessConfig::unbounded() };
		let guesser = Guesser::new(&model, config).unwrap();
		for guess in guesser.guesses() {
			assert!(guess.probability >= 0.1);
		}
		assert!(guesser.guesses().count() > 0);
	}

	#[test]
	fn any_cutoff_bounds_the_run() {
		assert!(GuessConfig::unbounded().is_unbounded());
		assert!(!GuessConfig::default().is_unbounded());
		assert!(!GuessConfig { limit: Some(1), ..GuessConfig::unbounded() }.is_unbounded());
		assert!(!GuessConfig { max_length: Some(8), ..GuessConfig::unbounded() }.is_unbounded());
	}

	#[test]
	fn unreachable_prefix_yields_nothing() {
		let model = model(2, &["abc"]);
		let config = GuessConfig { prefix: "zz".to_owned(), ..GuessConfig::default() };
		let guesser = Guesser::new(&model, config).unwrap();
		assert_eq!(guesser.guesses().count(), 0);
	}

	#[test]
	fn bad_threshold_and_prefix_are_rejected() {
		let model = model(2, &["abc"]);
		let config = GuessConfig { min_probability: 2.0, ..GuessConfig::default() };
		assert!(matches!(Guesser::new(&model, config), Err(MarkovError::Configuration(_))));
		let config = GuessConfig { prefix: "a\nb".to_owned(), ..GuessConfig::default() };
		assert!(matches!(Guesser::new(&model, config), Err(MarkovError::InvalidInput(_))));
	}

	#[test]
	fn cursor_of_other_order_is_rejected() {
		let small = model(2, &["abc"]);
		let large = model(3, &["abc"]);
		let cursor = Guesser::new(&small, GuessConfig::default()).unwrap().guesses().checkpoint();
		let guesser = Guesser::new(&large, GuessConfig::default()).unwrap();
		assert!(guesser.resume(cursor).is_err());
	}
}
