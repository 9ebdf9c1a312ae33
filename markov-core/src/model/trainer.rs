use std::path::Path;
use std::sync::mpsc;
use std::thread;

use super::markov_model::MarkovModel;
use super::ngram_model::NGramCounts;
use super::smoothing::Smoothing;
use crate::error::{MarkovError, Result};
use crate::io::{CorpusFormat, read_corpus};

/// A progress line is logged every this many passwords.
pub const LOGGING_FREQUENCY: u64 = 1_000_000;

/// Corpora smaller than this are counted on the calling thread.
const PARALLEL_THRESHOLD: usize = 10_000;

/// Builds a `MarkovModel` from a password corpus.
///
/// The trainer owns the model hyper-parameters (order and smoothing) and
/// validates them up front, so an invalid configuration fails before any
/// password is read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trainer {
	order: usize,
	smoothing: Smoothing,
}

impl Trainer {
	/// Creates a trainer for order-`order` models.
	///
	/// # Errors
	/// Returns `MarkovError::Configuration` if `order < 1` or the smoothing
	/// parameters are invalid.
	pub fn new(order: usize, smoothing: Smoothing) -> Result<Self> {
		if order < 1 {
			return Err(MarkovError::Configuration(format!("Order must be >= 1, got {}", order)));
		}
		smoothing.validate()?;
		Ok(Self { order, smoothing })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn smoothing(&self) -> Smoothing {
		self.smoothing
	}

	/// Trains on passwords that each count once.
	pub fn train<S: AsRef<str> + Sync>(&self, corpus: &[S]) -> Result<MarkovModel> {
		let weighted: Vec<(&str, u64)> = corpus.iter().map(|p| (p.as_ref(), 1)).collect();
		self.train_weighted(&weighted)
	}

	/// Trains on `(password, count)` pairs.
	///
	/// # Errors
	/// - `MarkovError::InvalidInput` if the corpus is empty, a count is 0
	///   or a password contains a marker character.
	pub fn train_weighted<S: AsRef<str> + Sync>(&self, corpus: &[(S, u64)]) -> Result<MarkovModel> {
		if corpus.is_empty() {
			return Err(MarkovError::InvalidInput("Training corpus is empty".to_owned()));
		}

		tracing::info!(
			order = self.order,
			smoothing = %self.smoothing.kind(),
			passwords = corpus.len(),
			"Beginning training of {}-gram model",
			self.order
		);

		let counts = if corpus.len() < PARALLEL_THRESHOLD {
			self.count_sequential(corpus)?
		} else {
			self.count_parallel(corpus)?
		};

		let model = MarkovModel::from_counts(&counts, self.smoothing);
		tracing::info!(
			contexts = model.len(),
			alphabet = model.alphabet().len(),
			passwords = counts.passwords(),
			"Training complete"
		);
		Ok(model)
	}

	/// Reads a training file and trains on it.
	pub fn train_file<P: AsRef<Path>>(&self, path: P, format: CorpusFormat) -> Result<MarkovModel> {
		let corpus = read_corpus(path, format)?;
		self.train_weighted(&corpus)
	}

	fn count_sequential<S: AsRef<str>>(&self, corpus: &[(S, u64)]) -> Result<NGramCounts> {
		let mut counts = NGramCounts::new(self.order, self.smoothing.counts_suffixes())?;
		for (index, (password, weight)) in corpus.iter().enumerate() {
			let seen = index as u64 + 1;
			if seen % LOGGING_FREQUENCY == 0 {
				tracing::info!("Training on password {}", seen);
			}
			counts.add_password(password.as_ref(), *weight)?;
		}
		Ok(counts)
	}

	/// Splits the corpus into chunks, counts them on worker threads and
	/// merges the partial tables.
	///
	/// Counts are integers, so the result does not depend on chunking.
	fn count_parallel<S: AsRef<str> + Sync>(&self, corpus: &[(S, u64)]) -> Result<NGramCounts> {
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = corpus.len().div_ceil(chunks);
		let with_suffixes = self.smoothing.counts_suffixes();
		let order = self.order;

		tracing::debug!(cpus, chunk_size, "Counting n-grams in parallel");

		let (tx, rx) = mpsc::channel();
		let mut final_counts = NGramCounts::new(order, with_suffixes)?;

		thread::scope(|scope| -> Result<()> {
			for chunk in corpus.chunks(chunk_size) {
				let tx = tx.clone();
				scope.spawn(move || {
					let partial = NGramCounts::new(order, with_suffixes).and_then(|mut partial| {
						for (password, weight) in chunk {
							partial.add_password(password.as_ref(), *weight)?;
						}
						Ok(partial)
					});
					// The receiver lives until every sender is dropped
					let _ = tx.send(partial);
				});
			}
			drop(tx);

			let mut next_log = LOGGING_FREQUENCY;
			for partial in rx.iter() {
				final_counts.merge(&partial?)?;
				if final_counts.passwords() >= next_log {
					tracing::info!("Training on password {}", final_counts.passwords());
					next_log = (final_counts.passwords() / LOGGING_FREQUENCY + 1) * LOGGING_FREQUENCY;
				}
			}
			Ok(())
		})?;

		Ok(final_counts)
	}
}
