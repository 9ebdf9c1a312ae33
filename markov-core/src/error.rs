//! Error type shared by the trainer, the model store and the guesser.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum MarkovError {
	/// Invalid order, smoothing kind, smoothing parameter or config value
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// Unusable training data or guessing input
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	/// Corrupt, unreadable or inconsistent model file
	#[error("Model load error: {0}")]
	ModelLoad(String),

	/// Failure while encoding a model
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// I/O error with file context
	#[error("I/O error for {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl MarkovError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MarkovError>;
