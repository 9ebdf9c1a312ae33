//! N-gram (Markov) password model library.
//!
//! This crate provides:
//! - Training of order-k character models over password corpora, with
//!   `none`, `additive` and `backoff` smoothing
//! - A versioned binary/JSON model store
//! - Lazy enumeration of candidate passwords with their probabilities
//! - Random sampling, password scoring and Monte Carlo guess numbers
//!
//! Count tables and per-context state are kept internal; models are
//! immutable once trained.

/// Run configuration (smoothing amounts, guessing cutoffs).
pub mod config;

/// Error type and `Result` alias.
pub mod error;

/// Training corpus and guess file helpers.
pub mod io;

/// Core n-gram models, training and generation logic.
pub mod model;

pub use config::{GuesserClass, MarkovConfig};
pub use error::{MarkovError, Result};
pub use io::CorpusFormat;
pub use model::estimator::GuessNumberEstimator;
pub use model::guesser::{Guess, GuessConfig, GuessCursor, Guesser, Guesses};
pub use model::markov_model::MarkovModel;
pub use model::sampler::Sampler;
pub use model::smoothing::{Smoothing, SmoothingKind};
pub use model::store::ModelFormat;
pub use model::trainer::Trainer;
