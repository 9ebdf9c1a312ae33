//! Top-level module for the n-gram password model.
//!
//! This module provides:
//! - Count tables built from a corpus (`NGramCounts`, internal)
//! - Smoothed, immutable models (`MarkovModel`) and their persistence
//! - Model training (`Trainer`)
//! - Exhaustive guess enumeration (`Guesser`) and random sampling (`Sampler`)

/// Symbol set and the reserved start/end markers.
pub mod alphabet;

/// Next-symbol probability distribution of one context.
pub mod distribution;

/// Guess-number estimation from random walks.
pub mod estimator;

/// Enumerates candidate passwords with their probabilities.
///
/// Depth-first traversal with an explicit stack, probability and length
/// cutoffs, and resumable checkpoints.
pub mod guesser;

/// Trained model: context table, smoothing fallback, scoring queries.
pub mod markov_model;

/// Raw n-gram count table (padding, sliding window, merging).
///
/// Not exposed publicly.
mod ngram_model;

/// Random password generation by weighted sampling.
pub mod sampler;

/// Smoothing policies (`none`, `additive`, `backoff`).
pub mod smoothing;

/// Internal representation of the counts observed after one context.
mod state;

/// Binary and JSON model files.
pub mod store;

/// Builds models from password corpora, in parallel for large inputs.
pub mod trainer;
