use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MarkovError, Result};

/// Name of a smoothing policy, as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SmoothingKind {
	None,
	Additive,
	Backoff,
}

impl SmoothingKind {
	pub const ALL: [SmoothingKind; 3] = [SmoothingKind::None, SmoothingKind::Additive, SmoothingKind::Backoff];

	pub fn as_str(&self) -> &'static str {
		match self {
			SmoothingKind::None => "none",
			SmoothingKind::Additive => "additive",
			SmoothingKind::Backoff => "backoff",
		}
	}
}

impl fmt::Display for SmoothingKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SmoothingKind {
	type Err = MarkovError;

	fn from_str(s: &str) -> Result<Self> {
		SmoothingKind::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| MarkovError::Configuration(format!(
				"Unknown smoothing kind '{}', expected one of: none, additive, backoff",
				s
			)))
	}
}

/// Smoothing policy applied when count tables become probabilities.
///
/// - `None`: maximum likelihood, only observed transitions get mass.
/// - `Additive`: Laplace style pseudo-count `alpha` on every outcome.
/// - `Backoff`: pseudo-count `alpha`, frequencies under `threshold` are
///   dropped and an empty context falls back to its shorter suffix.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub enum Smoothing {
	#[default]
	None,
	Additive { alpha: f64 },
	Backoff { threshold: u64, alpha: f64 },
}

impl Smoothing {
	/// Additive smoothing, `alpha` must be finite and strictly positive.
	pub fn additive(alpha: f64) -> Result<Self> {
		let smoothing = Smoothing::Additive { alpha };
		smoothing.validate()?;
		Ok(smoothing)
	}

	/// Threshold backoff smoothing, `alpha` must be finite and non-negative.
	pub fn backoff(threshold: u64, alpha: f64) -> Result<Self> {
		let smoothing = Smoothing::Backoff { threshold, alpha };
		smoothing.validate()?;
		Ok(smoothing)
	}

	pub fn kind(&self) -> SmoothingKind {
		match self {
			Smoothing::None => SmoothingKind::None,
			Smoothing::Additive { .. } => SmoothingKind::Additive,
			Smoothing::Backoff { .. } => SmoothingKind::Backoff,
		}
	}

	/// Backoff models count every suffix of each context.
	pub(crate) fn counts_suffixes(&self) -> bool {
		matches!(self, Smoothing::Backoff { .. })
	}

	pub fn validate(&self) -> Result<()> {
		match *self {
			Smoothing::None => Ok(()),
			Smoothing::Additive { alpha } => {
				if !alpha.is_finite() || alpha <= 0.0 {
					return Err(MarkovError::Configuration(format!(
						"Additive smoothing amount must be > 0, got {}",
						alpha
					)));
				}
				Ok(())
			}
			Smoothing::Backoff { alpha, .. } => {
				if !alpha.is_finite() || alpha < 0.0 {
					return Err(MarkovError::Configuration(format!(
						"Backoff smoothing amount must be >= 0, got {}",
						alpha
					)));
				}
				Ok(())
			}
		}
	}

	/// Frequency used in place of a raw count for a single outcome.
	///
	/// Returns 0 for outcomes that must not receive any mass.
	pub(crate) fn adjusted_frequency(&self, count: u64) -> f64 {
		match *self {
			Smoothing::None => count as f64,
			Smoothing::Additive { alpha } => count as f64 + alpha,
			Smoothing::Backoff { threshold, alpha } => {
				let frequency = count as f64 + alpha;
				if frequency < threshold as f64 { 0.0 } else { frequency }
			}
		}
	}

	/// Whether contexts absent from training still receive a uniform distribution.
	pub(crate) fn has_uniform_fallback(&self) -> bool {
		match *self {
			Smoothing::None => false,
			Smoothing::Additive { .. } => true,
			Smoothing::Backoff { threshold, alpha } => alpha > 0.0 && alpha >= threshold as f64,
		}
	}
}
