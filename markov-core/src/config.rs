//! Run configuration: smoothing amounts and guessing cutoffs.
//!
//! Values come from defaults, then an optional JSON file, then
//! `NAME=VALUE;NAME2=VALUE` overrides.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MarkovError, Result};
use crate::model::guesser::GuessConfig;
use crate::model::smoothing::{Smoothing, SmoothingKind};

/// How a model is used once loaded.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GuesserClass {
	/// Enumerate candidates; score passwords with their probability.
	#[default]
	Human,
	/// Draw random passwords from the model.
	GenerateRandom,
	/// Score passwords with their probability and an estimated guess number.
	#[serde(alias = "delamico_random_walk")]
	RandomWalk,
}

impl GuesserClass {
	pub const ALL: [GuesserClass; 3] = [GuesserClass::Human, GuesserClass::GenerateRandom, GuesserClass::RandomWalk];

	pub fn as_str(self) -> &'static str {
		match self {
			GuesserClass::Human => "human",
			GuesserClass::GenerateRandom => "generate_random",
			GuesserClass::RandomWalk => "random_walk",
		}
	}
}

impl fmt::Display for GuesserClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for GuesserClass {
	type Err = MarkovError;

	fn from_str(s: &str) -> Result<Self> {
		let name = s.trim().to_ascii_lowercase();
		let name = name.strip_prefix("markov_").unwrap_or(&name);
		match name {
			"delamico_random_walk" => Ok(GuesserClass::RandomWalk),
			_ => GuesserClass::ALL.into_iter().find(|class| class.as_str() == name).ok_or_else(|| {
				let known: Vec<&str> = GuesserClass::ALL.iter().map(|class| class.as_str()).collect();
				MarkovError::Configuration(format!(
					"guesser_class is {:?}, must be one of: {}",
					s,
					known.join(", ")
				))
			}),
		}
	}
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MarkovConfig {
	/// Pseudo-count added by additive and backoff smoothing.
	pub additive_smoothing_amount: f64,
	/// Minimum adjusted frequency kept by backoff smoothing.
	pub backoff_smoothing_threshold: u64,
	/// Guesses below this probability are not generated.
	pub lower_probability_threshold: f64,
	/// Longest generated password, 0 for no bound.
	pub max_length: usize,
	/// Stop after this many guesses.
	pub guess_limit: Option<usize>,
	/// Enumeration, random generation or guess-number estimation.
	pub guesser_class: GuesserClass,
	/// Random walks drawn for random generation and guess-number estimates.
	pub random_walk_samples: usize,
}

impl Default for MarkovConfig {
	fn default() -> Self {
		Self {
			additive_smoothing_amount: 1.0,
			backoff_smoothing_threshold: 10,
			lower_probability_threshold: 1e-8,
			max_length: 40,
			guess_limit: None,
			guesser_class: GuesserClass::Human,
			random_walk_samples: 10_000,
		}
	}
}

impl MarkovConfig {
	/// Reads a JSON config file; missing fields keep their defaults.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		tracing::info!(path = %path.display(), "Reading config");
		let text = std::fs::read_to_string(path).map_err(|e| MarkovError::io(path, e))?;
		let config: Self = serde_json::from_str(&text)
			.map_err(|e| MarkovError::Configuration(format!("{}: {}", path.display(), e)))?;
		config.validate()?;
		Ok(config)
	}

	/// Applies `NAME=VALUE;NAME2=VALUE` overrides.
	///
	/// # Errors
	/// Unknown names, malformed pairs and unparsable values are
	/// configuration errors.
	pub fn apply_overrides(&mut self, overrides: &str) -> Result<()> {
		for pair in overrides.split(';').map(str::trim).filter(|p| !p.is_empty()) {
			let (name, value) = pair.split_once('=').ok_or_else(|| {
				MarkovError::Configuration(format!("Expected NAME=VALUE, got {:?}", pair))
			})?;
			let (name, value) = (name.trim(), value.trim());
			match name {
				"additive_smoothing_amount" => self.additive_smoothing_amount = parse_value(name, value)?,
				"backoff_smoothing_threshold" => self.backoff_smoothing_threshold = parse_value(name, value)?,
				"lower_probability_threshold" => self.lower_probability_threshold = parse_value(name, value)?,
				"max_length" => self.max_length = parse_value(name, value)?,
				"guesser_class" => self.guesser_class = value.parse()?,
				"random_walk_samples" => self.random_walk_samples = parse_value(name, value)?,
				"guess_limit" => {
					self.guess_limit = match value {
						"" | "none" | "None" => None,
						_ => Some(parse_value(name, value)?),
					}
				}
				_ => {
					return Err(MarkovError::Configuration(format!("Unknown config value {:?}", name)));
				}
			}
		}
		self.validate()
	}

	pub fn validate(&self) -> Result<()> {
		if !self.additive_smoothing_amount.is_finite() || self.additive_smoothing_amount < 0.0 {
			return Err(MarkovError::Configuration(format!(
				"additive_smoothing_amount must be >= 0, got {}",
				self.additive_smoothing_amount
			)));
		}
		if !(0.0..=1.0).contains(&self.lower_probability_threshold) {
			return Err(MarkovError::Configuration(format!(
				"lower_probability_threshold must be between 0.0 and 1.0, got {}",
				self.lower_probability_threshold
			)));
		}
		Ok(())
	}

	/// Builds the smoothing policy named `kind` with this config's amounts.
	pub fn smoothing(&self, kind: SmoothingKind) -> Result<Smoothing> {
		match kind {
			SmoothingKind::None => Ok(Smoothing::None),
			SmoothingKind::Additive => Smoothing::additive(self.additive_smoothing_amount),
			SmoothingKind::Backoff => {
				Smoothing::backoff(self.backoff_smoothing_threshold, self.additive_smoothing_amount)
			}
		}
	}

	/// Guessing limits for a run starting at `prefix`.
	pub fn guess_config(&self, prefix: &str) -> GuessConfig {
		GuessConfig {
			limit: self.guess_limit,
			min_probability: self.lower_probability_threshold,
			max_length: (self.max_length > 0).then_some(self.max_length),
			prefix: prefix.to_owned(),
		}
	}
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T> {
	value
		.parse()
		.map_err(|_| MarkovError::Configuration(format!("Invalid value {:?} for {}", value, name)))
}
