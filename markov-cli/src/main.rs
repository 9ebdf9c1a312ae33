//! markov-model - train and guess with an n-gram password model.
//!
//! Modes, picked from the flags given:
//! - `-t` trains a model and writes it to `-o`
//! - `-m` and `-p` score every password of the file into `-o`, adding an
//!   estimated guess number with `guesser_class=random_walk`
//! - `-m` alone enumerates (or samples) guesses into `-o`

mod commands;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, bail};
use clap::Parser;
use markov_core::{CorpusFormat, MarkovConfig, SmoothingKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "markov-model")]
#[command(about = "Train and guess with a markov model.", long_about = None)]
#[command(version)]
pub struct Cli {
	/// Training file. Will train a model.
	#[arg(short = 't', long)]
	pub train_file: Option<PathBuf>,

	/// Output file (model when training, guesses or probabilities otherwise).
	#[arg(short = 'o', long)]
	pub ofile: Option<PathBuf>,

	/// Model file. Will guess passwords.
	#[arg(short = 'm', long)]
	pub model_file: Option<PathBuf>,

	/// Password file. Will calculate probabilities.
	#[arg(short = 'p', long)]
	pub password_file: Option<PathBuf>,

	/// Giving an argument of 2 means using 1 character of context to predict
	/// the next character. Default is 2 when training.
	#[arg(short = 'k', long)]
	pub k_order: Option<usize>,

	/// Type of smoothing (none, additive, backoff). Default is no smoothing
	/// when training.
	#[arg(short = 's', long)]
	pub smoothing: Option<SmoothingKind>,

	/// Training file format: list or tsv.
	#[arg(short = 'f', long, default_value_t = CorpusFormat::Tsv)]
	pub train_format: CorpusFormat,

	/// Config file (JSON).
	#[arg(short = 'c', long)]
	pub config: Option<PathBuf>,

	/// Configuration values in format: NAME=VALUE;NAME2=VALUE
	#[arg(long = "config-values", visible_alias = "cv")]
	pub config_values: Option<String>,

	/// Only generate guesses starting with these characters.
	#[arg(long, default_value = "")]
	pub prefix: String,

	/// Stop after this many guesses (overrides guess_limit).
	#[arg(long)]
	pub limit: Option<usize>,

	/// Draw this many random passwords instead of enumerating.
	#[arg(long)]
	pub sample: Option<usize>,

	/// Log file, stderr when absent.
	#[arg(short = 'l', long)]
	pub log_file: Option<PathBuf>,

	/// Log level: error, warn, info, debug or trace.
	#[arg(long, default_value = "info")]
	pub log_level: String,
}

/// Default order when training without `-k`.
pub const DEFAULT_ORDER: usize = 2;

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
	let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

	match &cli.log_file {
		Some(path) => {
			let file = File::create(path).with_context(|| format!("Cannot create log file {}", path.display()))?;
			builder.with_writer(Mutex::new(file)).with_ansi(false).init();
		}
		None => builder.with_writer(std::io::stderr).init(),
	}
	Ok(())
}

fn read_config(cli: &Cli) -> anyhow::Result<MarkovConfig> {
	let mut config = match &cli.config {
		Some(path) => MarkovConfig::from_file(path)?,
		None => {
			tracing::info!("Using default config");
			MarkovConfig::default()
		}
	};
	if let Some(values) = &cli.config_values {
		config.apply_overrides(values)?;
	}
	if cli.limit.is_some() {
		config.guess_limit = cli.limit;
	}
	tracing::debug!(?config, "Using config");
	Ok(config)
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	init_logging(&cli)?;
	let config = read_config(&cli)?;

	let Some(ofile) = cli.ofile.clone() else {
		bail!("Must provide --ofile argument");
	};

	if let Some(train_file) = &cli.train_file {
		commands::train::run(&cli, &config, train_file, &ofile)
	} else if let Some(model_file) = &cli.model_file {
		match &cli.password_file {
			Some(password_file) => commands::score::run(&cli, &config, model_file, password_file, &ofile),
			None => commands::guess::run(&cli, &config, model_file, &ofile),
		}
	} else {
		bail!("Must provide --train-file or --model-file flag")
	}
}
