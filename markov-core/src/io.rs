use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{MarkovError, Result};
use crate::model::guesser::Guess;

/// Layout of a training file.
///
/// - `List`: one password per line.
/// - `Tsv`: `password<TAB>count` per line; a missing count means 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorpusFormat {
	List,
	#[default]
	Tsv,
}

impl fmt::Display for CorpusFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CorpusFormat::List => f.write_str("list"),
			CorpusFormat::Tsv => f.write_str("tsv"),
		}
	}
}

impl FromStr for CorpusFormat {
	type Err = MarkovError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"list" => Ok(CorpusFormat::List),
			"tsv" => Ok(CorpusFormat::Tsv),
			other => Err(MarkovError::Configuration(format!(
				"Unknown training format '{}', expected list or tsv",
				other
			))),
		}
	}
}

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let path = filename.as_ref();
	let mut contents = String::new();
	File::open(path)
		.and_then(|mut file| file.read_to_string(&mut contents))
		.map_err(|e| MarkovError::io(path, e))?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Reads a training file into `(password, count)` pairs.
pub fn read_corpus<P: AsRef<Path>>(filename: P, format: CorpusFormat) -> Result<Vec<(String, u64)>> {
	let lines = read_file(&filename)?;
	tracing::debug!(path = %filename.as_ref().display(), lines = lines.len(), %format, "read training file");
	parse_corpus(&lines, format)
}

/// Parses training lines. Blank lines are skipped.
///
/// # Errors
/// Returns `MarkovError::InvalidInput` naming the line of a malformed count.
pub fn parse_corpus<S: AsRef<str>>(lines: &[S], format: CorpusFormat) -> Result<Vec<(String, u64)>> {
	let mut corpus = Vec::with_capacity(lines.len());
	for (index, line) in lines.iter().enumerate() {
		let line = line.as_ref();
		if line.trim().is_empty() {
			continue;
		}
		match format {
			CorpusFormat::List => corpus.push((line.to_owned(), 1)),
			CorpusFormat::Tsv => {
				let (password, count) = match line.rsplit_once('\t') {
					Some((password, count)) => {
						let count = count.trim().parse::<u64>().map_err(|_| {
							MarkovError::InvalidInput(format!(
								"Line {}: invalid count {:?}",
								index + 1,
								count
							))
						})?;
						(password, count)
					}
					None => (line, 1),
				};
				corpus.push((password.to_owned(), count));
			}
		}
	}
	Ok(corpus)
}

/// Reads a file of passwords to score, one per line.
pub fn read_passwords<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	Ok(read_file(filename)?
		.into_iter()
		.filter(|line| !line.is_empty())
		.collect())
}

/// Writes one `password<TAB>probability` line per guess, in the order given.
///
/// Returns the number of lines written. Probabilities use scientific
/// notation so that `sort -g` orders them.
pub fn write_guesses<W, I>(writer: &mut W, guesses: I) -> io::Result<usize>
where
	W: Write,
	I: IntoIterator<Item = Guess>,
{
	let mut written = 0;
	for guess in guesses {
		writeln!(writer, "{}\t{:e}", guess.password, guess.probability)?;
		written += 1;
	}
	Ok(written)
}

/// Writes `password<TAB>probability` lines for scored passwords.
pub fn write_scores<'a, W, I>(writer: &mut W, scores: I) -> io::Result<usize>
where
	W: Write,
	I: IntoIterator<Item = (&'a str, f64)>,
{
	let mut written = 0;
	for (password, probability) in scores {
		writeln!(writer, "{}\t{:e}", password, probability)?;
		written += 1;
	}
	Ok(written)
}

/// Writes `password<TAB>probability<TAB>guess_number` lines.
pub fn write_estimates<'a, W, I>(writer: &mut W, estimates: I) -> io::Result<usize>
where
	W: Write,
	I: IntoIterator<Item = (&'a str, f64, f64)>,
{
	let mut written = 0;
	for (password, probability, guess_number) in estimates {
		writeln!(writer, "{}\t{:e}\t{:.1}", password, probability, guess_number)?;
		written += 1;
	}
	Ok(written)
}
