use std::collections::HashSet;

use markov_core::model::alphabet::END_CHAR;
use markov_core::{Guess, GuessConfig, GuessCursor, Guesser, MarkovModel, Smoothing, Trainer};

fn three_symbol_model() -> MarkovModel {
	Trainer::new(2, Smoothing::None)
		.unwrap()
		.train(&["ab", "ba", "abc", "c", "cab"])
		.unwrap()
}

fn step_product(model: &MarkovModel, password: &str) -> f64 {
	let chars: Vec<char> = password.chars().collect();
	let mut product = 1.0;
	for (i, symbol) in chars.iter().copied().chain([END_CHAR]).enumerate() {
		let prefix: String = chars[..i].iter().collect();
		product *= model.probability(&prefix, symbol);
	}
	product
}

#[test]
fn guess_probability_is_product_of_steps() {
	let model = three_symbol_model();
	assert_eq!(model.alphabet().len(), 3);

	let config = GuessConfig { max_length: Some(6), ..GuessConfig::unbounded() };
	let guesser = Guesser::new(&model, config).unwrap();
	let guesses: Vec<Guess> = guesser.guesses().collect();
	assert!(!guesses.is_empty());

	for guess in &guesses {
		let expected = step_product(&model, &guess.password);
		assert!(
			(guess.probability - expected).abs() <= 1e-12 * expected.max(1.0),
			"{:?}: {} vs {}",
			guess.password,
			guess.probability,
			expected
		);
		assert!((guess.log_probability - model.log_probability(&guess.password)).abs() < 1e-9);
	}
}

#[test]
fn each_candidate_is_emitted_once() {
	let model = three_symbol_model();
	let config = GuessConfig { max_length: Some(7), ..GuessConfig::unbounded() };
	let guesser = Guesser::new(&model, config).unwrap();
	let mut seen = HashSet::new();
	for guess in guesser.guesses() {
		assert!(seen.insert(guess.password.clone()), "duplicate {:?}", guess.password);
	}
}

#[test]
fn prefix_restricts_to_reachable_completions() {
	let model = Trainer::new(3, Smoothing::None).unwrap().train(&["aab", "aac"]).unwrap();
	let config = GuessConfig { prefix: "aa".to_owned(), ..GuessConfig::unbounded() };
	let guesser = Guesser::new(&model, config).unwrap();

	let guesses: Vec<Guess> = guesser.guesses().collect();
	let passwords: HashSet<&str> = guesses.iter().map(|g| g.password.as_str()).collect();
	assert_eq!(passwords, HashSet::from(["aab", "aac"]));
	assert_eq!(guesses.len(), 2);
	for guess in &guesses {
		assert!((guess.probability - 0.5).abs() < 1e-12);
	}
}

#[test]
fn empty_password_probability_is_immediate_end() {
	let model = Trainer::new(2, Smoothing::None).unwrap().train(&["", "", "x", "y"]).unwrap();
	let guesser = Guesser::new(&model, GuessConfig::default()).unwrap();
	let empty = guesser.guesses().find(|g| g.password.is_empty()).unwrap();
	assert!((empty.probability - 0.5).abs() < 1e-12);
	assert!((empty.probability - model.probability("", END_CHAR)).abs() < 1e-12);
}

#[test]
fn unsmoothed_dead_ends_are_pruned() {
	// Without smoothing, contexts never seen in training are cut
	let model = Trainer::new(3, Smoothing::None).unwrap().train(&["abc"]).unwrap();
	let guesser = Guesser::new(&model, GuessConfig::unbounded()).unwrap();
	let all: Vec<String> = guesser.guesses().map(|g| g.password).collect();
	assert_eq!(all, vec!["abc"]);

	let smoothed = Trainer::new(3, Smoothing::additive(1.0).unwrap()).unwrap().train(&["abc"]).unwrap();
	let config = GuessConfig { max_length: Some(2), ..GuessConfig::unbounded() };
	let guesser = Guesser::new(&smoothed, config).unwrap();
	// With additive smoothing unseen contexts are uniform, so every string counts
	// alphabet {a, b, c}: 1 + 3 + 9 candidates of length 0..=2
	assert_eq!(guesser.guesses().count(), 13);
}

#[test]
fn resume_continues_without_duplicates() {
	let model = three_symbol_model();
	let config = GuessConfig { max_length: Some(6), ..GuessConfig::unbounded() };
	let guesser = Guesser::new(&model, config).unwrap();
	let full: Vec<Guess> = guesser.guesses().collect();
	assert!(full.len() > 10);

	let mut first_run = guesser.guesses();
	let head: Vec<Guess> = first_run.by_ref().take(7).collect();
	let cursor = first_run.checkpoint();
	drop(first_run);
	assert_eq!(cursor.emitted(), 7);

	// The cursor survives a trip through a file
	let saved = serde_json::to_string(&cursor).unwrap();
	let cursor: GuessCursor = serde_json::from_str(&saved).unwrap();

	let tail: Vec<Guess> = guesser.resume(cursor).unwrap().collect();
	let mut combined = head.clone();
	combined.extend(tail);
	assert_eq!(combined, full);

	// A fresh restart reproduces the same sequence rather than new candidates
	let restart: Vec<Guess> = guesser.guesses().take(7).collect();
	assert_eq!(restart, head);
}

#[test]
fn limit_counts_across_resume() {
	let model = three_symbol_model();
	let config = GuessConfig { limit: Some(5), max_length: Some(6), ..GuessConfig::unbounded() };
	let guesser = Guesser::new(&model, config).unwrap();

	let mut run = guesser.guesses();
	assert_eq!(run.by_ref().take(3).count(), 3);
	let resumed = guesser.resume(run.checkpoint()).unwrap();
	assert_eq!(resumed.count(), 2);
}
