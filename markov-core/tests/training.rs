use markov_core::model::alphabet::END_CHAR;
use markov_core::model::distribution::SUM_TOLERANCE;
use markov_core::{MarkovError, MarkovModel, Smoothing, Trainer};
use proptest::prelude::*;

fn assert_normalised(model: &MarkovModel) {
	for (context, dist) in model.contexts() {
		let total = dist.total();
		assert!(
			(total - 1.0).abs() <= SUM_TOLERANCE,
			"context {:?} sums to {}",
			context,
			total
		);
	}
}

#[test]
fn unsmoothed_context_splits_evenly() {
	let model = Trainer::new(3, Smoothing::None).unwrap().train(&["aab", "aac"]).unwrap();
	let dist = model.distribution("aa").unwrap();
	assert_eq!(dist.len(), 2);
	assert!((dist.probability('b') - 0.5).abs() < 1e-12);
	assert!((dist.probability('c') - 0.5).abs() < 1e-12);
	assert_normalised(&model);
}

#[test]
fn additive_smoothing_adds_pseudo_counts() {
	// alphabet {a, b, c} + end = 4 outcomes, "aa" seen twice
	let model = Trainer::new(3, Smoothing::additive(1.0).unwrap())
		.unwrap()
		.train(&["aab", "aac"])
		.unwrap();
	assert_eq!(model.alphabet().outcome_count(), 4);

	let dist = model.distribution("aa").unwrap();
	assert!((dist.probability('b') - 1.0 / 3.0).abs() < 1e-12);
	assert!((dist.probability('c') - 1.0 / 3.0).abs() < 1e-12);
	assert!((dist.probability('a') - 1.0 / 6.0).abs() < 1e-12);
	assert!((dist.probability(END_CHAR) - 1.0 / 6.0).abs() < 1e-12);
}

#[test]
fn additive_smoothing_gives_every_outcome_mass() {
	let model = Trainer::new(2, Smoothing::additive(0.01).unwrap())
		.unwrap()
		.train(&["password", "dragon", "qwerty"])
		.unwrap();
	for (context, dist) in model.contexts() {
		for symbol in model.alphabet().outcomes() {
			assert!(dist.probability(symbol) > 0.0, "{:?} -> {:?} has no mass", context, symbol);
		}
	}
}

#[test]
fn backoff_model_is_normalised() {
	let corpus: Vec<String> = (0..200).map(|i| format!("pass{}", i % 13)).collect();
	let model = Trainer::new(4, Smoothing::backoff(5, 0.5).unwrap()).unwrap().train(&corpus).unwrap();
	assert_normalised(&model);
	model.validate().unwrap();

	assert!(model.password_probability("pass12") > 0.0);
}

#[test]
fn configuration_and_input_errors() {
	assert!(matches!(Trainer::new(0, Smoothing::None), Err(MarkovError::Configuration(_))));

	let trainer = Trainer::new(2, Smoothing::None).unwrap();
	let empty: Vec<String> = Vec::new();
	assert!(matches!(trainer.train(&empty), Err(MarkovError::InvalidInput(_))));
	assert!(matches!(trainer.train(&["ok", "bad\0"]), Err(MarkovError::InvalidInput(_))));
	assert!(matches!(trainer.train_weighted(&[("ok", 0)]), Err(MarkovError::InvalidInput(_))));
}

proptest! {
	#[test]
	fn every_stored_distribution_sums_to_one(
		corpus in prop::collection::vec("[a-d0-2]{0,8}", 1..30),
		order in 1usize..5,
		kind in 0u8..3,
	) {
		let smoothing = match kind {
			0 => Smoothing::None,
			1 => Smoothing::additive(1.0).unwrap(),
			_ => Smoothing::backoff(2, 0.5).unwrap(),
		};
		let model = Trainer::new(order, smoothing).unwrap().train(&corpus).unwrap();
		for (_, dist) in model.contexts() {
			prop_assert!((dist.total() - 1.0).abs() <= SUM_TOLERANCE);
		}
		if let Some(fallback) = model.fallback() {
			prop_assert!((fallback.total() - 1.0).abs() <= SUM_TOLERANCE);
		}
		prop_assert!(model.validate().is_ok());
	}

	#[test]
	fn training_passwords_are_reachable(corpus in prop::collection::vec("[a-c]{0,6}", 1..20)) {
		let model = Trainer::new(3, Smoothing::None).unwrap().train(&corpus).unwrap();
		for password in &corpus {
			prop_assert!(model.password_probability(password) > 0.0);
		}
	}
}
