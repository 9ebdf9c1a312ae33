use rand::Rng;

use super::alphabet::END_CHAR;
use super::guesser::Guess;
use super::markov_model::MarkovModel;

/// Draws random passwords following the model distribution.
///
/// Each step picks the next symbol by weighted random sampling from the
/// distribution of the current context, until the end marker is drawn.
#[derive(Clone, Copy, Debug)]
pub struct Sampler<'m> {
	model: &'m MarkovModel,
	max_length: Option<usize>,
}

impl<'m> Sampler<'m> {
	pub fn new(model: &'m MarkovModel, max_length: Option<usize>) -> Self {
		Self { model, max_length }
	}

	/// Draws one password.
	///
	/// Returns `None` if the walk reaches a zero-probability context or
	/// grows past `max_length` before drawing the end marker.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Guess> {
		let mut password = String::new();
		let mut length = 0;
		let mut context = self.model.context_key("");
		let mut log_probability = 0.0;

		loop {
			let dist = self.model.distribution(&context)?;
			let symbol = dist.sample(rng)?;
			log_probability += dist.probability(symbol).ln();

			if symbol == END_CHAR {
				return Some(Guess {
					password,
					probability: log_probability.exp(),
					log_probability,
				});
			}
			if self.max_length.is_some_and(|max| length >= max) {
				return None;
			}

			password.push(symbol);
			length += 1;
			context = self.model.advance_context(&context, symbol);
		}
	}

	/// Lazily draws passwords, skipping failed walks.
	///
	/// At most `attempts` walks are made, so the iterator always ends.
	pub fn samples<'r, R: Rng + ?Sized>(&self, rng: &'r mut R, attempts: usize) -> impl Iterator<Item = Guess> {
		let sampler = *self;
		(0..attempts).filter_map(move |_| sampler.sample(rng))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::smoothing::Smoothing;
	use crate::model::trainer::Trainer;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn samples_are_training_passwords_for_acyclic_model() {
		let model = Trainer::new(3, Smoothing::None).unwrap().train(&["abc", "xyz"]).unwrap();
		let sampler = Sampler::new(&model, None);
		let mut rng = StdRng::seed_from_u64(42);
		for guess in sampler.samples(&mut rng, 50) {
			assert!(guess.password == "abc" || guess.password == "xyz");
			assert!((guess.probability - 0.5).abs() < 1e-12);
		}
	}

	#[test]
	fn sampled_probability_matches_scoring() {
		let model = Trainer::new(2, Smoothing::additive(1.0).unwrap())
			.unwrap()
			.train(&["hello", "help", "yellow"])
			.unwrap();
		let sampler = Sampler::new(&model, Some(12));
		let mut rng = StdRng::seed_from_u64(1);
		let mut drawn = 0;
		for guess in sampler.samples(&mut rng, 200) {
			let expected = model.log_probability(&guess.password);
			assert!((guess.log_probability - expected).abs() < 1e-9);
			drawn += 1;
		}
		assert!(drawn > 0);
	}

	#[test]
	fn max_length_rejects_long_walks() {
		// Order 5 leaves a single deterministic path
		let model = Trainer::new(5, Smoothing::None).unwrap().train(&["aaaa"]).unwrap();
		let sampler = Sampler::new(&model, Some(2));
		let mut rng = StdRng::seed_from_u64(3);
		assert!(sampler.sample(&mut rng).is_none());
	}
}
