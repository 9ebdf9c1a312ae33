use std::path::Path;

use serde::{Deserialize, Serialize};

use super::markov_model::MarkovModel;
use crate::error::{MarkovError, Result};

/// Version written in every model file.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk encoding of a model.
///
/// - `Binary`: compact `postcard` encoding (default).
/// - `Json`: human readable, floats round-trip exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelFormat {
	#[default]
	Binary,
	Json,
}

impl ModelFormat {
	/// `.json` files are JSON, anything else is binary.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
		match path.as_ref().extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::Json,
			_ => ModelFormat::Binary,
		}
	}
}

#[derive(Serialize)]
struct ModelEnvelopeRef<'a> {
	version: u32,
	model: &'a MarkovModel,
}

#[derive(Deserialize)]
struct ModelEnvelope {
	version: u32,
	model: MarkovModel,
}

/// Encodes a model with its format version.
pub fn serialize(model: &MarkovModel, format: ModelFormat) -> Result<Vec<u8>> {
	let envelope = ModelEnvelopeRef { version: FORMAT_VERSION, model };
	match format {
		ModelFormat::Binary => postcard::to_stdvec(&envelope).map_err(|e| MarkovError::Serialization(e.to_string())),
		ModelFormat::Json => serde_json::to_vec(&envelope).map_err(|e| MarkovError::Serialization(e.to_string())),
	}
}

/// Decodes and validates a model.
///
/// # Errors
/// Returns `MarkovError::ModelLoad` for undecodable bytes, an unknown
/// format version or a model violating its invariants. A model is either
/// returned whole or not at all.
pub fn deserialize(bytes: &[u8], format: ModelFormat) -> Result<MarkovModel> {
	let envelope: ModelEnvelope = match format {
		ModelFormat::Binary => postcard::from_bytes(bytes).map_err(|e| MarkovError::ModelLoad(e.to_string()))?,
		ModelFormat::Json => serde_json::from_slice(bytes).map_err(|e| MarkovError::ModelLoad(e.to_string()))?,
	};
	if envelope.version != FORMAT_VERSION {
		return Err(MarkovError::ModelLoad(format!(
			"Unsupported model format version {} (expected {})",
			envelope.version, FORMAT_VERSION
		)));
	}
	envelope.model.validate()?;
	Ok(envelope.model)
}

impl MarkovModel {
	/// Writes the model to `path`, format chosen from the extension.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		tracing::info!(path = %path.display(), "Saving model");
		let bytes = serialize(self, ModelFormat::from_path(path))?;
		std::fs::write(path, bytes).map_err(|e| MarkovError::io(path, e))
	}

	/// Reads a model from `path`, format chosen from the extension.
	///
	/// # Errors
	/// Unreadable files and invalid content are both reported as
	/// `MarkovError::ModelLoad`.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		tracing::info!(path = %path.display(), "Loading model");
		let bytes = std::fs::read(path)
			.map_err(|e| MarkovError::ModelLoad(format!("Cannot read {}: {}", path.display(), e)))?;
		let model = deserialize(&bytes, ModelFormat::from_path(path))?;
		tracing::debug!(order = model.order(), contexts = model.len(), "Model loaded");
		Ok(model)
	}
}
