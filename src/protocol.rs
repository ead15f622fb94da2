//! Pure protocol codecs: the `state` blob, request construction, response classification,
//! and identity-token decoding.
//!
//! Nothing in this module performs I/O. [`crate::flows::Engine`] sequences these pieces and
//! owns the single transport call.

pub mod id_token;
pub mod request;
pub mod response;
pub mod state;

pub use id_token::*;
pub use request::*;
pub use response::*;
pub use state::*;

// crates.io
use base64::{
	alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

const LOG_TAG: &str = "oauth2_engine.protocol";

/// URL-safe base64 that writes no padding and accepts input with or without it.
pub(crate) const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new()
		.with_encode_padding(false)
		.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub(crate) type JsonError = serde_path_to_error::Error<serde_json::Error>;

/// Reads a JSON object into a flat string map.
///
/// String members are kept verbatim; every other member is rendered as JSON text.
pub(crate) fn parse_flat_object(body: &[u8]) -> Result<HashMap<String, String>, JsonError> {
	let de = &mut serde_json::Deserializer::from_slice(body);
	let object: Map<String, Value> = serde_path_to_error::deserialize(de)?;

	Ok(object
		.into_iter()
		.map(|(key, value)| {
			let value = match value {
				Value::String(s) => s,
				other => other.to_string(),
			};

			(key, value)
		})
		.collect())
}
