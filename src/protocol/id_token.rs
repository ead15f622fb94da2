//! Identity token payload decoding.
//!
//! Only the claims payload is read; the signature is not verified.

// crates.io
use base64::Engine as _;
// self
use crate::{
	_prelude::*,
	auth::IdentityClaims,
	protocol::{JsonError, URL_SAFE_LENIENT, parse_flat_object},
};

/// Reasons an identity token could not be decoded.
#[derive(Debug, ThisError)]
pub enum IdTokenError {
	/// The token is not `header.payload.signature` with non-empty header and payload.
	#[error("Identity token must have exactly three segments.")]
	Segments,
	/// The payload is not valid base64url.
	#[error("Identity token payload is not valid base64url.")]
	Base64 {
		/// Underlying decoder failure.
		#[source]
		source: base64::DecodeError,
	},
	/// The payload bytes are not UTF-8.
	#[error("Identity token payload is not UTF-8.")]
	Utf8 {
		/// Underlying conversion failure.
		#[source]
		source: std::string::FromUtf8Error,
	},
	/// The payload is not a JSON object.
	#[error("Identity token payload is not a JSON object.")]
	Json {
		/// Underlying parse failure with the failing path.
		#[source]
		source: JsonError,
	},
	/// The payload object has no members.
	#[error("Identity token payload is empty.")]
	EmptyPayload,
}

/// Decodes the claims segment of a compact `header.payload.signature` token.
pub fn decode_id_token(token: &str) -> Result<IdentityClaims, IdTokenError> {
	let mut segments = token.split('.');
	let (Some(header), Some(payload), Some(_signature), None) =
		(segments.next(), segments.next(), segments.next(), segments.next())
	else {
		return Err(IdTokenError::Segments);
	};

	if header.is_empty() || payload.is_empty() {
		return Err(IdTokenError::Segments);
	}

	let bytes = URL_SAFE_LENIENT.decode(payload).map_err(|source| IdTokenError::Base64 { source })?;
	let text = String::from_utf8(bytes).map_err(|source| IdTokenError::Utf8 { source })?;
	let claims = parse_flat_object(text.as_bytes()).map_err(|source| IdTokenError::Json { source })?;

	if claims.is_empty() {
		return Err(IdTokenError::EmptyPayload);
	}

	Ok(IdentityClaims::from_map(&claims))
}
