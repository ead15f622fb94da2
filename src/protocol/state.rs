//! The opaque `state` value binding a redirect to the authority and resource that produced it.
//!
//! The blob is `a=<authority>&r=<resource>` in unpadded base64url. Inputs are not escaped, so an
//! authority or resource containing `&` or `=` does not survive [`ProtocolState::parse`].
//! Redirect validation relies on that exact decoding, so the format is kept as is.

// crates.io
use base64::Engine as _;
// self
use crate::{
	_prelude::*, auth::request::is_blank, error::EncodingError, protocol::URL_SAFE_LENIENT,
};

/// Encodes `authority` and `resource` into a `state` parameter value.
pub fn encode(authority: &str, resource: &str) -> String {
	URL_SAFE_LENIENT.encode(format!("a={authority}&r={resource}"))
}

/// Decodes a `state` parameter value into its plain-text form.
///
/// Blank input yields `Ok(None)`. Padding is optional.
pub fn decode(state: &str) -> Result<Option<String>, EncodingError> {
	if is_blank(state) {
		return Ok(None);
	}

	let bytes =
		URL_SAFE_LENIENT.decode(state).map_err(|source| EncodingError::Base64 { source })?;

	String::from_utf8(bytes).map(Some).map_err(|source| EncodingError::Utf8 { source })
}

/// Authority and resource carried inside a decoded `state`.
///
/// Missing fields read as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolState {
	authority: String,
	resource: String,
}
impl ProtocolState {
	/// Pairs an authority with a resource.
	pub fn new(authority: impl Into<String>, resource: impl Into<String>) -> Self {
		Self { authority: authority.into(), resource: resource.into() }
	}

	/// Reads `a` and `r` from decoded state text; the first occurrence of each key wins.
	///
	/// Values are taken literally. [`encode`] never percent-encodes them, so `+` and `%xx`
	/// survive as written.
	pub fn parse(decoded: &str) -> Self {
		let mut authority = None;
		let mut resource = None;

		for pair in decoded.split('&') {
			let (key, value) = pair.split_once('=').unwrap_or((pair, ""));

			match key {
				"a" if authority.is_none() => authority = Some(value),
				"r" if resource.is_none() => resource = Some(value),
				_ => {},
			}
		}

		Self::new(authority.unwrap_or_default(), resource.unwrap_or_default())
	}

	/// Authority recorded in the state.
	pub fn authority(&self) -> &str {
		&self.authority
	}

	/// Resource recorded in the state.
	pub fn resource(&self) -> &str {
		&self.resource
	}

	/// Encodes the pair with [`encode`].
	pub fn encode(&self) -> String {
		encode(&self.authority, &self.resource)
	}

	/// Returns `true` when both fields are present and the resource equals `expected`,
	/// ignoring case.
	pub fn matches_resource(&self, expected: &str) -> bool {
		!is_blank(&self.authority)
			&& !is_blank(&self.resource)
			&& self
				.resource
				.chars()
				.flat_map(char::to_lowercase)
				.eq(expected.chars().flat_map(char::to_lowercase))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn round_trip_restores_both_fields() {
		let cases = [
			("https://login.example.com/common", "https://api.example.com"),
			("a", "b"),
			("https://login.example.com/tenant-ü", "urn:resource:42"),
			("https://login.example.com", "urn:a+b"),
			("https://login.example.com", "https://api.example.com/x%2Fy"),
			("https://login.example.com/a b", "urn:x;y"),
		];

		for (authority, resource) in cases {
			let encoded = encode(authority, resource);

			assert!(!encoded.contains('='), "State must be unpadded: {encoded}.");
			assert!(!encoded.contains('+') && !encoded.contains('/'));

			let decoded = decode(&encoded)
				.expect("Encoded state should decode.")
				.expect("Encoded state should not be blank.");
			let state = ProtocolState::parse(&decoded);

			assert_eq!(state, ProtocolState::new(authority, resource));
			assert_eq!(state.encode(), encoded);
		}
	}

	#[test]
	fn blank_state_decodes_to_none() {
		assert_eq!(decode("").expect("Empty state should not error."), None);
		assert_eq!(decode("   ").expect("Blank state should not error."), None);
	}

	#[test]
	fn invalid_alphabet_is_an_encoding_error() {
		let err = decode("!!!").expect_err("Invalid base64url should fail.");

		assert!(matches!(err, EncodingError::Base64 { .. }));

		let err = decode("_w").expect_err("Non-UTF-8 bytes should fail.");

		assert!(matches!(err, EncodingError::Utf8 { .. }));
	}

	#[test]
	fn resource_match_ignores_case_and_rejects_blanks() {
		let state = ProtocolState::new("https://login.example.com", "https://API.example.com");

		assert!(state.matches_resource("https://api.example.com"));
		assert!(!state.matches_resource("https://other.example.com"));
		assert!(!ProtocolState::new("", "r").matches_resource("r"));
		assert!(!ProtocolState::new("a", " ").matches_resource(" "));
	}

	#[test]
	fn parse_keeps_first_occurrence_and_tolerates_missing_keys() {
		let state = ProtocolState::parse("a=first&r=res&a=second");

		assert_eq!(state.authority(), "first");
		assert_eq!(state.resource(), "res");

		let state = ProtocolState::parse("a=only");

		assert_eq!(state.resource(), "");
	}

	#[test]
	fn separators_inside_fields_corrupt_decoding() {
		let decoded = decode(&encode("https://login.example.com", "https://api?x=1&r=evil"))
			.expect("State should decode.")
			.expect("State should not be blank.");
		let state = ProtocolState::parse(&decoded);

		assert_eq!(state.resource(), "https://api?x=1");
	}

	#[test]
	fn plus_and_percent_escapes_are_not_decoded() {
		let state = ProtocolState::parse("a=https://login.example.com&r=urn:a+b%2Fc");

		assert_eq!(state.resource(), "urn:a+b%2Fc");
		assert!(state.matches_resource("URN:A+B%2FC"));
		assert!(!state.matches_resource("urn:a b/c"));
	}
}
