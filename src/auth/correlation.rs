//! Correlation identifiers pairing engine requests with server responses.

// crates.io
use uuid::{Builder, Uuid};
// self
use crate::_prelude::*;

/// Caller-generated 128-bit identifier echoed by the server in `client-request-id`.
///
/// Generate a fresh value for every flow attempt; retries must not reuse an identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);
impl CorrelationId {
	/// Generates a random (version 4) identifier.
	pub fn new() -> Self {
		Self(Builder::from_random_bytes(rand::random()).into_uuid())
	}

	/// Parses the hyphenated textual form, ignoring surrounding whitespace.
	pub fn parse(value: &str) -> Result<Self, CorrelationIdError> {
		Uuid::try_parse(value.trim())
			.map(Self)
			.map_err(|_| CorrelationIdError { value: value.to_owned() })
	}

	/// Returns the wrapped UUID.
	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}
impl Default for CorrelationId {
	fn default() -> Self {
		Self::new()
	}
}
impl From<Uuid> for CorrelationId {
	fn from(value: Uuid) -> Self {
		Self(value)
	}
}
impl FromStr for CorrelationId {
	type Err = CorrelationIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl Debug for CorrelationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CorrelationId({})", self.0)
	}
}
impl Display for CorrelationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0.hyphenated(), f)
	}
}

/// Error returned when a correlation identifier is not a UUID.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("`{value}` is not a valid correlation identifier.")]
pub struct CorrelationIdError {
	/// Rejected input.
	pub value: String,
}
