//! Engine-level error types shared across the protocol codecs and flows.

// self
use crate::_prelude::*;

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical engine error exposed by public APIs.
///
/// Only structural problems abort a flow. State failures, redirect errors, missing tokens,
/// token endpoint rejections, malformed token bodies, and empty responses resolve into
/// [`AuthenticationResult::Failed`] instead.
///
/// [`AuthenticationResult::Failed`]: crate::auth::AuthenticationResult::Failed
#[derive(Debug, ThisError)]
pub enum Error {
	/// A required input was empty or whitespace.
	#[error("Argument `{name}` must not be blank.")]
	Argument {
		/// Name of the offending argument.
		name: &'static str,
	},
	/// Text could not be decoded while reading protocol data.
	#[error(transparent)]
	Encoding(#[from] EncodingError),
	/// The authority or redirect cannot form a valid URL.
	#[error("`{url}` is not a valid URL.")]
	MalformedUrl {
		/// Offending input.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Transport failure (DNS, TCP, TLS, I/O).
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// Returns the stable code used when this error is logged.
	pub fn code(&self) -> ErrorCode {
		match self {
			Error::Argument { .. } => ErrorCode::ArgumentException,
			Error::Encoding(_) => ErrorCode::EncodingIsNotSupported,
			Error::MalformedUrl { .. } => ErrorCode::DeveloperAuthorityIsNotValidUrl,
			Error::Transport(_) => ErrorCode::ServerError,
		}
	}

	pub(crate) fn malformed_url(url: impl Into<String>, source: url::ParseError) -> Self {
		Self::MalformedUrl { url: url.into(), source }
	}
}

/// Decoding failures raised while reading the protocol `state` value.
#[derive(Debug, ThisError)]
pub enum EncodingError {
	/// The value is not valid base64url.
	#[error("State value is not valid base64url.")]
	Base64 {
		/// Underlying decoder failure.
		#[source]
		source: base64::DecodeError,
	},
	/// The decoded bytes are not UTF-8.
	#[error("State value does not decode to UTF-8 text.")]
	Utf8 {
		/// Underlying conversion failure.
		#[source]
		source: std::string::FromUtf8Error,
	},
}

/// Failures binding a redirect back to the request that produced it.
///
/// These never abort a flow; they are reported as failed results carrying [`Self::code`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum ProtocolStateError {
	/// The redirect did not carry a `state` parameter.
	#[error("Authorization response did not contain a state parameter.")]
	Missing,
	/// The returned `state` names a different authority or resource.
	#[error("Authorization response state does not match the request.")]
	Mismatch,
}
impl ProtocolStateError {
	/// Returns the code reported in the failed result.
	pub const fn code(self) -> ErrorCode {
		match self {
			Self::Missing => ErrorCode::AuthFailedNoState,
			Self::Mismatch => ErrorCode::AuthFailedBadState,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The HTTP request could not be assembled.
	#[error("Token request could not be constructed.")]
	Request(#[from] oauth2::http::Error),
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure without a structured cause.
	#[error("HTTP client error occurred while calling the token endpoint: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Stable codes attached to log events and derived from [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
	/// Returned `state` did not match the request.
	AuthFailedBadState,
	/// Returned redirect carried no `state`.
	AuthFailedNoState,
	/// Neither a code nor a token was returned.
	AuthFailedNoToken,
	/// A correlation identifier could not be parsed.
	CorrelationIdFormat,
	/// The response correlation identifier differs from the request's.
	CorrelationIdNotMatchingRequestResponse,
	/// Identity token could not be decoded.
	IdTokenParsingFailure,
	/// Token endpoint body was not a JSON object.
	ServerInvalidJsonResponse,
	/// Token endpoint call failed at the transport level.
	ServerError,
	/// A required argument was blank.
	ArgumentException,
	/// Protocol text could not be decoded.
	EncodingIsNotSupported,
	/// The authority cannot form a valid URL.
	DeveloperAuthorityIsNotValidUrl,
}
impl ErrorCode {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorCode::AuthFailedBadState => "auth_failed_bad_state",
			ErrorCode::AuthFailedNoState => "auth_failed_no_state",
			ErrorCode::AuthFailedNoToken => "auth_failed_no_token",
			ErrorCode::CorrelationIdFormat => "correlation_id_format",
			ErrorCode::CorrelationIdNotMatchingRequestResponse =>
				"correlation_id_not_matching_request_response",
			ErrorCode::IdTokenParsingFailure => "id_token_parsing_failure",
			ErrorCode::ServerInvalidJsonResponse => "server_invalid_json_response",
			ErrorCode::ServerError => "server_error",
			ErrorCode::ArgumentException => "argument_exception",
			ErrorCode::EncodingIsNotSupported => "encoding_is_not_supported",
			ErrorCode::DeveloperAuthorityIsNotValidUrl => "developer_authority_is_not_valid_url",
		}
	}
}
impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
