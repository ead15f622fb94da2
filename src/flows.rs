//! Flow orchestration: authorize URL, redirect handling, and token endpoint exchanges.
//!
//! [`Engine`] sequences the pure codecs in [`crate::protocol`] and owns the single transport
//! call each token operation makes. It keeps no per-flow state between calls, so one engine
//! can serve any number of concurrent flows as long as each uses its own
//! [`AuthorizationRequest`](crate::auth::AuthorizationRequest).

mod authorize;
mod exchange;
mod redirect;

// self
use crate::{
	_prelude::*,
	auth::AuthenticationResult,
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, Logger},
	protocol::ClientTelemetry,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

pub use crate::obs::FlowStage;

const LOG_TAG: &str = "oauth2_engine.flows";

/// Engine specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestEngine = Engine<ReqwestHttpClient>;

/// OAuth 2.0 client protocol engine.
///
/// Holds the transport, the injected [`Logger`], and the telemetry appended to authorize
/// URLs. Operations:
///
/// - [`Engine::code_request_url`] builds the URL to open in the user agent.
/// - [`Engine::token_from_redirect`] validates the final redirect and returns tokens, exchanging
///   a code when needed.
/// - [`Engine::token_for_code`] and [`Engine::refresh_token`] run the two grants directly.
/// - [`Engine::post_token`] sends a caller-built body to the token endpoint.
pub struct Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client wrapper used for every token endpoint call.
	pub http_client: Arc<C>,
	logger: Arc<Logger>,
	telemetry: ClientTelemetry,
}
impl<C> Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates an engine over the provided transport with a fresh [`Logger`].
	pub fn new(http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			logger: Arc::new(Logger::new()),
			telemetry: ClientTelemetry::default(),
		}
	}

	/// Replaces the logger; pass [`Logger::global`] to share the process-wide instance.
	pub fn with_logger(mut self, logger: impl Into<Arc<Logger>>) -> Self {
		self.logger = logger.into();

		self
	}

	/// Replaces the telemetry appended to authorize URLs.
	pub fn with_telemetry(mut self, telemetry: ClientTelemetry) -> Self {
		self.telemetry = telemetry;

		self
	}

	/// Logger used for every event this engine emits.
	pub fn logger(&self) -> &Arc<Logger> {
		&self.logger
	}

	/// Telemetry appended to authorize URLs.
	pub fn telemetry(&self) -> &ClientTelemetry {
		&self.telemetry
	}

	fn finish(&self, kind: FlowKind, operation: &str, result: &Result<AuthenticationResult>) {
		match result {
			Ok(AuthenticationResult::Succeeded(_)) => {
				self.logger.verbose(LOG_TAG, format!("{operation} produced tokens."));
				obs::record_flow_outcome(kind, FlowOutcome::Success);
			},
			Ok(AuthenticationResult::Failed(failure)) => {
				self.logger.info(
					LOG_TAG,
					format!(
						"{operation} failed with `{}`: {}",
						failure.error_code, failure.error_description
					),
				);
				obs::record_flow_outcome(kind, FlowOutcome::Failure);
			},
			Err(e) => {
				self.logger.error(LOG_TAG, format!("{operation} aborted."), e.code(), Some(e));
				obs::record_flow_outcome(kind, FlowOutcome::Failure);
			},
		}
	}
}
#[cfg(feature = "reqwest")]
impl Default for Engine<ReqwestHttpClient> {
	fn default() -> Self {
		Self::new(ReqwestHttpClient::default())
	}
}
impl<C> Clone for Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			logger: self.logger.clone(),
			telemetry: self.telemetry.clone(),
		}
	}
}
impl<C> Debug for Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Engine")
			.field("logger", &self.logger)
			.field("telemetry", &self.telemetry)
			.finish()
	}
}
