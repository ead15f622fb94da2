//! Observability helpers for engine flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_engine.flow` with the `flow` (grant)
//!   and `stage` ([`FlowStage`]) fields, and to mirror every accepted [`Logger`] event as a
//!   `tracing` event.
//! - Enable `metrics` to increment the `oauth2_engine_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.
//!
//! [`Logger`] itself is always available: it filters by a minimum [`LogLevel`] and forwards
//! entries to an optional injected [`LogSink`].

mod log;
mod metrics;
mod tracing;

pub use log::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// OAuth flow kinds observed by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorize URL construction.
	Authorize,
	/// Redirect handling followed by the authorization code exchange.
	AuthorizationCode,
	/// Refresh token flow.
	Refresh,
	/// Direct token endpoint call with a caller-built body.
	TokenRequest,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authorize => "authorize",
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Refresh => "refresh",
			FlowKind::TokenRequest => "token_request",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Stages a flow moves through; a stage is never revisited within one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlowStage {
	/// Request accepted, nothing derived yet.
	Built,
	/// Authorize URL produced.
	AuthorizationUriReady,
	/// Redirect parameters parsed.
	RedirectCaptured,
	/// Returned `state` matched the request.
	StateValidated,
	/// Token endpoint call in flight.
	Exchanging,
	/// Result produced.
	Done,
}
impl FlowStage {
	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Built => "built",
			FlowStage::AuthorizationUriReady => "authorization_uri_ready",
			FlowStage::RedirectCaptured => "redirect_captured",
			FlowStage::StateValidated => "state_validated",
			FlowStage::Exchanging => "exchanging",
			FlowStage::Done => "done",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an engine operation.
	Attempt,
	/// Tokens (or an authorize URL) were produced.
	Success,
	/// An error or a failed result was returned to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
