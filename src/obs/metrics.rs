// self
use crate::obs::{FlowKind, FlowOutcome};

/// Counter incremented once per engine operation attempt and once per terminal outcome.
pub const FLOW_TOTAL: &str = "oauth2_engine_flow_total";
/// Counter of token endpoint responses, labeled by status class.
pub const TOKEN_RESPONSE_TOTAL: &str = "oauth2_engine_token_response_total";

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			FLOW_TOTAL,
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records the status class of a token endpoint response that reached the parser.
pub fn record_token_response(status: u16) {
	let class = status_class(status);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(TOKEN_RESPONSE_TOTAL, "class" => class).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = class;
	}
}

fn status_class(status: u16) -> &'static str {
	match status {
		200..=299 => "2xx",
		300..=399 => "3xx",
		400..=499 => "4xx",
		500..=599 => "5xx",
		_ => "other",
	}
}
