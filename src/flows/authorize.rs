// self
use crate::{
	_prelude::*,
	auth::AuthorizationRequest,
	flows::{Engine, LOG_TAG},
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, FlowStage},
	protocol,
};

impl<C> Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Builds the authorize URL the user agent should open for `request`.
	///
	/// Fails with [`Error::MalformedUrl`] when the authority cannot form a URL.
	pub fn code_request_url(&self, request: &AuthorizationRequest) -> Result<Url> {
		const KIND: FlowKind = FlowKind::Authorize;

		let span = FlowSpan::new(KIND, "code_request_url");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let _guard = span.clone().entered();
		let result = protocol::authorization_uri(request, &self.telemetry);

		match &result {
			Ok(url) => {
				span.advance(FlowStage::AuthorizationUriReady);
				self.logger.verbose(
					LOG_TAG,
					format!(
						"Authorize URL ready for {}{}.",
						url.origin().ascii_serialization(),
						url.path()
					),
				);
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(e) => {
				self.logger.error(LOG_TAG, "Authorize URL could not be built.", e.code(), Some(e));
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}
}
