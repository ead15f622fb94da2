//! Final redirect handling: state validation, then code exchange or implicit tokens.

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationResult, AuthorizationRequest, request::is_blank},
	error::{ErrorCode, ProtocolStateError},
	flows::{Engine, LOG_TAG},
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, FlowStage},
	protocol::{self, AuthorizationOutcome, ProtocolState},
};

impl<C> Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Turns the final redirect URI reached by the user agent into tokens.
	///
	/// Only a blank or malformed URI, an undecodable `state`, or a transport failure abort
	/// with an [`Error`]. Everything else resolves into an [`AuthenticationResult`]:
	///
	/// - A missing `state` fails with `auth_failed_no_state`. A `state` that does not name the
	///   request's resource (compared ignoring case) and a non-blank authority fails with
	///   `auth_failed_bad_state`. Nothing is sent in either case.
	/// - An `error` in the redirect fails with the server's code and description.
	/// - A code is exchanged at the token endpoint.
	/// - Tokens carried by the redirect itself (implicit flow) succeed without a network call.
	/// - Anything else fails with `auth_failed_no_token`.
	pub async fn token_from_redirect(
		&self,
		request: &AuthorizationRequest,
		final_redirect_uri: &str,
	) -> Result<AuthenticationResult> {
		const KIND: FlowKind = FlowKind::AuthorizationCode;

		let span = FlowSpan::new(KIND, "token_from_redirect");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				if is_blank(final_redirect_uri) {
					return Err(Error::Argument { name: "final_redirect_uri" });
				}

				let params = protocol::redirect_parameters(final_redirect_uri)?;

				span.advance(FlowStage::RedirectCaptured);

				let encoded_state = params.get("state").map(String::as_str).unwrap_or_default();
				let Some(decoded_state) =
					protocol::state::decode(encoded_state)?.filter(|state| !is_blank(state))
				else {
					return Ok(self.reject_state(ProtocolStateError::Missing, &span));
				};

				if !ProtocolState::parse(&decoded_state).matches_resource(request.resource()) {
					return Ok(self.reject_state(ProtocolStateError::Mismatch, &span));
				}

				span.advance(FlowStage::StateValidated);

				match protocol::classify_outcome(&params, &self.logger) {
					Some(AuthorizationOutcome::Code { code }) if !is_blank(&code) => {
						self.logger.verbose(LOG_TAG, "Redirect carried a code; exchanging it.");

						let body = protocol::authorization_code_grant_body(request, &code);

						self.exchange(request, body, &span).await
					},
					Some(outcome @ AuthorizationOutcome::Error { .. }) => {
						self.logger.verbose(LOG_TAG, "Redirect carried a server error.");
						span.advance(FlowStage::Done);

						Ok(outcome.into_result(OffsetDateTime::now_utc()))
					},
					Some(outcome) if outcome.has_access_token() => {
						self.logger.verbose(LOG_TAG, "Redirect carried tokens directly.");
						span.advance(FlowStage::Done);

						Ok(outcome.into_result(OffsetDateTime::now_utc()))
					},
					_ => {
						self.logger.error(
							LOG_TAG,
							"Redirect carried neither a code nor an access token.",
							ErrorCode::AuthFailedNoToken,
							None,
						);
						span.advance(FlowStage::Done);

						Ok(AuthenticationResult::failed(
							ErrorCode::AuthFailedNoToken.as_str(),
							"Authorization response did not contain a code or an access token.",
						))
					},
				}
			})
			.await;

		self.finish(KIND, "token_from_redirect", &result);

		result
	}

	fn reject_state(&self, reason: ProtocolStateError, span: &FlowSpan) -> AuthenticationResult {
		self.logger.error(LOG_TAG, reason.to_string(), reason.code(), None);
		span.advance(FlowStage::Done);

		AuthenticationResult::failed(reason.code().as_str(), reason.to_string())
	}
}
