//! Token endpoint grants: authorization code, refresh token, and raw bodies.

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationResult, AuthorizationRequest, request::is_blank},
	flows::{Engine, LOG_TAG},
	http::TokenHttpClient,
	oauth::BasicFacade,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, FlowStage},
	protocol,
};

impl<C> Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Exchanges an authorization code for tokens.
	///
	/// A blank `code` fails with [`Error::Argument`] before any network call.
	pub async fn token_for_code(
		&self,
		request: &AuthorizationRequest,
		code: &str,
	) -> Result<AuthenticationResult> {
		const KIND: FlowKind = FlowKind::AuthorizationCode;

		let span = FlowSpan::new(KIND, "token_for_code");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				if is_blank(code) {
					return Err(Error::Argument { name: "code" });
				}

				let body = protocol::authorization_code_grant_body(request, code);

				self.exchange(request, body, &span).await
			})
			.await;

		self.finish(KIND, "token_for_code", &result);

		result
	}

	/// Redeems a refresh token without touching redirect or state handling.
	///
	/// A blank `refresh_token` fails with [`Error::Argument`] before any network call. The
	/// request's resource is sent only when non-blank.
	pub async fn refresh_token(
		&self,
		request: &AuthorizationRequest,
		refresh_token: &str,
	) -> Result<AuthenticationResult> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				if is_blank(refresh_token) {
					return Err(Error::Argument { name: "refresh_token" });
				}

				let body = protocol::refresh_token_grant_body(request, refresh_token);

				self.exchange(request, body, &span).await
			})
			.await;

		self.finish(KIND, "refresh_token", &result);

		result
	}

	/// Posts a form body to `<authority>/oauth2/token` and interprets the response.
	///
	/// Transport failures propagate as [`Error::Transport`] without retry. Any response that
	/// arrives, whatever its status, is read by [`protocol::parse_token_response`].
	pub async fn post_token(
		&self,
		request: &AuthorizationRequest,
		body: impl Into<String>,
	) -> Result<AuthenticationResult> {
		const KIND: FlowKind = FlowKind::TokenRequest;

		let span = FlowSpan::new(KIND, "post_token");
		let body = body.into();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange(request, body, &span)).await;

		self.finish(KIND, "post_token", &result);

		result
	}

	pub(super) async fn exchange(
		&self,
		request: &AuthorizationRequest,
		body: String,
		span: &FlowSpan,
	) -> Result<AuthenticationResult> {
		let endpoint = protocol::token_endpoint(request)?;
		let correlation_id = request.correlation_id();

		span.advance(FlowStage::Exchanging);
		self.logger.verbose(LOG_TAG, format!("Sending token request to {endpoint}."));

		let facade = BasicFacade::new(self.http_client.clone());
		let response = facade.post_form(&endpoint, body, correlation_id).await?;

		self.logger.verbose(
			LOG_TAG,
			format!("Token endpoint answered with status {}.", response.status()),
		);
		obs::record_token_response(response.status().as_u16());

		let result = protocol::parse_token_response(
			response.status(),
			response.headers(),
			response.body(),
			correlation_id,
			&self.logger,
		);

		span.advance(FlowStage::Done);

		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
	// self
	use super::*;
	use crate::{auth::CorrelationId, error::TransportError};

	#[derive(Debug, ThisError)]
	#[error("Unreachable transport.")]
	struct Unreachable;

	#[derive(Default)]
	struct CountingClient {
		calls: Arc<AtomicUsize>,
	}
	impl TokenHttpClient for CountingClient {
		type Handle = CountingHandle;
		type TransportError = Unreachable;

		fn with_correlation(&self, _correlation_id: Option<CorrelationId>) -> Self::Handle {
			CountingHandle { calls: self.calls.clone() }
		}
	}

	struct CountingHandle {
		calls: Arc<AtomicUsize>,
	}
	impl<'c> AsyncHttpClient<'c> for CountingHandle {
		type Error = HttpClientError<Unreachable>;
		type Future =
			Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

		fn call(&'c self, _request: HttpRequest) -> Self::Future {
			let calls = self.calls.clone();

			Box::pin(async move {
				calls.fetch_add(1, Ordering::SeqCst);

				Err(HttpClientError::Reqwest(Box::new(Unreachable)))
			})
		}
	}

	fn request() -> AuthorizationRequest {
		AuthorizationRequest::builder("https://login.example.com/common", "abc", "res", "app://cb")
			.build()
			.expect("Request fixture should build.")
	}

	#[tokio::test]
	async fn blank_inputs_fail_before_the_transport() {
		let client = CountingClient::default();
		let calls = client.calls.clone();
		let engine: Engine<CountingClient> = Engine::new(client);

		assert!(matches!(
			engine.refresh_token(&request(), "  ").await,
			Err(Error::Argument { name: "refresh_token" })
		));
		assert!(matches!(
			engine.token_for_code(&request(), "").await,
			Err(Error::Argument { name: "code" })
		));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn transport_failures_propagate_without_retry() {
		let client = CountingClient::default();
		let calls = client.calls.clone();
		let engine: Engine<CountingClient> = Engine::new(client);
		let err = engine
			.post_token(&request(), "grant_type=refresh_token&refresh_token=RT1&client_id=abc")
			.await
			.expect_err("Transport failures should propagate.");

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn invalid_authority_fails_before_the_transport() {
		let client = CountingClient::default();
		let calls = client.calls.clone();
		let engine: Engine<CountingClient> = Engine::new(client);
		let request = AuthorizationRequest::builder("not a url", "abc", "res", "app://cb")
			.build()
			.expect("Request fixture should build.");

		assert!(matches!(
			engine.refresh_token(&request, "RT1").await,
			Err(Error::MalformedUrl { .. })
		));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}
}
