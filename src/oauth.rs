//! Token endpoint facade: request assembly over the transport and transport error mapping.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		HeaderValue, Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::CorrelationId,
	error::TransportError,
	http::TokenHttpClient,
};

/// `Content-Type` of every token endpoint POST.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
/// `Accept` header sent with every token endpoint POST.
pub const JSON_ACCEPT: &str = "application/json";

type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Posts form bodies to a token endpoint through a [`TokenHttpClient`].
pub(crate) struct BasicFacade<C>
where
	C: ?Sized + TokenHttpClient,
{
	http_client: Arc<C>,
}
impl<C> BasicFacade<C>
where
	C: ?Sized + TokenHttpClient,
{
	pub(crate) fn new(http_client: Arc<C>) -> Self {
		Self { http_client }
	}

	/// Sends `body` to `endpoint` and returns the raw response, whatever its status.
	pub(crate) fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		body: String,
		correlation_id: Option<CorrelationId>,
	) -> FacadeFuture<'a, HttpResponse> {
		Box::pin(async move {
			let request = build_token_request(endpoint, body)?;
			let handle = self.http_client.with_correlation(correlation_id);
			let response = handle.call(request).await.map_err(map_transport_error)?;

			Ok(response)
		})
	}
}

/// Assembles the token endpoint POST.
pub fn build_token_request(endpoint: &Url, body: String) -> Result<HttpRequest> {
	Request::builder()
		.method(Method::POST)
		.uri(endpoint.as_str())
		.header(ACCEPT, HeaderValue::from_static(JSON_ACCEPT))
		.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
		.body(body.into_bytes())
		.map_err(|e| TransportError::from(e).into())
}

/// Converts an [`HttpClientError`] emitted by any transport into a [`TransportError`].
pub fn map_transport_error<E>(err: HttpClientError<E>) -> TransportError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::Network { source: inner },
		HttpClientError::Http(inner) => TransportError::Request(inner),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Other { message },
		_ => TransportError::Other { message: "Unrecognized transport failure".into() },
	}
}
