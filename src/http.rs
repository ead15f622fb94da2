//! Transport seam for token endpoint calls.
//!
//! The engine only needs one capability from an HTTP stack: send a prepared
//! [`HttpRequest`] and hand back the status, headers, and body. [`TokenHttpClient`] expresses
//! that through `oauth2`'s [`AsyncHttpClient`] so any stack `oauth2` can drive also works here.
//! Each call gets a fresh handle carrying the request's [`CorrelationId`], which the handle is
//! expected to send as the `client-request-id` header.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] use oauth2::http::HeaderValue;
// self
use crate::{_prelude::*, auth::CorrelationId};

/// Header asking the server to echo `client-request-id` in its response.
pub const RETURN_CLIENT_REQUEST_ID_HEADER: &str = "return-client-request-id";

/// Abstraction over HTTP transports capable of executing token endpoint POSTs.
///
/// Implementations must be `Send + Sync + 'static` so one transport can serve concurrent
/// flows, and the handles they return must own whatever state they need so request futures
/// stay `Send` while in flight. The engine neither retries nor enforces timeouts; a timeout
/// raised by the transport surfaces as a transport error.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle bound to one correlation identifier.
	///
	/// The request future returned by [`AsyncHttpClient::call`] must be `Send`.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle that attaches `correlation_id` to the requests it sends.
	///
	/// When an identifier is present, implementations should set `client-request-id` to its
	/// hyphenated form and `return-client-request-id: true`.
	fn with_correlation(&self, correlation_id: Option<CorrelationId>) -> Self::Handle;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token endpoints answer directly, so configure any custom [`ReqwestClient`] to disable
/// redirect following.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	pub(crate) fn correlated(&self, correlation_id: Option<CorrelationId>) -> CorrelatedHandle {
		CorrelatedHandle(Arc::new(CorrelatedHttpClient { client: self.0.clone(), correlation_id }))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = CorrelatedHandle;
	type TransportError = ReqwestError;

	fn with_correlation(&self, correlation_id: Option<CorrelationId>) -> Self::Handle {
		self.correlated(correlation_id)
	}
}

#[cfg(feature = "reqwest")]
struct CorrelatedHttpClient {
	client: ReqwestClient,
	correlation_id: Option<CorrelationId>,
}

/// Handle returned by [`ReqwestHttpClient`] that stamps correlation headers.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct CorrelatedHandle(Arc<CorrelatedHttpClient>);
#[cfg(feature = "reqwest")]
impl CorrelatedHandle {
	/// Correlation identifier attached to every request sent through this handle.
	pub fn correlation_id(&self) -> Option<CorrelationId> {
		self.0.correlation_id
	}
}
#[cfg(feature = "reqwest")]
impl Debug for CorrelatedHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CorrelatedHandle").field(&self.0.correlation_id).finish()
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for CorrelatedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, mut request: HttpRequest) -> Self::Future {
		let inner = Arc::clone(&self.0);

		Box::pin(async move {
			if let Some(id) = inner.correlation_id {
				let headers = request.headers_mut();

				headers.insert(
					crate::protocol::CLIENT_REQUEST_ID_HEADER,
					HeaderValue::from_str(&id.to_string()).map_err(|e| {
						HttpClientError::<ReqwestError>::Other(format!(
							"Correlation id is not a valid header: {e}."
						))
					})?,
				);
				headers.insert(RETURN_CLIENT_REQUEST_ID_HEADER, HeaderValue::from_static("true"));
			}

			let response = inner
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
