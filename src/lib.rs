//! OAuth 2.0 client protocol engine.
//!
//! Builds authorize URLs, validates redirects, exchanges codes and refresh tokens, and reads
//! identity-token claims. HTTP goes through the pluggable [`http::TokenHttpClient`] transport.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod protocol;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	#[cfg(feature = "reqwest")] use crate::{flows::Engine, http::ReqwestHttpClient};
	use crate::{
		error::ErrorCode,
		obs::{LogEntry, LogSink, SinkError},
	};
	#[cfg(feature = "reqwest")] use crate::obs::{LogLevel, Logger};

	/// Engine type alias used by reqwest-backed integration tests.
	#[cfg(feature = "reqwest")]
	pub type ReqwestTestEngine = Engine<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`Engine`] backed by the reqwest transport used across integration tests,
	/// plus the capturing sink wired into its logger.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_engine() -> (ReqwestTestEngine, Arc<CapturingSink>) {
		let sink = Arc::new(CapturingSink::default());
		let logger = Logger::new().with_level(LogLevel::Verbose).with_sink(sink.clone());
		let engine = Engine::new(test_reqwest_http_client()).with_logger(logger);

		(engine, sink)
	}

	/// [`LogSink`] that records every delivered entry for later assertions.
	#[derive(Debug, Default)]
	pub struct CapturingSink(Mutex<Vec<LogEntry>>);
	impl CapturingSink {
		/// Returns a snapshot of the captured entries.
		pub fn entries(&self) -> Vec<LogEntry> {
			self.0.lock().clone()
		}

		/// Returns `true` if any captured entry carries the provided code.
		pub fn contains_code(&self, code: ErrorCode) -> bool {
			self.0.lock().iter().any(|entry| entry.code == Some(code))
		}
	}
	impl LogSink for CapturingSink {
		fn log(&self, entry: &LogEntry) -> Result<(), SinkError> {
			self.0.lock().push(entry.clone());

			Ok(())
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
