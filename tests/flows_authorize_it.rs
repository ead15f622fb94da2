#![cfg(all(feature = "reqwest", feature = "test"))]

// self
use oauth2_engine::{
	_preludet::*,
	auth::{AuthorizationRequest, CorrelationId, PromptBehavior},
	error::ErrorCode,
	flows::ReqwestEngine,
	obs::{LogLevel, Logger},
	protocol::{self, ClientTelemetry, ProtocolState},
};

fn query_value(url: &Url, key: &str) -> Option<String> {
	url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned())
}

#[test]
fn code_request_url_encodes_request_fields() {
	let (engine, _sink) = build_reqwest_test_engine();
	let request = AuthorizationRequest::builder(
		"https://login.example.com/common",
		"abc",
		"https://api.example.com",
		"app://cb",
	)
	.build()
	.expect("Authorization request fixture should build.");
	let url = engine.code_request_url(&request).expect("Authorize URL should build.");
	let query = url.query().expect("Authorize URL should have a query.");

	assert_eq!(url.as_str().split('?').next(), Some("https://login.example.com/common/oauth2/authorize"));
	assert!(query.contains("response_type=code"));
	assert!(query.contains("client_id=abc"));
	assert!(query.contains("resource=https%3A%2F%2Fapi.example.com"));
	assert!(query.contains("redirect_uri=app%3A%2F%2Fcb"));
	assert_eq!(query_value(&url, "x-client-SKU").as_deref(), Some("Rust"));
	assert_eq!(query_value(&url, "x-client-Ver").as_deref(), Some(env!("CARGO_PKG_VERSION")));

	let state = query_value(&url, "state").expect("Authorize URL should carry state.");
	let decoded = protocol::decode(&state)
		.expect("State should decode.")
		.expect("State should not be blank.");

	assert_eq!(
		ProtocolState::parse(&decoded),
		ProtocolState::new("https://login.example.com/common", "https://api.example.com")
	);
}

#[test]
fn state_differs_between_requests_for_different_resources() {
	let (engine, _sink) = build_reqwest_test_engine();
	let state_for = |resource: &str| {
		let request =
			AuthorizationRequest::builder("https://login.example.com/common", "abc", resource, "app://cb")
				.build()
				.expect("Authorization request fixture should build.");
		let url = engine.code_request_url(&request).expect("Authorize URL should build.");

		query_value(&url, "state").expect("Authorize URL should carry state.")
	};
	let first = state_for("https://api.example.com");
	let second = state_for("https://graph.example.com");

	assert!(!first.is_empty());
	assert_ne!(first, second);
}

#[test]
fn correlation_prompt_and_telemetry_follow_configuration() {
	let sink = Arc::new(CapturingSink::default());
	let engine = ReqwestEngine::new(test_reqwest_http_client())
		.with_logger(Logger::new().with_level(LogLevel::Verbose).with_sink(sink.clone()))
		.with_telemetry(ClientTelemetry::default().with_sku("Embedded").with_device_model("pi"));
	let id = CorrelationId::new();
	let request = AuthorizationRequest::builder(
		"https://login.example.com/common",
		"abc",
		"https://api.example.com",
		"app://cb",
	)
	.login_hint("user@example.com")
	.prompt(PromptBehavior::Always)
	.correlation_id(id)
	.extra_query_parameters("msafed=0")
	.build()
	.expect("Authorization request fixture should build.");
	let url = engine.code_request_url(&request).expect("Authorize URL should build.");

	assert_eq!(query_value(&url, "client-request-id"), Some(id.to_string()));
	assert_eq!(query_value(&url, "prompt").as_deref(), Some("login"));
	assert_eq!(query_value(&url, "login_hint").as_deref(), Some("user@example.com"));
	assert_eq!(query_value(&url, "x-client-SKU").as_deref(), Some("Embedded"));
	assert_eq!(query_value(&url, "x-client-DM").as_deref(), Some("pi"));
	assert!(url.as_str().ends_with("&msafed=0"));
	assert!(!sink.entries().is_empty());
}

#[test]
fn malformed_authority_is_reported_and_logged() {
	let (engine, sink) = build_reqwest_test_engine();
	let request = AuthorizationRequest::builder("login.example.com", "abc", "r", "app://cb")
		.build()
		.expect("Authorization request fixture should build.");
	let err = engine.code_request_url(&request).expect_err("Relative authorities should fail.");

	assert!(matches!(err, Error::MalformedUrl { .. }));
	assert!(sink.contains_code(ErrorCode::DeveloperAuthorityIsNotValidUrl));
}
