//! Redirect and token endpoint response interpretation.

// crates.io
use oauth2::http::{HeaderMap, StatusCode};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{
		AuthenticationResult, CorrelationId, IdentityClaims, TokenGrant, TokenSecret, UserInfo,
		request::is_blank,
	},
	error::ErrorCode,
	obs::Logger,
	protocol::{LOG_TAG, decode_id_token, parse_flat_object},
};

/// Lifetime assumed when the server omits `expires_in` or sends an unreadable value.
pub const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3_600;
/// Error code of the failed result produced for token bodies that are not JSON objects.
pub const JSON_PARSING_FAILED: &str = "json_parsing_failed";
/// Header carrying the correlation identifier in both directions.
pub const CLIENT_REQUEST_ID_HEADER: &str = "client-request-id";

/// What an authorization server answered, classified by priority: error, then code, then
/// access token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationOutcome {
	/// The server reported an OAuth error.
	Error {
		/// OAuth `error` field.
		error: String,
		/// OAuth `error_description` field (empty when absent).
		description: String,
		/// Server-reported `correlation_id`, when present and well formed.
		correlation_id: Option<CorrelationId>,
	},
	/// The server issued an authorization code.
	Code {
		/// Code to exchange at the token endpoint.
		code: String,
	},
	/// The server issued tokens directly.
	Token {
		/// Access token.
		access_token: TokenSecret,
		/// Refresh token, when issued.
		refresh_token: Option<TokenSecret>,
		/// Parsed `expires_in`; `None` falls back to [`DEFAULT_EXPIRES_IN_SECONDS`].
		expires_in_seconds: Option<i64>,
		/// `resource` field; its presence marks a multi-resource refresh token.
		resource: Option<String>,
		/// Raw identity token.
		id_token: Option<String>,
		/// Claims decoded from `id_token`, when it could be read.
		claims: Option<IdentityClaims>,
	},
}
impl AuthorizationOutcome {
	/// Returns `true` for a token outcome whose access token is not blank.
	pub fn has_access_token(&self) -> bool {
		matches!(self, Self::Token { access_token, .. } if !is_blank(access_token.expose()))
	}

	/// Converts the outcome into a terminal result, computing expiry from `captured_at`.
	///
	/// Codes and token outcomes with a blank access token cannot satisfy a token request and
	/// become `auth_failed_no_token` failures.
	pub fn into_result(self, captured_at: OffsetDateTime) -> AuthenticationResult {
		match self {
			Self::Error { error, description, .. } =>
				AuthenticationResult::failed(error, description),
			Self::Code { .. } => AuthenticationResult::failed(
				ErrorCode::AuthFailedNoToken.as_str(),
				"Token endpoint returned an authorization code instead of tokens.",
			),
			Self::Token { access_token, .. } if is_blank(access_token.expose()) =>
				no_token_failure(),
			Self::Token {
				access_token,
				refresh_token,
				expires_in_seconds,
				resource,
				claims,
				..
			} => AuthenticationResult::Succeeded(TokenGrant {
				access_token,
				refresh_token,
				expires_on: captured_at
					+ Duration::seconds(expires_in_seconds.unwrap_or(DEFAULT_EXPIRES_IN_SECONDS)),
				is_multi_resource_refresh_token: resource.is_some(),
				user_info: claims.map(UserInfo::from),
			}),
		}
	}
}

/// Extracts the parameters of a final redirect URI.
///
/// Fragment parameters win when the fragment yields any; otherwise the query is used. For
/// duplicate keys the last occurrence wins.
pub fn redirect_parameters(final_uri: &str) -> Result<HashMap<String, String>> {
	let url = Url::parse(final_uri).map_err(|source| Error::malformed_url(final_uri, source))?;
	let from_fragment = url.fragment().map(form_decode).unwrap_or_default();

	if !from_fragment.is_empty() {
		return Ok(from_fragment);
	}

	Ok(url.query().map(form_decode).unwrap_or_default())
}

/// Classifies a flat parameter map; returns `None` when it holds no `error`, `code`, or
/// `access_token` key.
pub fn classify_outcome(
	params: &HashMap<String, String>,
	log: &Logger,
) -> Option<AuthorizationOutcome> {
	if let Some(error) = params.get("error") {
		let description = params.get("error_description").cloned().unwrap_or_default();
		let correlation_id = params
			.get("correlation_id")
			.filter(|raw| !is_blank(raw))
			.and_then(|raw| match CorrelationId::parse(raw) {
				Ok(id) => Some(id),
				Err(e) => {
					log.error(
						LOG_TAG,
						format!("Correlation id in the response is malformed: {raw}."),
						ErrorCode::CorrelationIdFormat,
						Some(&e),
					);

					None
				},
			});

		log.verbose(
			LOG_TAG,
			format!(
				"OAuth2 error: {error}, description: {description}, correlation id: {}.",
				correlation_id.map(|id| id.to_string()).unwrap_or_default()
			),
		);

		return Some(AuthorizationOutcome::Error {
			error: error.clone(),
			description,
			correlation_id,
		});
	}
	if let Some(code) = params.get("code") {
		return Some(AuthorizationOutcome::Code { code: code.clone() });
	}

	let access_token = params.get("access_token")?;
	let expires_in_seconds = params
		.get("expires_in")
		.and_then(|raw| raw.trim().parse::<i32>().ok())
		.map(i64::from);
	let id_token = params.get("id_token").cloned();
	let claims = match id_token.as_deref() {
		Some(token) if !is_blank(token) => match decode_id_token(token) {
			Ok(claims) => Some(claims),
			Err(e) => {
				log.error(
					LOG_TAG,
					"Identity token could not be parsed.",
					ErrorCode::IdTokenParsingFailure,
					Some(&e),
				);

				None
			},
		},
		Some(_) => {
			log.verbose(LOG_TAG, "Identity token is not provided.");

			None
		},
		None => None,
	};

	Some(AuthorizationOutcome::Token {
		access_token: TokenSecret::new(access_token.as_str()),
		refresh_token: params
			.get("refresh_token")
			.filter(|token| !is_blank(token))
			.map(|token| TokenSecret::new(token.as_str())),
		expires_in_seconds,
		resource: params.get("resource").cloned(),
		id_token,
		claims,
	})
}

/// Interprets a token endpoint response regardless of its status code.
///
/// Never fails: unusable bodies become [`AuthenticationResult::Failed`]. The
/// `client-request-id` response header is reconciled with `expected_correlation` for logging
/// only.
pub fn parse_token_response(
	status: StatusCode,
	headers: &HeaderMap,
	body: &[u8],
	expected_correlation: Option<CorrelationId>,
	log: &Logger,
) -> AuthenticationResult {
	let result = if body.is_empty() {
		log.verbose(LOG_TAG, format!("Token endpoint returned an empty body with status {status}."));

		AuthenticationResult::failed(
			status.as_u16().to_string(),
			format!("Status code: {}", status.as_u16()),
		)
	} else {
		match parse_flat_object(body) {
			Ok(params) => classify_outcome(&params, log)
				.map(|outcome| outcome.into_result(OffsetDateTime::now_utc()))
				.unwrap_or_else(no_token_failure),
			Err(e) => {
				log.error(
					LOG_TAG,
					"Token endpoint returned a body that is not a JSON object.",
					ErrorCode::ServerInvalidJsonResponse,
					Some(&e),
				);

				AuthenticationResult::failed(JSON_PARSING_FAILED, e.to_string())
			},
		}
	};

	reconcile_correlation(headers, expected_correlation, log);

	result
}

fn reconcile_correlation(headers: &HeaderMap, expected: Option<CorrelationId>, log: &Logger) {
	let Some(raw) = headers.get(CLIENT_REQUEST_ID_HEADER) else {
		return;
	};
	let raw = String::from_utf8_lossy(raw.as_bytes());

	if raw.is_empty() {
		return;
	}

	match CorrelationId::parse(&raw) {
		Ok(id) => {
			if Some(id) != expected {
				log.warn(
					LOG_TAG,
					"Correlation id in the response does not match the request.",
					ErrorCode::CorrelationIdNotMatchingRequestResponse,
				);
			}

			log.verbose(LOG_TAG, format!("Response correlation id: {id}."));
		},
		Err(e) => log.error(
			LOG_TAG,
			format!("Correlation id in the response is malformed: {raw}."),
			ErrorCode::CorrelationIdFormat,
			Some(&e),
		),
	}
}

fn no_token_failure() -> AuthenticationResult {
	AuthenticationResult::failed(
		ErrorCode::AuthFailedNoToken.as_str(),
		"Token endpoint returned neither an access token nor an error.",
	)
}

fn form_decode(raw: &str) -> HashMap<String, String> {
	form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::Engine as _;
	use oauth2::http::HeaderValue;
	// self
	use super::*;
	use crate::{
		_preludet::CapturingSink,
		auth::AuthenticationStatus,
		obs::{LogLevel, Logger},
		protocol::URL_SAFE_LENIENT,
	};

	fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	fn capturing_logger() -> (Logger, Arc<CapturingSink>) {
		let sink = Arc::new(CapturingSink::default());

		(Logger::new().with_level(LogLevel::Verbose).with_sink(sink.clone()), sink)
	}

	#[test]
	fn error_beats_code_beats_token() {
		let log = Logger::new();
		let outcome = classify_outcome(
			&params(&[("error", "access_denied"), ("code", "c"), ("access_token", "t")]),
			&log,
		);

		assert!(matches!(outcome, Some(AuthorizationOutcome::Error { ref error, .. }) if error == "access_denied"));

		let outcome = classify_outcome(&params(&[("code", "c"), ("access_token", "t")]), &log);

		assert_eq!(outcome, Some(AuthorizationOutcome::Code { code: "c".into() }));
		assert_eq!(classify_outcome(&params(&[("state", "s")]), &log), None);
	}

	#[test]
	fn malformed_error_correlation_is_logged_and_dropped() {
		let (log, sink) = capturing_logger();
		let id = CorrelationId::new();
		let id_text = id.to_string();
		let outcome = classify_outcome(
			&params(&[("error", "e"), ("correlation_id", id_text.as_str())]),
			&log,
		);

		assert!(matches!(
			outcome,
			Some(AuthorizationOutcome::Error { correlation_id: Some(found), .. }) if found == id
		));

		let outcome =
			classify_outcome(&params(&[("error", "e"), ("correlation_id", "nope")]), &log);

		assert!(matches!(outcome, Some(AuthorizationOutcome::Error { correlation_id: None, .. })));
		assert!(sink.contains_code(ErrorCode::CorrelationIdFormat));
	}

	#[test]
	fn missing_expiry_defaults_to_one_hour() {
		let before = OffsetDateTime::now_utc();
		let result = parse_token_response(
			StatusCode::OK,
			&HeaderMap::new(),
			br#"{"access_token":"AT1"}"#,
			None,
			&Logger::new(),
		);
		let grant = result.grant().expect("Token body should succeed.");
		let expected = before + Duration::seconds(DEFAULT_EXPIRES_IN_SECONDS);

		assert!((grant.expires_on - expected).abs() <= Duration::seconds(1));
		assert!(!grant.is_multi_resource_refresh_token);
		assert!(grant.refresh_token.is_none());
	}

	#[test]
	fn expiry_accepts_strings_and_numbers() {
		let log = Logger::new();

		for body in [&br#"{"access_token":"AT1","expires_in":"60"}"#[..], br#"{"access_token":"AT1","expires_in":60}"#]
		{
			let before = OffsetDateTime::now_utc();
			let result = parse_token_response(StatusCode::OK, &HeaderMap::new(), body, None, &log);
			let grant = result.grant().expect("Token body should succeed.");

			assert!((grant.expires_on - (before + Duration::seconds(60))).abs() <= Duration::seconds(1));
		}

		let outcome = classify_outcome(&params(&[("access_token", "AT1"), ("expires_in", "soon")]), &log);

		assert!(matches!(outcome, Some(AuthorizationOutcome::Token { expires_in_seconds: None, .. })));
	}

	#[test]
	fn resource_field_marks_multi_resource_tokens() {
		let result = parse_token_response(
			StatusCode::OK,
			&HeaderMap::new(),
			br#"{"access_token":"AT1","refresh_token":"RT1","resource":"https://api.example.com"}"#,
			None,
			&Logger::new(),
		);
		let grant = result.grant().expect("Token body should succeed.");

		assert!(grant.is_multi_resource_refresh_token);
		assert_eq!(grant.refresh_token.as_ref().map(TokenSecret::expose), Some("RT1"));
	}

	#[test]
	fn identity_token_populates_user_info() {
		let payload = URL_SAFE_LENIENT.encode(r#"{"sub":"s1","tid":"t1","upn":"u@x.com"}"#);
		let body = format!(r#"{{"access_token":"AT1","id_token":"H.{payload}.S"}}"#);
		let result = parse_token_response(
			StatusCode::OK,
			&HeaderMap::new(),
			body.as_bytes(),
			None,
			&Logger::new(),
		);
		let user = result
			.grant()
			.and_then(|grant| grant.user_info.clone())
			.expect("Identity token should yield user info.");

		assert_eq!(user.user_id.as_deref(), Some("u@x.com"));
		assert!(user.is_user_id_displayable);
		assert_eq!(user.tenant_id.as_deref(), Some("t1"));
	}

	#[test]
	fn unreadable_identity_token_is_logged_only() {
		let (log, sink) = capturing_logger();
		let result = parse_token_response(
			StatusCode::OK,
			&HeaderMap::new(),
			br#"{"access_token":"AT1","id_token":"garbage"}"#,
			None,
			&log,
		);

		assert_eq!(result.status(), AuthenticationStatus::Succeeded);
		assert!(result.grant().is_some_and(|grant| grant.user_info.is_none()));
		assert!(sink.contains_code(ErrorCode::IdTokenParsingFailure));
	}

	#[test]
	fn server_error_body_becomes_failed_result() {
		let result = parse_token_response(
			StatusCode::BAD_REQUEST,
			&HeaderMap::new(),
			br#"{"error":"invalid_grant","error_description":"bad token"}"#,
			None,
			&Logger::new(),
		);
		let failure = result.failure().expect("Error body should fail.");

		assert_eq!(failure.error_code, "invalid_grant");
		assert_eq!(failure.error_description, "bad token");
	}

	#[test]
	fn unusable_bodies_become_failed_results() {
		let (log, sink) = capturing_logger();
		let result = parse_token_response(StatusCode::OK, &HeaderMap::new(), b"<html>", None, &log);

		assert_eq!(result.failure().map(|f| f.error_code.as_str()), Some(JSON_PARSING_FAILED));
		assert!(sink.contains_code(ErrorCode::ServerInvalidJsonResponse));

		let result =
			parse_token_response(StatusCode::SERVICE_UNAVAILABLE, &HeaderMap::new(), b"", None, &log);
		let failure = result.failure().expect("Empty body should fail.");

		assert_eq!(failure.error_code, "503");
		assert_eq!(failure.error_description, "Status code: 503");

		for body in [&br#"{"code":"c"}"#[..], br#"{"foo":"bar"}"#, br#"{"access_token":" "}"#] {
			let result = parse_token_response(StatusCode::OK, &HeaderMap::new(), body, None, &log);

			assert_eq!(
				result.failure().map(|f| f.error_code.as_str()),
				Some(ErrorCode::AuthFailedNoToken.as_str())
			);
		}
	}

	#[test]
	fn correlation_header_is_reconciled_for_logging_only() {
		let (log, sink) = capturing_logger();
		let expected = CorrelationId::new();
		let mut headers = HeaderMap::new();

		headers.insert(
			CLIENT_REQUEST_ID_HEADER,
			HeaderValue::from_str(&expected.to_string()).expect("UUID should be a valid header."),
		);

		let result =
			parse_token_response(StatusCode::OK, &headers, br#"{"access_token":"AT1"}"#, Some(expected), &log);

		assert!(result.is_success());
		assert!(!sink.contains_code(ErrorCode::CorrelationIdNotMatchingRequestResponse));

		let result =
			parse_token_response(StatusCode::OK, &headers, br#"{"access_token":"AT1"}"#, None, &log);

		assert!(result.is_success());
		assert!(sink.contains_code(ErrorCode::CorrelationIdNotMatchingRequestResponse));

		headers.insert(CLIENT_REQUEST_ID_HEADER, HeaderValue::from_static("not-a-uuid"));

		let result = parse_token_response(
			StatusCode::OK,
			&headers,
			br#"{"access_token":"AT1"}"#,
			Some(expected),
			&log,
		);

		assert!(result.is_success());
		assert!(sink.contains_code(ErrorCode::CorrelationIdFormat));
	}

	#[test]
	fn redirect_parameters_prefer_a_non_empty_fragment() {
		let params = redirect_parameters("app://cb?code=q#access_token=f&state=s")
			.expect("Redirect should parse.");

		assert_eq!(params.get("access_token").map(String::as_str), Some("f"));
		assert!(!params.contains_key("code"));

		let params = redirect_parameters("app://cb?code=a%20b&code=last#")
			.expect("Redirect should parse.");

		assert_eq!(params.get("code").map(String::as_str), Some("last"));
		assert!(matches!(redirect_parameters("no scheme here"), Err(Error::MalformedUrl { .. })));
		assert!(redirect_parameters("app://cb").expect("Bare redirect should parse.").is_empty());
	}
}
