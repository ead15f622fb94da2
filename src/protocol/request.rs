//! Authorize URL and token endpoint body construction.

// crates.io
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{AuthorizationRequest, PromptBehavior, request::is_blank},
	protocol::state,
};

const AUTHORIZE_PATH: &str = "/oauth2/authorize";
const TOKEN_PATH: &str = "/oauth2/token";

/// Client identification appended to authorize URLs as `x-client-*` parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientTelemetry {
	sku: String,
	version: String,
	os: String,
	device_model: String,
}
impl ClientTelemetry {
	/// Overrides the SKU (`x-client-SKU`).
	pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
		self.sku = sku.into();

		self
	}

	/// Overrides the library version (`x-client-Ver`).
	pub fn with_version(mut self, version: impl Into<String>) -> Self {
		self.version = version.into();

		self
	}

	/// Overrides the operating system label (`x-client-OS`).
	pub fn with_os(mut self, os: impl Into<String>) -> Self {
		self.os = os.into();

		self
	}

	/// Overrides the device model (`x-client-DM`).
	pub fn with_device_model(mut self, device_model: impl Into<String>) -> Self {
		self.device_model = device_model.into();

		self
	}

	/// Query parameters in the order they are appended.
	pub fn query_pairs(&self) -> [(&'static str, &str); 4] {
		[
			("x-client-SKU", &self.sku),
			("x-client-Ver", &self.version),
			("x-client-OS", &self.os),
			("x-client-DM", &self.device_model),
		]
	}
}
impl Default for ClientTelemetry {
	fn default() -> Self {
		Self {
			sku: "Rust".into(),
			version: env!("CARGO_PKG_VERSION").into(),
			os: std::env::consts::OS.into(),
			device_model: std::env::consts::ARCH.into(),
		}
	}
}

/// Resolves `<authority>/oauth2/authorize`.
pub fn authorization_endpoint(request: &AuthorizationRequest) -> Result<Url> {
	endpoint(request.authority(), AUTHORIZE_PATH)
}

/// Resolves `<authority>/oauth2/token`.
pub fn token_endpoint(request: &AuthorizationRequest) -> Result<Url> {
	endpoint(request.authority(), TOKEN_PATH)
}

/// Builds the URL the user agent should open to start the authorization code flow.
///
/// Parameters appear in a fixed order: `response_type`, `client_id`, `resource`,
/// `redirect_uri`, `state`, `login_hint` (when set), the telemetry parameters,
/// `client-request-id` (when a correlation id is set), `prompt=login` for
/// [`PromptBehavior::Always`], and finally the caller's extra parameters as given.
///
/// Extra parameters containing `#` fail with [`Error::Argument`]; a fragment marker would
/// silently drop them from the query.
pub fn authorization_uri(
	request: &AuthorizationRequest,
	telemetry: &ClientTelemetry,
) -> Result<Url> {
	let endpoint = authorization_endpoint(request)?;
	let mut query = Serializer::new(String::new());

	query
		.append_pair("response_type", "code")
		.append_pair("client_id", request.client_id())
		.append_pair("resource", request.resource())
		.append_pair("redirect_uri", request.redirect_uri())
		.append_pair("state", &state::encode(request.authority(), request.resource()));

	if let Some(hint) = request.login_hint().filter(|hint| !is_blank(hint)) {
		query.append_pair("login_hint", hint);
	}

	query.extend_pairs(telemetry.query_pairs());

	if let Some(id) = request.correlation_id() {
		query.append_pair("client-request-id", &id.to_string());
	}
	if request.prompt() == PromptBehavior::Always {
		query.append_pair("prompt", "login");
	}

	let mut raw = format!("{endpoint}?{}", query.finish());

	if let Some(extra) = request.extra_query_parameters().filter(|extra| !is_blank(extra)) {
		if extra.contains('#') {
			return Err(Error::Argument { name: "extra_query_parameters" });
		}
		if !extra.starts_with('&') {
			raw.push('&');
		}

		raw.push_str(extra);
	}

	Url::parse(&raw).map_err(|source| Error::malformed_url(raw, source))
}

/// Form body for the `authorization_code` grant.
pub fn authorization_code_grant_body(request: &AuthorizationRequest, code: &str) -> String {
	Serializer::new(String::new())
		.append_pair("grant_type", "authorization_code")
		.append_pair("code", code)
		.append_pair("client_id", request.client_id())
		.append_pair("redirect_uri", request.redirect_uri())
		.finish()
}

/// Form body for the `refresh_token` grant; `resource` is included only when non-blank.
pub fn refresh_token_grant_body(request: &AuthorizationRequest, refresh_token: &str) -> String {
	let mut body = Serializer::new(String::new());

	body.append_pair("grant_type", "refresh_token")
		.append_pair("refresh_token", refresh_token)
		.append_pair("client_id", request.client_id());

	if !is_blank(request.resource()) {
		body.append_pair("resource", request.resource());
	}

	body.finish()
}

fn endpoint(authority: &str, path: &str) -> Result<Url> {
	let raw = format!("{}{path}", authority.strip_suffix('/').unwrap_or(authority));

	Url::parse(&raw).map_err(|source| Error::malformed_url(authority, source))
}
