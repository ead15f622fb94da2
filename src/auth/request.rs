//! Immutable authorization request parameters and their builder.

// self
use crate::{_prelude::*, auth::CorrelationId};

/// Controls how the authorization server treats existing browser sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptBehavior {
	/// Reuse cached sessions when possible.
	#[default]
	Auto,
	/// Always prompt; adds `prompt=login` to the authorize URL.
	Always,
	/// Re-validate the session without forcing credentials.
	RefreshSession,
	/// Force credential entry inside the user agent.
	ForceLogin,
}

/// Errors raised by [`AuthorizationRequestBuilder::build`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthorizationRequestError {
	/// A mandatory field was blank.
	#[error("Authorization request field `{field}` must not be blank.")]
	Blank {
		/// Name of the blank field.
		field: &'static str,
	},
}

/// Parameters for a single authorization attempt.
///
/// Built once per flow and read-only afterwards. The correlation identifier, when present,
/// is attached to the authorize URL and to every token endpoint call made for the request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
	authority: String,
	client_id: String,
	resource: String,
	redirect_uri: String,
	login_hint: Option<String>,
	prompt: PromptBehavior,
	extra_query_parameters: Option<String>,
	correlation_id: Option<CorrelationId>,
}
impl AuthorizationRequest {
	/// Starts a builder seeded with the mandatory fields.
	pub fn builder(
		authority: impl Into<String>,
		client_id: impl Into<String>,
		resource: impl Into<String>,
		redirect_uri: impl Into<String>,
	) -> AuthorizationRequestBuilder {
		AuthorizationRequestBuilder::new(authority, client_id, resource, redirect_uri)
	}

	/// Authority base URI, e.g. `https://login.example.com/common`.
	pub fn authority(&self) -> &str {
		&self.authority
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Resource the access token is requested for.
	pub fn resource(&self) -> &str {
		&self.resource
	}

	/// Redirect URI registered for the client.
	pub fn redirect_uri(&self) -> &str {
		&self.redirect_uri
	}

	/// Optional login hint forwarded as `login_hint`.
	pub fn login_hint(&self) -> Option<&str> {
		self.login_hint.as_deref()
	}

	/// Prompt behavior for the authorize URL.
	pub fn prompt(&self) -> PromptBehavior {
		self.prompt
	}

	/// Raw query fragment appended verbatim to the authorize URL.
	pub fn extra_query_parameters(&self) -> Option<&str> {
		self.extra_query_parameters.as_deref()
	}

	/// Correlation identifier, if the caller supplied one.
	pub fn correlation_id(&self) -> Option<CorrelationId> {
		self.correlation_id
	}
}

/// Builder for [`AuthorizationRequest`].
#[derive(Clone, Debug)]
pub struct AuthorizationRequestBuilder {
	authority: String,
	client_id: String,
	resource: String,
	redirect_uri: String,
	login_hint: Option<String>,
	prompt: PromptBehavior,
	extra_query_parameters: Option<String>,
	correlation_id: Option<CorrelationId>,
}
impl AuthorizationRequestBuilder {
	fn new(
		authority: impl Into<String>,
		client_id: impl Into<String>,
		resource: impl Into<String>,
		redirect_uri: impl Into<String>,
	) -> Self {
		Self {
			authority: authority.into(),
			client_id: client_id.into(),
			resource: resource.into(),
			redirect_uri: redirect_uri.into(),
			login_hint: None,
			prompt: PromptBehavior::default(),
			extra_query_parameters: None,
			correlation_id: None,
		}
	}

	/// Sets the login hint.
	pub fn login_hint(mut self, hint: impl Into<String>) -> Self {
		self.login_hint = Some(hint.into());

		self
	}

	/// Overrides the prompt behavior (defaults to [`PromptBehavior::Auto`]).
	pub fn prompt(mut self, prompt: PromptBehavior) -> Self {
		self.prompt = prompt;

		self
	}

	/// Sets the raw query fragment appended to the authorize URL.
	///
	/// The text goes after every engine parameter, with a leading `&` added when missing. It
	/// must already be percent-encoded: the final URL is re-parsed, which escapes characters
	/// such as spaces. A `#` is rejected when the URL is built.
	pub fn extra_query_parameters(mut self, params: impl Into<String>) -> Self {
		self.extra_query_parameters = Some(params.into());

		self
	}

	/// Attaches a correlation identifier.
	pub fn correlation_id(mut self, id: CorrelationId) -> Self {
		self.correlation_id = Some(id);

		self
	}

	/// Attaches a freshly generated correlation identifier.
	pub fn new_correlation_id(self) -> Self {
		self.correlation_id(CorrelationId::new())
	}

	/// Validates the mandatory fields and freezes the request.
	pub fn build(self) -> Result<AuthorizationRequest, AuthorizationRequestError> {
		ensure_present("authority", &self.authority)?;
		ensure_present("client_id", &self.client_id)?;
		ensure_present("redirect_uri", &self.redirect_uri)?;

		Ok(AuthorizationRequest {
			authority: self.authority,
			client_id: self.client_id,
			resource: self.resource,
			redirect_uri: self.redirect_uri,
			login_hint: self.login_hint,
			prompt: self.prompt,
			extra_query_parameters: self.extra_query_parameters,
			correlation_id: self.correlation_id,
		})
	}
}

pub(crate) fn is_blank(value: &str) -> bool {
	value.trim().is_empty()
}

fn ensure_present(field: &'static str, value: &str) -> Result<(), AuthorizationRequestError> {
	if is_blank(value) { Err(AuthorizationRequestError::Blank { field }) } else { Ok(()) }
}
