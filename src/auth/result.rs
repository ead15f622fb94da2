//! Terminal results returned by the engine's token operations.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, UserInfo},
};

/// Coarse status of an [`AuthenticationResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthenticationStatus {
	/// Tokens were issued.
	Succeeded,
	/// The server or the engine reported a failure.
	Failed,
}

/// Outcome of a token acquisition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticationResult {
	/// Tokens were issued.
	Succeeded(TokenGrant),
	/// The token endpoint rejected the request or answered with an unusable body.
	Failed(AuthenticationFailure),
}
impl AuthenticationResult {
	/// Shorthand for a [`AuthenticationResult::Failed`] value.
	pub fn failed(error_code: impl Into<String>, error_description: impl Into<String>) -> Self {
		Self::Failed(AuthenticationFailure {
			error_code: error_code.into(),
			error_description: error_description.into(),
		})
	}

	/// Returns the coarse status.
	pub fn status(&self) -> AuthenticationStatus {
		match self {
			Self::Succeeded(_) => AuthenticationStatus::Succeeded,
			Self::Failed(_) => AuthenticationStatus::Failed,
		}
	}

	/// Returns `true` for [`AuthenticationResult::Succeeded`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Succeeded(_))
	}

	/// Returns the grant when tokens were issued.
	pub fn grant(&self) -> Option<&TokenGrant> {
		match self {
			Self::Succeeded(grant) => Some(grant),
			Self::Failed(_) => None,
		}
	}

	/// Returns the failure details when no tokens were issued.
	pub fn failure(&self) -> Option<&AuthenticationFailure> {
		match self {
			Self::Succeeded(_) => None,
			Self::Failed(failure) => Some(failure),
		}
	}
}

/// Tokens and metadata issued on success.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
	/// Access token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token, if the server issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry computed from the capture instant plus `expires_in`.
	pub expires_on: OffsetDateTime,
	/// `true` when the response carried a `resource` field.
	pub is_multi_resource_refresh_token: bool,
	/// User details decoded from the identity token, if one was returned and readable.
	pub user_info: Option<UserInfo>,
}
impl TokenGrant {
	/// Returns `true` if the access token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_on
	}
}
impl Debug for TokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGrant")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_on", &self.expires_on)
			.field("is_multi_resource_refresh_token", &self.is_multi_resource_refresh_token)
			.field("user_info", &self.user_info)
			.finish()
	}
}

/// Error pair reported when no tokens were issued.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationFailure {
	/// OAuth `error` code, HTTP status, or an engine-defined code.
	pub error_code: String,
	/// Human-readable description (may be empty).
	pub error_description: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn accessors_follow_the_variant() {
		let failed = AuthenticationResult::failed("invalid_grant", "bad token");

		assert_eq!(failed.status(), AuthenticationStatus::Failed);
		assert!(failed.grant().is_none());
		assert_eq!(
			failed.failure().map(|f| f.error_code.as_str()),
			Some("invalid_grant")
		);

		let now = OffsetDateTime::now_utc();
		let success = AuthenticationResult::Succeeded(TokenGrant {
			access_token: "AT1".into(),
			refresh_token: None,
			expires_on: now + Duration::seconds(60),
			is_multi_resource_refresh_token: false,
			user_info: None,
		});

		assert!(success.is_success());
		assert!(success.failure().is_none());

		let grant = success.grant().expect("Succeeded results should expose a grant.");

		assert!(!grant.is_expired_at(now));
		assert!(grant.is_expired_at(now + Duration::seconds(61)));
		assert!(!format!("{grant:?}").contains("AT1"));
	}
}
