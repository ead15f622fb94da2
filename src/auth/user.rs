//! Identity claims extracted from identity tokens and the user view derived from them.

// self
use crate::{_prelude::*, auth::request::is_blank};

/// Flat string claims recognized in an identity token payload.
///
/// Fields stay `None` when the claim was absent from the payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
	/// `sub` claim.
	pub subject: Option<String>,
	/// `tid` claim.
	pub tenant_id: Option<String>,
	/// `upn` claim.
	pub upn: Option<String>,
	/// `email` claim.
	pub email: Option<String>,
	/// `given_name` claim.
	pub given_name: Option<String>,
	/// `family_name` claim.
	pub family_name: Option<String>,
	/// `idp` claim.
	pub identity_provider: Option<String>,
}
impl IdentityClaims {
	/// Copies recognized claims out of a flat string map; unknown keys are ignored.
	pub fn from_map(map: &HashMap<String, String>) -> Self {
		let claim = |key: &str| map.get(key).cloned();

		Self {
			subject: claim("sub"),
			tenant_id: claim("tid"),
			upn: claim("upn"),
			email: claim("email"),
			given_name: claim("given_name"),
			family_name: claim("family_name"),
			identity_provider: claim("idp"),
		}
	}
}

/// User details surfaced on a successful authentication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
	/// Preferred user identifier: UPN, then email, then subject.
	pub user_id: Option<String>,
	/// `true` when `user_id` is a human-readable name (UPN or email).
	pub is_user_id_displayable: bool,
	/// Given name.
	pub given_name: Option<String>,
	/// Family name.
	pub family_name: Option<String>,
	/// Identity provider that authenticated the user.
	pub identity_provider: Option<String>,
	/// Tenant the user signed into.
	pub tenant_id: Option<String>,
	/// Raw claims the view was derived from.
	pub claims: IdentityClaims,
}
impl From<IdentityClaims> for UserInfo {
	fn from(claims: IdentityClaims) -> Self {
		let present = |value: &Option<String>| value.as_deref().filter(|v| !is_blank(v)).map(str::to_owned);
		let (user_id, is_user_id_displayable) = if let Some(upn) = present(&claims.upn) {
			(Some(upn), true)
		} else if let Some(email) = present(&claims.email) {
			(Some(email), true)
		} else {
			(present(&claims.subject), false)
		};

		Self {
			user_id,
			is_user_id_displayable,
			given_name: claims.given_name.clone(),
			family_name: claims.family_name.clone(),
			identity_provider: claims.identity_provider.clone(),
			tenant_id: claims.tenant_id.clone(),
			claims,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	#[test]
	fn from_map_copies_known_claims_only() {
		let claims =
			IdentityClaims::from_map(&map(&[("sub", "s1"), ("tid", "t1"), ("aud", "ignored")]));

		assert_eq!(claims.subject.as_deref(), Some("s1"));
		assert_eq!(claims.tenant_id.as_deref(), Some("t1"));
		assert!(claims.upn.is_none());
		assert!(claims.email.is_none());
	}

	#[test]
	fn user_id_prefers_upn_then_email_then_subject() {
		let info = UserInfo::from(IdentityClaims::from_map(&map(&[
			("sub", "s1"),
			("upn", "u@x.com"),
			("email", "e@x.com"),
		])));

		assert_eq!(info.user_id.as_deref(), Some("u@x.com"));
		assert!(info.is_user_id_displayable);

		let info = UserInfo::from(IdentityClaims::from_map(&map(&[
			("sub", "s1"),
			("upn", " "),
			("email", "e@x.com"),
		])));

		assert_eq!(info.user_id.as_deref(), Some("e@x.com"));

		let info = UserInfo::from(IdentityClaims::from_map(&map(&[("sub", "s1")])));

		assert_eq!(info.user_id.as_deref(), Some("s1"));
		assert!(!info.is_user_id_displayable);
	}
}
