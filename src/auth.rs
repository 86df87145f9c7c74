//! Consumer credentials and the redacting secret wrapper used to sign requests.
//!
//! The API uses two-legged OAuth 1.0a: requests are signed with the consumer key and secret
//! only, so [`Credentials::token`] and [`Credentials::token_secret`] are always `None`.

// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for Secret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Signing credentials derived from a [`Config`](crate::config::Config) on every access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
	/// OAuth consumer key issued by Context.IO.
	pub consumer_key: Option<String>,
	/// OAuth consumer secret issued by Context.IO.
	pub consumer_secret: Option<Secret>,
	/// Always `None`; two-legged OAuth carries no user token.
	pub token: Option<String>,
	/// Always `None`; two-legged OAuth carries no user token secret.
	pub token_secret: Option<Secret>,
}
impl Credentials {
	/// Builds consumer-only credentials.
	pub fn consumer(consumer_key: Option<String>, consumer_secret: Option<Secret>) -> Self {
		Self { consumer_key, consumer_secret, token: None, token_secret: None }
	}

	/// Returns `true` iff both the consumer key and secret are present and non-empty.
	pub fn is_complete(&self) -> bool {
		let has_key = self.consumer_key.as_deref().is_some_and(|key| !key.is_empty());
		let has_secret = self.consumer_secret.as_ref().is_some_and(|secret| !secret.is_empty());

		has_key && has_secret
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = Secret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "Secret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "super-secret");
	}

	#[test]
	fn completeness_requires_both_halves() {
		let key = || Some("K".to_owned());
		let secret = || Some(Secret::new("S"));

		assert!(Credentials::consumer(key(), secret()).is_complete());
		assert!(!Credentials::consumer(key(), None).is_complete());
		assert!(!Credentials::consumer(None, secret()).is_complete());
		assert!(!Credentials::consumer(None, None).is_complete());
		assert!(!Credentials::consumer(Some(String::new()), secret()).is_complete());
		assert!(!Credentials::consumer(key(), Some(Secret::new(""))).is_complete());
	}
}
