//! IMAP settings discovery for an email address.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, client::Client, request::Params, resource::API_VERSION_PREFIX};

/// Server settings suggested for a mailbox.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ImapSettings {
	/// Server host name.
	#[serde(default)]
	pub server: Option<String>,
	/// Login user name.
	#[serde(default)]
	pub username: Option<String>,
	/// Server port.
	#[serde(default, deserialize_with = "super::lenient_port")]
	pub port: Option<u16>,
	/// Whether TLS should be used.
	#[serde(default)]
	pub use_ssl: Option<bool>,
	/// Whether the provider supports OAuth.
	#[serde(default)]
	pub oauth: Option<bool>,
}

/// Discovered settings for an email address.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Discovery {
	/// Address that was looked up.
	#[serde(default)]
	pub email: Option<String>,
	/// Source type, e.g. `IMAP`.
	#[serde(default, rename = "type")]
	pub source_type: Option<String>,
	/// Suggested server settings.
	#[serde(default)]
	pub imap: ImapSettings,
	/// Provider documentation links.
	#[serde(default)]
	pub documentation: Vec<Value>,
}
impl Discovery {
	/// Looks up settings for `email`; `None` unless the API found any.
	///
	/// `source_type` is upper-cased before it is sent.
	pub async fn discover(client: &Client, source_type: &str, email: &str) -> Result<Option<Self>> {
		let params = Params::new()
			.push("source_type", source_type.to_uppercase())
			.push("email", email);
		let response = client.get(format!("{API_VERSION_PREFIX}/discovery"), params).await?;
		let found = response
			.as_json()
			.and_then(|value| value.get("found"))
			.and_then(Value::as_bool)
			.unwrap_or(false);

		if !found {
			return Ok(None);
		}

		Ok(Some(response.decode()?))
	}
}
