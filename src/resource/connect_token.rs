//! Connect tokens: hosted flows letting end users attach a mailbox themselves.
//!
//! Tokens exist at the application level or scoped to an existing account; every operation
//! takes an optional account to pick the scope.

// crates.io
use serde::Deserializer;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	client::Client,
	request::Params,
	resource::{API_VERSION_PREFIX, Account, AccountId, TokenId},
};

/// Parameters accepted by [`ConnectToken::create`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewConnectToken {
	/// Where the user is sent once the mailbox is connected.
	pub callback_url: Url,
	/// Pre-filled email address.
	pub email: Option<String>,
	/// Pre-filled first name.
	pub first_name: Option<String>,
	/// Pre-filled last name.
	pub last_name: Option<String>,
	/// Service level of the resulting source.
	pub service_level: Option<String>,
	/// Callback invoked once the source finishes its first sync.
	pub source_callback_url: Option<Url>,
}
impl NewConnectToken {
	/// Starts a token request returning to `callback_url`.
	pub fn new(callback_url: Url) -> Self {
		Self {
			callback_url,
			email: None,
			first_name: None,
			last_name: None,
			service_level: None,
			source_callback_url: None,
		}
	}

	/// Renders the request as body parameters.
	pub fn to_params(&self) -> Params {
		Params::new()
			.push("callback_url", self.callback_url.as_str())
			.push_opt("email", self.email.as_ref())
			.push_opt("first_name", self.first_name.as_ref())
			.push_opt("last_name", self.last_name.as_ref())
			.push_opt("service_level", self.service_level.as_ref())
			.push_opt("source_callback_url", self.source_callback_url.as_ref().map(Url::as_str))
	}
}

/// Result of [`ConnectToken::create`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreatedConnectToken {
	/// Id of the new token.
	#[serde(rename = "token")]
	pub token_id: TokenId,
	/// URL the end user must be sent to.
	#[serde(rename = "browser_redirect_url")]
	pub redirect_url: String,
}

/// A connect token.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConnectToken {
	/// Token id.
	pub token: TokenId,
	/// Email address the token was created for.
	#[serde(default)]
	pub email: Option<String>,
	/// Creation time.
	#[serde(default, rename = "created", deserialize_with = "super::epoch_or_none")]
	pub created_at: Option<OffsetDateTime>,
	/// When the token was used, if it has been.
	#[serde(default, rename = "used", deserialize_with = "super::epoch_or_none")]
	pub used_at: Option<OffsetDateTime>,
	/// Callback URL.
	#[serde(default)]
	pub callback_url: Option<String>,
	/// Service level.
	#[serde(default)]
	pub service_level: Option<String>,
	/// Pre-filled first name.
	#[serde(default)]
	pub first_name: Option<String>,
	/// Pre-filled last name.
	#[serde(default)]
	pub last_name: Option<String>,
	/// Account created through the token; `None` while unused.
	#[serde(default, deserialize_with = "account_or_empty")]
	pub account: Option<Account>,
}
impl ConnectToken {
	/// Lists tokens, application-wide or for `account`.
	pub async fn all(client: &Client, account: Option<&AccountId>) -> Result<Vec<Self>> {
		client.get(Self::collection_path(account), Params::new()).await?.decode()
	}

	/// Fetches one token.
	pub async fn find(
		client: &Client,
		token_id: &TokenId,
		account: Option<&AccountId>,
	) -> Result<Self> {
		client.get(Self::path_of(token_id, account), Params::new()).await?.decode()
	}

	/// Creates a token and returns its id plus the URL to send the user to.
	pub async fn create(
		client: &Client,
		request: &NewConnectToken,
		account: Option<&AccountId>,
	) -> Result<CreatedConnectToken> {
		client.post(Self::collection_path(account), request.to_params()).await?.decode()
	}

	/// Deletes the token `token_id`.
	pub async fn destroy_by_id(
		client: &Client,
		token_id: &TokenId,
		account: Option<&AccountId>,
	) -> Result<bool> {
		Ok(client.delete(Self::path_of(token_id, account), Params::new()).await?.success())
	}

	/// Deletes this token.
	pub async fn destroy(&self, client: &Client, account: Option<&AccountId>) -> Result<bool> {
		Self::destroy_by_id(client, &self.token, account).await
	}

	fn collection_path(account: Option<&AccountId>) -> String {
		match account {
			Some(id) => format!("{}/connect_tokens", Account::path_of(id)),
			None => format!("{API_VERSION_PREFIX}/connect_tokens"),
		}
	}

	fn path_of(token_id: &TokenId, account: Option<&AccountId>) -> String {
		format!("{}/{token_id}", Self::collection_path(account))
	}
}

fn account_or_empty<'de, D>(deserializer: D) -> Result<Option<Account>, D::Error>
where
	D: Deserializer<'de>,
{
	match Value::deserialize(deserializer)? {
		Value::Null => Ok(None),
		Value::Array(items) if items.is_empty() => Ok(None),
		value => Account::from_json(value).map(Some).map_err(serde::de::Error::custom),
	}
}
