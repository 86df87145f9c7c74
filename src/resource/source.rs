//! Mail sources: one per mailbox attached to an account.

// self
use crate::{
	_prelude::*,
	client::Client,
	request::Params,
	resource::{Account, AccountId, Folder, SourceLabel, SourceStatus, flag},
};

/// Filters accepted by [`Source::all`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceQuery {
	/// Only sources in this status.
	pub status: Option<SourceStatus>,
	/// Only sources that are (or are not) working.
	pub status_ok: Option<bool>,
}
impl SourceQuery {
	/// Renders the filters as request parameters.
	pub fn to_params(&self) -> Params {
		Params::new().push_opt("status", self.status).push_opt("status_ok", self.status_ok.map(flag))
	}
}

/// Settings changed through [`Source::update_attributes`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceUpdate {
	/// Requested status, e.g. `OK` to resume a disabled source.
	pub status: Option<String>,
	/// How often the source is synced, e.g. `1d`.
	pub sync_period: Option<String>,
	/// Service level, e.g. `pro`.
	pub service_level: Option<String>,
	/// New IMAP password.
	pub password: Option<String>,
	/// New OAuth token for the mailbox.
	pub provider_token: Option<String>,
	/// New OAuth token secret for the mailbox.
	pub provider_token_secret: Option<String>,
}
impl SourceUpdate {
	fn to_params(&self) -> Params {
		Params::new()
			.push_opt("status", self.status.as_ref())
			.push_opt("sync_period", self.sync_period.as_ref())
			.push_opt("service_level", self.service_level.as_ref())
			.push_opt("password", self.password.as_ref())
			.push_opt("provider_token", self.provider_token.as_ref())
			.push_opt("provider_token_secret", self.provider_token_secret.as_ref())
	}
}

/// A mailbox attached to an account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Source {
	/// Account owning the source; filled in from the enclosing request.
	#[serde(skip)]
	pub account_id: Option<AccountId>,
	/// Label identifying the source; `None` before creation and after destruction.
	#[serde(default, deserialize_with = "optional_label")]
	pub label: Option<SourceLabel>,
	/// Mailbox email address.
	#[serde(default)]
	pub email: Option<String>,
	/// Mail server host name.
	#[serde(default)]
	pub server: Option<String>,
	/// Login user name.
	#[serde(default)]
	pub username: Option<String>,
	/// Whether the connection uses TLS.
	#[serde(default)]
	pub use_ssl: Option<bool>,
	/// Mail server port.
	#[serde(default, deserialize_with = "super::lenient_port")]
	pub port: Option<u16>,
	/// Server protocol, e.g. `IMAP`.
	#[serde(default, rename = "type")]
	pub source_type: Option<String>,
	/// `password` or `oauth`.
	#[serde(default)]
	pub authentication_type: Option<String>,
	/// Service level, e.g. `pro`.
	#[serde(default)]
	pub service_level: Option<String>,
	/// Sync period, e.g. `1d`.
	#[serde(default)]
	pub sync_period: Option<String>,
	/// Current status as reported by the API.
	#[serde(default)]
	pub status: Option<String>,
}
impl Source {
	/// Prepares an unsaved source for `account_id`.
	pub fn new(account_id: AccountId) -> Self {
		Self { account_id: Some(account_id), ..Default::default() }
	}

	/// Lists the sources of an account.
	pub async fn all(
		client: &Client,
		account_id: &AccountId,
		query: &SourceQuery,
	) -> Result<Vec<Self>> {
		let sources: Vec<Self> =
			client.get(Self::collection_path(account_id), query.to_params()).await?.decode()?;

		Ok(sources.into_iter().map(|source| source.owned_by(account_id)).collect())
	}

	/// Fetches the source labelled `label`.
	pub async fn find(client: &Client, account_id: &AccountId, label: &SourceLabel) -> Result<Self> {
		let source: Self = client
			.get(format!("{}/{label}", Self::collection_path(account_id)), Params::new())
			.await?
			.decode()?;

		Ok(source.owned_by(account_id))
	}

	/// Creates the source.
	///
	/// Email, server, username, port and type are mandatory; a missing one fails with
	/// [`Error::InvalidArgument`] before any request is sent.
	pub async fn save(&self, client: &Client) -> Result<bool> {
		let account_id = self.require_account()?;
		let email = required("email", self.email.as_deref())?;
		let server = required("server", self.server.as_deref())?;
		let username = required("username", self.username.as_deref())?;
		let port = self.port.ok_or_else(|| Error::invalid_argument("port is required"))?;
		let source_type = required("type", self.source_type.as_deref())?;
		let params = Params::new()
			.push("email", email)
			.push("server", server)
			.push("username", username)
			.push("use_ssl", self.use_ssl.unwrap_or(false))
			.push("port", port)
			.push("type", source_type);

		Ok(client.post(Self::collection_path(account_id), params).await?.success())
	}

	/// Sends `update` to the API and mirrors the status, sync period and service level locally.
	pub async fn update_attributes(&mut self, client: &Client, update: SourceUpdate) -> Result<bool> {
		let path = self.path()?;
		let success = client.post(path, update.to_params()).await?.success();

		if let Some(status) = update.status {
			self.status = Some(status);
		}
		if let Some(sync_period) = update.sync_period {
			self.sync_period = Some(sync_period);
		}
		if let Some(service_level) = update.service_level {
			self.service_level = Some(service_level);
		}

		Ok(success)
	}

	/// Deletes the source; on success the label is cleared.
	pub async fn destroy(&mut self, client: &Client) -> Result<bool> {
		let success = client.delete(self.path()?, Params::new()).await?.success();

		if success {
			self.label = None;
		}

		Ok(success)
	}

	/// Lists the folders of this source.
	pub async fn folders(&self, client: &Client) -> Result<Vec<Folder>> {
		Folder::all(client, self.require_account()?, self.require_label()?).await
	}

	/// API path of this source.
	pub fn path(&self) -> Result<String> {
		Ok(format!(
			"{}/{}",
			Self::collection_path(self.require_account()?),
			self.require_label()?
		))
	}

	pub(crate) fn collection_path(account_id: &AccountId) -> String {
		format!("{}/sources", Account::path_of(account_id))
	}

	fn owned_by(mut self, account_id: &AccountId) -> Self {
		self.account_id = Some(account_id.clone());

		self
	}

	fn require_account(&self) -> Result<&AccountId> {
		self.account_id.as_ref().ok_or_else(|| Error::invalid_argument("the source has no account"))
	}

	fn require_label(&self) -> Result<&SourceLabel> {
		self.label.as_ref().ok_or_else(|| Error::invalid_argument("the source has no label"))
	}
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
	value
		.filter(|value| !value.trim().is_empty())
		.ok_or_else(|| Error::invalid_argument(format!("{name} is required")))
}

fn optional_label<'de, D>(deserializer: D) -> Result<Option<SourceLabel>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let label = Option::<String>::deserialize(deserializer)?;

	match label {
		Some(label) if !label.is_empty() =>
			SourceLabel::new(label).map(Some).map_err(serde::de::Error::custom),
		_ => Ok(None),
	}
}
