//! Accounts: one per end user, holding any number of mail [`Source`]s.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	client::Client,
	error::DecodeError,
	request::Params,
	resource::{API_VERSION_PREFIX, AccountId, Source, SourceStatus, flag},
};

/// Filters accepted by [`Account::all`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountQuery {
	/// Only accounts associated with this email address.
	pub email: Option<String>,
	/// Only accounts with sources in this status.
	pub status: Option<SourceStatus>,
	/// Only accounts whose sources are (or are not) working.
	pub status_ok: Option<bool>,
	/// Maximum number of results.
	pub limit: Option<u32>,
	/// Offset to start the list at.
	pub offset: Option<u32>,
}
impl AccountQuery {
	/// Renders the filters as request parameters.
	pub fn to_params(&self) -> Params {
		Params::new()
			.push_opt("email", self.email.as_ref())
			.push_opt("status", self.status)
			.push_opt("status_ok", self.status_ok.map(flag))
			.push_opt("limit", self.limit)
			.push_opt("offset", self.offset)
	}
}

/// Name changes accepted by [`Account::update_attributes`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountUpdate {
	/// New first name.
	pub first_name: Option<String>,
	/// New last name.
	pub last_name: Option<String>,
}

/// An account. Only the first and last name can change after creation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Account {
	/// Unique id; `None` until the account has been saved.
	#[serde(default)]
	pub id: Option<AccountId>,
	/// Username assigned by the API.
	#[serde(default)]
	pub username: Option<String>,
	/// Creation time.
	#[serde(default, deserialize_with = "super::epoch_or_none")]
	pub created: Option<OffsetDateTime>,
	/// Suspension time, if suspended.
	#[serde(default, deserialize_with = "super::epoch_or_none")]
	pub suspended: Option<OffsetDateTime>,
	/// Email addresses associated with the account; the first one is primary.
	#[serde(default)]
	pub email_addresses: Vec<String>,
	/// First name of the account holder.
	#[serde(default)]
	pub first_name: Option<String>,
	/// Last name of the account holder.
	#[serde(default)]
	pub last_name: Option<String>,
	/// When the password expired, if it has.
	#[serde(default, deserialize_with = "super::epoch_or_none")]
	pub password_expired: Option<OffsetDateTime>,
	/// Mail sources attached to the account.
	#[serde(default)]
	pub sources: Vec<Source>,
}
impl Account {
	/// Lists accounts matching `query`.
	pub async fn all(client: &Client, query: &AccountQuery) -> Result<Vec<Self>> {
		let accounts: Vec<Self> =
			client.get(format!("{API_VERSION_PREFIX}/accounts"), query.to_params()).await?.decode()?;

		Ok(accounts.into_iter().map(Self::adopt_sources).collect())
	}

	/// Fetches the account with `id`.
	pub async fn find(client: &Client, id: &AccountId) -> Result<Self> {
		let account: Self = client.get(Self::path_of(id), Params::new()).await?.decode()?;

		Ok(account.adopt_sources())
	}

	/// Prepares an unsaved account with a primary email address.
	pub fn new(email: impl Into<String>) -> Self {
		Self { email_addresses: vec![email.into()], ..Default::default() }
	}

	/// Sets the first name.
	pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
		self.first_name = Some(first_name.into());

		self
	}

	/// Sets the last name.
	pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
		self.last_name = Some(last_name.into());

		self
	}

	/// Decodes an account document, handing the account id down to its sources.
	pub fn from_json(value: Value) -> Result<Self> {
		let account: Self = serde_path_to_error::deserialize(value)
			.map_err(|source| DecodeError::Shape { source })?;

		Ok(account.adopt_sources())
	}

	/// Creates the account (POST) or, once it has an id, updates its names (PUT).
	///
	/// Creation requires at least one email address. Returns the API `success` flag.
	pub async fn save(&mut self, client: &Client) -> Result<bool> {
		match self.id.clone() {
			Some(id) => {
				let params = Params::new()
					.push_opt("first_name", self.first_name.as_ref())
					.push_opt("last_name", self.last_name.as_ref());

				Ok(client.put(Self::path_of(&id), params).await?.success())
			},
			None => self.create(client).await,
		}
	}

	/// Applies `update` locally and sends it to the API.
	pub async fn update_attributes(&mut self, client: &Client, update: AccountUpdate) -> Result<bool> {
		let id = self.require_id()?.clone();

		if let Some(first_name) = &update.first_name {
			self.first_name = Some(first_name.clone());
		}
		if let Some(last_name) = &update.last_name {
			self.last_name = Some(last_name.clone());
		}

		let params = Params::new()
			.push_opt("first_name", update.first_name)
			.push_opt("last_name", update.last_name);

		Ok(client.put(Self::path_of(&id), params).await?.success())
	}

	/// API path of this account.
	pub fn path(&self) -> Result<String> {
		Ok(Self::path_of(self.require_id()?))
	}

	pub(crate) fn path_of(id: &AccountId) -> String {
		format!("{API_VERSION_PREFIX}/accounts/{id}")
	}

	fn require_id(&self) -> Result<&AccountId> {
		self.id.as_ref().ok_or_else(|| Error::invalid_argument("the account has not been saved yet"))
	}

	async fn create(&mut self, client: &Client) -> Result<bool> {
		let Some(email) = self.email_addresses.first().filter(|email| !email.is_empty()) else {
			return Err(Error::invalid_argument("you must specify an email address"));
		};
		let params = Params::new()
			.push("email", email)
			.push_opt("first_name", self.first_name.as_ref())
			.push_opt("last_name", self.last_name.as_ref());
		let response = client.post(format!("{API_VERSION_PREFIX}/accounts"), params).await?;

		if let Some(id) = response.as_json().and_then(|value| value.get("id")).and_then(Value::as_str)
		{
			self.id = Some(AccountId::new(id)?);
		}

		Ok(response.success())
	}

	fn adopt_sources(mut self) -> Self {
		for source in &mut self.sources {
			source.account_id = self.id.clone();
		}

		self
	}
}
