//! Contacts an account has exchanged email with.

// self
use crate::{
	_prelude::*,
	client::Client,
	request::Params,
	resource::{Account, AccountId, path_segment},
};

/// Filters accepted by [`Contact::all`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactQuery {
	/// Matches names and addresses.
	pub search: Option<String>,
	/// Only contacts last seen before this time.
	pub active_before: Option<OffsetDateTime>,
	/// Only contacts last seen after this time.
	pub active_after: Option<OffsetDateTime>,
	/// Maximum number of results.
	pub limit: Option<u32>,
	/// Offset to start the list at.
	pub offset: Option<u32>,
}
impl ContactQuery {
	/// Renders the filters as request parameters.
	pub fn to_params(&self) -> Params {
		Params::new()
			.push_opt("search", self.search.as_ref())
			.push_opt("active_before", self.active_before.map(OffsetDateTime::unix_timestamp))
			.push_opt("active_after", self.active_after.map(OffsetDateTime::unix_timestamp))
			.push_opt("limit", self.limit)
			.push_opt("offset", self.offset)
	}
}

/// A contact.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Contact {
	/// Account the contact belongs to.
	#[serde(skip)]
	pub account_id: Option<AccountId>,
	/// Email address.
	#[serde(default)]
	pub email: Option<String>,
	/// Number of messages exchanged.
	#[serde(default)]
	pub count: Option<u64>,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Thumbnail URL.
	#[serde(default)]
	pub thumbnail: Option<String>,
}
impl Contact {
	/// Lists the contacts of an account.
	pub async fn all(
		client: &Client,
		account_id: &AccountId,
		query: &ContactQuery,
	) -> Result<Vec<Self>> {
		#[derive(Deserialize)]
		struct Matches {
			#[serde(default)]
			matches: Vec<Contact>,
		}

		let found: Matches =
			client.get(Self::collection_path(account_id), query.to_params()).await?.decode()?;

		Ok(found.matches.into_iter().map(|contact| contact.owned_by(account_id)).collect())
	}

	/// Fetches the contact with `email`.
	pub async fn find(client: &Client, account_id: &AccountId, email: &str) -> Result<Self> {
		let email = path_segment("contact email", email)?;
		let path = format!("{}/{email}", Self::collection_path(account_id));
		let contact: Self = client.get(path, Params::new()).await?.decode()?;

		Ok(contact.owned_by(account_id))
	}

	fn collection_path(account_id: &AccountId) -> String {
		format!("{}/contacts", Account::path_of(account_id))
	}

	fn owned_by(mut self, account_id: &AccountId) -> Self {
		self.account_id = Some(account_id.clone());

		self
	}
}
