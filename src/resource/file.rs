//! File attachments found in an account's messages.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	client::Client,
	request::Params,
	resource::{Account, AccountId, Addresses, FileId},
};

/// File name filter for [`FileQuery`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileNameFilter {
	/// Exact file name.
	Exact(String),
	/// Regular expression source, sent as `/source/`.
	Regex(String),
}
impl FileNameFilter {
	fn to_param(&self) -> String {
		match self {
			Self::Exact(name) => name.clone(),
			Self::Regex(source) => format!("/{source}/"),
		}
	}
}

/// Filters accepted by [`File::all`] and [`File::all_grouped`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileQuery {
	/// File name filter.
	pub file_name: Option<FileNameFilter>,
	/// Any address the file was sent from or to.
	pub email: Option<String>,
	/// Recipient address.
	pub to: Option<String>,
	/// Sender address.
	pub from: Option<String>,
	/// Carbon-copy address.
	pub cc: Option<String>,
	/// Blind carbon-copy address.
	pub bcc: Option<String>,
	/// Only files sent before this time.
	pub date_before: Option<OffsetDateTime>,
	/// Only files sent after this time.
	pub date_after: Option<OffsetDateTime>,
	/// Only files indexed before this time.
	pub indexed_before: Option<OffsetDateTime>,
	/// Only files indexed after this time.
	pub indexed_after: Option<OffsetDateTime>,
	/// Maximum number of results.
	pub limit: Option<u32>,
	/// Offset to start the list at.
	pub offset: Option<u32>,
}
impl FileQuery {
	/// Renders the filters as request parameters.
	pub fn to_params(&self) -> Params {
		Params::new()
			.push_opt("file_name", self.file_name.as_ref().map(FileNameFilter::to_param))
			.push_opt("email", self.email.as_ref())
			.push_opt("to", self.to.as_ref())
			.push_opt("from", self.from.as_ref())
			.push_opt("cc", self.cc.as_ref())
			.push_opt("bcc", self.bcc.as_ref())
			.push_opt("date_before", self.date_before.map(OffsetDateTime::unix_timestamp))
			.push_opt("date_after", self.date_after.map(OffsetDateTime::unix_timestamp))
			.push_opt("indexed_before", self.indexed_before.map(OffsetDateTime::unix_timestamp))
			.push_opt("indexed_after", self.indexed_after.map(OffsetDateTime::unix_timestamp))
			.push_opt("limit", self.limit)
			.push_opt("offset", self.offset)
	}
}

/// A file attachment.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct File {
	/// Account the file belongs to.
	#[serde(skip)]
	pub account_id: Option<AccountId>,
	/// File id.
	#[serde(rename = "file_id")]
	pub id: FileId,
	/// Size in bytes.
	#[serde(default)]
	pub size: Option<u64>,
	/// MIME type.
	#[serde(default, rename = "type")]
	pub file_type: Option<String>,
	/// Subject of the carrying message.
	#[serde(default)]
	pub subject: Option<String>,
	/// Sending time of the carrying message.
	#[serde(default, deserialize_with = "super::epoch_or_none")]
	pub date: Option<OffsetDateTime>,
	/// Sender and recipients of the carrying message.
	#[serde(default)]
	pub addresses: Addresses,
	/// File name.
	#[serde(default)]
	pub file_name: Option<String>,
	/// MIME body section holding the file.
	#[serde(default, deserialize_with = "super::string_or_number")]
	pub body_section: Option<String>,
	/// Whether a preview can be rendered.
	#[serde(default)]
	pub supports_preview: Option<bool>,
	/// Context.IO id of the carrying message.
	#[serde(default)]
	pub message_id: Option<String>,
	/// Indexing time.
	#[serde(default, deserialize_with = "super::epoch_or_none")]
	pub date_indexed: Option<OffsetDateTime>,
	/// `Message-ID` header of the carrying message.
	#[serde(default)]
	pub email_message_id: Option<String>,
	/// Per-address contact details.
	#[serde(default)]
	pub person_info: BTreeMap<String, Value>,
	/// File name split into `(part, kind)` pairs, e.g. `("report", "main")`.
	#[serde(default)]
	pub file_name_structure: Vec<(String, String)>,
}
impl File {
	/// Lists the files of an account.
	pub async fn all(client: &Client, account_id: &AccountId, query: &FileQuery) -> Result<Vec<Self>> {
		let files: Vec<Self> =
			client.get(Self::collection_path(account_id), query.to_params()).await?.decode()?;

		Ok(files.into_iter().map(|file| file.owned_by(account_id)).collect())
	}

	/// Lists the files of an account grouped by revision.
	pub async fn all_grouped(
		client: &Client,
		account_id: &AccountId,
		query: &FileQuery,
	) -> Result<Vec<FileRevisions>> {
		let params = query.to_params().push("group_by_revisions", "1");
		let groups: Vec<FileRevisions> =
			client.get(Self::collection_path(account_id), params).await?.decode()?;

		Ok(groups
			.into_iter()
			.map(|group| FileRevisions {
				occurrences: group
					.occurrences
					.into_iter()
					.map(|file| file.owned_by(account_id))
					.collect(),
				..group
			})
			.collect())
	}

	/// Downloads the file content.
	pub async fn content(&self, client: &Client) -> Result<Vec<u8>> {
		client.get(format!("{}/content", self.path()?), Params::new().raw()).await?.into_bytes()
	}

	/// API path of this file.
	pub fn path(&self) -> Result<String> {
		let account_id = self
			.account_id
			.as_ref()
			.ok_or_else(|| Error::invalid_argument("the file has no account"))?;

		Ok(format!("{}/{}", Self::collection_path(account_id), self.id))
	}

	fn collection_path(account_id: &AccountId) -> String {
		format!("{}/files", Account::path_of(account_id))
	}

	fn owned_by(mut self, account_id: &AccountId) -> Self {
		self.account_id = Some(account_id.clone());

		self
	}
}

/// Revisions of one file name, returned by [`File::all_grouped`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FileRevisions {
	/// File name shared by every revision.
	#[serde(default)]
	pub file_name: Option<String>,
	/// Date of the newest revision.
	#[serde(default, deserialize_with = "super::epoch_or_none")]
	pub latest_date: Option<OffsetDateTime>,
	/// Every revision of the file.
	#[serde(default, rename = "occurences", alias = "occurrences")]
	pub occurrences: Vec<File>,
}
