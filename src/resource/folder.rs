//! Folders of a mail source.

// self
use crate::{
	_prelude::*,
	client::Client,
	request::Params,
	resource::{AccountId, Source, SourceLabel, path_segment},
};

/// A folder on a mail source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Folder {
	/// Account the folder belongs to.
	#[serde(skip)]
	pub account_id: Option<AccountId>,
	/// Label of the source the folder belongs to.
	#[serde(skip)]
	pub source_label: Option<SourceLabel>,
	/// Full folder name, parents included.
	pub name: String,
	/// Hierarchy delimiter; `name.rsplit(delim)` yields the leaf name first.
	#[serde(default)]
	pub delim: Option<String>,
	/// Number of messages in the folder.
	#[serde(default)]
	pub nb_messages: Option<u64>,
	/// Whether the folder is included when the source syncs.
	#[serde(default)]
	pub included_in_sync: Option<bool>,
}
impl Folder {
	/// Lists the folders of a source.
	pub async fn all(
		client: &Client,
		account_id: &AccountId,
		label: &SourceLabel,
	) -> Result<Vec<Self>> {
		let folders: Vec<Self> =
			client.get(Self::collection_path(account_id, label), Params::new()).await?.decode()?;

		Ok(folders
			.into_iter()
			.map(|folder| Self {
				account_id: Some(account_id.clone()),
				source_label: Some(label.clone()),
				..folder
			})
			.collect())
	}

	/// Creates folder `name` on a source (PUT); `delim` is the hierarchy delimiter used in it.
	pub async fn create(
		client: &Client,
		account_id: &AccountId,
		label: &SourceLabel,
		name: &str,
		delim: Option<&str>,
	) -> Result<bool> {
		let path = format!(
			"{}/{}",
			Self::collection_path(account_id, label),
			path_segment("folder name", name)?
		);

		Ok(client.put(path, Params::new().push_opt("delim", delim)).await?.success())
	}

	/// Leaf name, without parent folders.
	pub fn leaf_name(&self) -> &str {
		match self.delim.as_deref().filter(|delim| !delim.is_empty()) {
			Some(delim) => self.name.rsplit(delim).next().unwrap_or(&self.name),
			None => &self.name,
		}
	}

	fn collection_path(account_id: &AccountId, label: &SourceLabel) -> String {
		format!("{}/{label}/folders", Source::collection_path(account_id))
	}
}
