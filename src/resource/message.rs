//! Messages indexed for an account, with lazily fetched bodies and headers.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	client::Client,
	request::Params,
	resource::{Account, AccountId, Addresses, MessageId, SourceLabel, flag},
};

/// Body representation requested from [`Message::body`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyFormat {
	/// `text/plain`.
	#[default]
	Plain,
	/// `text/html`.
	Html,
}
impl BodyFormat {
	/// MIME type of the body part.
	pub const fn mime_type(self) -> &'static str {
		match self {
			Self::Plain => "text/plain",
			Self::Html => "text/html",
		}
	}
}

/// IMAP flags settable through [`Message::set_flag`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageFlag {
	/// `\Seen`.
	Seen,
	/// `\Flagged`.
	Flagged,
	/// `\Answered`.
	Answered,
	/// `\Draft`.
	Draft,
	/// `\Deleted`.
	Deleted,
}
impl MessageFlag {
	/// Parameter name of the flag.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Seen => "seen",
			Self::Flagged => "flagged",
			Self::Answered => "answered",
			Self::Draft => "draft",
			Self::Deleted => "deleted",
		}
	}
}

/// Filters accepted by [`Message::all`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageQuery {
	/// Subject filter; `/pattern/` is matched as a regular expression.
	pub subject: Option<String>,
	/// Any address the message was sent from or to.
	pub email: Option<String>,
	/// Recipient address.
	pub to: Option<String>,
	/// Sender address.
	pub from: Option<String>,
	/// Carbon-copy address.
	pub cc: Option<String>,
	/// Blind carbon-copy address.
	pub bcc: Option<String>,
	/// Folder the message is in.
	pub folder: Option<String>,
	/// Only messages sent before this time.
	pub date_before: Option<OffsetDateTime>,
	/// Only messages sent after this time.
	pub date_after: Option<OffsetDateTime>,
	/// Only messages indexed after this time.
	pub indexed_after: Option<OffsetDateTime>,
	/// Include bodies in the listing.
	pub include_body: Option<bool>,
	/// Include headers in the listing.
	pub include_headers: Option<bool>,
	/// Include flags in the listing.
	pub include_flags: Option<bool>,
	/// Maximum number of results.
	pub limit: Option<u32>,
	/// Offset to start the list at.
	pub offset: Option<u32>,
}
impl MessageQuery {
	/// Renders the filters as request parameters.
	pub fn to_params(&self) -> Params {
		Params::new()
			.push_opt("subject", self.subject.as_ref())
			.push_opt("email", self.email.as_ref())
			.push_opt("to", self.to.as_ref())
			.push_opt("from", self.from.as_ref())
			.push_opt("cc", self.cc.as_ref())
			.push_opt("bcc", self.bcc.as_ref())
			.push_opt("folder", self.folder.as_ref())
			.push_opt("date_before", self.date_before.map(OffsetDateTime::unix_timestamp))
			.push_opt("date_after", self.date_after.map(OffsetDateTime::unix_timestamp))
			.push_opt("indexed_after", self.indexed_after.map(OffsetDateTime::unix_timestamp))
			.push_opt("include_body", self.include_body.map(flag))
			.push_opt("include_headers", self.include_headers.map(flag))
			.push_opt("include_flags", self.include_flags.map(flag))
			.push_opt("limit", self.limit)
			.push_opt("offset", self.offset)
	}
}

/// Source a message was found on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MessageSource {
	/// Source label.
	#[serde(default)]
	pub label: Option<String>,
	/// API URL of the message on that source.
	#[serde(default)]
	pub resource_url: Option<String>,
}

/// Attachment summary embedded in a message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MessageFile {
	/// File id.
	#[serde(default)]
	pub file_id: Option<String>,
	/// File name.
	#[serde(default)]
	pub file_name: Option<String>,
	/// Size in bytes.
	#[serde(default)]
	pub size: Option<u64>,
	/// MIME type.
	#[serde(default, rename = "type")]
	pub file_type: Option<String>,
}

/// A message.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Message {
	/// Account the message belongs to.
	#[serde(skip)]
	pub account_id: Option<AccountId>,
	/// Context.IO message id.
	pub message_id: MessageId,
	/// Subject line.
	#[serde(default)]
	pub subject: Option<String>,
	/// Sending time.
	#[serde(default, deserialize_with = "super::epoch_or_none")]
	pub date: Option<OffsetDateTime>,
	/// Sender and recipients.
	#[serde(default)]
	pub addresses: Addresses,
	/// Sources the message was found on.
	#[serde(default)]
	pub sources: Vec<MessageSource>,
	/// Folders holding the message.
	#[serde(default)]
	pub folders: Vec<String>,
	/// Attachments.
	#[serde(default)]
	pub files: Vec<MessageFile>,
	#[serde(skip)]
	bodies: BTreeMap<String, String>,
	#[serde(skip)]
	headers: Option<Map<String, Value>>,
}
impl Message {
	/// Lists the messages of an account.
	pub async fn all(
		client: &Client,
		account_id: &AccountId,
		query: &MessageQuery,
	) -> Result<Vec<Self>> {
		let messages: Vec<Self> =
			client.get(Self::collection_path(account_id), query.to_params()).await?.decode()?;

		Ok(messages.into_iter().map(|message| message.owned_by(account_id)).collect())
	}

	/// Fetches one message.
	pub async fn find(
		client: &Client,
		account_id: &AccountId,
		message_id: &MessageId,
	) -> Result<Self> {
		let message: Self = client
			.get(format!("{}/{message_id}", Self::collection_path(account_id)), Params::new())
			.await?
			.decode()?;

		Ok(message.owned_by(account_id))
	}

	/// Body in `format`, fetched on first use and cached for every format afterwards.
	pub async fn body(&mut self, client: &Client, format: BodyFormat) -> Result<Option<&str>> {
		if self.bodies.is_empty() {
			#[derive(Deserialize)]
			struct BodyPart {
				#[serde(rename = "type")]
				mime_type: String,
				#[serde(default)]
				content: String,
			}

			let parts: Vec<BodyPart> =
				client.get(format!("{}/body", self.path()?), Params::new()).await?.decode()?;

			self.bodies = parts.into_iter().map(|part| (part.mime_type, part.content)).collect();
		}

		Ok(self.bodies.get(format.mime_type()).map(String::as_str))
	}

	/// Message headers, fetched on first use and cached afterwards.
	pub async fn headers(&mut self, client: &Client) -> Result<&Map<String, Value>> {
		if self.headers.is_none() {
			let headers =
				client.get(format!("{}/headers", self.path()?), Params::new()).await?.decode()?;

			self.headers = Some(headers);
		}

		Ok(self.headers.get_or_insert_default())
	}

	/// Current IMAP flags, as returned by the API.
	pub async fn flags(&self, client: &Client) -> Result<Value> {
		client.get(format!("{}/flags", self.path()?), Params::new()).await?.into_json()
	}

	/// Sets or clears one flag.
	pub async fn set_flag(&self, client: &Client, flag: MessageFlag, value: bool) -> Result<bool> {
		let params = Params::new().push(flag.as_str(), value);

		Ok(client.post(format!("{}/flags", self.path()?), params).await?.success())
	}

	/// Marks the message as read.
	pub async fn mark_read(&self, client: &Client) -> Result<bool> {
		self.set_flag(client, MessageFlag::Seen, true).await
	}

	/// Marks the message as unread.
	pub async fn mark_unread(&self, client: &Client) -> Result<bool> {
		self.set_flag(client, MessageFlag::Seen, false).await
	}

	/// Messages in the same thread.
	pub async fn thread(&self, client: &Client) -> Result<Vec<Self>> {
		#[derive(Deserialize)]
		struct Thread {
			#[serde(default)]
			messages: Vec<Message>,
		}

		let account_id = self.require_account()?;
		let thread: Thread =
			client.get(format!("{}/thread", self.path()?), Params::new()).await?.decode()?;

		Ok(thread.messages.into_iter().map(|message| message.owned_by(account_id)).collect())
	}

	/// Copies the message into `folder`, optionally on another source.
	pub async fn copy(
		&self,
		client: &Client,
		folder: &str,
		destination: Option<&SourceLabel>,
	) -> Result<bool> {
		self.copy_or_move(client, folder, destination, false).await
	}

	/// Moves the message into `folder`, optionally on another source.
	pub async fn move_to(
		&self,
		client: &Client,
		folder: &str,
		destination: Option<&SourceLabel>,
	) -> Result<bool> {
		self.copy_or_move(client, folder, destination, true).await
	}

	/// API path of this message.
	pub fn path(&self) -> Result<String> {
		Ok(format!("{}/{}", Self::collection_path(self.require_account()?), self.message_id))
	}

	async fn copy_or_move(
		&self,
		client: &Client,
		folder: &str,
		destination: Option<&SourceLabel>,
		move_message: bool,
	) -> Result<bool> {
		if folder.is_empty() {
			return Err(Error::invalid_argument("destination folder cannot be empty"));
		}

		let params = Params::new()
			.push("dst_folder", folder)
			.push("move", flag(move_message))
			.push_opt("dst_source", destination);

		Ok(client.post(self.path()?, params).await?.success())
	}

	fn collection_path(account_id: &AccountId) -> String {
		format!("{}/messages", Account::path_of(account_id))
	}

	fn owned_by(mut self, account_id: &AccountId) -> Self {
		self.account_id = Some(account_id.clone());

		self
	}

	fn require_account(&self) -> Result<&AccountId> {
		self.account_id.as_ref().ok_or_else(|| Error::invalid_argument("the message has no account"))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn message() -> Message {
		let message: Message = serde_json::from_value(json!({
			"message_id": "4f0f1c533f757e0f3c00000b",
			"subject": "Get Gmail on your mobile phone",
			"date": 1_326_389_107,
			"addresses": {
				"from": { "email": "mail-noreply@google.com", "name": "Gmail Team" },
				"to": [{ "email": "me@example.com", "name": "Me" }]
			},
			"sources": [{ "label": "me::imap", "resource_url": "https://api.context.io/2.0/x" }],
			"folders": ["INBOX"],
			"files": []
		}))
		.expect("Message document should decode.");

		message.owned_by(&AccountId::new("abc").expect("Account id fixture should be valid."))
	}

	#[test]
	fn decodes_message_documents() {
		let message = message();

		assert_eq!(message.subject.as_deref(), Some("Get Gmail on your mobile phone"));
		assert_eq!(
			message.addresses.from.as_ref().and_then(|from| from.name.as_deref()),
			Some("Gmail Team")
		);
		assert_eq!(message.addresses.to.len(), 1);
		assert_eq!(message.date.map(OffsetDateTime::unix_timestamp), Some(1_326_389_107));
		assert_eq!(
			message.path().ok().as_deref(),
			Some("/2.0/accounts/abc/messages/4f0f1c533f757e0f3c00000b")
		);
	}

	#[tokio::test]
	async fn copy_rejects_empty_destination() {
		let err = message()
			.move_to(&Client::default(), "", None)
			.await
			.expect_err("Empty destination folders must be rejected.");

		assert!(matches!(err, Error::InvalidArgument { .. }));
	}

	#[test]
	fn query_encodes_dates_and_flags() {
		let query = MessageQuery {
			date_after: Some(
				OffsetDateTime::from_unix_timestamp(1_300_000_000).expect("Timestamp fixture."),
			),
			include_body: Some(true),
			..Default::default()
		};

		assert_eq!(
			query.to_params().text_pairs(),
			vec![
				("date_after".to_owned(), "1300000000".to_owned()),
				("include_body".to_owned(), "1".to_owned())
			]
		);
	}
}
