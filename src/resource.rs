//! Typed mappings of the API resources.
//!
//! Every resource decodes its JSON through explicit serde field mappings. Timestamps arrive as
//! UNIX seconds and are converted with [`epoch`] (required) or [`epoch_or_none`] (where `0` and
//! `null` mean "absent").

pub mod account;
pub mod connect_token;
pub mod contact;
pub mod discovery;
pub mod file;
pub mod folder;
pub mod message;
pub mod oauth_provider;
pub mod source;

mod id;

pub use account::*;
pub use connect_token::*;
pub use contact::*;
pub use discovery::*;
pub use file::*;
pub use folder::*;
pub use id::*;
pub use message::*;
pub use oauth_provider::*;
pub use source::*;

// crates.io
use serde::{Deserializer, de::Error as _};
use serde_json::Value;
// self
use crate::{_prelude::*, oauth::percent_encode, request::Param};

/// Path prefix shared by every resource.
pub const API_VERSION_PREFIX: &str = "/2.0";

/// Email address participating in a message or file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
	/// Email address.
	#[serde(default)]
	pub email: Option<String>,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
}

/// Sender and recipients of a message or file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Addresses {
	/// Sender.
	#[serde(default)]
	pub from: Option<Address>,
	/// Direct recipients.
	#[serde(default, deserialize_with = "one_or_many")]
	pub to: Vec<Address>,
	/// Carbon-copy recipients.
	#[serde(default, deserialize_with = "one_or_many")]
	pub cc: Vec<Address>,
	/// Blind carbon-copy recipients.
	#[serde(default, deserialize_with = "one_or_many")]
	pub bcc: Vec<Address>,
}

/// Source status filter understood by the account and source listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceStatus {
	/// Stored credentials were rejected.
	InvalidCredentials,
	/// The mail server could not be reached.
	ConnectionImpossible,
	/// The source cannot see the "All Mail" folder.
	NoAccessToAllMail,
	/// Syncing normally.
	Ok,
	/// Temporarily disabled.
	TempDisabled,
	/// Disabled.
	Disabled,
}
impl SourceStatus {
	/// Upper-cased label sent in the `status` parameter.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::InvalidCredentials => "INVALID_CREDENTIALS",
			Self::ConnectionImpossible => "CONNECTION_IMPOSSIBLE",
			Self::NoAccessToAllMail => "NO_ACCESS_TO_ALL_MAIL",
			Self::Ok => "OK",
			Self::TempDisabled => "TEMP_DISABLED",
			Self::Disabled => "DISABLED",
		}
	}
}
impl Display for SourceStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<SourceStatus> for Param {
	fn from(value: SourceStatus) -> Self {
		Param::Text(value.as_str().into())
	}
}

/// Encodes a boolean as the `1`/`0` flag the API expects in filters.
pub fn flag(value: bool) -> &'static str {
	if value { "1" } else { "0" }
}

/// Percent-encodes a caller-supplied path segment such as a folder name or contact email.
///
/// `what` names the value in the error. Empty values and `.`/`..` are rejected because URL
/// resolution would drop them or climb to the parent resource, even when percent-encoded.
pub fn path_segment(what: &str, value: &str) -> Result<String> {
	if value.is_empty() {
		return Err(Error::invalid_argument(format!("{what} cannot be empty")));
	}
	if matches!(value, "." | "..") {
		return Err(Error::invalid_argument(format!("{what} cannot be a dot segment")));
	}

	Ok(percent_encode(value))
}

/// Converts a JSON timestamp (integer, float or numeric string) to a date-time.
///
/// `0` and `null` yield `None`.
pub fn timestamp_from_value(value: &Value) -> Result<Option<OffsetDateTime>, String> {
	let secs = match value {
		Value::Null => return Ok(None),
		Value::Number(number) => number
			.as_i64()
			.or_else(|| number.as_f64().map(|secs| secs as i64))
			.ok_or_else(|| format!("timestamp `{number}` is out of range"))?,
		Value::String(text) if text.is_empty() => return Ok(None),
		Value::String(text) =>
			text.trim().parse::<i64>().map_err(|_| format!("timestamp `{text}` is not numeric"))?,
		other => return Err(format!("timestamp has unexpected type: {other}")),
	};

	if secs == 0 {
		return Ok(None);
	}

	OffsetDateTime::from_unix_timestamp(secs).map(Some).map_err(|e| e.to_string())
}

/// Deserializes a required UNIX timestamp.
pub fn epoch<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;

	match value {
		Value::Number(ref number) if number.as_i64() == Some(0) => Ok(OffsetDateTime::UNIX_EPOCH),
		_ => timestamp_from_value(&value)
			.map_err(D::Error::custom)?
			.ok_or_else(|| D::Error::custom("timestamp is missing")),
	}
}

/// Deserializes an optional UNIX timestamp where `0` and `null` mean absent.
pub fn epoch_or_none<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;

	timestamp_from_value(&value).map_err(D::Error::custom)
}

/// Deserializes a port given as a number, a numeric string or an empty string.
pub fn lenient_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
	D: Deserializer<'de>,
{
	match Value::deserialize(deserializer)? {
		Value::Null => Ok(None),
		Value::Number(number) => number
			.as_u64()
			.and_then(|port| u16::try_from(port).ok())
			.map(Some)
			.ok_or_else(|| D::Error::custom(format!("port `{number}` is out of range"))),
		Value::String(text) if text.trim().is_empty() => Ok(None),
		Value::String(text) => text
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| D::Error::custom(format!("port `{text}` is not numeric"))),
		other => Err(D::Error::custom(format!("port has unexpected type: {other}"))),
	}
}

/// Deserializes a value the API sends either as a string or as a number.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	match Value::deserialize(deserializer)? {
		Value::Null => Ok(None),
		Value::String(text) => Ok(Some(text)),
		Value::Number(number) => Ok(Some(number.to_string())),
		other => Err(D::Error::custom(format!("expected a string or number, got {other}"))),
	}
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: serde::de::DeserializeOwned,
{
	match Value::deserialize(deserializer)? {
		Value::Null => Ok(Vec::new()),
		Value::Array(items) => items
			.into_iter()
			.map(|item| serde_json::from_value(item).map_err(D::Error::custom))
			.collect(),
		item => serde_json::from_value(item).map(|item| vec![item]).map_err(D::Error::custom),
	}
}
