//! Request values: parameters, file parts, the per-call [`Request`] and the parsed
//! [`ResponseBody`].

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{_prelude::*, error::DecodeError};

/// Pseudo-parameter selecting raw (non-JSON) response mode; never sent to the API.
pub const RAW_PARAM: &str = "raw";

/// File uploaded as part of a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
	/// File name reported to the server.
	pub file_name: String,
	/// MIME type of the content.
	pub content_type: String,
	/// File content.
	pub bytes: Vec<u8>,
}
impl FilePart {
	/// Creates a new file part.
	pub fn new(
		file_name: impl Into<String>,
		content_type: impl Into<String>,
		bytes: impl Into<Vec<u8>>,
	) -> Self {
		Self { file_name: file_name.into(), content_type: content_type.into(), bytes: bytes.into() }
	}
}
impl Debug for FilePart {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FilePart")
			.field("file_name", &self.file_name)
			.field("content_type", &self.content_type)
			.field("len", &self.bytes.len())
			.finish()
	}
}

/// A single request parameter value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Param {
	/// Plain text value.
	Text(String),
	/// Binary upload.
	File(FilePart),
}
impl Param {
	/// Content type of upload values; `None` for text.
	pub fn content_type(&self) -> Option<&str> {
		match self {
			Self::Text(_) => None,
			Self::File(file) => Some(&file.content_type),
		}
	}

	/// Text of plain values; `None` for uploads.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			Self::File(_) => None,
		}
	}
}
impl From<String> for Param {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<&String> for Param {
	fn from(value: &String) -> Self {
		Self::Text(value.clone())
	}
}
impl From<&str> for Param {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}
impl From<bool> for Param {
	fn from(value: bool) -> Self {
		Self::Text(if value { "true" } else { "false" }.into())
	}
}
impl From<FilePart> for Param {
	fn from(value: FilePart) -> Self {
		Self::File(value)
	}
}
macro_rules! impl_param_from_int {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Param {
				fn from(value: $ty) -> Self {
					Self::Text(value.to_string())
				}
			}
		)*
	};
}
impl_param_from_int!(u8, u16, u32, u64, usize, i32, i64);

/// Ordered parameter list for a request.
///
/// Keys may repeat; [`Params::insert`] replaces instead of appending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, Param)>);
impl Params {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a parameter.
	pub fn push(mut self, key: impl Into<String>, value: impl Into<Param>) -> Self {
		self.0.push((key.into(), value.into()));

		self
	}

	/// Appends a parameter when `value` is present.
	pub fn push_opt<V>(self, key: impl Into<String>, value: Option<V>) -> Self
	where
		V: Into<Param>,
	{
		match value {
			Some(value) => self.push(key, value),
			None => self,
		}
	}

	/// Marks the request as raw: the response body is returned undecoded.
	pub fn raw(self) -> Self {
		self.push(RAW_PARAM, true)
	}

	/// Sets `key` to `value`, dropping any previous values for `key`.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Param>) {
		let key = key.into();

		self.0.retain(|(existing, _)| existing != &key);
		self.0.push((key, value.into()));
	}

	/// Returns the first value for `key`.
	pub fn get(&self, key: &str) -> Option<&Param> {
		self.0.iter().find(|(existing, _)| existing == key).map(|(_, value)| value)
	}

	/// Removes every value for `key`, returning the first one.
	pub fn remove(&mut self, key: &str) -> Option<Param> {
		let position = self.0.iter().position(|(existing, _)| existing == key)?;
		let (_, first) = self.0.remove(position);

		self.0.retain(|(existing, _)| existing != key);

		Some(first)
	}

	/// Removes the [`RAW_PARAM`] pseudo-parameter and reports whether it was truthy.
	pub fn take_raw_flag(&mut self) -> bool {
		matches!(self.remove(RAW_PARAM), Some(Param::Text(value)) if value == "true" || value == "1")
	}

	/// Returns `true` when any value is a file upload.
	pub fn has_file(&self) -> bool {
		self.0.iter().any(|(_, value)| value.content_type().is_some())
	}

	/// Returns `true` when no parameter is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Iterates over the parameters in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Key/value pairs of the text parameters.
	pub fn text_pairs(&self) -> Vec<(String, String)> {
		self.0
			.iter()
			.filter_map(|(key, value)| value.as_text().map(|text| (key.clone(), text.to_owned())))
			.collect()
	}
}
impl IntoIterator for Params {
	type IntoIter = std::vec::IntoIter<(String, Param)>;
	type Item = (String, Param);

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
impl<K, V> FromIterator<(K, V)> for Params
where
	K: Into<String>,
	V: Into<Param>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

/// A single API call before it enters the pipeline.
#[derive(Clone, Debug)]
pub struct Request {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the base URL, e.g. `/2.0/accounts`.
	pub path: String,
	/// Query parameters (GET, DELETE) or body parameters (POST, PUT).
	pub params: Params,
	/// Skip JSON decoding and return the body as bytes.
	pub raw: bool,
}
impl Request {
	/// Creates a request, extracting the [`RAW_PARAM`] pseudo-parameter from `params`.
	pub fn new(method: Method, path: impl Into<String>, mut params: Params) -> Self {
		let raw = params.take_raw_flag();

		Self { method, path: path.into(), params, raw }
	}

	/// Returns `true` when parameters travel in the body rather than the query string.
	///
	/// PUT is treated like POST.
	pub fn sends_body(&self) -> bool {
		self.method == Method::POST || self.method == Method::PUT
	}
}

/// Response body returned by the request helpers.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
	/// Decoded JSON; an empty body decodes to [`Value::Null`].
	Json(Value),
	/// Undecoded bytes, returned in raw mode.
	Raw(Vec<u8>),
}
impl ResponseBody {
	/// Borrows the decoded JSON, if any.
	pub fn as_json(&self) -> Option<&Value> {
		match self {
			Self::Json(value) => Some(value),
			Self::Raw(_) => None,
		}
	}

	/// Returns the decoded JSON or fails for raw bodies.
	pub fn into_json(self) -> Result<Value> {
		match self {
			Self::Json(value) => Ok(value),
			Self::Raw(_) => Err(DecodeError::UnexpectedBody { expected: "JSON" }.into()),
		}
	}

	/// Returns the raw bytes or fails for decoded bodies.
	pub fn into_bytes(self) -> Result<Vec<u8>> {
		match self {
			Self::Raw(bytes) => Ok(bytes),
			Self::Json(_) => Err(DecodeError::UnexpectedBody { expected: "raw" }.into()),
		}
	}

	/// Decodes the JSON body into `T`, reporting the path of any mismatch.
	pub fn decode<T>(self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let value = self.into_json()?;

		serde_path_to_error::deserialize(value)
			.map_err(|source| DecodeError::Shape { source }.into())
	}

	/// Reads the `success` flag of mutating calls; anything but `true` counts as failure.
	pub fn success(&self) -> bool {
		self.as_json().and_then(|value| value.get("success")).and_then(Value::as_bool).unwrap_or(false)
	}
}
