//! Two-legged OAuth 1.0a request signing (HMAC-SHA1).
//!
//! [`OAuthHeader`] builds the `Authorization` header value for one request. The normalized
//! parameter string combines the OAuth protocol parameters, the URL query parameters and the
//! body parameters. When any body parameter is a file upload the body parameters are left out
//! entirely, since multipart payloads are never part of the signature base string.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	error::ConfigError,
	request::Params,
};

/// Everything except RFC 3986 unreserved characters is encoded.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');
const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";

/// OAuth 1.0a header for a single request.
#[derive(Clone)]
pub struct OAuthHeader {
	method: Method,
	url: Url,
	params: Vec<(String, String)>,
	credentials: Credentials,
	nonce: String,
	timestamp: i64,
}
impl OAuthHeader {
	/// Prepares a header with a fresh nonce and the current timestamp.
	pub fn new(method: &Method, url: &Url, body: &Params, credentials: &Credentials) -> Self {
		Self {
			method: method.clone(),
			url: url.clone(),
			params: signature_params(body),
			credentials: credentials.clone(),
			nonce: generate_nonce(),
			timestamp: OffsetDateTime::now_utc().unix_timestamp(),
		}
	}

	/// Pins the nonce.
	pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
		self.nonce = nonce.into();

		self
	}

	/// Pins the timestamp (UNIX seconds).
	pub fn with_timestamp(mut self, timestamp: i64) -> Self {
		self.timestamp = timestamp;

		self
	}

	/// Body parameters taking part in the signature.
	pub fn signature_params(&self) -> &[(String, String)] {
		&self.params
	}

	/// Protocol parameters, excluding the signature.
	pub fn oauth_params(&self) -> BTreeMap<&'static str, String> {
		let mut params = BTreeMap::new();

		params.insert(
			"oauth_consumer_key",
			self.credentials.consumer_key.clone().unwrap_or_default(),
		);
		params.insert("oauth_nonce", self.nonce.clone());
		params.insert("oauth_signature_method", SIGNATURE_METHOD.into());
		params.insert("oauth_timestamp", self.timestamp.to_string());
		params.insert("oauth_version", VERSION.into());

		if let Some(token) = &self.credentials.token {
			params.insert("oauth_token", token.clone());
		}

		params
	}

	/// Scheme, host, non-default port and path, without query or fragment.
	pub fn normalized_url(&self) -> String {
		let mut normalized = format!(
			"{}://{}",
			self.url.scheme().to_ascii_lowercase(),
			self.url.host_str().unwrap_or_default().to_ascii_lowercase()
		);

		if let Some(port) = self.url.port() {
			normalized.push_str(&format!(":{port}"));
		}

		normalized.push_str(self.url.path());

		normalized
	}

	/// Sorted, encoded `key=value` pairs joined with `&`.
	pub fn normalized_params(&self) -> String {
		let oauth = self.oauth_params();
		let mut pairs = oauth
			.iter()
			.map(|(key, value)| (percent_encode(key), percent_encode(value)))
			.chain(
				self.url
					.query_pairs()
					.map(|(key, value)| (percent_encode(&key), percent_encode(&value))),
			)
			.chain(self.params.iter().map(|(key, value)| (percent_encode(key), percent_encode(value))))
			.collect::<Vec<_>>();

		pairs.sort();

		pairs.into_iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&")
	}

	/// `METHOD&url&params`, each component percent-encoded.
	pub fn signature_base_string(&self) -> String {
		format!(
			"{}&{}&{}",
			self.method.as_str().to_ascii_uppercase(),
			percent_encode(&self.normalized_url()),
			percent_encode(&self.normalized_params())
		)
	}

	/// `consumer_secret&token_secret`, each percent-encoded; a missing token secret is empty.
	pub fn signing_key(&self) -> String {
		format!(
			"{}&{}",
			percent_encode(self.credentials.consumer_secret.as_ref().map_or("", Secret::expose)),
			percent_encode(self.credentials.token_secret.as_ref().map_or("", Secret::expose))
		)
	}

	/// Base64-encoded HMAC-SHA1 of the signature base string.
	pub fn signature(&self) -> Result<String, ConfigError> {
		let mut mac = <Hmac<Sha1>>::new_from_slice(self.signing_key().as_bytes())
			.map_err(|_| ConfigError::InvalidSigningKey)?;

		mac.update(self.signature_base_string().as_bytes());

		Ok(STANDARD.encode(mac.finalize().into_bytes()))
	}

	/// `OAuth key="value", ...` with the signature included and keys sorted.
	pub fn to_header_value(&self) -> Result<String, ConfigError> {
		let mut params = self.oauth_params();

		params.insert("oauth_signature", self.signature()?);

		let fields = params
			.iter()
			.map(|(key, value)| format!("{key}=\"{}\"", percent_encode(value)))
			.collect::<Vec<_>>()
			.join(", ");

		Ok(format!("OAuth {fields}"))
	}
}
impl Debug for OAuthHeader {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthHeader")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("params", &self.params)
			.field("consumer_key", &self.credentials.consumer_key)
			.field("nonce", &self.nonce)
			.field("timestamp", &self.timestamp)
			.finish()
	}
}

/// Body parameters that take part in the signature: none at all when any value is an upload.
pub fn signature_params(body: &Params) -> Vec<(String, String)> {
	if body.has_file() { Vec::new() } else { body.text_pairs() }
}

/// Percent-encodes per RFC 3986 as OAuth 1.0a requires.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

fn generate_nonce() -> String {
	let bytes = rand::random::<[u8; 16]>();

	bytes.iter().map(|b| format!("{b:02x}")).collect()
}
