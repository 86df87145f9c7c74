//! Request and response stages applied by a [`Connection`](crate::connection::Connection).
//!
//! Request stages mutate a [`PendingRequest`] before it reaches the transport. Response stages
//! consume or transform a [`ResponseEnvelope`] and may turn it into an [`Error`].

// crates.io
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::{ClientErrorKind, ConfigError, DecodeError, ServerErrorKind},
	http::{PendingRequest, RawResponse, RequestBody},
	oauth::OAuthHeader,
	request::ResponseBody,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Response travelling back through the response stages.
#[derive(Clone, Debug)]
pub struct ResponseEnvelope {
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Body, decoded once the JSON stage has run.
	pub body: ResponseBody,
}
impl From<RawResponse> for ResponseEnvelope {
	fn from(response: RawResponse) -> Self {
		Self {
			status: response.status,
			headers: response.headers,
			body: ResponseBody::Raw(response.body),
		}
	}
}

/// Signs `request` with an OAuth 1.0a `Authorization` header.
pub fn sign_request(request: &mut PendingRequest, credentials: &Credentials) -> Result<()> {
	let header = OAuthHeader::new(&request.method, &request.url, &request.params, credentials)
		.to_header_value()?;
	let value = HeaderValue::from_str(&header)
		.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.to_string() })?;

	request.headers.insert(AUTHORIZATION, value);

	Ok(())
}

/// Encodes the body parameters of `request`.
///
/// Text-only parameters become an `application/x-www-form-urlencoded` body; any upload switches
/// to multipart. Empty parameter sets send no body at all.
pub fn encode_body(request: &mut PendingRequest) {
	if request.params.is_empty() {
		request.body = RequestBody::Empty;

		return;
	}
	if request.params.has_file() {
		request.body = RequestBody::Multipart(request.params.clone());

		return;
	}

	let encoded = url::form_urlencoded::Serializer::new(String::new())
		.extend_pairs(request.params.text_pairs())
		.finish();

	request.headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
	request.body = RequestBody::Bytes(encoded.into_bytes());
}

/// Decodes a response body.
///
/// An empty (or whitespace-only) body is [`Value::Null`], the literal texts `true` and `false`
/// are booleans, and everything else goes through the JSON parser.
pub fn parse_json(body: &[u8]) -> Result<Value, serde_json::Error> {
	let text = String::from_utf8_lossy(body);

	match text.trim() {
		"" => Ok(Value::Null),
		"true" => Ok(Value::Bool(true)),
		"false" => Ok(Value::Bool(false)),
		text => serde_json::from_str(text),
	}
}

/// JSON stage: decodes raw bodies in place.
///
/// A successful response that is not valid JSON fails with [`DecodeError::Json`]. Error
/// responses that cannot be decoded keep their raw body so the client-error stage still reports
/// the status.
pub fn parse_json_body(mut response: ResponseEnvelope) -> Result<ResponseEnvelope> {
	let ResponseBody::Raw(bytes) = &response.body else {
		return Ok(response);
	};

	match parse_json(bytes) {
		Ok(value) => response.body = ResponseBody::Json(value),
		Err(source) if response.status.is_success() =>
			return Err(DecodeError::Json { source, status: response.status.as_u16() }.into()),
		Err(_) => {},
	}

	Ok(response)
}

/// Client-error stage: maps 400, 401, 402, 403 and 404 to [`Error::Client`].
pub fn raise_client_error(response: ResponseEnvelope) -> Result<ResponseEnvelope> {
	let Some(kind) = ClientErrorKind::from_status(response.status.as_u16()) else {
		return Ok(response);
	};
	let message = error_message(&response.body);

	Err(Error::Client { kind, message, headers: response.headers })
}

/// Server-error stage: maps 500 and 503 to [`Error::Server`] with their fixed messages.
pub fn raise_server_error(response: ResponseEnvelope) -> Result<ResponseEnvelope> {
	let Some(kind) = ServerErrorKind::from_status(response.status.as_u16()) else {
		return Ok(response);
	};

	Err(Error::Server { kind, message: kind.message().into(), headers: response.headers })
}

/// Extracts `value` from an `{"type": "error", "value": ...}` document, or returns an empty
/// string.
pub fn error_message(body: &ResponseBody) -> String {
	let parsed;
	let document = match body {
		ResponseBody::Json(value) => value,
		ResponseBody::Raw(bytes) => match parse_json(bytes) {
			Ok(value) => {
				parsed = value;

				&parsed
			},
			Err(_) => return String::new(),
		},
	};

	if document.get("type").and_then(Value::as_str) != Some("error") {
		return String::new();
	}

	match document.get("value") {
		Some(Value::String(message)) => message.clone(),
		Some(Value::Null) | None => String::new(),
		Some(other) => other.to_string(),
	}
}
