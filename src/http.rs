//! Transport primitives for API requests.
//!
//! [`Transport`] is the only seam between the connection pipeline and an HTTP stack. The
//! pipeline hands every implementation a fully prepared [`PendingRequest`] (URL, headers, OAuth
//! signature, encoded body) plus the [`ConnectionOptions`] resolved for that call, and expects a
//! [`RawResponse`] back. Status handling and JSON decoding happen afterwards in the response
//! stages, so transports only report what went over the wire.
//!
//! [`ReqwestTransport`] is the default adapter. It builds a fresh [`ReqwestClient`] per call so
//! proxy, TLS and timeout settings always match the configuration snapshot of that request.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::{
	Proxy,
	multipart::{Form, Part},
};
// self
use crate::{
	_prelude::*,
	config::ConnectionOptions,
	error::{ConfigError, TransportError},
	request::{Param, Params},
};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<RawResponse>> + 'a + Send>>;

/// HTTP adapter performing the actual round-trip for a prepared request.
///
/// Implementations must be `Send + Sync + 'static` so a single adapter can be shared by every
/// clone of a [`Client`](crate::client::Client) through its configuration.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` using `options` and resolves once the full body has been read.
	fn send<'a>(
		&'a self,
		options: &'a ConnectionOptions,
		request: PendingRequest,
	) -> TransportFuture<'a>;
}

/// Request as it leaves the pipeline.
#[derive(Clone, Debug)]
pub struct PendingRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL, query string included.
	pub url: Url,
	/// Headers, `Authorization` included when the request was signed.
	pub headers: HeaderMap,
	/// Body parameters before encoding; empty for query-string methods.
	pub params: Params,
	/// Encoded body.
	pub body: RequestBody,
}

/// Encoded request body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestBody {
	/// No body is sent.
	#[default]
	Empty,
	/// Pre-encoded bytes; the matching `Content-Type` header is already set.
	Bytes(Vec<u8>),
	/// Multipart form built by the transport because at least one parameter is a file.
	Multipart(Params),
}

/// Response as received from the transport.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Undecoded body.
	pub body: Vec<u8>,
}

/// Default adapter backed by [`reqwest`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ReqwestTransport;
impl ReqwestTransport {
	/// Builds a reqwest client honoring proxy, TLS and timeout options.
	pub fn build_client(options: &ConnectionOptions) -> Result<ReqwestClient, ConfigError> {
		let mut builder = ReqwestClient::builder().danger_accept_invalid_certs(!options.ssl.verify);

		if let Some(proxy) = &options.proxy {
			let proxy = Proxy::all(proxy.as_str()).map_err(|e| ConfigError::InvalidProxy {
				proxy: proxy.to_string(),
				source: Box::new(e),
			})?;

			builder = builder.proxy(proxy);
		}
		if let Some(secs) = options.timeout {
			builder = builder.timeout(StdDuration::from_secs(secs));
		}
		if let Some(secs) = options.connect_timeout {
			builder = builder.connect_timeout(StdDuration::from_secs(secs));
		}

		builder.build().map_err(ConfigError::http_client_build)
	}
}
impl Transport for ReqwestTransport {
	fn send<'a>(
		&'a self,
		options: &'a ConnectionOptions,
		request: PendingRequest,
	) -> TransportFuture<'a> {
		Box::pin(async move {
			let client = Self::build_client(options)?;
			let PendingRequest { method, url, headers, body, .. } = request;
			let builder = client.request(method, url).headers(headers);
			let builder = match body {
				RequestBody::Empty => builder,
				RequestBody::Bytes(bytes) => builder.body(bytes),
				RequestBody::Multipart(params) => builder.multipart(multipart_form(params)?),
			};
			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(RawResponse { status, headers, body })
		})
	}
}

fn multipart_form(params: Params) -> Result<Form> {
	let mut form = Form::new();

	for (key, value) in params {
		form = match value {
			Param::Text(text) => form.text(key, text),
			Param::File(file) => {
				let part = Part::bytes(file.bytes)
					.file_name(file.file_name)
					.mime_str(&file.content_type)
					.map_err(|_| {
						Error::invalid_argument(format!(
							"file parameter `{key}` has an invalid content type `{}`",
							file.content_type
						))
					})?;

				form.part(key, part)
			},
		};
	}

	Ok(form)
}
