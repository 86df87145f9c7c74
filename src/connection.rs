//! Per-call connection factory and the declarative stage pipeline.
//!
//! A [`Connection`] is built fresh for every request from a configuration snapshot. The stages it
//! runs come from [`STAGE_RULES`], a static table of `{stage, order, predicate}` rows evaluated
//! against a [`StageContext`]. Request stages run in table order before dispatch; response
//! stages unwind innermost-first once the transport returns, so the stage closest to the
//! transport sees the response first.

// self
use crate::{
	_prelude::*,
	auth::Credentials,
	config::{Config, ConnectionOptions},
	error::ConfigError,
	http::{PendingRequest, RawResponse, RequestBody, Transport},
	middleware::{self, ResponseEnvelope},
	request::{Params, Request, ResponseBody},
};

/// Stages a connection may install, listed outermost first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Adds the OAuth 1.0a `Authorization` header.
	OAuthSign,
	/// Encodes body parameters.
	UrlEncode,
	/// Maps documented 4xx statuses to [`Error::Client`].
	RaiseClientError,
	/// Decodes JSON bodies.
	ParseJson,
	/// Maps documented 5xx statuses to [`Error::Server`].
	RaiseServerError,
}
impl Stage {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::OAuthSign => "oauth_sign",
			Self::UrlEncode => "url_encode",
			Self::RaiseClientError => "raise_client_error",
			Self::ParseJson => "parse_json",
			Self::RaiseServerError => "raise_server_error",
		}
	}

	/// Returns `true` for stages acting on the outgoing request.
	pub const fn is_request_stage(self) -> bool {
		matches!(self, Self::OAuthSign | Self::UrlEncode)
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Facts the stage predicates are evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageContext {
	/// Both consumer key and secret are configured.
	pub authenticated: bool,
	/// The caller asked for the undecoded body.
	pub raw: bool,
}

/// One row of the stage table.
#[derive(Clone, Copy, Debug)]
pub struct StageRule {
	/// Stage installed by this row.
	pub stage: Stage,
	/// Position in the pipeline, ascending from the outermost stage.
	pub order: u8,
	/// Whether the stage applies to a given call.
	pub applies: fn(StageContext) -> bool,
}

/// Declarative stage table.
pub const STAGE_RULES: &[StageRule] = &[
	StageRule { stage: Stage::OAuthSign, order: 1, applies: when_authenticated },
	StageRule { stage: Stage::UrlEncode, order: 2, applies: always },
	StageRule { stage: Stage::RaiseClientError, order: 3, applies: always },
	StageRule { stage: Stage::ParseJson, order: 4, applies: unless_raw },
	StageRule { stage: Stage::RaiseServerError, order: 5, applies: always },
];

fn always(_: StageContext) -> bool {
	true
}

fn when_authenticated(ctx: StageContext) -> bool {
	ctx.authenticated
}

fn unless_raw(ctx: StageContext) -> bool {
	!ctx.raw
}

/// Evaluates [`STAGE_RULES`] for `ctx` and returns the stages sorted by order.
pub fn assemble_stages(ctx: StageContext) -> Vec<Stage> {
	let mut rules = STAGE_RULES.iter().filter(|rule| (rule.applies)(ctx)).collect::<Vec<_>>();

	rules.sort_by_key(|rule| rule.order);

	rules.into_iter().map(|rule| rule.stage).collect()
}

/// Connection configured for a single request.
#[derive(Clone)]
pub struct Connection {
	options: ConnectionOptions,
	stages: Vec<Stage>,
	credentials: Credentials,
	transport: Arc<dyn Transport>,
}
impl Connection {
	/// Builds a connection from a configuration snapshot.
	pub fn new(config: &Config, raw: bool) -> Result<Self, ConfigError> {
		let options = config.connection_options()?;
		let credentials = config.authentication();
		let stages =
			assemble_stages(StageContext { authenticated: credentials.is_complete(), raw });

		Ok(Self { options, stages, credentials, transport: config.transport() })
	}

	/// Stages installed on this connection, outermost first.
	pub fn stages(&self) -> &[Stage] {
		&self.stages
	}

	/// Merged connection options.
	pub fn options(&self) -> &ConnectionOptions {
		&self.options
	}

	/// Returns `true` when the OAuth stage is installed.
	pub fn is_signed(&self) -> bool {
		self.stages.contains(&Stage::OAuthSign)
	}

	/// Resolves the URL and default headers, then runs the request stages.
	pub fn prepare(&self, request: Request) -> Result<PendingRequest> {
		let sends_body = request.sends_body();
		let Request { method, path, params, .. } = request;
		let mut url = self
			.options
			.url
			.join(&path)
			.map_err(|source| ConfigError::InvalidPath { path: path.clone(), source })?;
		let mut headers = HeaderMap::new();

		for (name, value) in &self.options.headers {
			let invalid = || ConfigError::InvalidHeader { name: name.clone() };
			let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
			let value = HeaderValue::from_str(value).map_err(|_| invalid())?;

			headers.insert(name, value);
		}

		let params = if sends_body {
			params
		} else {
			if !params.is_empty() {
				url.query_pairs_mut().extend_pairs(params.text_pairs());
			}

			Params::new()
		};
		let mut pending = PendingRequest { method, url, headers, params, body: RequestBody::Empty };

		for stage in self.stages.iter().copied().filter(|stage| stage.is_request_stage()) {
			match stage {
				Stage::OAuthSign => middleware::sign_request(&mut pending, &self.credentials)?,
				Stage::UrlEncode => middleware::encode_body(&mut pending),
				_ => {},
			}
		}

		Ok(pending)
	}

	/// Runs the response stages, innermost first.
	pub fn finish(&self, response: RawResponse) -> Result<ResponseEnvelope> {
		let mut envelope = ResponseEnvelope::from(response);

		for stage in self.stages.iter().rev().copied().filter(|stage| !stage.is_request_stage()) {
			envelope = match stage {
				Stage::RaiseServerError => middleware::raise_server_error(envelope)?,
				Stage::ParseJson => middleware::parse_json_body(envelope)?,
				Stage::RaiseClientError => middleware::raise_client_error(envelope)?,
				_ => envelope,
			};
		}

		Ok(envelope)
	}

	/// Sends `request` through the full pipeline and returns the processed body.
	pub async fn call(&self, request: Request) -> Result<ResponseBody> {
		let pending = self.prepare(request)?;
		let response = self.transport.send(&self.options, pending).await?;

		Ok(self.finish(response)?.body)
	}
}
impl Debug for Connection {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connection")
			.field("options", &self.options)
			.field("stages", &self.stages)
			.field("consumer_key", &self.credentials.consumer_key)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
	use serde_json::json;
	// self
	use super::*;
	use crate::error::ClientErrorKind;

	fn config(authenticated: bool) -> Config {
		let config = Config::default();

		if authenticated { config.with_consumer_key("K").with_consumer_secret("S") } else { config }
	}

	fn raw_response(status: u16, body: &str) -> RawResponse {
		RawResponse {
			status: StatusCode::from_u16(status).expect("Test status should be valid."),
			headers: HeaderMap::new(),
			body: body.as_bytes().to_vec(),
		}
	}

	#[test]
	fn stage_table_follows_context() {
		let all = assemble_stages(StageContext { authenticated: true, raw: false });

		assert_eq!(
			all,
			[
				Stage::OAuthSign,
				Stage::UrlEncode,
				Stage::RaiseClientError,
				Stage::ParseJson,
				Stage::RaiseServerError
			]
		);

		let anonymous_raw = assemble_stages(StageContext { authenticated: false, raw: true });

		assert_eq!(
			anonymous_raw,
			[Stage::UrlEncode, Stage::RaiseClientError, Stage::RaiseServerError]
		);
	}

	#[test]
	fn connection_installs_oauth_only_when_authenticated() {
		let signed = Connection::new(&config(true), false).expect("Connection should build.");
		let unsigned = Connection::new(&config(false), false).expect("Connection should build.");

		assert!(signed.is_signed());
		assert!(!unsigned.is_signed());
	}

	#[test]
	fn query_methods_put_params_in_url() {
		let connection = Connection::new(&config(true), false).expect("Connection should build.");
		let pending = connection
			.prepare(Request::new(
				Method::GET,
				"/2.0/accounts",
				Params::new().push("email", "me@example.com").push("limit", 5u32),
			))
			.expect("GET should prepare.");

		assert_eq!(
			pending.url.as_str(),
			"https://api.context.io/2.0/accounts?email=me%40example.com&limit=5"
		);
		assert_eq!(pending.body, RequestBody::Empty);
		assert!(pending.params.is_empty());
		assert!(pending.headers.contains_key(AUTHORIZATION));
		assert_eq!(
			pending.headers.get("accept"),
			Some(&HeaderValue::from_static("application/json"))
		);
	}

	#[test]
	fn body_methods_encode_params_and_skip_empty_bodies() {
		let connection = Connection::new(&config(false), false).expect("Connection should build.");

		for method in [Method::POST, Method::PUT] {
			let pending = connection
				.prepare(Request::new(method.clone(), "/2.0/accounts", Params::new().push("a", "b")))
				.expect("Body request should prepare.");

			assert_eq!(pending.url.query(), None);
			assert_eq!(pending.body, RequestBody::Bytes(b"a=b".to_vec()));
			assert!(pending.headers.contains_key(CONTENT_TYPE));
			assert!(!pending.headers.contains_key(AUTHORIZATION));

			let empty = connection
				.prepare(Request::new(method, "/2.0/accounts", Params::new()))
				.expect("Empty body request should prepare.");

			assert_eq!(empty.body, RequestBody::Empty);
			assert!(!empty.headers.contains_key(CONTENT_TYPE));
		}
	}

	#[test]
	fn custom_base_url_and_headers_apply() {
		let config = config(false)
			.with_connection_option("url", json!("http://127.0.0.1:9999"))
			.with_connection_option("headers", json!({ "X-Trace": "abc" }));
		let connection = Connection::new(&config, false).expect("Connection should build.");
		let pending = connection
			.prepare(Request::new(Method::DELETE, "/2.0/oauth_providers/key", Params::new()))
			.expect("DELETE should prepare.");

		assert_eq!(pending.url.as_str(), "http://127.0.0.1:9999/2.0/oauth_providers/key");
		assert_eq!(pending.headers.get("x-trace"), Some(&HeaderValue::from_static("abc")));
	}

	#[test]
	fn response_stages_map_errors_and_parse_json() {
		let connection = Connection::new(&config(false), false).expect("Connection should build.");
		let ok = connection.finish(raw_response(200, "true")).expect("2xx should pass.");

		assert_eq!(ok.body, ResponseBody::Json(json!(true)));

		let err = connection
			.finish(raw_response(404, r#"{"type":"error","value":"not found"}"#))
			.expect_err("404 should raise.");

		assert!(matches!(err, Error::Client { kind: ClientErrorKind::NotFound, .. }));
		assert_eq!(err.message(), Some("not found"));

		let err = connection.finish(raw_response(503, "<html>")).expect_err("503 should raise.");

		assert_eq!(err.message(), Some("Could not connect to mail server."));
	}

	#[test]
	fn raw_connections_keep_bytes() {
		let connection = Connection::new(&config(false), true).expect("Connection should build.");
		let ok = connection.finish(raw_response(200, "%PDF-1.4")).expect("Raw 2xx should pass.");

		assert_eq!(ok.body, ResponseBody::Raw(b"%PDF-1.4".to_vec()));

		let err = connection
			.finish(raw_response(403, r#"{"type":"error","value":"denied"}"#))
			.expect_err("403 should raise in raw mode too.");

		assert_eq!(err.message(), Some("denied"));
	}
}
