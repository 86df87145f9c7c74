//! Client configuration: credentials, transport adapter, proxy, user agent, and connection
//! options.
//!
//! A [`Config`] is an ordinary value owned by the application. [`Client`](crate::client::Client)
//! keeps it behind a lock and snapshots it for every request, so reconfiguring a client never
//! affects a request that is already in flight.
//!
//! Connection options are free-form JSON merged recursively over the defaults produced by
//! [`Config::connection_options`]; the recognised keys are documented on
//! [`ConnectionOptions`].

// crates.io
use serde_json::{Map, Value, json};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	error::ConfigError,
	http::{ReqwestTransport, Transport},
};

/// Base URL every request path is resolved against.
pub const DEFAULT_BASE_URL: &str = "https://api.context.io";
/// Value sent in the `User-Agent` header unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("context-io rust crate ", env!("CARGO_PKG_VERSION"));

/// Settings shared by every request made through a client.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Transport used to perform requests; `None` selects [`ReqwestTransport`].
	#[serde(skip)]
	pub adapter: Option<Arc<dyn Transport>>,
	/// Extra connection options merged recursively over the defaults.
	pub connection_options: Map<String, Value>,
	/// OAuth consumer key issued by Context.IO.
	pub consumer_key: Option<String>,
	/// OAuth consumer secret issued by Context.IO.
	pub consumer_secret: Option<Secret>,
	/// HTTP proxy to route requests through.
	pub proxy: Option<Url>,
	/// Value sent in the `User-Agent` header.
	pub user_agent: String,
}
impl Config {
	/// Applies `f` to the settings and returns them for chaining.
	pub fn configure<F>(&mut self, f: F) -> &mut Self
	where
		F: FnOnce(&mut Self),
	{
		f(self);

		self
	}

	/// Restores every setting to its default value.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	/// Sets the consumer key.
	pub fn with_consumer_key(mut self, key: impl Into<String>) -> Self {
		self.consumer_key = Some(key.into());

		self
	}

	/// Sets the consumer secret.
	pub fn with_consumer_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.consumer_secret = Some(secret.into());

		self
	}

	/// Routes requests through the given proxy.
	pub fn with_proxy(mut self, proxy: Url) -> Self {
		self.proxy = Some(proxy);

		self
	}

	/// Overrides the `User-Agent` header value.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Replaces the transport adapter.
	pub fn with_adapter<T>(mut self, adapter: T) -> Self
	where
		T: Transport,
	{
		self.adapter = Some(Arc::new(adapter));

		self
	}

	/// Sets a single top-level connection option, replacing any previous value for `key`.
	pub fn with_connection_option(mut self, key: impl Into<String>, value: Value) -> Self {
		self.connection_options.insert(key.into(), value);

		self
	}

	/// Returns the signing credentials derived from the current settings.
	pub fn authentication(&self) -> Credentials {
		Credentials::consumer(self.consumer_key.clone(), self.consumer_secret.clone())
	}

	/// Returns `true` iff both the consumer key and secret are configured and non-empty.
	pub fn is_authenticated(&self) -> bool {
		self.authentication().is_complete()
	}

	/// Returns the configured adapter or the default reqwest transport.
	pub fn transport(&self) -> Arc<dyn Transport> {
		match &self.adapter {
			Some(adapter) => Arc::clone(adapter),
			None => Arc::new(ReqwestTransport),
		}
	}

	/// Merges the default connection options with [`Config::connection_options`] and decodes
	/// the result.
	pub fn connection_options(&self) -> Result<ConnectionOptions, ConfigError> {
		let defaults = json!({
			"headers": {
				"Accept": "application/json",
				"User-Agent": self.user_agent,
			},
			"proxy": self.proxy.as_ref().map(Url::as_str),
			"ssl": { "verify": true },
			"url": DEFAULT_BASE_URL,
		});
		let merged = deep_merge(defaults, &Value::Object(self.connection_options.clone()));

		serde_path_to_error::deserialize(merged)
			.map_err(|source| ConfigError::InvalidConnectionOptions { source })
	}
}
impl Default for Config {
	fn default() -> Self {
		Self {
			adapter: None,
			connection_options: Map::new(),
			consumer_key: None,
			consumer_secret: None,
			proxy: None,
			user_agent: DEFAULT_USER_AGENT.into(),
		}
	}
}
impl Debug for Config {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Config")
			.field("adapter_set", &self.adapter.is_some())
			.field("connection_options", &self.connection_options)
			.field("consumer_key", &self.consumer_key)
			.field("consumer_secret_set", &self.consumer_secret.is_some())
			.field("proxy", &self.proxy)
			.field("user_agent", &self.user_agent)
			.finish()
	}
}

/// Connection settings resolved for a single request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ConnectionOptions {
	/// Base URL request paths are joined onto.
	pub url: Url,
	/// Default headers sent with every request.
	#[serde(default)]
	pub headers: BTreeMap<String, String>,
	/// Proxy to route requests through.
	#[serde(default)]
	pub proxy: Option<Url>,
	/// TLS settings.
	#[serde(default)]
	pub ssl: SslOptions,
	/// Whole-request timeout in seconds; the transport default applies when absent.
	#[serde(default)]
	pub timeout: Option<u64>,
	/// Connect timeout in seconds; the transport default applies when absent.
	#[serde(default)]
	pub connect_timeout: Option<u64>,
}

/// TLS settings for a connection.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SslOptions {
	/// Whether server certificates are verified.
	#[serde(default = "SslOptions::default_verify")]
	pub verify: bool,
}
impl SslOptions {
	fn default_verify() -> bool {
		true
	}
}
impl Default for SslOptions {
	fn default() -> Self {
		Self { verify: Self::default_verify() }
	}
}

/// Merges `overrides` into `base` recursively.
///
/// Objects present on both sides are merged key by key; any other value in `overrides`
/// replaces the one in `base`.
pub fn deep_merge(base: Value, overrides: &Value) -> Value {
	match (base, overrides) {
		(Value::Object(mut target), Value::Object(source)) => {
			for (key, value) in source {
				let merged = match target.remove(key) {
					Some(existing) => deep_merge(existing, value),
					None => value.clone(),
				};

				target.insert(key.clone(), merged);
			}

			Value::Object(target)
		},
		(_, value) => value.clone(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn deep_merge_merges_nested_objects() {
		let base = json!({ "foo": "bar", "baz": { "foobar": "hey" } });
		let overrides = json!({ "foo": "foobar", "baz": { "foo": "bar" } });

		assert_eq!(
			deep_merge(base, &overrides),
			json!({ "foo": "foobar", "baz": { "foobar": "hey", "foo": "bar" } })
		);
	}

	#[test]
	fn deep_merge_replaces_non_objects() {
		let base = json!({ "headers": { "Accept": "application/json" } });
		let overrides = json!({ "headers": "none" });

		assert_eq!(deep_merge(base, &overrides), json!({ "headers": "none" }));
	}

	#[test]
	fn defaults_resolve_to_documented_options() {
		let options =
			Config::default().connection_options().expect("Default options should decode.");

		assert_eq!(options.url.as_str(), "https://api.context.io/");
		assert_eq!(options.headers.get("Accept").map(String::as_str), Some("application/json"));
		assert_eq!(options.headers.get("User-Agent").map(String::as_str), Some(DEFAULT_USER_AGENT));
		assert_eq!(options.proxy, None);
		assert!(options.ssl.verify);
		assert_eq!(options.timeout, None);
	}

	#[test]
	fn caller_options_win_and_merge() {
		let config = Config::default()
			.with_user_agent("my-app/1.0")
			.with_connection_option("headers", json!({ "X-Trace": "abc" }))
			.with_connection_option("timeout", json!(30));
		let options = config.connection_options().expect("Merged options should decode.");

		assert_eq!(options.headers.get("Accept").map(String::as_str), Some("application/json"));
		assert_eq!(options.headers.get("User-Agent").map(String::as_str), Some("my-app/1.0"));
		assert_eq!(options.headers.get("X-Trace").map(String::as_str), Some("abc"));
		assert_eq!(options.timeout, Some(30));
	}

	#[test]
	fn invalid_options_report_their_path() {
		let config = Config::default().with_connection_option("ssl", json!({ "verify": "yes" }));
		let err = config.connection_options().expect_err("A string verify flag should fail.");
		let ConfigError::InvalidConnectionOptions { source } = err else {
			panic!("Unexpected error variant: {err:?}.");
		};

		assert_eq!(source.path().to_string(), "ssl.verify");
	}

	#[test]
	fn reset_restores_defaults() {
		let mut config = Config::default();

		config
			.configure(|config| {
				config.consumer_key = Some("K".into());
				config.consumer_secret = Some(Secret::new("S"));
				config.proxy = Some(Url::parse("http://proxy.local:3128").expect("Proxy URL."));
				config.user_agent = "custom".into();
			})
			.connection_options
			.insert("timeout".into(), json!(5));

		assert!(config.is_authenticated());

		config.reset();

		assert_eq!(config.consumer_key, None);
		assert_eq!(config.consumer_secret, None);
		assert_eq!(config.proxy, None);
		assert!(config.connection_options.is_empty());
		assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
		assert!(config.adapter.is_none());
		assert!(!config.is_authenticated());
	}

	#[test]
	fn config_deserializes_with_defaults() {
		let config: Config =
			serde_json::from_str(r#"{ "consumer_key": "K", "consumer_secret": "S" }"#)
				.expect("Config should deserialize from partial JSON.");

		assert!(config.is_authenticated());
		assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
		assert!(!format!("{config:?}").contains("\"S\""));
	}
}
