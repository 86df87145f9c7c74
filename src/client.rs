//! The API client: shared configuration plus the verb helpers every resource goes through.

// self
use crate::{
	_prelude::*,
	auth::Credentials,
	config::Config,
	connection::Connection,
	obs::{self, RequestOutcome, RequestSpan},
	request::{Params, Request, ResponseBody},
};

/// Context.IO API client.
///
/// Clones share one configuration. Every request takes a snapshot of it, so calling
/// [`Client::configure`] or [`Client::reset`] while a request is in flight only affects later
/// requests.
#[derive(Clone, Debug, Default)]
pub struct Client {
	config: Arc<RwLock<Config>>,
}
impl Client {
	/// Creates a client owning `config`.
	pub fn new(config: Config) -> Self {
		Self { config: Arc::new(RwLock::new(config)) }
	}

	/// Applies `f` to the shared settings and returns the updated settings.
	pub fn configure<F>(&self, f: F) -> Config
	where
		F: FnOnce(&mut Config),
	{
		let mut config = self.config.write();

		config.configure(f).clone()
	}

	/// Restores every setting to its default value.
	pub fn reset(&self) {
		self.config.write().reset();
	}

	/// Snapshot of the current settings.
	pub fn config(&self) -> Config {
		self.config.read().clone()
	}

	/// Signing credentials derived from the current settings.
	pub fn authentication(&self) -> Credentials {
		self.config.read().authentication()
	}

	/// Returns `true` iff both the consumer key and secret are configured and non-empty.
	pub fn is_authenticated(&self) -> bool {
		self.config.read().is_authenticated()
	}

	/// Builds a connection for one request; `raw` skips JSON decoding.
	pub fn connection(&self, raw: bool) -> Result<Connection> {
		let config = self.config();

		Ok(Connection::new(&config, raw)?)
	}

	/// Performs a GET request; `params` go into the query string.
	pub async fn get(&self, path: impl Into<String>, params: Params) -> Result<ResponseBody> {
		self.request(Request::new(Method::GET, path, params)).await
	}

	/// Performs a POST request; `params` go into the body.
	pub async fn post(&self, path: impl Into<String>, params: Params) -> Result<ResponseBody> {
		self.request(Request::new(Method::POST, path, params)).await
	}

	/// Performs a PUT request; `params` go into the body like [`Client::post`].
	pub async fn put(&self, path: impl Into<String>, params: Params) -> Result<ResponseBody> {
		self.request(Request::new(Method::PUT, path, params)).await
	}

	/// Performs a DELETE request; `params` go into the query string.
	pub async fn delete(&self, path: impl Into<String>, params: Params) -> Result<ResponseBody> {
		self.request(Request::new(Method::DELETE, path, params)).await
	}

	/// Sends a prepared [`Request`] through a fresh connection.
	pub async fn request(&self, request: Request) -> Result<ResponseBody> {
		let method = request.method.clone();
		let span = RequestSpan::new(&method, &request.path);

		obs::record_request_outcome(&method, RequestOutcome::Attempt);

		let result = span
			.instrument(async move {
				let connection = self.connection(request.raw)?;

				connection.call(request).await
			})
			.await;

		obs::record_request_outcome(&method, RequestOutcome::of(&result));

		result
	}
}
