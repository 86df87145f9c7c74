//! OAuth providers registered for mailbox access (e.g. Google).

// self
use crate::{
	_prelude::*,
	auth::Secret,
	client::Client,
	request::Params,
	resource::{API_VERSION_PREFIX, ProviderKey},
};

/// A registered OAuth provider.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OAuthProvider {
	/// Provider type, e.g. `GMAIL`.
	#[serde(default, rename = "type")]
	pub provider_type: Option<String>,
	/// Consumer key registered with the provider.
	#[serde(rename = "provider_consumer_key")]
	pub consumer_key: ProviderKey,
	/// Consumer secret registered with the provider.
	#[serde(default, rename = "provider_consumer_secret")]
	pub consumer_secret: Option<Secret>,
}
impl OAuthProvider {
	/// Lists the registered providers.
	pub async fn all(client: &Client) -> Result<Vec<Self>> {
		client.get(Self::collection_path(), Params::new()).await?.decode()
	}

	/// Registers a provider; `provider_type` is upper-cased before it is sent.
	pub async fn create(
		client: &Client,
		provider_type: &str,
		consumer_key: &str,
		consumer_secret: &Secret,
	) -> Result<bool> {
		let params = Params::new()
			.push("type", provider_type.to_uppercase())
			.push("provider_consumer_key", consumer_key)
			.push("provider_consumer_secret", consumer_secret.expose());

		Ok(client.post(Self::collection_path(), params).await?.success())
	}

	/// Fetches the provider registered under `consumer_key`.
	pub async fn find(client: &Client, consumer_key: &ProviderKey) -> Result<Self> {
		client
			.get(format!("{}/{consumer_key}", Self::collection_path()), Params::new())
			.await?
			.decode()
	}

	/// Removes the provider.
	pub async fn destroy(&self, client: &Client) -> Result<bool> {
		let path = format!("{}/{}", Self::collection_path(), self.consumer_key);

		Ok(client.delete(path, Params::new()).await?.success())
	}

	fn collection_path() -> String {
		format!("{API_VERSION_PREFIX}/oauth_providers")
	}
}
