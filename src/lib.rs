//! Async Rust client for the Context.IO 2.0 email-indexing API: OAuth 1.0a request signing, a
//! declarative request/response pipeline with typed errors, and typed resource mappings.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod middleware;
pub mod oauth;
pub mod obs;
pub mod request;
pub mod resource;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by unit and integration tests.

	pub use crate::_prelude::*;

	// crates.io
	use parking_lot::Mutex;
	use serde_json::json;
	// self
	use crate::{
		client::Client,
		config::{Config, ConnectionOptions},
		http::{
			PendingRequest, RawResponse, RequestBody, ReqwestTransport, Transport, TransportFuture,
		},
	};

	/// Builds a client whose base URL points at a mock server such as `httpmock`.
	///
	/// `credentials` sets the consumer key and secret; `None` leaves the client unauthenticated.
	pub fn build_test_client(base_url: &str, credentials: Option<(&str, &str)>) -> Client {
		let config = Config::default().with_connection_option("url", json!(base_url));
		let config = match credentials {
			Some((key, secret)) => config.with_consumer_key(key).with_consumer_secret(secret),
			None => config,
		};

		Client::new(config)
	}

	/// Like [`build_test_client`], with every request also passing through `transport`.
	pub fn build_recording_client(
		base_url: &str,
		credentials: Option<(&str, &str)>,
		transport: &RecordingTransport,
	) -> Client {
		let client = build_test_client(base_url, credentials);
		let adapter: Arc<dyn Transport> = Arc::new(transport.clone());

		client.configure(|config| config.adapter = Some(adapter));

		client
	}

	/// Transport that records every prepared request.
	///
	/// A replying transport answers `200` with a canned body without touching the network; a
	/// forwarding one hands the request on to [`ReqwestTransport`].
	#[derive(Clone, Debug, Default)]
	pub struct RecordingTransport {
		requests: Arc<Mutex<Vec<PendingRequest>>>,
		reply: Option<&'static str>,
		forward: ReqwestTransport,
	}
	impl RecordingTransport {
		/// Answers every request with `200` and `body`.
		pub fn replying(body: &'static str) -> Self {
			Self { reply: Some(body), ..Default::default() }
		}

		/// Forwards every request to the default reqwest transport.
		pub fn forwarding() -> Self {
			Self::default()
		}

		/// Every request recorded so far.
		pub fn requests(&self) -> Vec<PendingRequest> {
			self.requests.lock().clone()
		}

		/// The most recent request.
		pub fn last(&self) -> PendingRequest {
			self.requests.lock().last().cloned().expect("A request should have been recorded.")
		}

		/// URL-encoded bodies of the recorded requests, oldest first.
		pub fn bodies(&self) -> Vec<String> {
			self.requests
				.lock()
				.iter()
				.filter_map(|request| match &request.body {
					RequestBody::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
					_ => None,
				})
				.collect()
		}
	}
	impl Transport for RecordingTransport {
		fn send<'a>(
			&'a self,
			options: &'a ConnectionOptions,
			request: PendingRequest,
		) -> TransportFuture<'a> {
			self.requests.lock().push(request.clone());

			if let Some(body) = self.reply {
				return Box::pin(async move {
					Ok(RawResponse {
						status: StatusCode::OK,
						headers: HeaderMap::new(),
						body: body.as_bytes().to_vec(),
					})
				});
			}

			self.forward.send(options, request)
		}
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use reqwest::{
		Client as ReqwestClient, Error as ReqwestError, Method, StatusCode,
		header::{HeaderMap, HeaderName, HeaderValue},
	};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
