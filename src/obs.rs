//! Optional observability helpers for API requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `context_io.request` with the `method` and
//!   `path` fields.
//! - Enable `metrics` to increment the `context_io_request_total` counter for every
//!   attempt and its outcome, labeled by `method` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a request helper.
	Attempt,
	/// Response passed every stage.
	Success,
	/// The API answered with a documented 4xx status.
	ClientError,
	/// The API answered with a documented 5xx status.
	ServerError,
	/// Any other failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Classifies the result of a finished request.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => Self::Success,
			Err(Error::Client { .. }) => Self::ClientError,
			Err(Error::Server { .. }) => Self::ServerError,
			Err(_) => Self::Failure,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::ClientError => "client_error",
			RequestOutcome::ServerError => "server_error",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
