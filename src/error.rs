//! Client-level error types shared by the connection pipeline and every resource.

// self
use crate::{_prelude::*, resource::IdentifierError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// HTTP failures are split by status family: [`Error::Client`] for the 4xx codes the API
/// documents and [`Error::Server`] for the 5xx ones. Both keep the response headers so callers
/// can inspect rate-limit or diagnostic headers.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, proxy).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Resource identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),

	/// The API answered with one of the documented 4xx statuses.
	#[error("{kind}: {message}")]
	Client {
		/// Status-specific error kind.
		kind: ClientErrorKind,
		/// Message extracted from the error document, or empty.
		message: String,
		/// Headers of the failing response.
		headers: HeaderMap,
	},
	/// The API answered with one of the documented 5xx statuses.
	#[error("{kind}: {message}")]
	Server {
		/// Status-specific error kind.
		kind: ServerErrorKind,
		/// Fixed message associated with the status.
		message: String,
		/// Headers of the failing response.
		headers: HeaderMap,
	},
	/// Caller supplied an argument the API cannot accept.
	#[error("Invalid argument: {reason}.")]
	InvalidArgument {
		/// Human-readable reason.
		reason: String,
	},
}
impl Error {
	/// Builds an [`Error::InvalidArgument`].
	pub fn invalid_argument(reason: impl Into<String>) -> Self {
		Self::InvalidArgument { reason: reason.into() }
	}

	/// HTTP status carried by API errors.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Client { kind, .. } => Some(kind.status()),
			Self::Server { kind, .. } => Some(kind.status()),
			_ => None,
		}
	}

	/// Response headers carried by API errors.
	pub fn headers(&self) -> Option<&HeaderMap> {
		match self {
			Self::Client { headers, .. } | Self::Server { headers, .. } => Some(headers),
			_ => None,
		}
	}

	/// Message carried by API errors.
	pub fn message(&self) -> Option<&str> {
		match self {
			Self::Client { message, .. } | Self::Server { message, .. } => Some(message),
			_ => None,
		}
	}

	/// Returns `true` for any 4xx API error.
	pub fn is_client_error(&self) -> bool {
		matches!(self, Self::Client { .. })
	}

	/// Returns `true` for any 5xx API error.
	pub fn is_server_error(&self) -> bool {
		matches!(self, Self::Server { .. })
	}
}

/// 4xx statuses documented by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientErrorKind {
	/// 400, required data is missing or malformed.
	BadRequest,
	/// 401, the OAuth signature could not be validated.
	Unauthorized,
	/// 402, the current plan does not allow the call.
	PaymentRequired,
	/// 403, the resource is not accessible with these credentials.
	Forbidden,
	/// 404, the resource does not exist.
	NotFound,
}
impl ClientErrorKind {
	/// Maps a status code to its kind, if documented.
	pub const fn from_status(status: u16) -> Option<Self> {
		match status {
			400 => Some(Self::BadRequest),
			401 => Some(Self::Unauthorized),
			402 => Some(Self::PaymentRequired),
			403 => Some(Self::Forbidden),
			404 => Some(Self::NotFound),
			_ => None,
		}
	}

	/// Status code for this kind.
	pub const fn status(self) -> u16 {
		match self {
			Self::BadRequest => 400,
			Self::Unauthorized => 401,
			Self::PaymentRequired => 402,
			Self::Forbidden => 403,
			Self::NotFound => 404,
		}
	}

	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::BadRequest => "bad request",
			Self::Unauthorized => "unauthorized",
			Self::PaymentRequired => "payment required",
			Self::Forbidden => "forbidden",
			Self::NotFound => "not found",
		}
	}
}
impl Display for ClientErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// 5xx statuses documented by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServerErrorKind {
	/// 500, generic upstream failure.
	InternalServerError,
	/// 503, the backing mail server could not be reached.
	ServiceUnavailable,
}
impl ServerErrorKind {
	/// Maps a status code to its kind, if documented.
	pub const fn from_status(status: u16) -> Option<Self> {
		match status {
			500 => Some(Self::InternalServerError),
			503 => Some(Self::ServiceUnavailable),
			_ => None,
		}
	}

	/// Status code for this kind.
	pub const fn status(self) -> u16 {
		match self {
			Self::InternalServerError => 500,
			Self::ServiceUnavailable => 503,
		}
	}

	/// Fixed message reported for this kind regardless of the response body.
	pub const fn message(self) -> &'static str {
		match self {
			Self::InternalServerError => "Something is technically wrong.",
			Self::ServiceUnavailable => "Could not connect to mail server.",
		}
	}

	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::InternalServerError => "internal server error",
			Self::ServiceUnavailable => "service unavailable",
		}
	}
}
impl Display for ServerErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures raised before a request leaves the process.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Merged connection options do not have the expected shape.
	#[error("Connection options are invalid.")]
	InvalidConnectionOptions {
		/// Structured decoding failure pointing at the offending option.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request path cannot be joined onto the base URL.
	#[error("Request path `{path}` is invalid.")]
	InvalidPath {
		/// Path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured header name or value is not valid HTTP.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name as configured.
		name: String,
	},
	/// The OAuth signing key was rejected by the MAC implementation.
	#[error("OAuth signing key is invalid.")]
	InvalidSigningKey,
	/// A proxy URL was rejected by the transport.
	#[error("Proxy `{proxy}` is invalid.")]
	InvalidProxy {
		/// Proxy URL as configured.
		proxy: String,
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures decoding a response body.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// A successful response carried a body that is not JSON.
	#[error("Response body with status {status} is not valid JSON.")]
	Json {
		/// Underlying parser failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status of the response.
		status: u16,
	},
	/// JSON body does not match the expected resource shape.
	#[error("Response body does not match the expected shape.")]
	Shape {
		/// Structured decoding failure with the JSON path of the mismatch.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Body kind differs from what the caller asked for.
	#[error("Expected a {expected} response body.")]
	UnexpectedBody {
		/// Expected body kind.
		expected: &'static str,
	},
}
