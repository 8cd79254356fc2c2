//! Broker-level error types shared across flows, document calls, and configuration.

// self
use crate::{
	_prelude::*,
	http::{ApiRequest, ApiResponse},
	obs::Operation,
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const REDACTED: &str = "<redacted>";
const SECRET_QUERY_KEYS: [&str; 4] = ["client_secret", "code", "refresh_token", "token"];
const UNREADABLE_RESPONSE: &str = "Unreadable response.";

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, I/O); never retried.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Session store failure.
	#[error(transparent)]
	Session(#[from] crate::session::SessionError),
	/// Provider answered with a status above 300 or without the expected fields.
	#[error(transparent)]
	UnexpectedResponse(#[from] Box<UnexpectedResponse>),
	/// Provider body did not match the shape the operation expects.
	#[error("The {operation} response has an unexpected shape.")]
	Decode {
		/// Operation that received the payload.
		operation: Operation,
		/// Structured decoding failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl From<UnexpectedResponse> for Error {
	fn from(e: UnexpectedResponse) -> Self {
		Self::UnexpectedResponse(Box::new(e))
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Settings could not be loaded from the environment.
	#[error("Settings could not be loaded.")]
	Load(#[from] config::ConfigError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor could not be assembled.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint URL cannot carry extra path segments.
	#[error("Endpoint {url} cannot be extended with path segments.")]
	CannotBeABase {
		/// Offending endpoint URL.
		url: String,
	},
	/// Configured scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Configured document identifier is invalid.
	#[error("Document identifier is invalid.")]
	InvalidDocumentId(#[from] crate::auth::DocumentIdError),
	/// A form field could not be serialized.
	#[error("Form field `{field}` could not be serialized.")]
	FormField {
		/// Field name.
		field: String,
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// HTTP client failed without a structured error.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Diagnostic snapshot of a provider call that did not meet its success criterion.
///
/// Secrets never reach this struct: query values for `client_secret`, `code`,
/// `refresh_token` and `token` are replaced, and so is the `Authorization` header.
#[derive(Debug, ThisError)]
#[error("The {operation} call failed: {message}")]
pub struct UnexpectedResponse {
	/// Operation that issued the request.
	pub operation: Operation,
	/// Provider-supplied message, or a generic fallback.
	pub message: String,
	/// HTTP method that was sent.
	pub method: String,
	/// Target host.
	pub host: String,
	/// Path plus redacted query string.
	pub path: String,
	/// Headers that were sent, with credentials redacted.
	pub sent_headers: Vec<(String, String)>,
	/// Encoded payload that was sent, if any.
	pub sent_payload: Option<String>,
	/// HTTP status returned by the provider.
	pub status: u16,
	/// Headers returned by the provider.
	pub received_headers: Vec<(String, String)>,
	/// Decoded body returned by the provider.
	pub received_body: Value,
}
impl UnexpectedResponse {
	/// Captures the request/response pair; `message` falls back to the provider's own text.
	pub fn new(
		operation: Operation,
		request: &ApiRequest,
		response: &ApiResponse,
		message: Option<String>,
	) -> Self {
		let url = &request.url;
		let sent_headers = request
			.headers
			.iter()
			.map(|(name, value)| {
				let shown = if *name == oauth2::http::header::AUTHORIZATION {
					REDACTED.to_owned()
				} else {
					value.clone()
				};

				(name.as_str().to_owned(), shown)
			})
			.collect();
		let received_headers = response
			.headers
			.iter()
			.map(|(name, value)| {
				(name.as_str().to_owned(), value.to_str().unwrap_or_default().to_owned())
			})
			.collect();

		Self {
			operation,
			message: message.unwrap_or_else(|| UNREADABLE_RESPONSE.to_owned()),
			method: request.method.to_string(),
			host: url.host_str().unwrap_or_default().to_owned(),
			path: redacted_path(url),
			sent_headers,
			sent_payload: request.body.preview(),
			status: response.status,
			received_headers,
			received_body: response.body.clone(),
		}
	}
}

fn redacted_path(url: &Url) -> String {
	let mut path = url.path().to_owned();
	let pairs = url.query_pairs().collect::<Vec<_>>();

	if pairs.is_empty() {
		return path;
	}

	let mut serializer = url::form_urlencoded::Serializer::new(String::new());

	for (key, value) in &pairs {
		if SECRET_QUERY_KEYS.contains(&key.as_ref()) {
			serializer.append_pair(key, REDACTED);
		} else {
			serializer.append_pair(key, value);
		}
	}

	path.push('?');
	path.push_str(&serializer.finish());

	path
}
