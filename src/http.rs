//! Transport primitives for provider and document calls.
//!
//! [`ApiRequest`] makes the body encoding an explicit choice ([`RequestBody`]) and
//! [`ApiResponse`] always carries a decoded JSON body, so flows never guess at payload
//! types. [`ApiHttpClient`] is the only dependency on an HTTP stack: it hands out
//! [`AsyncHttpClient`] handles that execute the encoded request.

// std
use std::ops::Deref;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		HeaderMap, Method,
		header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderName},
	},
};
// self
use crate::{_prelude::*, error::ConfigError};

/// Highest HTTP status that still counts as an accepted provider response.
pub const ACCEPTED_STATUS_CEILING: u16 = 300;

const JSON_MIME: &str = "application/json";
const FORM_MIME: &str = "application/x-www-form-urlencoded";

/// Abstraction over HTTP transports capable of executing broker requests.
///
/// Callers provide an implementation (typically behind `Arc<T>`) and the broker asks
/// for a short-lived [`AsyncHttpClient`] handle per request. Implementations must be
/// `Send + Sync + 'static` so one transport can back many broker clones, and the
/// request futures their handles return must be `Send`.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single request.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next request.
	fn handle(&self) -> Self::Handle;
}

/// Explicit body encoding chosen at each call site.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
	/// No body; parameters travel in the query string.
	#[default]
	Empty,
	/// `application/x-www-form-urlencoded` pairs, encoded in order.
	Form(Vec<(String, String)>),
	/// `application/json` document.
	Json(Value),
}
impl RequestBody {
	/// MIME type announced for the body, if any.
	pub fn content_type(&self) -> Option<&'static str> {
		match self {
			Self::Empty => None,
			Self::Form(_) => Some(FORM_MIME),
			Self::Json(_) => Some(JSON_MIME),
		}
	}

	/// Encodes the body into wire bytes.
	pub fn encode(&self) -> Vec<u8> {
		self.preview().map(String::into_bytes).unwrap_or_default()
	}

	/// Encoded body as text, used for diagnostics.
	pub fn preview(&self) -> Option<String> {
		match self {
			Self::Empty => None,
			Self::Form(pairs) => {
				let mut serializer = url::form_urlencoded::Serializer::new(String::new());

				serializer.extend_pairs(pairs.iter());

				Some(serializer.finish())
			},
			Self::Json(value) => Some(value.to_string()),
		}
	}
}

/// Outgoing request description shared by every broker operation.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Fully-formed target URL including query parameters.
	pub url: Url,
	/// Extra headers; `Accept`, `Content-Type` and `Content-Length` are derived.
	pub headers: Vec<(HeaderName, String)>,
	/// Request body.
	pub body: RequestBody,
}
impl ApiRequest {
	/// Starts a request with the provided method.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: RequestBody::Empty }
	}

	/// Starts a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Starts a `POST` request.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Appends query parameters to the target URL.
	pub fn query<I, K, V>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		self.url.query_pairs_mut().extend_pairs(pairs);

		self
	}

	/// Adds an `Authorization: <scheme> <token>` header.
	pub fn authorized(self, scheme: &str, token: &str) -> Self {
		self.header(AUTHORIZATION, format!("{scheme} {token}"))
	}

	/// Adds an arbitrary header.
	pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}

	/// Replaces the body with form-encoded pairs.
	pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
		self.body = RequestBody::Form(pairs);

		self
	}

	/// Replaces the body with a JSON document.
	pub fn json(mut self, value: Value) -> Self {
		self.body = RequestBody::Json(value);

		self
	}

	/// Encodes the request for an [`AsyncHttpClient`].
	pub fn to_http(&self) -> Result<HttpRequest, ConfigError> {
		let body = self.body.encode();
		let mut builder = oauth2::http::Request::builder()
			.method(self.method.clone())
			.uri(self.url.as_str())
			.header(ACCEPT, JSON_MIME);

		for (name, value) in &self.headers {
			builder = builder.header(name, value.as_str());
		}
		if let Some(content_type) = self.body.content_type() {
			builder = builder.header(CONTENT_TYPE, content_type);
		}
		if self.method != Method::GET {
			builder = builder.header(CONTENT_LENGTH, body.len());
		}

		Ok(builder.body(body)?)
	}
}

/// Provider response with its body decoded as JSON.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: HeaderMap,
	/// Decoded body; `{}` when empty, a JSON string when the payload is not JSON.
	pub body: Value,
}
impl ApiResponse {
	/// Decodes a raw transport response.
	pub fn from_http(response: HttpResponse) -> Self {
		let status = response.status().as_u16();
		let (parts, bytes) = response.into_parts();

		Self { status, headers: parts.headers, body: decode_body(&bytes) }
	}

	/// Returns `true` when the status does not exceed [`ACCEPTED_STATUS_CEILING`].
	pub fn is_accepted(&self) -> bool {
		self.status <= ACCEPTED_STATUS_CEILING
	}

	/// Reads a top-level string field from the body.
	pub fn str_field(&self, key: &str) -> Option<&str> {
		self.body.get(key).and_then(Value::as_str)
	}
}

fn decode_body(bytes: &[u8]) -> Value {
	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Value::Object(Default::default());
	}

	serde_json::from_slice(bytes)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Provider endpoints answer directly, so custom clients passed to
/// [`ReqwestHttpClient::with_client`] should disable redirect following.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects.
	pub fn without_redirects() -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Per-request handle returned by [`ReqwestHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
