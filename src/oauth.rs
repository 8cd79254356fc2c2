//! Internal facade that executes [`ApiRequest`]s and turns provider answers into broker results.

pub use oauth2;

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError, UnexpectedResponse},
	http::{ApiHttpClient, ApiRequest, ApiResponse},
	obs::{self, Operation},
	provider::ProviderStrategy,
};

/// Maps HTTP transport failures into broker [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a broker error.
	fn map_transport_error(&self, operation: Operation, error: HttpClientError<E>) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: Operation,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { message }.into(),
			_ => TransportError::Other { message: format!("{operation} transport failed") }.into(),
		}
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}

/// Sends requests through the configured transport and maps its failures.
pub(crate) struct HttpFacade<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> HttpFacade<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(http_client: Arc<C>, error_mapper: Arc<M>) -> Self {
		Self { http_client, error_mapper }
	}

	/// Executes the request; any HTTP status is returned as a response.
	pub(crate) async fn send(
		&self,
		operation: Operation,
		request: &ApiRequest,
	) -> Result<ApiResponse> {
		let http_request = request.to_http()?;
		let handle = self.http_client.handle();
		let response = handle
			.call(http_request)
			.await
			.map_err(|err| self.error_mapper.map_transport_error(operation, err))?;

		Ok(ApiResponse::from_http(response))
	}

	/// Executes the request and rejects statuses above the accepted ceiling.
	pub(crate) async fn send_accepted(
		&self,
		operation: Operation,
		strategy: &dyn ProviderStrategy,
		request: &ApiRequest,
	) -> Result<ApiResponse> {
		let response = self.send(operation, request).await?;

		if response.is_accepted() {
			Ok(response)
		} else {
			Err(reject(operation, strategy, request, &response))
		}
	}
}

/// Captures the request/response pair as an [`UnexpectedResponse`] and logs it.
pub(crate) fn reject(
	operation: Operation,
	strategy: &dyn ProviderStrategy,
	request: &ApiRequest,
	response: &ApiResponse,
) -> Error {
	let message = strategy.error_message(&response.body);
	let diagnostic = UnexpectedResponse::new(operation, request, response, message);

	obs::unexpected_response(&diagnostic);

	diagnostic.into()
}

/// Decodes a provider body into a typed payload, keeping the failing JSON path.
pub(crate) fn decode<T>(operation: Operation, body: &Value) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(body).map_err(|source| Error::Decode { operation, source })
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::provider::DefaultProviderStrategy;

	#[derive(Debug, Deserialize)]
	struct Payload {
		#[allow(dead_code)]
		expires_in: i64,
	}

	#[test]
	fn decode_reports_the_failing_path() {
		let err = decode::<Payload>(Operation::Refresh, &json!({ "expires_in": "soon" }))
			.expect_err("A string lifetime should fail to decode.");

		match err {
			Error::Decode { operation, source } => {
				assert_eq!(operation, Operation::Refresh);
				assert_eq!(source.path().to_string(), "expires_in");
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn reject_uses_the_provider_message() {
		let url = Url::parse("https://accounts.zoho.com/oauth/user/info")
			.expect("URL fixture should parse.");
		let request = ApiRequest::get(url);
		let response = ApiResponse {
			status: 401,
			headers: Default::default(),
			body: json!({ "message": "Invalid OAuth token." }),
		};
		let err = reject(Operation::LoginIdentity, &DefaultProviderStrategy, &request, &response);

		assert_eq!(err.to_string(), "The login_identity call failed: Invalid OAuth token.");
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn reqwest_mapper_routes_io_and_other_failures_to_transport() {
		let mapper = ReqwestTransportErrorMapper;
		let io = mapper.map_transport_error(
			Operation::Refresh,
			HttpClientError::Io(std::io::Error::other("connection reset")),
		);
		let other = mapper
			.map_transport_error(Operation::Refresh, HttpClientError::Other("closed".into()));

		assert!(matches!(io, Error::Transport(TransportError::Io(_))));
		assert!(matches!(other, Error::Transport(TransportError::Other { .. })));
	}
}
