//! Shared helpers for token endpoint calls (query parameters, response shape, lifetimes).

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	error::UnexpectedResponse,
	flows::Broker,
	http::{ApiHttpClient, ApiRequest, ApiResponse},
	oauth::TransportErrorMapper,
	obs::{self, Operation},
	provider::GrantType,
};

/// Fields the broker reads from a token endpoint response.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct TokenEndpointResponse {
	#[serde(default)]
	pub(crate) access_token: Option<String>,
	#[serde(default)]
	pub(crate) refresh_token: Option<String>,
	#[serde(default)]
	pub(crate) expires_in: Option<i64>,
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the token endpoint request for a grant; parameters travel in the query string.
	pub(crate) fn token_request(
		&self,
		grant: GrantType,
		extra: impl IntoIterator<Item = (&'static str, String)>,
	) -> ApiRequest {
		let mut params = BTreeMap::from([
			("client_id".to_owned(), self.credentials.client_id.as_str().to_owned()),
			("client_secret".to_owned(), self.credentials.client_secret.secret().to_owned()),
			("grant_type".to_owned(), grant.as_str().to_owned()),
		]);

		params.extend(extra.into_iter().map(|(key, value)| (key.to_owned(), value)));
		self.strategy.augment_token_request(grant, &mut params);

		ApiRequest::post(self.descriptor.endpoints.token.clone()).query(params)
	}

	/// Reads the provider lifetime, defaulting to [`TokenRecord::DEFAULT_LIFETIME`].
	pub(crate) fn token_lifetime(
		&self,
		operation: Operation,
		request: &ApiRequest,
		response: &ApiResponse,
		expires_in: Option<i64>,
	) -> Result<Duration> {
		match expires_in {
			None => Ok(TokenRecord::DEFAULT_LIFETIME),
			Some(seconds) if seconds > 0 => Ok(Duration::seconds(seconds)),
			Some(seconds) => {
				let diagnostic = UnexpectedResponse::new(
					operation,
					request,
					response,
					Some(format!("Token lifetime must be positive, got {seconds}.")),
				);

				obs::unexpected_response(&diagnostic);

				Err(diagnostic.into())
			},
		}
	}
}
