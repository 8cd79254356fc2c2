//! Consent redirect and authorization-code exchange.

// self
use crate::{
	_prelude::*,
	auth::{TokenRecord, TokenSecret},
	flows::{Broker, common::TokenEndpointResponse},
	http::ApiHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::{self, Operation},
	provider::GrantType,
	session::SessionStore,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the consent page URL the user's browser is redirected to.
	///
	/// The URL is deterministic for a given configuration: `client_id`, `redirect_uri`,
	/// `scope`, `response_type=code`, `access_type=offline` and `prompt=consent`.
	pub fn consent_redirect(&self) -> Url {
		let mut url = self.descriptor.endpoints.authorization.clone();
		let scope = self.credentials.scope.join(self.descriptor.quirks.scope_delimiter);

		url.query_pairs_mut()
			.append_pair("client_id", self.credentials.client_id.as_str())
			.append_pair("redirect_uri", self.credentials.redirect_uri.as_str())
			.append_pair("scope", &scope)
			.append_pair("response_type", "code")
			.append_pair("access_type", "offline")
			.append_pair("prompt", "consent");

		url
	}

	/// Exchanges the code returned on the redirect and stores the tokens in the session.
	pub async fn exchange_code<S>(&self, session: &S, code: &str) -> Result<Option<TokenSecret>>
	where
		S: ?Sized + SessionStore,
	{
		self.exchange_code_at(session, code, OffsetDateTime::now_utc()).await
	}

	/// Same as [`Broker::exchange_code`] with an explicit clock.
	///
	/// The session is only written when the response carries a refresh token.
	pub async fn exchange_code_at<S>(
		&self,
		session: &S,
		code: &str,
		now: OffsetDateTime,
	) -> Result<Option<TokenSecret>>
	where
		S: ?Sized + SessionStore,
	{
		const OPERATION: Operation = Operation::ExchangeCode;

		obs::observe(OPERATION, "exchange_code", async move {
			let request = self.token_request(
				GrantType::AuthorizationCode,
				[
					("redirect_uri", self.credentials.redirect_uri.to_string()),
					("code", code.to_owned()),
				],
			);
			let response = self.facade().send(OPERATION, &request).await?;

			if response.str_field("refresh_token").is_none_or(str::is_empty) {
				return Err(oauth::reject(OPERATION, self.strategy.as_ref(), &request, &response));
			}

			let payload = oauth::decode::<TokenEndpointResponse>(OPERATION, &response.body)?;
			let lifetime =
				self.token_lifetime(OPERATION, &request, &response, payload.expires_in)?;
			let access_token = payload.access_token.and_then(TokenSecret::non_empty);
			let record = TokenRecord::issued(
				payload.refresh_token.and_then(TokenSecret::non_empty),
				access_token.clone(),
				lifetime,
				now,
			);

			obs::token_issued(OPERATION, record.expires_at);
			session.save(record).await?;

			Ok(access_token)
		})
		.await
	}
}
