//! Login identity lookup.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	flows::Broker,
	http::{ApiHttpClient, ApiRequest},
	oauth::TransportErrorMapper,
	obs::{self, Operation},
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the profile of the user the access token belongs to.
	pub async fn login_identity(&self, access_token: &TokenSecret) -> Result<Value> {
		const OPERATION: Operation = Operation::LoginIdentity;

		obs::observe(OPERATION, "login_identity", async move {
			let request = ApiRequest::get(self.descriptor.endpoints.user_info.clone())
				.authorized(&self.descriptor.quirks.authorization_scheme, access_token.expose());
			let response =
				self.facade().send_accepted(OPERATION, self.strategy.as_ref(), &request).await?;

			Ok(response.body)
		})
		.await
	}
}
