//! Refresh token revocation.

// self
use crate::{
	_prelude::*,
	flows::Broker,
	http::{ApiHttpClient, ApiRequest},
	oauth::{self, TransportErrorMapper},
	obs::{self, Operation},
	session::SessionStore,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Revokes the session's refresh token and nulls the three token fields.
	///
	/// A session without a refresh token is cleared without contacting the provider. On
	/// failure the session is left untouched.
	pub async fn revoke<S>(&self, session: &S) -> Result<()>
	where
		S: ?Sized + SessionStore,
	{
		const OPERATION: Operation = Operation::Revoke;

		obs::observe(OPERATION, "revoke", async move {
			let mut record = session.load().await?;

			if let Some(refresh_token) = record.refresh_token.as_ref() {
				let request = ApiRequest::post(self.descriptor.endpoints.revocation.clone())
					.query([("token", refresh_token.expose())]);
				let response = self.facade().send(OPERATION, &request).await?;

				if !self.strategy.revocation_accepted(response.status, &response.body) {
					return Err(oauth::reject(
						OPERATION,
						self.strategy.as_ref(),
						&request,
						&response,
					));
				}
			}

			record.clear();
			session.save(record).await?;

			Ok(())
		})
		.await
	}
}
