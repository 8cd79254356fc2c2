//! Refresh-token grant plus the cached service and session token lookups.
//!
//! [`Broker::service_token`] keeps one process-wide record behind an async mutex that
//! stays locked across the refresh, so concurrent callers wait for a single grant.
//! [`Broker::session_token`] reads and writes the caller's session and never touches
//! the process-wide record.

mod metrics;

pub use metrics::{RefreshCounts, RefreshMetrics};

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	flows::{Broker, common::TokenEndpointResponse},
	http::ApiHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::{self, Operation},
	provider::GrantType,
	session::SessionStore,
};

/// Access token minted by a refresh-token grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshGrant {
	/// New access token; Zoho may omit it.
	pub access_token: Option<TokenSecret>,
	/// Provider-reported lifetime, before the safety margin is applied.
	pub lifetime: Duration,
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Performs a `grant_type=refresh_token` call without touching any cache.
	pub async fn refresh(&self, refresh_token: &TokenSecret) -> Result<RefreshGrant> {
		const OPERATION: Operation = Operation::Refresh;

		self.refresh_metrics.record_attempt();

		let result = obs::observe(OPERATION, "refresh", async move {
			let request = self.token_request(
				GrantType::RefreshToken,
				[("refresh_token", refresh_token.expose().to_owned())],
			);
			let response =
				self.facade().send_accepted(OPERATION, self.strategy.as_ref(), &request).await?;
			let payload = oauth::decode::<TokenEndpointResponse>(OPERATION, &response.body)?;
			let lifetime =
				self.token_lifetime(OPERATION, &request, &response, payload.expires_in)?;

			Ok(RefreshGrant {
				access_token: payload.access_token.and_then(TokenSecret::non_empty),
				lifetime,
			})
		})
		.await;

		match &result {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		result
	}

	/// Returns the process-wide access token, refreshing it when missing or expired.
	///
	/// The cached token is only reused for the refresh token that minted it; passing a
	/// different refresh token forces a new grant and replaces the cached record.
	pub async fn service_token(&self, refresh_token: &TokenSecret) -> Result<Option<TokenSecret>> {
		self.service_token_at(refresh_token, OffsetDateTime::now_utc()).await
	}

	/// Same as [`Broker::service_token`] with an explicit clock.
	pub async fn service_token_at(
		&self,
		refresh_token: &TokenSecret,
		now: OffsetDateTime,
	) -> Result<Option<TokenSecret>> {
		const OPERATION: Operation = Operation::ServiceToken;

		obs::observe(OPERATION, "service_token", async move {
			let mut record = self.service_record.lock().await;

			let same_grant = record.refresh_token.as_ref() == Some(refresh_token);

			if let Some(token) = record.valid_access_token_at(now).filter(|_| same_grant) {
				obs::token_reused(OPERATION, record.expires_at);

				return Ok(Some(token.clone()));
			}

			let grant = self.refresh(refresh_token).await?;

			record.refresh_token = Some(refresh_token.clone());
			record.renew(grant.access_token.clone(), grant.lifetime, now);
			obs::token_issued(OPERATION, record.expires_at);

			Ok(grant.access_token)
		})
		.await
	}

	/// Returns the session's access token, refreshing it when missing or expired.
	///
	/// `Ok(None)` means the session holds no refresh token and the user has to go
	/// through [`Broker::consent_redirect`] again.
	pub async fn session_token<S>(&self, session: &S) -> Result<Option<TokenSecret>>
	where
		S: ?Sized + SessionStore,
	{
		self.session_token_at(session, OffsetDateTime::now_utc()).await
	}

	/// Same as [`Broker::session_token`] with an explicit clock.
	pub async fn session_token_at<S>(
		&self,
		session: &S,
		now: OffsetDateTime,
	) -> Result<Option<TokenSecret>>
	where
		S: ?Sized + SessionStore,
	{
		const OPERATION: Operation = Operation::SessionToken;

		obs::observe(OPERATION, "session_token", async move {
			let mut record = session.load().await?;
			let Some(refresh_token) = record.refresh_token.clone() else {
				obs::authentication_required(OPERATION);

				return Ok(None);
			};

			if let Some(token) = record.valid_access_token_at(now) {
				obs::token_reused(OPERATION, record.expires_at);

				return Ok(Some(token.clone()));
			}

			let grant = self.refresh(&refresh_token).await?;

			record.renew(grant.access_token.clone(), grant.lifetime, now);
			obs::token_issued(OPERATION, record.expires_at);
			session.save(record).await?;

			Ok(grant.access_token)
		})
		.await
	}

	/// Returns `true` when the session holds a refresh token.
	pub async fn is_authenticated<S>(&self, session: &S) -> Result<bool>
	where
		S: ?Sized + SessionStore,
	{
		Ok(session.load().await?.is_authenticated())
	}
}
