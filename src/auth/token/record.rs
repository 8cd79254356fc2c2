//! Token record and expiry policy shared by the process-wide and per-session caches.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Current lifecycle status for a token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// No refresh token; the user has to go through the consent redirect.
	Unauthenticated,
	/// Access token present and not yet expired.
	Active,
	/// Refresh token present but the access token is missing or expired.
	Expired,
}

/// Refresh and access tokens plus the instant the access token stops being trusted.
///
/// The record is deliberately mutable: the broker rewrites it in place on every refresh
/// and clears it on revocation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenRecord {
	/// Long-lived refresh token, absent for unauthenticated sessions and service records.
	pub refresh_token: Option<TokenSecret>,
	/// Short-lived access token.
	pub access_token: Option<TokenSecret>,
	/// Instant after which the access token must be refreshed.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenRecord {
	/// Margin subtracted from every provider lifetime so tokens are renewed before the boundary.
	pub const SAFETY_MARGIN: Duration = Duration::seconds(1);
	/// Lifetime assumed when the provider omits `expires_in`.
	pub const DEFAULT_LIFETIME: Duration = Duration::seconds(3600);

	/// Builds a record for tokens minted at `now` with the provider-reported `lifetime`.
	pub fn issued(
		refresh_token: Option<TokenSecret>,
		access_token: Option<TokenSecret>,
		lifetime: Duration,
		now: OffsetDateTime,
	) -> Self {
		Self { refresh_token, access_token, expires_at: Some(Self::expiry_for(lifetime, now)) }
	}

	/// Expiry instant for a token minted at `now`: `now + lifetime - SAFETY_MARGIN`.
	pub fn expiry_for(lifetime: Duration, now: OffsetDateTime) -> OffsetDateTime {
		now + lifetime - Self::SAFETY_MARGIN
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if self.refresh_token.is_none() {
			return TokenStatus::Unauthenticated;
		}
		if self.valid_access_token_at(instant).is_some() {
			return TokenStatus::Active;
		}

		TokenStatus::Expired
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns the access token if it is present and `instant < expires_at`.
	///
	/// A record without an expiry never yields a token.
	pub fn valid_access_token_at(&self, instant: OffsetDateTime) -> Option<&TokenSecret> {
		match (&self.access_token, self.expires_at) {
			(Some(token), Some(expires_at)) if instant < expires_at => Some(token),
			_ => None,
		}
	}

	/// Returns `true` when a refresh token is present.
	pub fn is_authenticated(&self) -> bool {
		self.refresh_token.is_some()
	}

	/// Replaces the access token and expiry, keeping the refresh token.
	pub fn renew(
		&mut self,
		access_token: Option<TokenSecret>,
		lifetime: Duration,
		now: OffsetDateTime,
	) {
		self.access_token = access_token;
		self.expires_at = Some(Self::expiry_for(lifetime, now));
	}

	/// Drops every token and the expiry.
	pub fn clear(&mut self) {
		*self = Self::default();
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
