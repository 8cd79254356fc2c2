//! Token lifecycle orchestration built on the HTTP facade.
//!
//! [`Broker`] owns the transport, the Zoho descriptor, the client registration and the
//! process-wide service token. Per-user state stays in the caller's
//! [`SessionStore`](crate::session::SessionStore).

pub mod common;
pub mod consent;
pub mod refresh;
pub mod revoke;

pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	config::{BrokerConfig, ClientCredentials},
	http::ApiHttpClient,
	oauth::{HttpFacade, TransportErrorMapper},
	provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Coordinates consent, token exchanges, refreshes, and revocation against Zoho.
///
/// Cloning is cheap and clones share the transport, counters, and the service token
/// record, so one broker can back every request handler of a process.
pub struct Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Provider descriptor that defines endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Strategy responsible for provider-specific request and response handling.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// OAuth client registration used in every grant.
	pub credentials: ClientCredentials,
	/// Shared counters for refresh-token grants.
	pub refresh_metrics: Arc<RefreshMetrics>,
	service_record: Arc<AsyncMutex<TokenRecord>>,
}
impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		credentials: ClientCredentials,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			descriptor,
			strategy: Arc::new(DefaultProviderStrategy),
			credentials,
			refresh_metrics: Default::default(),
			service_record: Default::default(),
		}
	}

	/// Replaces the provider strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Returns a copy of the process-wide service token record.
	pub async fn service_record(&self) -> TokenRecord {
		self.service_record.lock().await.clone()
	}

	pub(crate) fn facade(&self) -> HttpFacade<C, M> {
		HttpFacade::new(self.http_client.clone(), self.transport_mapper.clone())
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new broker with its own reqwest-backed transport.
	pub fn new(descriptor: ProviderDescriptor, credentials: ClientCredentials) -> Self {
		Self::with_http_client(
			descriptor,
			credentials,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Builds a broker for the configured data center; the transport never follows redirects.
	pub fn from_config(config: &BrokerConfig) -> Result<Self> {
		Ok(Self::with_http_client(
			config.descriptor()?,
			config.client.clone(),
			ReqwestHttpClient::without_redirects()?,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> Clone for Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			descriptor: self.descriptor.clone(),
			strategy: self.strategy.clone(),
			credentials: self.credentials.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			service_record: self.service_record.clone(),
		}
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.credentials.client_id.as_str())
			.field("redirect_uri", &self.credentials.redirect_uri.as_str())
			.finish()
	}
}
