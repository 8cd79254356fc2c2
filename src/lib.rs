//! Zoho Writer OAuth 2.0 broker: consent redirects, cached service and session tokens,
//! revocation, and the Writer document calls (merge fields, merge-and-sign) built on top.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod session;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ScopeSet,
		config::ClientCredentials,
		flows::Broker,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::ProviderDescriptor,
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Client identifier shared by the integration fixtures.
	pub const TEST_CLIENT_ID: &str = "1000.TESTCLIENT";
	/// Client secret shared by the integration fixtures.
	pub const TEST_CLIENT_SECRET: &str = "test-client-secret";
	/// Redirect URI shared by the integration fixtures.
	pub const TEST_REDIRECT_URI: &str = "https://app.example.com/oauth/callback";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Client credentials used across integration tests.
	pub fn test_credentials() -> ClientCredentials {
		let redirect_uri =
			Url::parse(TEST_REDIRECT_URI).expect("Test redirect URI fixture should parse.");
		let scope = ScopeSet::new(["ZohoWriter.documentEditor.ALL", "ZohoWriter.merge.ALL"])
			.expect("Test scope fixture should be valid.");

		ClientCredentials::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET, redirect_uri, scope)
	}

	/// Builds a descriptor whose endpoints all point at the provided mock base URL.
	pub fn test_descriptor(base: &str) -> ProviderDescriptor {
		let endpoint = |path: &str| {
			Url::parse(&format!("{base}{path}")).expect("Mock endpoint URL should parse.")
		};

		ProviderDescriptor::builder()
			.authorization_endpoint(endpoint("/oauth/v2/auth"))
			.token_endpoint(endpoint("/oauth/v2/token"))
			.revocation_endpoint(endpoint("/oauth/v2/token/revoke"))
			.user_info_endpoint(endpoint("/oauth/user/info"))
			.documents_endpoint(endpoint("/writer/api/v1/documents"))
			.build()
			.expect("Mock provider descriptor should build successfully.")
	}

	/// Constructs a [`Broker`] wired to the reqwest transport used across integration tests.
	pub fn build_reqwest_test_broker(descriptor: ProviderDescriptor) -> ReqwestTestBroker {
		Broker::with_http_client(
			descriptor,
			test_credentials(),
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))]
use {color_eyre as _, dotenvy as _, httpmock as _, tokio as _, tracing_subscriber as _};
