//! Client credentials and environment-driven broker settings.
//!
//! Settings are read with the `config` crate from `Z_`-prefixed environment variables:
//! `Z_TLD`, `Z_CLIENT_ID`, `Z_CLIENT_SECRET`, `Z_CLIENT_REDIRECT`, `Z_AUTH_SCOPE`, and the
//! optional `Z_REFRESH_TOKEN` and `Z_TEMPLATE_ID`.

// crates.io
use config::{Config, Environment, Map};
use oauth2::{ClientId, ClientSecret};
// self
use crate::{
	_prelude::*,
	auth::{DocumentId, ScopeSet, TokenSecret},
	error::ConfigError,
	provider::ProviderDescriptor,
};

const ENV_PREFIX: &str = "Z";

/// OAuth client registration shared by every flow.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
	/// OAuth client identifier.
	pub client_id: ClientId,
	/// OAuth client secret; redacted in `Debug`.
	pub client_secret: ClientSecret,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Url,
	/// Scopes requested on the consent page.
	pub scope: ScopeSet,
}
impl ClientCredentials {
	/// Bundles a client registration.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: Url,
		scope: ScopeSet,
	) -> Self {
		Self {
			client_id: ClientId::new(client_id.into()),
			client_secret: ClientSecret::new(client_secret.into()),
			redirect_uri,
			scope,
		}
	}
}

/// Validated broker settings.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
	/// Zoho data-center top-level domain, e.g. `com` or `eu`.
	pub tld: String,
	/// Client registration.
	pub client: ClientCredentials,
	/// Refresh token used for service-level calls.
	pub refresh_token: Option<TokenSecret>,
	/// Writer template used by merge-and-sign.
	pub template_id: Option<DocumentId>,
}
impl BrokerConfig {
	/// Loads settings from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::load(Environment::with_prefix(ENV_PREFIX))
	}

	/// Loads settings from an explicit variable map (keys such as `Z_CLIENT_ID`).
	pub fn from_source(vars: Map<String, String>) -> Result<Self, ConfigError> {
		Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
	}

	/// Zoho endpoints for the configured data center.
	pub fn descriptor(&self) -> Result<ProviderDescriptor, ConfigError> {
		Ok(ProviderDescriptor::zoho(&self.tld)?)
	}

	fn load(environment: Environment) -> Result<Self, ConfigError> {
		let raw =
			Config::builder().add_source(environment).build()?.try_deserialize::<RawConfig>()?;

		raw.validate()
	}
}

#[derive(Deserialize)]
struct RawConfig {
	tld: String,
	client_id: String,
	client_secret: String,
	client_redirect: String,
	auth_scope: String,
	refresh_token: Option<String>,
	template_id: Option<String>,
}
impl RawConfig {
	fn validate(self) -> Result<BrokerConfig, ConfigError> {
		let redirect_uri = Url::parse(&self.client_redirect)
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let scope = ScopeSet::from_str(&self.auth_scope)?;
		let template_id =
			self.template_id.filter(|id| !id.is_empty()).map(DocumentId::new).transpose()?;

		ProviderDescriptor::zoho(&self.tld)?;

		Ok(BrokerConfig {
			tld: self.tld,
			client: ClientCredentials::new(
				self.client_id,
				self.client_secret,
				redirect_uri,
				scope,
			),
			refresh_token: self.refresh_token.and_then(TokenSecret::non_empty),
			template_id,
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	fn complete() -> Vec<(&'static str, &'static str)> {
		vec![
			("Z_TLD", "eu"),
			("Z_CLIENT_ID", "1000.CLIENT"),
			("Z_CLIENT_SECRET", "shh"),
			("Z_CLIENT_REDIRECT", "https://app.example.com/oauth/callback"),
			("Z_AUTH_SCOPE", "ZohoWriter.documentEditor.ALL,ZohoWriter.merge.ALL"),
			("Z_REFRESH_TOKEN", "1000.refresh"),
			("Z_TEMPLATE_ID", "ywzp4c0f1e2d"),
		]
	}

	#[test]
	fn loads_every_setting_from_the_environment_map() {
		let config =
			BrokerConfig::from_source(vars(&complete())).expect("Complete settings should load.");

		assert_eq!(config.tld, "eu");
		assert_eq!(config.client.client_id.as_str(), "1000.CLIENT");
		assert_eq!(config.client.client_secret.secret(), "shh");
		assert_eq!(config.client.redirect_uri.as_str(), "https://app.example.com/oauth/callback");
		assert_eq!(config.client.scope.len(), 2);
		assert_eq!(config.refresh_token.as_ref().map(TokenSecret::expose), Some("1000.refresh"));
		assert_eq!(config.template_id.as_deref(), Some("ywzp4c0f1e2d"));
		assert!(!format!("{config:?}").contains("shh"));
	}

	#[test]
	fn optional_settings_may_be_absent() {
		let pairs = complete()
			.into_iter()
			.filter(|(k, _)| !matches!(*k, "Z_REFRESH_TOKEN" | "Z_TEMPLATE_ID"))
			.collect::<Vec<_>>();
		let config =
			BrokerConfig::from_source(vars(&pairs)).expect("Required settings should suffice.");

		assert!(config.refresh_token.is_none());
		assert!(config.template_id.is_none());
	}

	#[test]
	fn invalid_settings_are_rejected() {
		let with = |key: &str, value: &'static str| {
			let pairs = complete()
				.into_iter()
				.map(|(k, v)| if k == key { (k, value) } else { (k, v) })
				.collect::<Vec<_>>();

			BrokerConfig::from_source(vars(&pairs))
		};

		assert!(matches!(
			with("Z_CLIENT_REDIRECT", "not a url"),
			Err(ConfigError::InvalidRedirect { .. })
		));
		assert!(matches!(with("Z_AUTH_SCOPE", " , "), Err(ConfigError::InvalidScope(_))));
		assert!(matches!(with("Z_TLD", "com/evil"), Err(ConfigError::InvalidDescriptor(_))));
		assert!(matches!(
			with("Z_TEMPLATE_ID", "two words"),
			Err(ConfigError::InvalidDocumentId(_))
		));

		let missing =
			complete().into_iter().filter(|(k, _)| *k != "Z_CLIENT_ID").collect::<Vec<_>>();

		assert!(matches!(BrokerConfig::from_source(vars(&missing)), Err(ConfigError::Load(_))));
	}
}
