// self
use crate::{
	_prelude::*,
	provider::{ProviderDescriptor, ProviderEndpoints, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// A required endpoint was never set.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The configured top-level domain cannot form a host name.
	#[error("Top-level domain `{tld}` is invalid.")]
	InvalidTld {
		/// Offending top-level domain.
		tld: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// The `Authorization` scheme must be a single non-empty token.
	#[error("Authorization scheme `{scheme}` is invalid.")]
	InvalidAuthorizationScheme {
		/// Invalid scheme that was supplied.
		scheme: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
	/// Consent page endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for exchanges and refreshes.
	pub token_endpoint: Option<Url>,
	/// Revocation endpoint.
	pub revocation_endpoint: Option<Url>,
	/// User profile endpoint.
	pub user_info_endpoint: Option<Url>,
	/// Writer documents collection endpoint.
	pub documents_endpoint: Option<Url>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates an empty builder with default quirks.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the revocation endpoint.
	pub fn revocation_endpoint(mut self, url: Url) -> Self {
		self.revocation_endpoint = Some(url);

		self
	}

	/// Sets the user info endpoint.
	pub fn user_info_endpoint(mut self, url: Url) -> Self {
		self.user_info_endpoint = Some(url);

		self
	}

	/// Sets the Writer documents endpoint.
	pub fn documents_endpoint(mut self, url: Url) -> Self {
		self.documents_endpoint = Some(url);

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let endpoints = ProviderEndpoints {
			authorization: required("authorization", self.authorization_endpoint)?,
			token: required("token", self.token_endpoint)?,
			revocation: required("revocation", self.revocation_endpoint)?,
			user_info: required("user_info", self.user_info_endpoint)?,
			documents: required("documents", self.documents_endpoint)?,
		};
		let descriptor = ProviderDescriptor { endpoints, quirks: self.quirks };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		let endpoints = &self.endpoints;

		validate_endpoint("authorization", &endpoints.authorization)?;
		validate_endpoint("token", &endpoints.token)?;
		validate_endpoint("revocation", &endpoints.revocation)?;
		validate_endpoint("user_info", &endpoints.user_info)?;
		validate_endpoint("documents", &endpoints.documents)?;
		validate_scope_delimiter(self.quirks.scope_delimiter)?;
		validate_authorization_scheme(&self.quirks.authorization_scheme)?;

		Ok(())
	}
}

fn required(endpoint: &'static str, url: Option<Url>) -> Result<Url, ProviderDescriptorError> {
	url.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderDescriptorError> {
	if delimiter.is_control() {
		Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}

fn validate_authorization_scheme(scheme: &str) -> Result<(), ProviderDescriptorError> {
	if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_graphic()) {
		Err(ProviderDescriptorError::InvalidAuthorizationScheme { scheme: scheme.to_owned() })
	} else {
		Ok(())
	}
}
