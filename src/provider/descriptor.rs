//! Provider descriptor data structures and helpers shared by all flows.
//!
//! The module exposes validated metadata, supporting builder utilities, and
//! grant identifiers so the broker can describe Zoho in a transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Grant identifiers sent to the token endpoint.
pub mod grant;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use grant::*;
pub use quirks::*;

// self
use crate::_prelude::*;

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Consent page the user's browser is redirected to.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token: Url,
	/// Refresh token revocation endpoint.
	pub revocation: Url,
	/// Endpoint returning the signed-in user's profile.
	pub user_info: Url,
	/// Base collection URL for Writer documents.
	pub documents: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}

	/// Derives the Zoho data-center endpoints for a top-level domain such as `com`, `eu`, or
	/// `com.au`.
	pub fn zoho(tld: &str) -> Result<Self, ProviderDescriptorError> {
		validate_tld(tld)?;

		let accounts = format!("https://accounts.zoho.{tld}");
		let apis = format!("https://zohoapis.{tld}");
		let endpoint = |base: &str, path: &str| {
			Url::parse(&format!("{base}{path}"))
				.map_err(|_| ProviderDescriptorError::InvalidTld { tld: tld.to_owned() })
		};

		Self::builder()
			.authorization_endpoint(endpoint(&accounts, "/oauth/v2/auth")?)
			.token_endpoint(endpoint(&accounts, "/oauth/v2/token")?)
			.revocation_endpoint(endpoint(&accounts, "/oauth/v2/token/revoke")?)
			.user_info_endpoint(endpoint(&accounts, "/oauth/user/info")?)
			.documents_endpoint(endpoint(&apis, "/writer/api/v1/documents")?)
			.build()
	}
}

fn validate_tld(tld: &str) -> Result<(), ProviderDescriptorError> {
	let valid = !tld.is_empty()
		&& !tld.starts_with('.')
		&& !tld.ends_with('.')
		&& !tld.contains("..")
		&& tld.chars().all(|c| c.is_ascii_alphanumeric() || c == '.');

	if valid { Ok(()) } else { Err(ProviderDescriptorError::InvalidTld { tld: tld.to_owned() }) }
}
