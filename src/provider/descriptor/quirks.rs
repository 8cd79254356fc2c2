// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how requests are shaped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Character used to join scopes when constructing the `scope` parameter.
	pub scope_delimiter: char,
	/// Scheme placed before the access token in the `Authorization` header.
	pub authorization_scheme: String,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { scope_delimiter: ',', authorization_scheme: "Zoho-oauthtoken".into() }
	}
}
