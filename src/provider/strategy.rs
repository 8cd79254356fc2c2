//! Provider strategy hooks that customize token requests and read error payloads.
//!
//! Implementations decorate outgoing token requests and decide how provider bodies are
//! interpreted without tying flows to any particular HTTP client.

// self
use crate::{_prelude::*, provider::descriptor::GrantType};

/// HTTP status Zoho returns when revoking a token that is already invalid.
pub const REVOCATION_ALREADY_INVALID_STATUS: u16 = 400;

/// Strategy hook that allows providers to decorate requests and interpret responses.
///
/// Implementors are required to be `Send + Sync`, and the hooks use crate-owned or
/// `serde_json` data so downstream crates never depend on reqwest-specific structures.
/// Only [`ProviderStrategy::error_message`] is required.
pub trait ProviderStrategy: Send + Sync {
	/// Extracts the human-readable error message from a rejected response body.
	fn error_message(&self, body: &Value) -> Option<String>;

	/// Decides whether a revocation response means the refresh token is gone.
	///
	/// The default accepts `{"status":"success"}` bodies and status 400, which Zoho
	/// returns for tokens that are already invalid.
	fn revocation_accepted(&self, status: u16, body: &Value) -> bool {
		body.get("status").and_then(Value::as_str) == Some("success")
			|| status == REVOCATION_ALREADY_INVALID_STATUS
	}

	/// Gives providers a chance to add custom query parameters before dispatching.
	///
	/// The default implementation does nothing. The method works on a plain `BTreeMap`
	/// so implementations remain HTTP client agnostic.
	fn augment_token_request(&self, _grant: GrantType, _params: &mut BTreeMap<String, String>) {}
}

/// Default strategy for Zoho Accounts and Writer payloads.
///
/// Error messages come from `message`, then `error.message`, then a plain string `error`.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn error_message(&self, body: &Value) -> Option<String> {
		if let Some(message) = body.get("message").and_then(Value::as_str) {
			return Some(message.to_owned());
		}

		match body.get("error")? {
			Value::String(error) => Some(error.clone()),
			error => error.get("message").and_then(Value::as_str).map(str::to_owned),
		}
	}
}
