//! Per-user session contract and the built-in in-memory session.
//!
//! The broker reads and writes three session fields: [`REFRESH_TOKEN_FIELD`],
//! [`ACCESS_TOKEN_FIELD`] and [`EXPIRY_FIELD`] (epoch milliseconds). Stores only move
//! [`TokenRecord`] values in and out; the field codec lives here so every backend
//! agrees on the wire shape.

pub mod memory;

pub use memory::MemorySession;

// self
use crate::{
	_prelude::*,
	auth::{TokenRecord, TokenSecret},
};

/// Session field holding the long-lived refresh token.
pub const REFRESH_TOKEN_FIELD: &str = "z_refresh_token";
/// Session field holding the current access token.
pub const ACCESS_TOKEN_FIELD: &str = "z_access_token";
/// Session field holding the access token expiry in epoch milliseconds.
pub const EXPIRY_FIELD: &str = "z_expiry";

/// Future returned by [`SessionStore`] operations.
pub type SessionFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, SessionError>> + 'a + Send>>;

/// Storage contract for one user's session.
///
/// A value implementing this trait is bound to a single session (cookie, request
/// context, row); the broker never sees session identifiers.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Reads the token fields; missing fields yield an unauthenticated record.
	fn load(&self) -> SessionFuture<'_, TokenRecord>;

	/// Overwrites all three token fields with the record's values (`null` when absent).
	fn save(&self, record: TokenRecord) -> SessionFuture<'_, ()>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionError {
	/// Session payload could not be (de)serialized by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the session storage.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Encodes a record into its three session fields.
pub fn encode_fields(record: &TokenRecord) -> [(&'static str, Value); 3] {
	let secret = |token: &Option<TokenSecret>| {
		token.as_ref().map(|t| Value::String(t.expose().to_owned())).unwrap_or(Value::Null)
	};
	let expiry = record
		.expires_at
		.map(|at| Value::from(at.unix_timestamp() * 1_000 + i64::from(at.millisecond())))
		.unwrap_or(Value::Null);

	[
		(REFRESH_TOKEN_FIELD, secret(&record.refresh_token)),
		(ACCESS_TOKEN_FIELD, secret(&record.access_token)),
		(EXPIRY_FIELD, expiry),
	]
}

/// Decodes a record from session fields looked up through `field`.
///
/// Empty or non-string tokens are treated as absent, and an expiry that is not a
/// representable epoch-millisecond number is dropped, which makes the access token stale.
pub fn decode_fields<F>(field: F) -> TokenRecord
where
	F: Fn(&str) -> Option<Value>,
{
	let secret = |name: &str| {
		field(name).as_ref().and_then(Value::as_str).and_then(TokenSecret::non_empty)
	};
	let expires_at = field(EXPIRY_FIELD).and_then(|value| {
		let millis = match value.as_i64() {
			Some(ms) => i128::from(ms),
			None => value.as_f64().filter(|ms| ms.is_finite())? as i128,
		};

		OffsetDateTime::from_unix_timestamp_nanos(millis.checked_mul(1_000_000)?).ok()
	});

	TokenRecord {
		refresh_token: secret(REFRESH_TOKEN_FIELD),
		access_token: secret(ACCESS_TOKEN_FIELD),
		expires_at,
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;

	#[test]
	fn fields_encode_expiry_as_epoch_millis() {
		let t0 = macros::datetime!(2025-01-01 00:00 UTC);
		let record = TokenRecord::issued(
			Some(TokenSecret::new("R1")),
			Some(TokenSecret::new("A1")),
			Duration::seconds(3600),
			t0,
		);
		let fields = encode_fields(&record);

		assert_eq!(fields[0], (REFRESH_TOKEN_FIELD, json!("R1")));
		assert_eq!(fields[1], (ACCESS_TOKEN_FIELD, json!("A1")));
		assert_eq!(fields[2], (EXPIRY_FIELD, json!(1_735_689_600_000_i64 + 3_599_000)));

		let map = HashMap::<&str, Value>::from_iter(fields);
		let decoded = decode_fields(|name| map.get(name).cloned());

		assert_eq!(decoded, record);
	}

	#[test]
	fn cleared_records_encode_as_nulls() {
		let fields = encode_fields(&TokenRecord::default());

		assert!(fields.iter().all(|(_, value)| value.is_null()));
	}

	#[test]
	fn unreadable_fields_decode_as_absent() {
		let map = HashMap::from([
			(REFRESH_TOKEN_FIELD, json!("R1")),
			(ACCESS_TOKEN_FIELD, json!("")),
			(EXPIRY_FIELD, json!("tomorrow")),
		]);
		let decoded = decode_fields(|name| map.get(name).cloned());

		assert!(decoded.is_authenticated());
		assert!(decoded.access_token.is_none());
		assert!(decoded.expires_at.is_none());

		let float_expiry = HashMap::from([(EXPIRY_FIELD, json!(1_735_689_600_000.0))]);
		let decoded = decode_fields(|name| float_expiry.get(name).cloned());

		assert_eq!(decoded.expires_at, Some(macros::datetime!(2025-01-01 00:00 UTC)));

		for out_of_range in [json!(1e300), json!(-1e300), json!(i64::MAX)] {
			let map =
				HashMap::from([(REFRESH_TOKEN_FIELD, json!("R1")), (EXPIRY_FIELD, out_of_range)]);
			let decoded = decode_fields(|name| map.get(name).cloned());

			assert!(decoded.is_authenticated());
			assert!(decoded.expires_at.is_none());
		}
	}
}
