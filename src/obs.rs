//! Observability helpers for broker operations.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits spans named `zoho_writer_broker.operation` with the `operation`
//!   and `stage` (call site) fields, plus structured events for cache hits, refreshes, and
//!   unexpected provider responses.
//! - `metrics` increments the `zoho_writer_broker_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Broker operations; the label doubles as the error context for failed calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Authorization-code exchange after the consent redirect.
	ExchangeCode,
	/// Refresh-token grant.
	Refresh,
	/// Process-wide token lookup.
	ServiceToken,
	/// Per-session token lookup.
	SessionToken,
	/// Refresh-token revocation.
	Revoke,
	/// Login user lookup.
	LoginIdentity,
	/// Writer merge-field listing.
	DocumentFields,
	/// Writer merge-and-sign submission.
	MergeAndSign,
}
impl Operation {
	/// Returns a stable label suitable for span, metric, or error fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::ExchangeCode => "exchange_code",
			Operation::Refresh => "refresh",
			Operation::ServiceToken => "service_token",
			Operation::SessionToken => "session_token",
			Operation::Revoke => "revoke",
			Operation::LoginIdentity => "login_identity",
			Operation::DocumentFields => "document_fields",
			Operation::MergeAndSign => "merge_and_sign",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a broker helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt plus final outcome.
pub(crate) async fn observe<T, Fut>(
	operation: Operation,
	stage: &'static str,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(operation, stage);

	record_outcome(operation, Outcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_outcome(operation, Outcome::Success),
		Err(_) => record_outcome(operation, Outcome::Failure),
	}

	result
}
