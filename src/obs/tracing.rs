// self
use crate::{_prelude::*, error::UnexpectedResponse, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by broker operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"zoho_writer_broker.operation",
				operation = operation.as_str(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a cached token being reused.
pub(crate) fn token_reused(operation: Operation, expires_at: Option<OffsetDateTime>) {
	#[cfg(feature = "tracing")]
	tracing::debug!(operation = operation.as_str(), ?expires_at, "Reusing cached access token.");

	#[cfg(not(feature = "tracing"))]
	let _ = (operation, expires_at);
}

/// Logs a freshly minted access token.
pub(crate) fn token_issued(operation: Operation, expires_at: Option<OffsetDateTime>) {
	#[cfg(feature = "tracing")]
	tracing::debug!(operation = operation.as_str(), ?expires_at, "Stored new access token.");

	#[cfg(not(feature = "tracing"))]
	let _ = (operation, expires_at);
}

/// Logs a session that has no refresh token and must go through consent again.
pub(crate) fn authentication_required(operation: Operation) {
	#[cfg(feature = "tracing")]
	tracing::debug!(operation = operation.as_str(), "Session holds no refresh token.");

	#[cfg(not(feature = "tracing"))]
	let _ = operation;
}

/// Emits the full diagnostic context of a rejected provider call.
pub(crate) fn unexpected_response(err: &UnexpectedResponse) {
	#[cfg(feature = "tracing")]
	tracing::error!(
		operation = err.operation.as_str(),
		method = %err.method,
		host = %err.host,
		path = %err.path,
		sent_headers = ?err.sent_headers,
		sent_payload = ?err.sent_payload,
		status = err.status,
		received_headers = ?err.received_headers,
		received_body = %err.received_body,
		"{}",
		err.message
	);

	#[cfg(not(feature = "tracing"))]
	let _ = err;
}
