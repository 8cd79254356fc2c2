//! Authenticated Zoho calls made with an access token from the broker.
//!
//! Every call sends `Authorization: <scheme> <token>` using the descriptor's scheme and
//! fails with an unexpected-response error when the status exceeds 300.

pub mod identity;
pub mod writer;

pub use writer::MergeSignRequest;
