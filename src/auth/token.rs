//! Token secrets and the lifecycle record shared by the service and session paths.

pub mod record;
pub mod secret;
