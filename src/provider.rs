//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the HTTPS-only
//! Zoho Accounts and Writer endpoints plus provider quirks (scope delimiter and the
//! `Authorization` scheme). `strategy` defines [`ProviderStrategy`], an HTTP-client-agnostic
//! hook used by flows to decorate token requests and read provider error payloads.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
