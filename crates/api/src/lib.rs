//! fc-api: Foundry REST adapter for the fc CLI client
//!
//! This crate implements the collaborator traits from fc-core against the
//! platform's v2 REST API. It is the only crate that speaks HTTP.

pub mod client;
pub mod list;
pub mod models;

pub use client::FoundryClient;
pub use list::ListEndpoint;
pub use models::Space;
