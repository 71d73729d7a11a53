//! Upstream access for the Chamber of Deputies web service (SitCamaraWS).
//!
//! This crate provides:
//! - [`PropositionSource`]: the three read-only operations the ingester needs
//! - [`CamaraClient`]: the HTTP implementation of that capability
//! - [`parse_xml`]: XML → generic [`serde_json::Value`] tree conversion

mod client;
mod xml;

use std::future::Future;

use civis_shared::{PropositionKey, Result};
use serde_json::Value;

pub use client::CamaraClient;
pub use xml::parse_xml;

/// Read-only capability over the upstream proposition API.
///
/// Every operation answers with the generic tree produced by [`parse_xml`];
/// callers canonicalize it with `civis-normalize`.
pub trait PropositionSource: Send + Sync {
    /// List the propositions voted in plenary during `year`.
    fn list_voted_in_plenary(&self, year: i32) -> impl Future<Output = Result<Value>> + Send;

    /// Fetch the detail record of one proposition.
    fn proposition_detail(
        &self,
        key: &PropositionKey,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Fetch the roll-call record of one proposition.
    fn proposition_votes(
        &self,
        key: &PropositionKey,
    ) -> impl Future<Output = Result<Value>> + Send;
}
