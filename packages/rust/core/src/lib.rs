//! Ingestion pipeline for the Chamber of Deputies voting dataset.
//!
//! This crate ties the source client and the normalizer together into the
//! end-to-end `ingest` workflow: gather unique propositions across a year
//! range, fetch their details and votes with bounded concurrency, resolve
//! deputy identities, and write the resulting dataset.

pub mod gatherer;
pub mod identity;
pub mod orchestrator;
pub mod pipeline;
pub mod processor;
pub mod themes;
pub mod writer;

#[cfg(test)]
mod testing;

pub use gatherer::{GatherOutcome, PropositionRef, YearStats, gather};
pub use identity::{DeputyRegistry, canonical_name};
pub use orchestrator::{FetchOrchestrator, FetchSummary};
pub use pipeline::{IngestResult, ProgressReporter, SilentProgress, ingest, run_ingest};
pub use processor::{MotionId, MotionProcessor};
pub use themes::{MultiThemed, ThemeBacklog, ThemeTable};
pub use writer::{DatasetWriter, WriteSummary};
