//! End-to-end ingest: gather → fetch → aggregate → write.

use std::time::{Duration, Instant};

use tracing::{Span, field, info, instrument};
use uuid::Uuid;

use civis_shared::{IngestConfig, Result};
use civis_source::{CamaraClient, PropositionSource};

use crate::gatherer::{self, PropositionRef, YearStats};
use crate::orchestrator::FetchOrchestrator;
use crate::processor::MotionProcessor;
use crate::themes::ThemeTable;
use crate::writer::DatasetWriter;

/// Result of an ingest run.
#[derive(Debug, Clone)]
pub struct IngestResult {
    /// Identifier of this run, also recorded on its tracing span.
    pub run_id: Uuid,
    pub year_stats: Vec<YearStats>,
    /// Listing rows across all years, duplicates included.
    pub listed_total: usize,
    pub unique_propositions: usize,
    /// Propositions that became motions.
    pub processed: usize,
    /// Propositions whose detail resolved to an already registered motion.
    pub duplicates: usize,
    /// Propositions excluded from the dataset.
    pub errors: usize,
    pub motions: usize,
    pub deputies: usize,
    pub roll_calls: usize,
    pub elapsed: Duration,
}

impl IngestResult {
    pub fn years_gathered(&self) -> usize {
        self.year_stats.len()
    }

    pub fn failed_years(&self) -> usize {
        self.year_stats.iter().filter(|s| s.failed).count()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called each time a proposition finishes, successfully or not.
    fn proposition_done(&self, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &IngestResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn proposition_done(&self, _current: usize, _total: usize) {}
    fn done(&self, _result: &IngestResult) {}
}

/// Run an ingest against the live web service.
pub async fn ingest(
    config: &IngestConfig,
    progress: &dyn ProgressReporter,
) -> Result<IngestResult> {
    config.validate()?;
    let client = CamaraClient::new(&config.source)?;
    run_ingest(config, &client, progress).await
}

/// Run the full ingest pipeline against `source`.
///
/// 1. Load the theme table (optional)
/// 2. Gather unique propositions across the year range
/// 3. Fetch details and votes with bounded concurrency
/// 4. Write motions, deputies and the roll-call index
///
/// Per-item failures are counted, not returned. Only invalid configuration
/// and output I/O failures surface as errors.
#[instrument(
    skip_all,
    fields(run_id = field::Empty, begin = config.year_begin, end = config.year_end)
)]
pub async fn run_ingest<S: PropositionSource>(
    config: &IngestConfig,
    source: &S,
    progress: &dyn ProgressReporter,
) -> Result<IngestResult> {
    config.validate()?;

    let start = Instant::now();
    let run_id = Uuid::now_v7();
    Span::current().record("run_id", field::display(run_id));

    info!(
        %run_id,
        begin = config.year_begin,
        end = config.year_end,
        concurrency = config.concurrency,
        "starting ingest"
    );

    // --- Phase 1: Themes ---
    progress.phase("Loading themes");
    let themes = match &config.themes_file {
        Some(path) => ThemeTable::load(path),
        None => ThemeTable::default(),
    };

    // --- Phase 2: Gather ---
    progress.phase("Gathering propositions");
    let gathered = gatherer::gather(source, config.years()).await;
    let listed_total = gathered.listed_total();
    let year_stats = gathered.stats;
    let propositions: Vec<PropositionRef> = gathered.propositions.into_values().collect();

    // --- Phase 3: Fetch + aggregate ---
    progress.phase("Fetching propositions");
    let mut processor = MotionProcessor::new(themes);
    let summary = FetchOrchestrator::new(source, config.concurrency)
        .run(&propositions, &mut processor, progress)
        .await;

    // --- Phase 4: Write ---
    progress.phase("Writing dataset");
    let written = DatasetWriter::new(&config.output).write(processor.into_dataset())?;

    let result = IngestResult {
        run_id,
        year_stats,
        listed_total,
        unique_propositions: propositions.len(),
        processed: summary.processed,
        duplicates: summary.duplicates,
        errors: summary.errors,
        motions: written.motions_written,
        deputies: written.deputies,
        roll_calls: written.roll_calls,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        %run_id,
        listed = result.listed_total,
        unique = result.unique_propositions,
        processed = result.processed,
        duplicates = result.duplicates,
        errors = result.errors,
        motions = result.motions,
        deputies = result.deputies,
        roll_calls = result.roll_calls,
        elapsed_ms = result.elapsed.as_millis(),
        "ingest complete"
    );

    Ok(result)
}
