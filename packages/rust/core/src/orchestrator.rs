//! Bounded-concurrency fetching of proposition details and vote records.
//!
//! Workers only talk to the source and normalize payloads. Their results are
//! applied to the [`MotionProcessor`] by the single loop that drains the
//! stream, one at a time, in completion order.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use civis_normalize::{PropositionDetail, VotingRecord, normalize_detail, normalize_votes};
use civis_shared::{CivisError, Result};
use civis_source::PropositionSource;

use crate::gatherer::PropositionRef;
use crate::pipeline::ProgressReporter;
use crate::processor::MotionProcessor;

/// Log a progress line every this many finished propositions.
const PROGRESS_LOG_EVERY: usize = 50;

/// Outcome counters of one orchestration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Propositions that became motions.
    pub processed: usize,
    /// Propositions whose detail resolved to a motion that already existed.
    pub duplicates: usize,
    /// Propositions excluded from the dataset.
    pub errors: usize,
}

/// What a worker brings back for one proposition.
enum FetchOutcome {
    DetailFailed(CivisError),
    MissingIdentity,
    Fetched {
        detail: PropositionDetail,
        votes: Result<VotingRecord>,
    },
}

/// How [`apply`] disposed of one proposition.
enum Applied {
    Motion,
    Duplicate,
    Excluded,
}

/// Runs detail + vote fetches for a proposition set with at most
/// `concurrency` propositions in flight.
pub struct FetchOrchestrator<'a, S> {
    source: &'a S,
    concurrency: usize,
}

impl<'a, S: PropositionSource> FetchOrchestrator<'a, S> {
    /// A limit of zero is treated as one.
    pub fn new(source: &'a S, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch every proposition and feed the results into `processor`.
    ///
    /// A failed or incomplete detail excludes the proposition and counts as
    /// an error. A failed vote fetch is logged and the motion is kept with no
    /// roll calls. Nothing here aborts the run.
    #[instrument(skip_all, fields(total = propositions.len(), concurrency = self.concurrency))]
    pub async fn run(
        &self,
        propositions: &[PropositionRef],
        processor: &mut MotionProcessor,
        progress: &dyn ProgressReporter,
    ) -> FetchSummary {
        let total = propositions.len();
        let source = self.source;
        let mut summary = FetchSummary::default();

        let mut results = stream::iter(propositions)
            .map(|proposition| async move { (proposition, fetch_one(source, proposition).await) })
            .buffer_unordered(self.concurrency);

        let mut done = 0usize;
        while let Some((proposition, outcome)) = results.next().await {
            match apply(proposition, outcome, processor) {
                Applied::Motion => summary.processed += 1,
                Applied::Duplicate => summary.duplicates += 1,
                Applied::Excluded => summary.errors += 1,
            }

            done += 1;
            progress.proposition_done(done, total);
            if done % PROGRESS_LOG_EVERY == 0 {
                info!(done, total, "progress");
            }
        }

        info!(
            processed = summary.processed,
            duplicates = summary.duplicates,
            errors = summary.errors,
            "propositions processed"
        );
        summary
    }
}

async fn fetch_one<S: PropositionSource>(source: &S, proposition: &PropositionRef) -> FetchOutcome {
    let key = &proposition.key;
    debug!(proposition = %key, "fetching detail");

    let detail = match source.proposition_detail(key).await {
        Ok(tree) => match normalize_detail(&tree) {
            Ok(detail) => detail,
            Err(e) => return FetchOutcome::DetailFailed(e),
        },
        Err(e) => return FetchOutcome::DetailFailed(e),
    };

    if detail.key().is_none() {
        return FetchOutcome::MissingIdentity;
    }

    let votes = source
        .proposition_votes(key)
        .await
        .and_then(|tree| normalize_votes(&tree));

    FetchOutcome::Fetched { detail, votes }
}

/// Apply one outcome to the processor.
///
/// The first detail to claim a composite key wins. A later one that resolves
/// to the same key contributes nothing, not even its roll calls.
fn apply(
    proposition: &PropositionRef,
    outcome: FetchOutcome,
    processor: &mut MotionProcessor,
) -> Applied {
    let key = &proposition.key;

    let (detail, votes) = match outcome {
        FetchOutcome::DetailFailed(e) => {
            warn!(proposition = %key, error = %e, "failed to fetch proposition detail");
            return Applied::Excluded;
        }
        FetchOutcome::MissingIdentity => {
            warn!(proposition = %key, "detail lacks type, number or year, skipping");
            return Applied::Excluded;
        }
        FetchOutcome::Fetched { detail, votes } => (detail, votes),
    };

    if let Some(resolved) = detail.key().filter(|k| processor.contains(k)) {
        debug!(proposition = %key, motion = %resolved, "detail resolves to an existing motion");
        return Applied::Duplicate;
    }

    let Some(motion) = processor.set_motion(&detail) else {
        warn!(proposition = %key, "could not create motion, skipping");
        return Applied::Excluded;
    };

    match votes {
        Ok(record) => processor.set_roll_call(motion, &record),
        Err(e) => warn!(
            proposition = %key,
            error = %e,
            "could not fetch votes, keeping motion without roll calls"
        ),
    }

    debug!(proposition = %key, "processed");
    Applied::Motion
}
