//! Cross-year gathering of the plenary-voted propositions.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use tracing::{info, instrument, warn};

use civis_normalize::{normalize_listing, parse_proposition_name};
use civis_shared::PropositionKey;
use civis_source::PropositionSource;

/// A unique proposition queued for fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropositionRef {
    pub key: PropositionKey,
    /// Display name from the first listing that mentioned it.
    pub display_name: String,
}

/// Per-year gathering counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearStats {
    pub year: i32,
    /// Rows in the listing, duplicates included.
    pub total: usize,
    /// Propositions not seen in any earlier year.
    pub added: usize,
    /// Rows without a usable name.
    pub skipped: usize,
    /// The listing request itself failed.
    pub failed: bool,
}

/// The deduplicated proposition set plus the stats that produced it.
#[derive(Debug, Clone, Default)]
pub struct GatherOutcome {
    /// Unique propositions keyed by composite key.
    pub propositions: BTreeMap<String, PropositionRef>,
    pub stats: Vec<YearStats>,
}

impl GatherOutcome {
    /// Listing rows across all years, duplicates included.
    pub fn listed_total(&self) -> usize {
        self.stats.iter().map(|s| s.total).sum()
    }

    pub fn failed_years(&self) -> usize {
        self.stats.iter().filter(|s| s.failed).count()
    }

    /// Add one listing row; returns whether it was new.
    fn merge(&mut self, key: PropositionKey, display_name: &str) -> bool {
        use std::collections::btree_map::Entry;

        match self.propositions.entry(key.composite()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(PropositionRef {
                    key,
                    display_name: display_name.to_string(),
                });
                true
            }
        }
    }
}

/// Gather the unique propositions voted in plenary across `years`.
///
/// Years are requested one at a time. A failed listing or an unparseable
/// name costs only that year or that row; gathering itself never fails.
#[instrument(skip_all, fields(begin = *years.start(), end = *years.end()))]
pub async fn gather<S: PropositionSource>(source: &S, years: RangeInclusive<i32>) -> GatherOutcome {
    let mut outcome = GatherOutcome::default();

    for year in years {
        let stats = gather_year(source, year, &mut outcome).await;
        outcome.stats.push(stats);
    }

    info!(
        years = outcome.stats.len(),
        listed = outcome.listed_total(),
        unique = outcome.propositions.len(),
        failed_years = outcome.failed_years(),
        "gathering complete"
    );

    outcome
}

async fn gather_year<S: PropositionSource>(
    source: &S,
    year: i32,
    outcome: &mut GatherOutcome,
) -> YearStats {
    let mut stats = YearStats {
        year,
        total: 0,
        added: 0,
        skipped: 0,
        failed: false,
    };

    let tree = match source.list_voted_in_plenary(year).await {
        Ok(tree) => tree,
        Err(e) => {
            warn!(year, error = %e, "failed to list propositions for year");
            stats.failed = true;
            return stats;
        }
    };

    let rows = normalize_listing(&tree);
    stats.total = rows.len();
    if rows.is_empty() {
        info!(year, "no propositions found for year");
        return stats;
    }

    for row in rows {
        let Some(name) = row.name else {
            warn!(year, "listing entry without a name, skipping");
            stats.skipped += 1;
            continue;
        };

        match parse_proposition_name(&name) {
            Ok(key) => {
                if outcome.merge(key, &name) {
                    stats.added += 1;
                }
            }
            Err(e) => {
                warn!(year, name = %name, error = %e, "could not parse proposition name, skipping");
                stats.skipped += 1;
            }
        }
    }

    info!(year, total = stats.total, added = stats.added, "gathered year");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;

    fn listing(names: &[&str]) -> String {
        let rows: String = names
            .iter()
            .map(|n| format!("<proposicao><nomeProposicao>{n}</nomeProposicao></proposicao>"))
            .collect();
        format!("<proposicoes>{rows}</proposicoes>")
    }

    #[tokio::test]
    async fn deduplicates_across_years() {
        let source = FakeSource::new()
            .with_listing(2007, &listing(&["PL 1/2007", "MPV 2/2007", "PL 1/2007"]))
            .with_listing(2008, &listing(&["PL 1/2007", "PEC 3/2008"]));

        let outcome = gather(&source, 2007..=2008).await;

        assert_eq!(outcome.propositions.len(), 3);
        assert!(outcome.propositions.contains_key("PL12007"));
        assert_eq!(outcome.listed_total(), 5);
        assert_eq!(outcome.stats[0].added, 2);
        assert_eq!(outcome.stats[1].added, 1);
    }

    #[tokio::test]
    async fn merge_is_order_independent() {
        let forward = FakeSource::new()
            .with_listing(2007, &listing(&["PL 1/2007", "PEC 3/2008"]))
            .with_listing(2008, &listing(&["PEC 3/2008", "MPV 2/2008"]));
        let backward = FakeSource::new()
            .with_listing(2007, &listing(&["MPV 2/2008", "PEC 3/2008"]))
            .with_listing(2008, &listing(&["PEC 3/2008", "PL 1/2007"]));

        let a = gather(&forward, 2007..=2008).await;
        let b = gather(&backward, 2007..=2008).await;

        let keys_a: Vec<_> = a.propositions.keys().collect();
        let keys_b: Vec<_> = b.propositions.keys().collect();
        assert_eq!(keys_a, keys_b);
    }

    #[tokio::test]
    async fn bad_names_are_skipped() {
        let source = FakeSource::new().with_listing(
            2007,
            "<proposicoes>\
                <proposicao><nomeProposicao>PL</nomeProposicao></proposicao>\
                <proposicao><nomeProposicao></nomeProposicao></proposicao>\
                <proposicao><nomeProposicao>PL 9/2007</nomeProposicao></proposicao>\
            </proposicoes>",
        );

        let outcome = gather(&source, 2007..=2007).await;
        assert_eq!(outcome.propositions.len(), 1);
        assert_eq!(outcome.stats[0].skipped, 2);
        assert_eq!(outcome.propositions["PL92007"].display_name, "PL 9/2007");
    }

    #[tokio::test]
    async fn failed_year_does_not_stop_gathering() {
        let source = FakeSource::new()
            .with_listing(2008, &listing(&["PL 1/2008"]));

        let outcome = gather(&source, 2007..=2008).await;
        assert!(outcome.stats[0].failed);
        assert!(!outcome.stats[1].failed);
        assert_eq!(outcome.failed_years(), 1);
        assert_eq!(outcome.propositions.len(), 1);
    }

    #[tokio::test]
    async fn empty_listing_is_not_a_failure() {
        let source = FakeSource::new().with_listing(2007, "<proposicoes/>");
        let outcome = gather(&source, 2007..=2007).await;
        assert!(!outcome.stats[0].failed);
        assert_eq!(outcome.stats[0].total, 0);
        assert!(outcome.propositions.is_empty());
    }
}
