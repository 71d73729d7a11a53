//! In-memory aggregation of motions, deputies and roll calls.

use std::collections::HashMap;

use tracing::trace;

use civis_normalize::{PropositionDetail, VotingRecord, normalize_party_name};
use civis_shared::{
    Dataset, Deputy, Motion, NO_THEME, PropositionKey, RollCall, RollCallIndexEntry, Vote,
    VoteCode,
};

use crate::identity::DeputyRegistry;
use crate::themes::ThemeTable;

/// Handle to a motion held by a [`MotionProcessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionId(usize);

/// Owns the entity collections of one ingest run.
///
/// Mutation goes through `&mut self`, so callers that fetch concurrently
/// must funnel results through a single owner.
#[derive(Debug, Default)]
pub struct MotionProcessor {
    motions: Vec<Motion>,
    by_key: HashMap<String, usize>,
    deputies: DeputyRegistry,
    roll_call_index: Vec<RollCallIndexEntry>,
    themes: ThemeTable,
}

impl MotionProcessor {
    pub fn new(themes: ThemeTable) -> Self {
        Self {
            themes,
            ..Self::default()
        }
    }

    /// Register a motion from its detail record.
    ///
    /// Returns `None` when the record lacks type, number or year. A key that
    /// is already registered returns the existing motion unchanged.
    pub fn set_motion(&mut self, detail: &PropositionDetail) -> Option<MotionId> {
        let key = detail.key()?;
        let composite = key.composite();

        if let Some(&index) = self.by_key.get(&composite) {
            return Some(MotionId(index));
        }

        let theme = self
            .themes
            .get(&key)
            .map(str::to_string)
            .or_else(|| detail.theme.clone())
            .unwrap_or_else(|| NO_THEME.to_string());

        let index = self.motions.len();
        self.motions.push(Motion {
            kind: key.kind,
            number: key.number,
            year: key.year,
            date: detail.presented_on.clone(),
            author: detail.author.clone(),
            amendment: detail.ementa.clone(),
            tags: detail.indexing.clone(),
            status: detail.status.clone(),
            theme,
            roll_calls: Vec::new(),
        });
        self.by_key.insert(composite, index);

        Some(MotionId(index))
    }

    /// Attach the roll calls of a vote record to a motion.
    ///
    /// Every vote event adds one index entry and one roll call, even when
    /// none of its ballots carry a recognized vote. Ballots with any other
    /// vote text are dropped before identity resolution.
    pub fn set_roll_call(&mut self, motion: MotionId, record: &VotingRecord) {
        let Some(events) = &record.events else {
            return;
        };
        if motion.0 >= self.motions.len() {
            return;
        }

        let mut roll_calls = Vec::with_capacity(events.len());
        let mut dropped = 0usize;

        for event in events {
            self.roll_call_index.push(RollCallIndexEntry {
                kind: record.kind.clone(),
                year: record.year.clone(),
                number: record.number.clone(),
                datetime: event.timestamp,
            });

            let mut votes = Vec::with_capacity(event.ballots.len());
            for ballot in &event.ballots {
                let Some(code) = VoteCode::from_text(&ballot.vote) else {
                    dropped += 1;
                    continue;
                };
                let deputy_id = self.deputies.resolve(&ballot.name, &ballot.district);
                votes.push(Vote {
                    deputy_id,
                    vote: code,
                    party: normalize_party_name(&ballot.party),
                });
            }

            roll_calls.push(RollCall {
                datetime: event.timestamp,
                object: event.object.clone(),
                summary: event.summary.clone(),
                votes,
            });
        }

        if dropped > 0 {
            trace!(dropped, "ignored ballots with unrecognized vote text");
        }

        self.motions[motion.0].roll_calls.extend(roll_calls);
    }

    pub fn motion(&self, id: MotionId) -> Option<&Motion> {
        self.motions.get(id.0)
    }

    pub fn motions(&self) -> &[Motion] {
        &self.motions
    }

    pub fn deputies(&self) -> &[Deputy] {
        self.deputies.roster()
    }

    pub fn roll_call_index(&self) -> &[RollCallIndexEntry] {
        &self.roll_call_index
    }

    /// Whether a motion with this composite key is already registered.
    pub fn contains(&self, key: &PropositionKey) -> bool {
        self.by_key.contains_key(&key.composite())
    }

    /// Hand the aggregated collections over for persistence.
    pub fn into_dataset(self) -> Dataset {
        Dataset {
            motions: self.motions,
            deputies: self.deputies.into_roster(),
            roll_calls: self.roll_call_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civis_normalize::{DeputyBallot, VoteEvent};

    fn detail(kind: &str, number: &str, year: &str) -> PropositionDetail {
        PropositionDetail {
            kind: Some(kind.into()),
            number: Some(number.into()),
            year: Some(year.into()),
            ementa: Some("Dispõe sobre...".into()),
            ..PropositionDetail::default()
        }
    }

    fn ballot(name: &str, party: &str, vote: &str) -> DeputyBallot {
        DeputyBallot {
            name: name.into(),
            district: "SP".into(),
            party: party.into(),
            vote: vote.into(),
        }
    }

    fn record(events: Vec<VoteEvent>) -> VotingRecord {
        VotingRecord {
            kind: "PL".into(),
            number: "1".into(),
            year: "2007".into(),
            events: Some(events),
        }
    }

    fn event(ballots: Vec<DeputyBallot>) -> VoteEvent {
        VoteEvent {
            timestamp: None,
            object: "SUBSTITUTIVO".into(),
            summary: "Aprovado".into(),
            ballots,
        }
    }

    #[test]
    fn set_motion_requires_identity() {
        let mut processor = MotionProcessor::default();
        let mut incomplete = detail("PL", "1", "2007");
        incomplete.year = None;
        assert_eq!(processor.set_motion(&incomplete), None);
        assert!(processor.motions().is_empty());
    }

    #[test]
    fn set_motion_deduplicates_by_composite_key() {
        let mut processor = MotionProcessor::default();
        let a = processor.set_motion(&detail("PL", "1", "2007")).unwrap();

        let mut again = detail("PL", "1", "2007");
        again.ementa = Some("outra".into());
        let b = processor.set_motion(&again).unwrap();

        assert_eq!(a, b);
        assert!(processor.contains(&PropositionKey::new("PL", "1", "2007")));
        assert!(!processor.contains(&PropositionKey::new("PL", "1", "2008")));
        assert_eq!(processor.motions().len(), 1);
        assert_eq!(processor.motions()[0].amendment.as_deref(), Some("Dispõe sobre..."));
    }

    #[test]
    fn theme_precedence() {
        let themes = ThemeTable::from_json(
            r#"[{"tipo": "PL", "numero": "1", "ano": "2007", "temaPredito": "Saúde"}]"#,
        )
        .unwrap();
        let mut processor = MotionProcessor::new(themes);

        let mut with_source_theme = detail("PL", "1", "2007");
        with_source_theme.theme = Some("Economia".into());
        let table = processor.set_motion(&with_source_theme).unwrap();
        assert_eq!(processor.motion(table).unwrap().theme, "Saúde");

        let mut source_only = detail("PL", "2", "2007");
        source_only.theme = Some("Economia".into());
        let source = processor.set_motion(&source_only).unwrap();
        assert_eq!(processor.motion(source).unwrap().theme, "Economia");

        let none = processor.set_motion(&detail("PL", "3", "2007")).unwrap();
        assert_eq!(processor.motion(none).unwrap().theme, NO_THEME);
    }

    #[test]
    fn roll_call_encodes_votes_and_parties() {
        let mut processor = MotionProcessor::default();
        let id = processor.set_motion(&detail("PL", "1", "2007")).unwrap();

        processor.set_roll_call(
            id,
            &record(vec![event(vec![
                ballot("Fulano", "PT", "Sim"),
                ballot("Beltrano", "Novo", "Não"),
                ballot("Ciclano", "PSDB", "Art. 17"),
            ])]),
        );

        let motion = processor.motion(id).unwrap();
        assert_eq!(motion.roll_calls.len(), 1);
        let votes = &motion.roll_calls[0].votes;
        assert_eq!(votes.len(), 3);
        assert_eq!(votes[0].vote, VoteCode::Yes);
        assert_eq!(votes[1].party, "NOVO");
        assert_eq!(votes[2].vote, VoteCode::Art17);
        assert_eq!(votes[2].deputy_id, 2);
    }

    #[test]
    fn unrecognized_votes_are_dropped_before_identity() {
        let mut processor = MotionProcessor::default();
        let id = processor.set_motion(&detail("PL", "1", "2007")).unwrap();

        processor.set_roll_call(
            id,
            &record(vec![event(vec![
                ballot("Ausente", "PT", "Ausente"),
                ballot("Fulano", "PT", "Sim"),
                ballot("Outro", "PT", ""),
            ])]),
        );

        let votes = &processor.motion(id).unwrap().roll_calls[0].votes;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].deputy_id, 0);
        assert_eq!(processor.deputies().len(), 1);
        assert_eq!(processor.deputies()[0].name, "FULANO");
    }

    #[test]
    fn every_event_yields_index_entry_and_roll_call() {
        let mut processor = MotionProcessor::default();
        let id = processor.set_motion(&detail("PL", "1", "2007")).unwrap();

        processor.set_roll_call(
            id,
            &record(vec![
                event(vec![ballot("Fulano", "PT", "Ausente")]),
                event(vec![]),
            ]),
        );

        assert_eq!(processor.motion(id).unwrap().roll_calls.len(), 2);
        assert_eq!(processor.roll_call_index().len(), 2);
        assert_eq!(processor.roll_call_index()[0].kind, "PL");
        assert!(processor.deputies().is_empty());
    }

    #[test]
    fn record_without_events_is_noop() {
        let mut processor = MotionProcessor::default();
        let id = processor.set_motion(&detail("PL", "1", "2007")).unwrap();

        let mut empty = record(vec![]);
        empty.events = None;
        processor.set_roll_call(id, &empty);

        assert!(processor.motion(id).unwrap().roll_calls.is_empty());
        assert!(processor.roll_call_index().is_empty());
    }

    #[test]
    fn shared_deputy_across_motions() {
        let mut processor = MotionProcessor::default();
        let a = processor.set_motion(&detail("PL", "1", "2007")).unwrap();
        let b = processor.set_motion(&detail("PEC", "2", "2008")).unwrap();

        processor.set_roll_call(
            a,
            &record(vec![event(vec![ballot("Andre Vargas", "PT", "Sim")])]),
        );
        processor.set_roll_call(
            b,
            &record(vec![event(vec![ballot("ANDRÉ VARGAS", "PT", "Não")])]),
        );

        let dataset = processor.into_dataset();
        assert_eq!(dataset.motions.len(), 2);
        assert_eq!(dataset.deputies.len(), 1);
        assert_eq!(dataset.roll_calls.len(), 2);
        assert_eq!(dataset.motions[1].roll_calls[0].votes[0].deputy_id, 0);
    }
}
