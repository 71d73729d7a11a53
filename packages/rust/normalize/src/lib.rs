//! Canonicalization of upstream payloads.
//!
//! The source client hands back a loosely shaped tree: a child that occurs
//! once is an object, twice an array; scalars may carry stray whitespace;
//! optional elements may be missing or empty. This crate turns those trees
//! into the typed records the processor consumes, and owns the small parsers
//! for names, timestamps and party labels.

mod fields;
mod names;
mod records;
mod timestamp;

pub use fields::{as_array, scalar_string};
pub use names::{normalize_party_name, parse_proposition_name};
pub use records::{
    DeputyBallot, ListingEntry, PropositionDetail, VoteEvent, VotingRecord, normalize_detail,
    normalize_listing, normalize_votes,
};
pub use timestamp::parse_timestamp;
