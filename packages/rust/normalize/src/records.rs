//! Typed records for the three upstream payloads.
//!
//! Each `normalize_*` function is total over the shapes the XML tree can
//! take: downstream code never has to ask whether a collection arrived as a
//! single object or as an array.

use chrono::{DateTime, Utc};
use serde_json::Value;

use civis_shared::{CivisError, PropositionKey, Result};

use crate::fields::{as_array, scalar_string, text_or_empty};
use crate::timestamp::parse_timestamp;

// ---------------------------------------------------------------------------
// ListarProposicoesVotadasEmPlenario
// ---------------------------------------------------------------------------

/// One row of a year's plenary-voted listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Free-text display name, e.g. `"PL 1234/2007"`. `None` when blank.
    pub name: Option<String>,
}

/// Read the rows of a listing payload. A listing with no rows is empty, not an error.
pub fn normalize_listing(tree: &Value) -> Vec<ListingEntry> {
    let rows = tree.get("proposicoes").and_then(|p| p.get("proposicao"));
    as_array(rows)
        .into_iter()
        .map(|row| ListingEntry {
            name: scalar_string(row.get("nomeProposicao")),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ObterProposicao
// ---------------------------------------------------------------------------

/// Canonical proposition detail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropositionDetail {
    pub kind: Option<String>,
    pub number: Option<String>,
    pub year: Option<String>,
    pub display_name: Option<String>,
    pub presented_on: Option<String>,
    pub author: Option<String>,
    pub ementa: Option<String>,
    pub indexing: Option<String>,
    pub status: Option<String>,
    /// Theme published by the source itself, if any.
    pub theme: Option<String>,
}

impl PropositionDetail {
    /// The identifying triple, or `None` if any part is missing.
    pub fn key(&self) -> Option<PropositionKey> {
        match (&self.kind, &self.number, &self.year) {
            (Some(kind), Some(number), Some(year)) => Some(PropositionKey::new(kind, number, year)),
            _ => None,
        }
    }
}

/// Normalize an `ObterProposicao` payload.
pub fn normalize_detail(tree: &Value) -> Result<PropositionDetail> {
    let node = proposition_node(tree)?;
    Ok(PropositionDetail {
        kind: scalar_string(node.get("tipo")),
        number: scalar_string(node.get("numero")),
        year: scalar_string(node.get("ano")),
        display_name: scalar_string(node.get("nomeProposicao")),
        presented_on: scalar_string(node.get("DataApresentacao")),
        author: scalar_string(node.get("Autor")),
        ementa: scalar_string(node.get("Ementa")),
        indexing: scalar_string(node.get("Indexacao")),
        status: scalar_string(node.get("Situacao")),
        theme: scalar_string(node.get("tema")),
    })
}

// ---------------------------------------------------------------------------
// ObterVotacaoProposicao
// ---------------------------------------------------------------------------

/// Canonical vote record of one proposition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VotingRecord {
    /// `Sigla`, trimmed; empty when absent.
    pub kind: String,
    pub number: String,
    pub year: String,
    /// `None` when the payload has no `Votacoes/Votacao` collection at all.
    pub events: Option<Vec<VoteEvent>>,
}

/// One `Votacao` element.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteEvent {
    pub timestamp: Option<DateTime<Utc>>,
    pub object: String,
    pub summary: String,
    pub ballots: Vec<DeputyBallot>,
}

/// One `Deputado` entry inside `votos`. Every field is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeputyBallot {
    pub name: String,
    pub district: String,
    pub party: String,
    pub vote: String,
}

/// Normalize an `ObterVotacaoProposicao` payload.
pub fn normalize_votes(tree: &Value) -> Result<VotingRecord> {
    let node = proposition_node(tree)?;

    let events: Option<Vec<VoteEvent>> = node
        .get("Votacoes")
        .and_then(|v| v.get("Votacao"))
        .map(|raw| as_array(Some(raw)).into_iter().map(vote_event).collect());

    Ok(VotingRecord {
        kind: text_or_empty(node, "Sigla"),
        number: text_or_empty(node, "Numero"),
        year: text_or_empty(node, "Ano"),
        events,
    })
}

fn vote_event(node: &Value) -> VoteEvent {
    let date = scalar_string(node.get("Data"));
    let time = scalar_string(node.get("Hora"));

    let deputies = node.get("votos").and_then(|v| v.get("Deputado"));
    let ballots = as_array(deputies)
        .into_iter()
        .filter(|d| d.is_object())
        .map(|d| DeputyBallot {
            name: text_or_empty(d, "Nome"),
            district: text_or_empty(d, "UF"),
            party: text_or_empty(d, "Partido"),
            vote: text_or_empty(d, "Voto"),
        })
        .collect();

    VoteEvent {
        timestamp: parse_timestamp(date.as_deref(), time.as_deref()),
        object: text_or_empty(node, "ObjVotacao"),
        summary: text_or_empty(node, "Resumo"),
        ballots,
    }
}

fn proposition_node(tree: &Value) -> Result<&Value> {
    tree.get("proposicao")
        .filter(|node| node.is_object())
        .ok_or_else(|| CivisError::parse("payload has no <proposicao> element"))
}
