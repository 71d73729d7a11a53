//! Proposition-name and party-label parsing.

use std::sync::LazyLock;

use regex::Regex;

use civis_shared::{CivisError, PropositionKey, Result};

/// Split a display name such as `"PL 1234/2007"` into its key.
///
/// The name is tokenized into ASCII word runs; the first three are type,
/// number and year. Anything after them (`"PEC 2/2007 => PEC 1/2007"`) is
/// ignored.
pub fn parse_proposition_name(name: &str) -> Result<PropositionKey> {
    static WORD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid regex"));

    let mut words = WORD_RE.find_iter(name).map(|m| m.as_str());
    match (words.next(), words.next(), words.next()) {
        (Some(kind), Some(number), Some(year)) => Ok(PropositionKey::new(kind, number, year)),
        _ => Err(CivisError::parse(format!(
            "invalid proposition name format: {name:?}"
        ))),
    }
}

/// Map legacy or misspelled party labels to their current form.
pub fn normalize_party_name(party: &str) -> String {
    let party = party.trim();
    match party {
        "Rede" => "REDE",
        "Cidadania" => "CIDADANIA",
        "Novo" => "NOVO",
        "Republican" => "Republicanos",
        other => other,
    }
    .to_string()
}
