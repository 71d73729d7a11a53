//! Dataset entities produced by an ingest run.
//!
//! The serialized field names are the ones downstream consumers of the
//! dataset already read (`rollCalls`, `deputyID`, `obj`, ...).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Theme assigned when neither the theme table nor the source provides one.
pub const NO_THEME: &str = "NO THEME";

/// Property holding the text of an XML element that also has attributes or children.
pub const XML_TEXT_KEY: &str = "#text";

// ---------------------------------------------------------------------------
// PropositionKey
// ---------------------------------------------------------------------------

/// The (type, number, year) triple identifying a proposition.
///
/// All three parts are trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropositionKey {
    #[serde(rename = "type")]
    pub kind: String,
    pub number: String,
    pub year: String,
}

impl PropositionKey {
    pub fn new(kind: &str, number: &str, year: &str) -> Self {
        Self {
            kind: kind.trim().to_string(),
            number: number.trim().to_string(),
            year: year.trim().to_string(),
        }
    }

    /// Composite key `"{type}{number}{year}"` used for motion dedup and file names.
    pub fn composite(&self) -> String {
        format!("{}{}{}", self.kind, self.number, self.year)
    }

    /// Key used by the theme lookup table, `"{type}-{number}-{year}"`.
    pub fn theme_key(&self) -> String {
        format!("{}-{}-{}", self.kind, self.number, self.year)
    }
}

impl fmt::Display for PropositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.number, self.year)
    }
}

// ---------------------------------------------------------------------------
// VoteCode
// ---------------------------------------------------------------------------

/// The six recognized vote values, serialized as their integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteCode {
    Yes = 0,
    No = 1,
    Abstention = 2,
    Obstruction = 3,
    Art17 = 4,
    Blank = 5,
}

impl VoteCode {
    /// Map the upstream vote text. Anything outside the six values is `None`.
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "Sim" => Some(Self::Yes),
            "Não" => Some(Self::No),
            "Abstenção" => Some(Self::Abstention),
            "Obstrução" => Some(Self::Obstruction),
            "Art. 17" => Some(Self::Art17),
            "Branco" => Some(Self::Blank),
            _ => None,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Yes),
            1 => Some(Self::No),
            2 => Some(Self::Abstention),
            3 => Some(Self::Obstruction),
            4 => Some(Self::Art17),
            5 => Some(Self::Blank),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Serialize for VoteCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for VoteCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown vote code {code}")))
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// One deputy's vote inside a roll call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "deputyID")]
    pub deputy_id: u32,
    pub vote: VoteCode,
    pub party: String,
}

/// One voting event attached to a motion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollCall {
    /// Absent when the source date or time could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(rename = "obj")]
    pub object: String,
    pub summary: String,
    pub votes: Vec<Vote>,
}

/// A legislative proposition with its roll calls, one per composite key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motion {
    #[serde(rename = "type")]
    pub kind: String,
    pub number: String,
    pub year: String,
    /// Presentation date as published upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// The "ementa" text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amendment: Option<String>,
    /// Free-form indexing tags ("indexacao").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// [`NO_THEME`], a single theme, or a `;`-separated candidate list.
    pub theme: String,
    #[serde(rename = "rollCalls", default)]
    pub roll_calls: Vec<RollCall>,
}

impl Motion {
    pub fn key(&self) -> PropositionKey {
        PropositionKey::new(&self.kind, &self.number, &self.year)
    }

    /// File name of this motion's artifact, `"{type}{number}{year}.json"`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.key().composite())
    }
}

/// A legislator, one per canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deputy {
    #[serde(rename = "deputyID")]
    pub id: u32,
    pub name: String,
    pub district: String,
}

/// Flat, dataset-wide pointer from a roll call back to its motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollCallIndexEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub year: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
}

/// The three entity collections handed to the dataset writer.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub motions: Vec<Motion>,
    pub deputies: Vec<Deputy>,
    pub roll_calls: Vec<RollCallIndexEntry>,
}
