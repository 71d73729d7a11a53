//! Deputy identity resolution.
//!
//! A deputy's identity is their canonical name: the raw name trimmed,
//! upper-cased and run through a fixed table of known misspellings. The
//! first canonical name seen gets id 0, the next new one id 1, and so on.

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::trace;

use civis_shared::Deputy;

/// Upper-cased spellings seen upstream, mapped to the canonical name.
static NAME_CORRECTIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ANDRE VARGAS", "ANDRÉ VARGAS"),
        ("JOSE STÉDILE", "JOSÉ STÉDILE"),
        ("DUDIMAR PAXIUBA", "DUDIMAR PAXIÚBA"),
        ("MARCIO REINALDO MOREIRA", "MÁRCIO REINALDO MOREIRA"),
        ("FELIX MENDONÇA JÚNIOR", "FÉLIX MENDONÇA JÚNIOR"),
        ("FABIO TRAD", "FÁBIO TRAD"),
        ("JOÃO PAULO  LIMA", "JOÃO PAULO LIMA"),
        ("JERONIMO GOERGEN", "JERÔNIMO GOERGEN"),
        ("JAIRO ATAIDE", "JAIRO ATAÍDE"),
        ("OSMAR  TERRA", "OSMAR TERRA"),
        ("MARCIO MARINHO", "MÁRCIO MARINHO"),
        ("LAERCIO OLIVEIRA", "LAÉRCIO OLIVEIRA"),
        ("EMILIA FERNANDES", "EMÍLIA FERNANDES"),
        ("SIBA MACHADO", "SIBÁ MACHADO"),
        ("JOAO ANANIAS", "JOÃO ANANIAS"),
        ("PADRE JOAO", "PADRE JOÃO"),
        ("JOSE HUMBERTO", "JOSÉ HUMBERTO"),
        ("ROGERIO CARVALHO", "ROGÉRIO CARVALHO"),
        ("JOSÉ  C. STANGARLINI", "JOSÉ C. STANGARLINI"),
        ("JOSÉ C STANGARLINI", "JOSÉ C. STANGARLINI"),
        ("MANUELA DÁVILA", "MANUELA D`ÁVILA"),
        ("CHICO DANGELO", "CHICO D`ANGELO"),
        ("VANESSA  GRAZZIOTIN", "VANESSA GRAZZIOTIN"),
        ("FRANCISCO TENORIO", "FRANCISCO TENÓRIO"),
        ("CLAUDIO DIAZ", "CLÁUDIO DIAZ"),
        ("DR. PAULO CESAR", "DR. PAULO CÉSAR"),
        ("ANDRE ZACHAROW", "ANDRÉ ZACHAROW"),
        ("ISAIAS SILVESTRE", "ISAÍAS SILVESTRE"),
        ("LEO ALCÂNTARA", "LÉO ALCÂNTARA"),
        ("CARLOS  MELLES", "CARLOS MELLES"),
        ("DAVI ALVES SILVA JUNIOR", "DAVI ALVES SILVA JÚNIOR"),
        ("WELINTON FAGUNDES", "WELLINGTON FAGUNDES"),
        ("WELLINTON FAGUNDES", "WELLINGTON FAGUNDES"),
        ("SERGIO CAIADO", "SÉRGIO CAIADO"),
        ("TARCISIO ZIMMERMANN", "TARCÍSIO ZIMMERMANN"),
        ("CLAUDIO RORATO", "CLÁUDIO RORATO"),
        ("MARCIO BITTAR", "MÁRCIO BITTAR"),
    ])
});

/// Canonical form of a raw deputy name.
pub fn canonical_name(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    match NAME_CORRECTIONS.get(upper.as_str()) {
        Some(corrected) => (*corrected).to_string(),
        None => upper,
    }
}

/// Name → id phonebook plus the roster in id order.
#[derive(Debug, Default)]
pub struct DeputyRegistry {
    ids: HashMap<String, u32>,
    roster: Vec<Deputy>,
}

impl DeputyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for this deputy, registering them on first sight.
    ///
    /// The district recorded is the one from the first sighting; later
    /// sightings under another district keep the existing record.
    pub fn resolve(&mut self, raw_name: &str, district: &str) -> u32 {
        let name = canonical_name(raw_name);
        if let Some(&id) = self.ids.get(&name) {
            return id;
        }

        let id = self.roster.len() as u32;
        trace!(id, name = %name, "registered deputy");
        self.ids.insert(name.clone(), id);
        self.roster.push(Deputy {
            id,
            name,
            district: district.trim().to_string(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Registered deputies, ordered by id.
    pub fn roster(&self) -> &[Deputy] {
        &self.roster
    }

    pub fn into_roster(self) -> Vec<Deputy> {
        self.roster
    }
}
