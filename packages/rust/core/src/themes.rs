//! Theme lookup table and theme backlog report.
//!
//! Themes come from an external classifier that writes a JSON array of
//! `{tipo, numero, ano, temaPredito}` rows. The ingester only reads that
//! output; the backlog report tells the classifier what is left to do.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use civis_normalize::{as_array, scalar_string};
use civis_shared::{CivisError, Motion, NO_THEME, PropositionKey, Result};

// ---------------------------------------------------------------------------
// ThemeTable
// ---------------------------------------------------------------------------

/// Predicted theme per proposition, keyed `"{tipo}-{numero}-{ano}"`.
#[derive(Debug, Clone, Default)]
pub struct ThemeTable {
    themes: HashMap<String, String>,
}

impl ThemeTable {
    /// Load the table from disk.
    ///
    /// A missing or unreadable file yields an empty table and a warning;
    /// themes are an enrichment, never a reason to abort a run.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "could not load themes file, continuing without themes");
                return Self::default();
            }
        };

        match Self::from_json(&content) {
            Ok(table) => {
                info!(themes = table.len(), "loaded themes");
                table
            }
            Err(e) => {
                warn!(error = %e, "could not parse themes file, continuing without themes");
                Self::default()
            }
        }
    }

    /// Parse the classifier output.
    ///
    /// `temaPredito` may be a string or a list of candidates, in which case
    /// the first one is taken. Rows without a usable theme are skipped.
    pub fn from_json(content: &str) -> Result<Self> {
        let rows: Value = serde_json::from_str(content)
            .map_err(|e| CivisError::validation(format!("invalid themes JSON: {e}")))?;
        if !rows.is_array() {
            return Err(CivisError::validation("themes file must hold a JSON array"));
        }

        let mut themes = HashMap::new();
        for row in as_array(Some(&rows)) {
            let (Some(kind), Some(number), Some(year)) = (
                scalar_string(row.get("tipo")),
                scalar_string(row.get("numero")),
                scalar_string(row.get("ano")),
            ) else {
                debug!(?row, "theme row without identity, skipping");
                continue;
            };

            let predicted = row.get("temaPredito");
            let theme = match predicted {
                Some(Value::Array(candidates)) => scalar_string(candidates.first()),
                other => scalar_string(other),
            };

            if let Some(theme) = theme {
                let key = PropositionKey::new(&kind, &number, &year);
                themes.insert(key.theme_key(), theme);
            }
        }

        Ok(Self { themes })
    }

    pub fn get(&self, key: &PropositionKey) -> Option<&str> {
        self.themes.get(&key.theme_key()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ThemeBacklog
// ---------------------------------------------------------------------------

/// A motion whose theme is still a `;`-separated candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiThemed {
    pub file: String,
    pub candidates: Vec<String>,
}

/// What the theme classifier still has to do over a written motions directory.
#[derive(Debug, Clone, Default)]
pub struct ThemeBacklog {
    /// Motion files read.
    pub scanned: usize,
    /// Every individual theme in use, sorted.
    pub themes: Vec<String>,
    /// Files of motions with no theme at all.
    pub unthemed: Vec<String>,
    /// Motions with more than one candidate theme.
    pub multi_themed: Vec<MultiThemed>,
}

impl ThemeBacklog {
    /// Scan every `*.json` motion file under `dir`.
    ///
    /// Files that do not parse as a motion are skipped with a warning.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| CivisError::io(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut backlog = Self::default();
        let mut themes = BTreeSet::new();

        for path in &files {
            let motion = match read_motion(path) {
                Ok(motion) => motion,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable motion file");
                    continue;
                }
            };
            backlog.scanned += 1;

            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if motion.theme == NO_THEME {
                backlog.unthemed.push(file);
                continue;
            }

            let candidates: Vec<String> = motion
                .theme
                .split(';')
                .map(|t| t.trim().to_string())
                .collect();
            themes.extend(candidates.iter().cloned());
            if candidates.len() > 1 {
                backlog.multi_themed.push(MultiThemed { file, candidates });
            }
        }

        backlog.themes = themes.into_iter().collect();

        info!(
            scanned = backlog.scanned,
            themes = backlog.themes.len(),
            unthemed = backlog.unthemed.len(),
            multi_themed = backlog.multi_themed.len(),
            "theme backlog scanned"
        );

        Ok(backlog)
    }

    /// Motions the classifier still has to touch.
    pub fn pending(&self) -> usize {
        self.unthemed.len() + self.multi_themed.len()
    }
}

fn read_motion(path: &Path) -> Result<Motion> {
    let content = std::fs::read_to_string(path).map_err(|e| CivisError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| CivisError::validation(format!("invalid motion JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("civis-themes-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn motion_json(kind: &str, number: &str, theme: &str) -> String {
        serde_json::json!({
            "type": kind,
            "number": number,
            "year": "2007",
            "theme": theme,
            "rollCalls": []
        })
        .to_string()
    }

    #[test]
    fn table_accepts_string_and_list_themes() {
        let table = ThemeTable::from_json(
            r#"[
                {"tipo": "PL", "numero": "1234", "ano": "2007", "temaPredito": "Saúde"},
                {"tipo": "PEC", "numero": 2, "ano": 2008, "temaPredito": ["Educação", "Cultura"]},
                {"tipo": "MPV", "numero": "3", "ano": "2009"},
                {"numero": "4", "ano": "2009", "temaPredito": "Economia"}
            ]"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&PropositionKey::new("PL", "1234", "2007")), Some("Saúde"));
        assert_eq!(table.get(&PropositionKey::new("PEC", "2", "2008")), Some("Educação"));
        assert_eq!(table.get(&PropositionKey::new("MPV", "3", "2009")), None);
    }

    #[test]
    fn table_rejects_non_array() {
        assert!(ThemeTable::from_json(r#"{"tipo": "PL"}"#).is_err());
        assert!(ThemeTable::from_json("not json").is_err());
    }

    #[test]
    fn missing_table_file_is_empty() {
        let tmp = temp_dir();
        let table = ThemeTable::load(&tmp.join("does-not-exist.json"));
        assert!(table.is_empty());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn table_loads_from_disk() {
        let tmp = temp_dir();
        let path = tmp.join("proposicoes_temas.json");
        std::fs::write(
            &path,
            r#"[{"tipo": "PL", "numero": "1", "ano": "2007", "temaPredito": "Saúde"}]"#,
        )
        .unwrap();

        let table = ThemeTable::load(&path);
        assert_eq!(table.get(&PropositionKey::new("PL", "1", "2007")), Some("Saúde"));
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn backlog_partitions_motions() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("PL12007.json"), motion_json("PL", "1", NO_THEME)).unwrap();
        std::fs::write(tmp.join("PL22007.json"), motion_json("PL", "2", "Saúde")).unwrap();
        std::fs::write(
            tmp.join("PL32007.json"),
            motion_json("PL", "3", "Economia; Saúde"),
        )
        .unwrap();
        std::fs::write(tmp.join("broken.json"), "{").unwrap();
        std::fs::write(tmp.join("notes.txt"), "ignored").unwrap();

        let backlog = ThemeBacklog::scan(&tmp).unwrap();
        assert_eq!(backlog.scanned, 3);
        assert_eq!(backlog.themes, vec!["Economia".to_string(), "Saúde".to_string()]);
        assert_eq!(backlog.unthemed, vec!["PL12007.json".to_string()]);
        assert_eq!(
            backlog.multi_themed,
            vec![MultiThemed {
                file: "PL32007.json".into(),
                candidates: vec!["Economia".into(), "Saúde".into()],
            }]
        );
        assert_eq!(backlog.pending(), 2);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn backlog_of_missing_dir_is_io_error() {
        let tmp = temp_dir();
        let err = ThemeBacklog::scan(&tmp.join("missing")).unwrap_err();
        assert!(matches!(err, CivisError::Io { .. }));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
