//! Application configuration for the Civis ingester.
//!
//! User config lives at `~/.civis/civis.toml`.
//! CLI flags (and their env vars) override config file values, which override defaults.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CivisError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "civis.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".civis";

// ---------------------------------------------------------------------------
// Config structs (matching civis.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Year range to ingest.
    #[serde(default)]
    pub years: YearsConfig,

    /// Upstream API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Output artifact locations.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// `[years]` section. Both bounds are inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearsConfig {
    #[serde(default = "default_year_begin")]
    pub begin: i32,

    #[serde(default = "default_year_end")]
    pub end: i32,
}

impl Default for YearsConfig {
    fn default() -> Self {
        Self {
            begin: default_year_begin(),
            end: default_year_end(),
        }
    }
}

fn default_year_begin() -> i32 {
    1991
}
fn default_year_end() -> i32 {
    2025
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the SitCamaraWS web service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum in-flight proposition fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.camara.leg.br/SitCamaraWS".into()
}
fn default_concurrency() -> u32 {
    1
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[paths]` section. Relative entries resolve against `output_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root directory for all dataset artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory holding one JSON file per motion.
    #[serde(default = "default_motions_dir")]
    pub motions_dir: String,

    /// Deputy roster artifact.
    #[serde(default = "default_deputies_file")]
    pub deputies_file: String,

    /// Roll-call index artifact.
    #[serde(default = "default_roll_calls_file")]
    pub roll_calls_file: String,

    /// Optional theme lookup table produced by the external classifier.
    #[serde(default = "default_themes_file")]
    pub themes_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            motions_dir: default_motions_dir(),
            deputies_file: default_deputies_file(),
            roll_calls_file: default_roll_calls_file(),
            themes_file: default_themes_file(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_motions_dir() -> String {
    "motions.min".into()
}
fn default_deputies_file() -> String {
    "deputies.json".into()
}
fn default_roll_calls_file() -> String {
    "arrayRollCalls.json".into()
}
fn default_themes_file() -> String {
    "proposicoes_temas.json".into()
}

// ---------------------------------------------------------------------------
// Ingest config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Connection settings for the upstream API client.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the web service (no trailing `/Proposicoes.asmx`).
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Resolved artifact locations.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub motions_dir: PathBuf,
    pub deputies_file: PathBuf,
    pub roll_calls_file: PathBuf,
}

impl OutputPaths {
    /// Resolve the `[paths]` entries against `root`.
    pub fn resolve(paths: &PathsConfig, root: &Path) -> Self {
        Self {
            motions_dir: root.join(&paths.motions_dir),
            deputies_file: root.join(&paths.deputies_file),
            roll_calls_file: root.join(&paths.roll_calls_file),
        }
    }
}

/// Runtime ingest configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// First year to gather (inclusive).
    pub year_begin: i32,
    /// Last year to gather (inclusive).
    pub year_end: i32,
    /// Maximum in-flight proposition fetches.
    pub concurrency: usize,
    /// Upstream client settings.
    pub source: SourceConfig,
    /// Where the dataset is written.
    pub output: OutputPaths,
    /// Theme lookup table, if one should be applied.
    pub themes_file: Option<PathBuf>,
}

impl From<&AppConfig> for IngestConfig {
    fn from(config: &AppConfig) -> Self {
        let root = PathBuf::from(&config.paths.output_dir);
        Self {
            year_begin: config.years.begin,
            year_end: config.years.end,
            concurrency: config.api.concurrency as usize,
            source: SourceConfig {
                base_url: config.api.base_url.clone(),
                timeout_secs: config.api.timeout_secs,
            },
            output: OutputPaths::resolve(&config.paths, &root),
            themes_file: Some(root.join(&config.paths.themes_file)),
        }
    }
}

impl IngestConfig {
    /// The inclusive year range to gather.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.year_begin..=self.year_end
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.year_begin > self.year_end {
            return Err(CivisError::config(format!(
                "year range is empty: begin {} is after end {}",
                self.year_begin, self.year_end
            )));
        }
        if self.concurrency == 0 {
            return Err(CivisError::config("concurrency must be a positive integer"));
        }
        if self.source.timeout_secs == 0 {
            return Err(CivisError::config("timeout_secs must be a positive integer"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.civis/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CivisError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.civis/civis.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CivisError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CivisError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CivisError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| CivisError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CivisError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("arrayRollCalls.json"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.years.begin, 1991);
        assert_eq!(parsed.api.concurrency, 1);
        assert_eq!(parsed.api.timeout_secs, 30);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[years]
begin = 2007
end = 2008

[api]
concurrency = 4
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.years.begin, 2007);
        assert_eq!(config.api.concurrency, 4);
        assert_eq!(config.api.base_url, "https://www.camara.leg.br/SitCamaraWS");
        assert_eq!(config.paths.motions_dir, "motions.min");
    }

    #[test]
    fn ingest_config_from_app_config() {
        let mut app = AppConfig::default();
        app.paths.output_dir = "/data/civis".into();
        let ingest = IngestConfig::from(&app);

        assert_eq!(ingest.years(), 1991..=2025);
        assert_eq!(ingest.concurrency, 1);
        assert_eq!(ingest.source.timeout_secs, 30);
        assert_eq!(
            ingest.output.motions_dir,
            PathBuf::from("/data/civis/motions.min")
        );
        assert_eq!(
            ingest.themes_file,
            Some(PathBuf::from("/data/civis/proposicoes_temas.json"))
        );
        assert!(ingest.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_years() {
        let mut ingest = IngestConfig::from(&AppConfig::default());
        ingest.year_begin = 2010;
        ingest.year_end = 2009;
        let err = ingest.validate().unwrap_err();
        assert!(err.to_string().contains("year range is empty"));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut ingest = IngestConfig::from(&AppConfig::default());
        ingest.concurrency = 0;
        assert!(ingest.validate().is_err());
    }
}
