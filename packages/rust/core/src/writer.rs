//! Persistence of the three dataset artifacts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use civis_shared::{CivisError, Dataset, OutputPaths, Result};

/// What a write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub motions_written: usize,
    /// Stale motion files removed before writing.
    pub motions_cleared: usize,
    pub deputies: usize,
    pub roll_calls: usize,
}

/// Writes a [`Dataset`] to its configured locations.
///
/// Layout:
/// ```text
/// <deputies_file>      roster, ordered by id
/// <roll_calls_file>    roll-call index, ascending by timestamp
/// <motions_dir>/
///   {type}{number}{year}.json
/// ```
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    paths: OutputPaths,
}

impl DatasetWriter {
    pub fn new(paths: &OutputPaths) -> Self {
        Self {
            paths: paths.clone(),
        }
    }

    /// Write all three artifacts, replacing any previous run's output.
    ///
    /// Each file goes to a temp sibling first and is renamed into place, so
    /// a failure leaves earlier files complete and no partial file behind.
    #[instrument(skip_all, fields(motions = dataset.motions.len()))]
    pub fn write(&self, dataset: Dataset) -> Result<WriteSummary> {
        let Dataset {
            motions,
            deputies,
            mut roll_calls,
        } = dataset;

        write_json(&self.paths.deputies_file, &deputies)?;
        info!(count = deputies.len(), path = %self.paths.deputies_file.display(), "saved deputies");

        // Stable: entries without a timestamp sort first, in aggregation order.
        roll_calls.sort_by_key(|entry| entry.datetime);
        write_json(&self.paths.roll_calls_file, &roll_calls)?;
        info!(
            count = roll_calls.len(),
            path = %self.paths.roll_calls_file.display(),
            "saved roll calls"
        );

        let motions_dir = &self.paths.motions_dir;
        let motions_cleared = clear_motions_dir(motions_dir)?;
        std::fs::create_dir_all(motions_dir).map_err(|e| CivisError::io(motions_dir, e))?;

        for motion in &motions {
            write_json(&motions_dir.join(motion.file_name()), motion)?;
        }
        info!(count = motions.len(), path = %motions_dir.display(), "saved motions");

        Ok(WriteSummary {
            motions_written: motions.len(),
            motions_cleared,
            deputies: deputies.len(),
            roll_calls: roll_calls.len(),
        })
    }
}

/// Remove the `*.json` files of a previous run. A missing directory is fine.
fn clear_motions_dir(dir: &Path) -> Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(CivisError::io(dir, e)),
    };

    let mut cleared = 0;
    for entry in entries {
        let path = entry.map_err(|e| CivisError::io(dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
            std::fs::remove_file(&path).map_err(|e| CivisError::io(&path, e))?;
            cleared += 1;
        }
    }

    debug!(cleared, "cleared existing motion files");
    Ok(cleared)
}

/// Write pretty-printed JSON through a temp file and rename it into place.
fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CivisError::io(parent, e))?;
    }

    let temp = temp_path(path);
    let file = File::create(&temp).map_err(|e| CivisError::io(&temp, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, data).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        CivisError::validation(format!("JSON serialization failed for {}: {e}", path.display()))
    })?;
    writer.flush().map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        CivisError::io(&temp, e)
    })?;
    drop(writer);

    std::fs::rename(&temp, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        CivisError::io(path, e)
    })?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

/// `dir/.name.tmp` next to the target.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
