//! JSON report output.
//!
//! The report is written to a temporary sibling and renamed into place, so a
//! reader never sees a half-written file.

use super::EstimationReport;
use crate::models::{EstimationError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "report".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `report` as pretty JSON to `path` (atomic write).
pub fn write_report(report: &EstimationReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| EstimationError::io("creating report dir", e))?;
    }

    let temp_path = temp_path_for(path);
    let file =
        File::create(&temp_path).map_err(|e| EstimationError::io("creating temp report", e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer
        .flush()
        .map_err(|e| EstimationError::io("flushing report", e))?;
    drop(writer);

    fs::rename(&temp_path, path).map_err(|e| EstimationError::io("renaming report", e))?;

    debug!(path = %path.display(), "Report written");
    Ok(())
}
