use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha1::{Digest, Sha1};
use tracing::info;

use crate::analysis::analyzer::PageAnalysis;
use crate::report::csv::generate_csv;

/// Files written by `export_analysis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPaths {
    pub session_id: String,
    pub json: PathBuf,
    pub csv: PathBuf,
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

/// Short id derived from the analyzed url and timestamp (8 hex chars).
pub fn export_id(analysis: &PageAnalysis) -> String {
    let meta = &analysis.analysis_metadata;
    let mut hasher = Sha1::new();
    hasher.update(meta.analyzed_url.as_bytes());
    hasher.update(meta.timestamp_ms.to_le_bytes());
    let digest = hasher.finalize();
    digest.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}

/// Write `analysis_<id>.json` and `analysis_<id>.csv` into `dir`.
pub fn export_analysis(analysis: &PageAnalysis, dir: &Path) -> io::Result<ExportPaths> {
    fs::create_dir_all(dir)?;
    let session_id = export_id(analysis);

    let json = dir.join(format!("analysis_{}.json", session_id));
    fs::write(&json, to_pretty_json(analysis)?)?;

    let csv = dir.join(format!("analysis_{}.csv", session_id));
    fs::write(&csv, generate_csv(&analysis.csv_data))?;

    info!(json = %json.display(), csv = %csv.display(), "analysis exported");
    Ok(ExportPaths { session_id, json, csv })
}
