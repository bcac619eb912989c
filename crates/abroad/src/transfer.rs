//! Import and export of database files.
//!
//! An uploaded file is classified by its extension: configured snapshot
//! extensions are binary `SQLite` databases that replace the session's
//! contents wholesale, everything else is an SQL script run against the
//! current contents. Neither path rolls back on failure.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::Table;
use crate::storage::Storage;

/// First 16 bytes of every `SQLite` database file.
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// How an uploaded file is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// A binary database that replaces all contents.
    Snapshot,
    /// SQL statements executed against the current contents.
    Script,
}

impl ImportKind {
    /// Classify a file by name.
    #[must_use]
    pub fn of(file_name: &str, config: &Config) -> Self {
        if config.is_snapshot_file(file_name) {
            Self::Snapshot
        } else {
            Self::Script
        }
    }
}

/// An uploaded file, classified and read asynchronously.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Where the file was read from.
    pub path: PathBuf,
    /// File name as shown to the user.
    pub file_name: String,
    /// How the file is applied.
    pub kind: ImportKind,
    /// The whole script, or only the leading header bytes of a snapshot.
    /// Snapshots are restored straight from `path`.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Classify a file and read what its import needs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn read(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let kind = ImportKind::of(&file_name, config);
        let bytes = match kind {
            ImportKind::Snapshot => {
                let file = tokio::fs::File::open(&path).await?;
                let mut header = Vec::with_capacity(SQLITE_HEADER.len());
                file.take(SQLITE_HEADER.len() as u64)
                    .read_to_end(&mut header)
                    .await?;
                header
            }
            ImportKind::Script => tokio::fs::read(&path).await?,
        };
        Ok(Self {
            path,
            file_name,
            kind,
            bytes,
        })
    }
}

/// What a successful import did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Name of the imported file.
    pub file_name: String,
    /// How it was applied.
    pub kind: ImportKind,
    /// Study records present afterwards, if the table exists.
    pub study_records: Option<i64>,
    /// Internship records present afterwards, if the table exists.
    pub internship_records: Option<i64>,
}

/// Outcome of loading a file, shown as the upload status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    /// The file was applied.
    Loaded(ImportReport),
    /// The file could not be applied; earlier statements of a script may
    /// have been.
    Failed {
        /// Name of the file.
        file_name: String,
        /// How it was to be applied.
        kind: ImportKind,
        /// What went wrong.
        message: String,
    },
}

impl LoadStatus {
    /// The user-visible status line.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self {
            Self::Loaded(report) => match report.kind {
                ImportKind::Snapshot => "✅ SQLite database loaded successfully!".to_string(),
                ImportKind::Script => "✅ SQL file loaded successfully!".to_string(),
            },
            Self::Failed { kind, message, .. } => match kind {
                ImportKind::Snapshot => format!("❌ Error loading SQLite database: {message}"),
                ImportKind::Script => format!("❌ Error loading SQL file: {message}"),
            },
        }
    }

    /// Whether the file was applied.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Apply an uploaded file to `storage`.
///
/// # Errors
///
/// Returns [`Error::SnapshotInvalid`] for a snapshot that is not an `SQLite`
/// database, or [`Error::ScriptFailed`] for a script that fails to run.
pub fn import(storage: &mut Storage, upload: &Upload) -> Result<ImportReport> {
    let kind = upload.kind;
    match kind {
        ImportKind::Snapshot => restore_snapshot(storage, upload)?,
        ImportKind::Script => run_script(storage, upload)?,
    }

    let report = ImportReport {
        file_name: upload.file_name.clone(),
        kind,
        study_records: storage.count(Table::Study).ok(),
        internship_records: storage.count(Table::Internship).ok(),
    };
    info!(
        "Imported {} ({:?}): {:?} study, {:?} internship records",
        report.file_name, kind, report.study_records, report.internship_records
    );
    Ok(report)
}

/// Apply an uploaded file and turn the outcome into a status.
pub fn load(storage: &mut Storage, upload: &Upload) -> LoadStatus {
    match import(storage, upload) {
        Ok(report) => LoadStatus::Loaded(report),
        Err(e) => {
            warn!("Failed to load {}: {}", upload.file_name, e);
            LoadStatus::Failed {
                file_name: upload.file_name.clone(),
                kind: upload.kind,
                message: e.to_string(),
            }
        }
    }
}

fn restore_snapshot(storage: &mut Storage, upload: &Upload) -> Result<()> {
    if !upload.bytes.starts_with(SQLITE_HEADER) {
        return Err(Error::snapshot_invalid(
            &upload.path,
            "file is not an SQLite database",
        ));
    }
    storage
        .restore_from(&upload.path)
        .map_err(|e| Error::snapshot_invalid(&upload.path, e.to_string()))
}

fn run_script(storage: &Storage, upload: &Upload) -> Result<()> {
    let sql = std::str::from_utf8(&upload.bytes).map_err(|source| Error::ScriptEncoding {
        path: upload.path.clone(),
        source,
    })?;
    storage
        .execute_script(sql)
        .map_err(|source| Error::ScriptFailed {
            path: upload.path.clone(),
            source,
        })
}

/// Resolve where an export goes: a directory receives the configured file name.
#[must_use]
pub fn export_destination(target: Option<&Path>, config: &Config) -> PathBuf {
    let file_name = &config.storage.export_file_name;
    match target {
        None => PathBuf::from(file_name),
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(path) => path.to_path_buf(),
    }
}

/// Write the whole database to `destination`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be replaced or written.
pub fn export(storage: &Storage, destination: &Path) -> Result<()> {
    if destination.exists() {
        std::fs::remove_file(destination)?;
    }
    storage.backup_to(destination)?;
    info!("Exported database to {}", destination.display());
    Ok(())
}
