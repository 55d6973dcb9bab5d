//! Task report (what each step wrote or would write)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema version for the task report
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for the task report
pub const REPORT_SCHEMA_ID: &str = "globalize-tasks/report@1";

/// Whether files are written or only checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Write,
    /// Dry run: report files that would change
    Check,
}

/// Kind of file produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Default-locale translation table
    Default,
    /// Translation table of another locale
    Translation,
    /// Per-locale bundle
    Bundle,
}

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Written,
    Unchanged,
    /// Out of date, not written (check mode)
    Stale,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Written => "written",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Stale => "stale",
        }
    }
}

/// One produced file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: String,
    pub kind: FileKind,
    pub locale: String,
    pub status: FileStatus,

    /// SHA-256 of the file contents
    pub digest: String,
}

/// Report for one task invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,
    pub mode: WriteMode,
    pub files: Vec<FileOutcome>,
}

impl TaskReport {
    pub fn new(mode: WriteMode) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            schema_id: REPORT_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            mode,
            files: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        path: &Path,
        kind: FileKind,
        locale: &str,
        status: FileStatus,
        digest: String,
    ) {
        self.files.push(FileOutcome {
            path: path.to_string_lossy().to_string(),
            kind,
            locale: locale.to_string(),
            status,
            digest,
        });
    }

    /// Append the outcomes of another report
    pub fn extend(&mut self, other: TaskReport) {
        self.files.extend(other.files);
    }

    /// Count of files with the given status
    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    /// True when no file is out of date
    pub fn is_clean(&self) -> bool {
        self.count(FileStatus::Stale) == 0
    }

    /// Human-readable summary line
    pub fn human_summary(&self) -> String {
        match self.mode {
            WriteMode::Write => format!(
                "{} file(s) written, {} unchanged",
                self.count(FileStatus::Written),
                self.count(FileStatus::Unchanged)
            ),
            WriteMode::Check => format!(
                "{} file(s) out of date, {} up to date",
                self.count(FileStatus::Stale),
                self.count(FileStatus::Unchanged)
            ),
        }
    }

    /// Serialize to JSON (pretty printed)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
