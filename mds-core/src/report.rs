use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::spec::Mode;
use crate::tree_copy::CopyStats;

/// Sink for user-facing messages emitted while a run progresses.
pub trait Reporter: Send + Sync {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Forwards every message to `tracing`; the binary decides where it ends up.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, msg: &str) {
        tracing::info!("{}", msg);
    }
    fn warn(&self, msg: &str) {
        tracing::warn!("{}", msg);
    }
    fn error(&self, msg: &str) {
        tracing::error!("{}", msg);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Keeps messages in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemoryReporter {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines().iter().any(|(l, m)| *l == level && m.contains(needle))
    }

    fn push(&self, level: Level, msg: &str) {
        if let Ok(mut l) = self.lines.lock() {
            l.push((level, msg.to_string()));
        }
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }
    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }
    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSetOutcome {
    pub name: String,
    pub folder: PathBuf,
    pub files_created: u64,
    pub bytes_planned: u64,
    /// File topped up during growth, if any.
    pub appended_file: Option<PathBuf>,
    pub bytes_appended: u64,
    /// Set when the data set was left alone on purpose.
    pub skipped: Option<String>,
    /// Set when the data set failed.
    pub error: Option<String>,
}

impl DataSetOutcome {
    pub fn new(name: &str, folder: PathBuf) -> Self {
        Self { name: name.to_string(), folder, ..Default::default() }
    }

    pub fn failed(name: &str, folder: PathBuf, error: String) -> Self {
        Self { error: Some(error), ..Self::new(name, folder) }
    }

    pub fn skipped(name: &str, folder: PathBuf, reason: String) -> Self {
        Self { skipped: Some(reason), ..Self::new(name, folder) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct RunSummary {
    pub mode: Mode,
    pub started_utc: String,
    pub elapsed_ms: u64,
    pub data_sets: Vec<DataSetOutcome>,
    pub backup_path: Option<PathBuf>,
    pub rotated_backup: Option<PathBuf>,
    pub copy_stats: Option<CopyStats>,
}

impl RunSummary {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            started_utc: chrono::Utc::now().to_rfc3339(),
            elapsed_ms: 0,
            data_sets: Vec::new(),
            backup_path: None,
            rotated_backup: None,
            copy_stats: None,
        }
    }

    pub fn failures(&self) -> usize {
        self.data_sets.iter().filter(|d| !d.is_ok()).count()
    }

    pub fn outcome(&self, name: &str) -> Option<&DataSetOutcome> {
        self.data_sets.iter().find(|d| d.name == name)
    }
}
