// crates/vidsnap-core/src/library.rs
//
// Folder scanning and the ordered list of videos shown in the side panel.
//
// A scan always produces a complete batch that replaces the previous list.
// Entries are immutable; selection is tracked by index into the batch.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::LoadError;

/// One source video in the browsed folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub path:         PathBuf,
    pub display_name: String,
    pub modified_at:  DateTime<Utc>,
}

impl VideoEntry {
    /// Builds an entry by stat-ing `path`.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let modified = std::fs::metadata(path)?.modified()?;
        Ok(Self::new(path.to_path_buf(), modified))
    }

    pub fn new(path: PathBuf, modified: SystemTime) -> Self {
        let display_name = path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self { path, display_name, modified_at: DateTime::<Utc>::from(modified) }
    }

    /// Modification time as a filesystem timestamp, for copying onto captures.
    pub fn modified_system_time(&self) -> SystemTime {
        SystemTime::from(self.modified_at)
    }

    /// `dd/mm/YYYY, HH:MM:SS` in UTC, shown under the list.
    pub fn modified_label(&self) -> String {
        self.modified_at.format("%d/%m/%Y, %H:%M:%S").to_string()
    }
}

/// Lists `folder` and returns the recognised videos ordered by modification time.
///
/// Sub-directories and entries whose metadata cannot be read are skipped. The
/// sort is stable, so equal timestamps keep directory-listing order.
pub fn scan(folder: &Path, config: &AppConfig) -> Result<Vec<VideoEntry>, LoadError> {
    let unreadable = |source| LoadError::Unreadable { path: folder.to_path_buf(), source };
    let dir = std::fs::read_dir(folder).map_err(unreadable)?;

    let mut entries = Vec::new();
    for item in dir {
        let Ok(item) = item else { continue };
        let path = item.path();
        let recognized = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| config.is_recognized(e))
            .unwrap_or(false);
        if !recognized || !path.is_file() { continue; }

        match VideoEntry::from_path(&path) {
            Ok(entry) => entries.push(entry),
            Err(e)    => debug!("[library] skipping {}: {e}", path.display()),
        }
    }

    entries.sort_by_key(|e| e.modified_at);
    info!("[library] {} videos in {}", entries.len(), folder.display());
    Ok(entries)
}

// ── VideoLibrary ─────────────────────────────────────────────────────────────

/// Result of installing a new batch of entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The first entry was selected; the caller should load it.
    Selected(VideoEntry),
    /// Nothing recognised in the folder. Informational, not an error.
    Empty,
}

#[derive(Clone, Debug, Default)]
pub struct VideoLibrary {
    folder:   Option<PathBuf>,
    entries:  Vec<VideoEntry>,
    selected: Option<usize>,
}

impl VideoLibrary {
    pub fn new() -> Self { Self::default() }

    pub fn folder(&self)   -> Option<&Path>   { self.folder.as_deref() }
    pub fn entries(&self)  -> &[VideoEntry]   { &self.entries }
    pub fn selected(&self) -> Option<usize>   { self.selected }
    pub fn is_empty(&self) -> bool            { self.entries.is_empty() }

    pub fn selected_entry(&self) -> Option<&VideoEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    /// Scans `folder` and replaces the current list with the result.
    pub fn load_folder(&mut self, folder: &Path, config: &AppConfig) -> Result<ScanOutcome, LoadError> {
        let entries = scan(folder, config)?;
        self.folder = Some(folder.to_path_buf());
        Ok(self.replace(entries))
    }

    /// Installs a fresh batch, dropping the previous list and selection.
    pub fn replace(&mut self, entries: Vec<VideoEntry>) -> ScanOutcome {
        self.entries  = entries;
        self.selected = None;
        match self.select(0) {
            Some(first) => ScanOutcome::Selected(first.clone()),
            None        => ScanOutcome::Empty,
        }
    }

    /// Marks `index` as selected and returns the entry to load.
    /// Out-of-range indices leave the selection untouched.
    pub fn select(&mut self, index: usize) -> Option<&VideoEntry> {
        if index >= self.entries.len() { return None; }
        self.selected = Some(index);
        self.entries.get(index)
    }

    /// Selects the entry whose path equals `path`, if present.
    pub fn select_path(&mut self, path: &Path) -> Option<&VideoEntry> {
        let index = self.entries.iter().position(|e| e.path == path)?;
        self.select(index)
    }

    /// Moves the selection by `delta` rows, clamped to the list bounds.
    pub fn select_relative(&mut self, delta: isize) -> Option<&VideoEntry> {
        if self.entries.is_empty() { return None; }
        let last = self.entries.len() as isize - 1;
        let next = match self.selected {
            Some(i) => (i as isize + delta).clamp(0, last),
            None    => 0,
        } as usize;
        if Some(next) == self.selected { return None; }
        self.select(next)
    }
}
