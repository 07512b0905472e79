//! Reconciliation of conflicted copies left behind by file synchronization.
//!
//! Sync tools (Dropbox, Syncthing, iCloud Drive, ...) do not block concurrent
//! writers. When two devices append to the log while offline, the tool keeps
//! one version under the original name and materializes the other as a
//! sibling "conflicted copy". Merging folds every sibling back into the
//! primary log so that replay sees all events from all devices.
//!
//! ## Ordering
//!
//! The merged log is sorted by timestamp, ascending. Ties keep their relative
//! position in the concatenation: primary events first, then siblings in
//! discovery order (file name, ascending), each file in its own order.
//!
//! ## Crash safety
//!
//! The primary is replaced atomically, but rewrite and sibling deletion are
//! separate steps. A crash in between leaves siblings whose events are
//! already merged; the next merge folds them in again. Duplicates replay
//! idempotently, so the state is unaffected.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::event::Event;
use crate::log::EventLog;

/// Outcome of one merge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Sibling files folded in and removed, in discovery order
    pub siblings: Vec<PathBuf>,
    /// Events in the rewritten primary (0 when nothing was merged)
    pub merged_events: usize,
}

impl MergeReport {
    pub fn merged_anything(&self) -> bool {
        !self.siblings.is_empty()
    }
}

/// Merges conflicted copies of one primary log.
pub struct ConflictMerger<'a> {
    log: &'a EventLog,
}

impl<'a> ConflictMerger<'a> {
    pub fn new(log: &'a EventLog) -> Self {
        Self { log }
    }

    /// Conflicted copies of the primary log, sorted by file name.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let primary = self.log.path();
        let Some(primary_name) = primary.file_name().and_then(|name| name.to_str()) else {
            return Ok(Vec::new());
        };
        let dir = match primary.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut siblings = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if is_conflict_copy(primary_name, name) {
                siblings.push(entry.path());
            }
        }
        siblings.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(siblings)
    }

    /// Fold every conflicted copy into the primary log and delete the copies.
    ///
    /// Leaves the primary untouched when there is nothing to merge. A copy
    /// with unparseable lines and no events is not a log; it is left in place.
    pub fn merge(&self) -> Result<MergeReport> {
        let candidates = self.discover()?;
        if candidates.is_empty() {
            return Ok(MergeReport::default());
        }

        let mut siblings = Vec::with_capacity(candidates.len());
        let mut replicas = Vec::with_capacity(candidates.len());
        for path in candidates {
            let read = EventLog::new(&path).read_report()?;
            if read.events.is_empty() && read.skipped > 0 {
                warn!(
                    sibling = %path.display(),
                    skipped = read.skipped,
                    "ignoring file that looks like a conflicted copy but holds no events"
                );
                continue;
            }
            debug!(sibling = %path.display(), events = read.events.len(), "read conflicted copy");
            siblings.push(path);
            replicas.push(read.events);
        }
        if siblings.is_empty() {
            return Ok(MergeReport::default());
        }

        let primary = self.log.read_all()?;
        let merged = merge_events(primary, replicas);
        self.log.rewrite(&merged)?;

        for path in &siblings {
            remove_sibling(path)?;
        }

        info!(
            path = %self.log.path().display(),
            siblings = siblings.len(),
            events = merged.len(),
            "merged conflicted copies"
        );
        Ok(MergeReport {
            merged_events: merged.len(),
            siblings,
        })
    }
}

/// Concatenate primary and sibling events and sort them by timestamp.
///
/// The sort is stable, which yields the documented tie-break. No
/// deduplication is performed.
pub fn merge_events(primary: Vec<Event>, siblings: Vec<Vec<Event>>) -> Vec<Event> {
    let mut merged = primary;
    for events in siblings {
        merged.extend(events);
    }
    merged.sort_by_key(|event| event.ts);
    merged
}

/// Whether `candidate` is a conflicted copy of the file named `primary`.
///
/// Recognized, for a primary `<stem>.<ext>`:
/// - `<stem> (Alice's conflicted copy 2024-01-02).<ext>` and other bracketed
///   markers containing `conflict` (Dropbox, Nextcloud, ownCloud)
/// - `<stem>_conflict-20240102-101010.<ext>` (older ownCloud clients)
/// - `<stem>.sync-conflict-20240102-101010-ABCDEFG.<ext>` (Syncthing)
/// - `<stem> 2.<ext>` (iCloud Drive)
/// - `<stem> (1).<ext>` (Google Drive)
pub fn is_conflict_copy(primary: &str, candidate: &str) -> bool {
    if candidate == primary || candidate.ends_with(".tmp") || candidate.ends_with(".lock") {
        return false;
    }

    let (stem, ext) = match primary.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (primary, None),
    };

    let Some(rest) = candidate.strip_prefix(stem) else {
        return false;
    };
    let middle = match ext {
        Some(ext) => match rest
            .strip_suffix(ext)
            .and_then(|rest| rest.strip_suffix('.'))
        {
            Some(middle) => middle,
            None => return false,
        },
        None => rest,
    };
    if middle.is_empty() {
        return false;
    }

    middle.starts_with(".sync-conflict-")
        || is_bracketed_conflict(middle)
        || is_stamped_conflict(middle)
        || is_numbered_copy(middle)
}

fn is_bracketed_conflict(middle: &str) -> bool {
    middle
        .strip_prefix(" (")
        .and_then(|inner| inner.strip_suffix(')'))
        .is_some_and(|inner| inner.to_lowercase().contains("conflict"))
}

fn is_stamped_conflict(middle: &str) -> bool {
    middle
        .strip_prefix("_conflict-")
        .is_some_and(|stamp| {
            !stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit() || c == '-')
        })
}

fn is_numbered_copy(middle: &str) -> bool {
    let Some(suffix) = middle.strip_prefix(' ') else {
        return false;
    };
    let digits = suffix
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(suffix);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn remove_sibling(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
