//! Append-only event log file.
//!
//! One JSON record per line. Appends are flushed to disk before returning.
//! Reads are fault-tolerant per line: a record that fails to parse is
//! skipped with a warning and the read carries on.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::event::Event;
use crate::fs::{ensure_parent_dir, rename_with_fallback, restrict_to_owner};

/// Events read from a log file, plus how many lines were dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogRead {
    pub events: Vec<Event>,
    pub skipped: usize,
}

/// Handle to one log file on disk.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create an empty log if none exists. Idempotent.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.exists() {
            return Ok(());
        }
        ensure_parent_dir(&self.path)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?
            .sync_all()?;
        restrict_to_owner(&self.path)?;
        debug!(path = %self.path.display(), "created event log");
        Ok(())
    }

    /// Append one record and flush it to disk.
    ///
    /// The record is validated and fully serialized before the file is
    /// touched, and written with a single `write_all`, so a failure never
    /// leaves a partial event behind from this call.
    pub fn append(&self, event: &Event) -> Result<()> {
        event.validate()?;
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        ensure_parent_dir(&self.path)?;
        let created = !self.path.exists();
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;
        if created {
            restrict_to_owner(&self.path)?;
        }

        // A torn final line from an earlier crash must not swallow this record.
        if !created && !ends_with_newline(&mut file)? {
            line.insert(0, '\n');
        }

        file.write_all(line.as_bytes())?;
        file.sync_all()?;
        debug!(path = %self.path.display(), op = %event.op, id = %event.id(), "appended event");
        Ok(())
    }

    /// All parseable events in file order. Empty when the file is absent.
    pub fn read_all(&self) -> Result<Vec<Event>> {
        Ok(self.read_report()?.events)
    }

    /// Like [`EventLog::read_all`], also reporting the number of skipped lines.
    pub fn read_report(&self) -> Result<LogRead> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(LogRead::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(parse_records(&bytes, &self.path))
    }

    /// Newest timestamp recorded in the file, if any.
    pub fn last_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read_all()?.iter().map(|event| event.ts).max())
    }

    /// Replace the whole file with `events`.
    ///
    /// Writes a temporary file next to the log, syncs it, then renames it into
    /// place, so readers see either the old or the new content.
    pub fn rewrite(&self, events: &[Event]) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        let temp_path = self.temp_path()?;

        let written = write_records(&temp_path, events);
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
        restrict_to_owner(&temp_path)?;
        rename_with_fallback(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), events = events.len(), "rewrote event log");
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
            .as_nanos();
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "kc".to_string());
        let temp_name = format!(".{}.{}.{}.tmp", name, std::process::id(), nanos);
        Ok(match self.path.parent() {
            Some(parent) => parent.join(temp_name),
            None => PathBuf::from(temp_name),
        })
    }
}

/// Parse raw log bytes line by line, skipping anything malformed.
pub fn parse_records(bytes: &[u8], source: &Path) -> LogRead {
    let mut read = LogRead::default();

    for (index, raw) in bytes.split(|byte| *byte == b'\n').enumerate() {
        let line = trim_line(raw);
        if line.is_empty() {
            continue;
        }

        let parsed = serde_json::from_slice::<Event>(line)
            .map_err(|e| e.to_string())
            .and_then(|event| event.validate().map(|()| event).map_err(|e| e.to_string()));

        match parsed {
            Ok(event) => read.events.push(event),
            Err(error) => {
                warn!(
                    path = %source.display(),
                    line = index + 1,
                    %error,
                    "skipping malformed log record"
                );
                read.skipped += 1;
            }
        }
    }

    read
}

fn trim_line(raw: &[u8]) -> &[u8] {
    let start = raw
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(raw.len());
    let end = raw
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(start, |pos| pos + 1);
    &raw[start..end]
}

fn write_records(path: &Path, events: &[Event]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
