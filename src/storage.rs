//! # Storage Module
//!
//! Append-only persistence of finished submissions to a CSV spreadsheet.
//! The file starts with a fixed header row; every completed form adds one
//! data row. Rows are never rewritten or removed.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::dialogue::UserKey;
use crate::error::StorageError;

/// Column headers, in row order
pub const HEADERS: [&str; 4] = ["Timestamp", "Name", "Email", "User ID"];

/// Default file name for the record sheet
pub const DEFAULT_OUTPUT_FILE: &str = "bot_data.csv";

/// A finished, validated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub user_id: UserKey,
}

impl Record {
    /// Build a record stamped with the current time
    pub fn new(name: impl Into<String>, email: impl Into<String>, user_id: UserKey) -> Self {
        Self::with_timestamp(Utc::now(), name, email, user_id)
    }

    pub fn with_timestamp(
        timestamp: DateTime<Utc>,
        name: impl Into<String>,
        email: impl Into<String>,
        user_id: UserKey,
    ) -> Self {
        Self {
            timestamp,
            name: name.into(),
            email: email.into(),
            user_id,
        }
    }

    /// Field values in `HEADERS` order
    pub fn to_row(&self) -> [String; 4] {
        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.name.clone(),
            self.email.clone(),
            self.user_id.to_string(),
        ]
    }
}

/// Append-only destination for finished records
pub trait RecordSink: Send + Sync {
    /// Create the backing store with its header if it does not exist yet
    fn ensure_initialized(&self) -> Result<(), StorageError>;

    /// Persist one record after everything already stored
    fn append(&self, record: &Record) -> Result<(), StorageError>;
}

/// CSV-backed record sheet.
///
/// All access goes through one mutex so concurrent submissions from
/// different users are appended one after another.
#[derive(Debug)]
pub struct SpreadsheetSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SpreadsheetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn verify_header(&self, file: &mut File) -> Result<(), StorageError> {
        file.seek(SeekFrom::Start(0))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(&*file);

        let found: Vec<String> = match reader.records().next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => Vec::new(),
        };

        if found.iter().map(String::as_str).eq(HEADERS) {
            Ok(())
        } else {
            Err(StorageError::CorruptedHeader {
                path: self.path.clone(),
                found,
            })
        }
    }

    /// Whether the file's last byte is a line break, so a new row starts on its own line
    fn ends_with_newline(file: &mut File) -> io::Result<bool> {
        if file.seek(SeekFrom::End(0))? == 0 {
            return Ok(true);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }
}

impl RecordSink for SpreadsheetSink {
    fn ensure_initialized(&self) -> Result<(), StorageError> {
        let _guard = self.lock();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %self.path.display(), "Record file already exists");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut writer = csv::Writer::from_writer(&file);
        writer.write_record(HEADERS)?;
        writer.flush()?;
        drop(writer);
        file.sync_all()?;

        info!(path = %self.path.display(), "Record file created with headers");
        Ok(())
    }

    fn append(&self, record: &Record) -> Result<(), StorageError> {
        let _guard = self.lock();

        let mut file = match OpenOptions::new().read(true).append(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotInitialized(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        self.verify_header(&mut file)?;
        let needs_separator = !Self::ends_with_newline(&mut file)?;

        // Append mode: every write lands at the end regardless of the read cursor.
        let mut row = Vec::new();
        if needs_separator {
            row.push(b'\n');
        }
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut row);
            writer.write_record(record.to_row())?;
            writer.flush()?;
        }

        file.write_all(&row)?;
        file.sync_all()?;

        debug!(
            path = %self.path.display(),
            user_id = record.user_id,
            "Record appended"
        );
        Ok(())
    }
}
