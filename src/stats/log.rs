//! Append-only event log
//!
//! One newline-delimited JSON record per prediction. Prior lines are never
//! rewritten or reordered; the only destructive operation is a full
//! truncation by an admin.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::models::PredictionEvent;

pub struct EventLog {
    path: PathBuf,
    // Erase holds the write side; appends and readers hold the read side,
    // so a truncation never races an in-flight append or scan.
    gate: RwLock<()>,
    // Appends additionally serialize so concurrent writers cannot
    // interleave partial lines.
    append_lock: Mutex<()>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            gate: RwLock::new(()),
            append_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single complete line. The file is opened in
    /// append mode per write; one `write_all` covers the whole line so a
    /// concurrent reader never observes a partial record.
    pub fn append(&self, event: &PredictionEvent) -> io::Result<()> {
        let _gate = self.gate.read();
        let _serial = self.append_lock.lock();

        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Run a closure over a buffered reader of the log, or `None` if the
    /// log file does not exist yet. Readers may run concurrently with
    /// appenders; they simply miss any append that lands after the open.
    pub fn with_reader<T>(
        &self,
        f: impl FnOnce(Option<BufReader<File>>) -> io::Result<T>,
    ) -> io::Result<T> {
        let _gate = self.gate.read();
        if !self.path.exists() {
            return f(None);
        }
        let file = File::open(&self.path)?;
        f(Some(BufReader::new(file)))
    }

    /// Truncate the entire log. Irreversible; exclusive with all appends
    /// and reads for its duration.
    pub fn erase(&self) -> io::Result<()> {
        let _gate = self.gate.write();
        File::create(&self.path)?;
        Ok(())
    }
}
