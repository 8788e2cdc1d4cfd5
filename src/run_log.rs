//! Append-only, human-readable log of per-item outcomes.
//!
//! One line per processed item: timestamp, sequence index, source path,
//! outcome. Diagnostic only — the pipeline never reads it back, and
//! resume semantics do not depend on it.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;

use crate::pipeline::ItemOutcome;

pub struct RunLog {
    writer: BufWriter<File>,
}

impl RunLog {
    /// Open (or create) the log in append mode, creating parent
    /// directories as needed.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one item outcome. Each line is flushed immediately so the
    /// log survives an interrupted run.
    pub fn record(
        &mut self,
        sequence_index: u32,
        source: &Path,
        outcome: &ItemOutcome,
    ) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{} | #{:04} | {} | {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            sequence_index,
            source.display(),
            outcome
        )?;
        self.writer.flush()
    }

    /// Append a free-form marker line (run started, run finished).
    pub fn note(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{} | {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            message
        )?;
        self.writer.flush()
    }
}
