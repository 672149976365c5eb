//! Append-only record of confirmed words, one per line.

use crate::error::PersistenceError;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct MatchLogInner {
    writer: Option<BufWriter<File>>,
    known: HashSet<String>,
    recorded: Vec<String>,
}

#[derive(Debug)]
pub struct MatchLog {
    path: Option<PathBuf>,
    inner: Mutex<MatchLogInner>,
}

impl MatchLog {
    /// Opens `path` for appending, remembering any words already in it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let display = path.display().to_string();

        let (known, unterminated) = match fs::read_to_string(&path) {
            Ok(content) => (
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
                !content.is_empty() && !content.ends_with('\n'),
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => (HashSet::new(), false),
            Err(e) => {
                return Err(PersistenceError::Read {
                    path: display,
                    msg: e.to_string(),
                })
            }
        };

        let write_err = |e: std::io::Error| PersistenceError::Write {
            path: display.clone(),
            msg: e.to_string(),
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(write_err)?;

        // Terminate a hand-edited last line so the next word gets its own line.
        if unterminated {
            file.write_all(b"\n").map_err(write_err)?;
        }

        Ok(Self {
            path: Some(path),
            inner: Mutex::new(MatchLogInner {
                writer: Some(BufWriter::new(file)),
                known,
                recorded: Vec::new(),
            }),
        })
    }

    /// Log that keeps matches in memory only.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: Mutex::new(MatchLogInner {
                writer: None,
                known: HashSet::new(),
                recorded: Vec::new(),
            }),
        }
    }

    /// Appends `word` and flushes. Returns false if the word was already known.
    pub fn record(&self, word: &str) -> Result<bool, PersistenceError> {
        let mut inner = self.lock();
        if !inner.known.insert(word.to_string()) {
            return Ok(false);
        }
        inner.recorded.push(word.to_string());

        if let Some(writer) = inner.writer.as_mut() {
            writeln!(writer, "{}", word)
                .and_then(|_| writer.flush())
                .map_err(|e| self.write_error(e))?;
        }
        Ok(true)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.lock().known.contains(word)
    }

    /// Words recorded during this run, in confirmation order.
    pub fn matches(&self) -> Vec<String> {
        self.lock().recorded.clone()
    }

    /// Number of known words, including those loaded at open.
    pub fn known_count(&self) -> usize {
        self.lock().known.len()
    }

    pub fn flush(&self) -> Result<(), PersistenceError> {
        let mut inner = self.lock();
        if let Some(writer) = inner.writer.as_mut() {
            writer.flush().map_err(|e| self.write_error(e))?;
        }
        Ok(())
    }

    fn write_error(&self, e: std::io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            msg: e.to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MatchLogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
