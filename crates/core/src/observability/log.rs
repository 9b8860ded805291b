use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::domain::interaction::InteractionRecord;
use crate::errors::DomainError;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("could not open interaction log `{path}`: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("could not append to interaction log `{path}`: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not read interaction log `{path}`: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not encode interaction record: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("malformed interaction record at line {line} of `{path}`: {source}")]
    Parse { path: PathBuf, line: usize, source: serde_json::Error },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Append-only JSON-lines file holding every interaction record ever written.
#[derive(Debug)]
pub struct InteractionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl InteractionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single line.
    ///
    /// A failed write truncates the file back to its previous length, so a
    /// reader never sees half a record.
    pub fn append(&self, record: &InteractionRecord) -> Result<(), LogError> {
        let mut line = serde_json::to_string(record).map_err(LogError::Encode)?;
        line.push('\n');

        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| LogError::Open { path: self.path.clone(), source })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| LogError::Open { path: self.path.clone(), source })?;
        let committed_len = file
            .metadata()
            .map_err(|source| LogError::Open { path: self.path.clone(), source })?
            .len();

        if let Err(source) = file.write_all(line.as_bytes()).and_then(|()| file.flush()) {
            if let Err(rollback) = file.set_len(committed_len) {
                tracing::error!(
                    event_name = "observability.log.rollback_failed",
                    path = %self.path.display(),
                    error = %rollback,
                    "could not truncate partial interaction record"
                );
            }
            return Err(LogError::Write { path: self.path.clone(), source });
        }

        Ok(())
    }

    /// Reads every stored record. A missing file is an empty history; any
    /// malformed line fails the whole load.
    pub fn load_all(&self) -> Result<Vec<InteractionRecord>, LogError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(LogError::Read { path: self.path.clone(), source }),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line =
                line.map_err(|source| LogError::Read { path: self.path.clone(), source })?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| LogError::Parse {
                path: self.path.clone(),
                line: index + 1,
                source,
            })?;
            records.push(record);
        }

        Ok(records)
    }
}
