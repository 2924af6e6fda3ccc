//! Human-readable archive of ledger entries.
//!
//! Every entry is one UTF-8 Markdown file holding a front-matter block:
//!
//! ```text
//! ---
//! debitor: Alice
//! debit: -5000
//! credit: 5000
//! creditor: Bob
//! ---
//! ```
//!
//! Amounts are plain integers of minor units, the same values stored in the
//! database, so the archive can be replayed. Files are named after the entry
//! timestamp (`ladger-entry-2026-01-19T10-15-30-123456Z.md`) and are never
//! overwritten.
use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};

use crate::{LedgerEntry, Money, PersistenceError};

const FILE_PREFIX: &str = "ladger-entry-";
const FILE_SUFFIX: &str = ".md";
const DELIMITER: &str = "---";

/// Directory under the home directory where archive files live.
pub const DEFAULT_SUBDIR: [&str; 3] = ["Vault", "Finance", "Transactions"];

/// `<home>/Vault/Finance/Transactions`.
pub fn default_dir(home: &Path) -> PathBuf {
    DEFAULT_SUBDIR.iter().fold(home.to_path_buf(), |path, part| path.join(part))
}

/// [`default_dir`] under `$HOME` (`%USERPROFILE%` on Windows), falling back to
/// the current directory.
pub fn default_location() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    default_dir(&home)
}

/// Renders the front-matter block for `entry`.
pub fn render(entry: &LedgerEntry) -> String {
    format!(
        "{DELIMITER}\ndebitor: {}\ndebit: {}\ncredit: {}\ncreditor: {}\n{DELIMITER}\n",
        entry.debitor(),
        entry.debit().cents(),
        entry.credit().cents(),
        entry.creditor(),
    )
}

/// File name for an entry stamped `timestamp` (the database text form).
///
/// `:` and `.` are replaced by `-` so the name is safe on every file system.
pub fn file_name(timestamp: &str) -> String {
    let token: String = timestamp
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect();
    format!("{FILE_PREFIX}{token}{FILE_SUFFIX}")
}

/// Whether `name` looks like an archive file.
pub fn is_archive_file_name(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)
}

/// Entry fields read back from an archive file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchivedEntry {
    pub debitor: String,
    pub debit: Money,
    pub credit: Money,
    pub creditor: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveParseError {
    #[error("front matter delimiters missing")]
    MissingDelimiter,
    #[error("\"{0}\" key missing")]
    MissingKey(&'static str),
    #[error("{key} is not an integer amount: {value}")]
    BadAmount { key: &'static str, value: String },
    #[error("debit {debit} and credit {credit} do not balance")]
    Unbalanced { debit: i64, credit: i64 },
}

/// Parses an archive file back into its fields.
///
/// Unknown keys are ignored; the balance invariant is checked.
pub fn parse(text: &str) -> Result<ArchivedEntry, ArchiveParseError> {
    let mut lines = text.lines();
    if lines.next() != Some(DELIMITER) {
        return Err(ArchiveParseError::MissingDelimiter);
    }

    let mut debitor = None;
    let mut creditor = None;
    let mut debit = None;
    let mut credit = None;
    let mut closed = false;
    for line in lines.by_ref() {
        if line == DELIMITER {
            closed = true;
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.strip_prefix(' ').unwrap_or(value);
        match key {
            "debitor" => debitor = Some(value.to_string()),
            "creditor" => creditor = Some(value.to_string()),
            "debit" => debit = Some(parse_amount("debit", value)?),
            "credit" => credit = Some(parse_amount("credit", value)?),
            _ => {}
        }
    }
    if !closed {
        return Err(ArchiveParseError::MissingDelimiter);
    }

    let entry = ArchivedEntry {
        debitor: debitor.ok_or(ArchiveParseError::MissingKey("debitor"))?,
        debit: debit.ok_or(ArchiveParseError::MissingKey("debit"))?,
        credit: credit.ok_or(ArchiveParseError::MissingKey("credit"))?,
        creditor: creditor.ok_or(ArchiveParseError::MissingKey("creditor"))?,
    };
    if entry.credit != -entry.debit {
        return Err(ArchiveParseError::Unbalanced {
            debit: entry.debit.cents(),
            credit: entry.credit.cents(),
        });
    }
    Ok(entry)
}

fn parse_amount(key: &'static str, value: &str) -> Result<Money, ArchiveParseError> {
    let bad = || ArchiveParseError::BadAmount {
        key,
        value: value.to_string(),
    };
    let cents: i64 = value.trim().parse().map_err(|_| bad())?;
    Money::try_from(cents).map_err(|_| bad())
}

/// The archive directory.
#[derive(Clone, Debug)]
pub struct ArchiveStore {
    dir: PathBuf,
}

impl ArchiveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, entry: &LedgerEntry) -> PathBuf {
        self.dir.join(file_name(&entry.timestamp_string()))
    }

    /// Creates the directory if needed and writes the entry file.
    ///
    /// An existing file with the same name is an error, not overwritten. A
    /// file this call created but could not fully write and sync is removed
    /// again before the error is returned.
    pub async fn write(&self, entry: &LedgerEntry) -> Result<PathBuf, PersistenceError> {
        let path = self.path_for(entry);
        let failed = |source: io::Error| PersistenceError::ArchiveWriteFailed {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).await.map_err(failed)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(failed)?;

        let written = async {
            file.write_all(render(entry).as_bytes()).await?;
            file.sync_all().await?;
            sync_dir(&self.dir).await
        }
        .await;
        drop(file);

        if let Err(source) = written {
            discard(&path).await;
            return Err(failed(source));
        }
        Ok(path)
    }

    /// Archive files currently in the directory, sorted by name. A missing
    /// directory holds no files.
    pub async fn list(&self) -> io::Result<Vec<PathBuf>> {
        let mut read_dir = match fs::read_dir(&self.dir).await {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut files = Vec::new();
        while let Some(item) = read_dir.next_entry().await? {
            let name = item.file_name();
            if name.to_str().is_some_and(is_archive_file_name) && item.file_type().await?.is_file()
            {
                files.push(item.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Removes a partially written archive file.
async fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), "partial archive file left behind: {err}");
    }
}

/// Flushes the directory entry of a freshly created file.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
