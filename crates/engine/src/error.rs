//! The module contains the errors the engine can throw.
//!
//! They fall in three families:
//!
//! - [`ValidationError`]: operator input was rejected; nothing was written and
//!   the input should be kept for a retry.
//! - [`SchemaError`]: the database schema could not be brought up to date;
//!   fatal at startup.
//! - [`PersistenceError`]: one of the two storage targets failed. The variant
//!   tells which one, since the archive is written before the database.
use std::{fmt, io, path::PathBuf};

use migration::SchemaError;
use sea_orm::DbErr;
use thiserror::Error;

/// Which party field of an entry failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Party {
    Debitor,
    Creditor,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debitor => "debitor",
            Self::Creditor => "creditor",
        })
    }
}

/// Input field an error refers to, for highlighting in a form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Debitor,
    Creditor,
    Amount,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyParty(Party),
    #[error("amount must not be zero")]
    ZeroAmount,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

impl ValidationError {
    /// The form field to highlight.
    pub fn field(&self) -> Field {
        match self {
            Self::EmptyParty(Party::Debitor) => Field::Debitor,
            Self::EmptyParty(Party::Creditor) => Field::Creditor,
            Self::ZeroAmount | Self::InvalidAmount(_) => Field::Amount,
        }
    }
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Nothing was persisted.
    #[error("archive write to {} failed: {source}", path.display())]
    ArchiveWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The archive file exists but has no database row (orphan file).
    #[error(
        "database write failed for entry {timestamp}; archive file {} has no matching row: {source}",
        archive_path.display()
    )]
    DatabaseWriteFailed {
        archive_path: PathBuf,
        timestamp: String,
        #[source]
        source: DbErr,
    },
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("corrupt transaction row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
    #[error("archive directory {}: {source}", path.display())]
    ArchiveScan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub fn is_archive_write_failed(&self) -> bool {
        matches!(
            self,
            Self::Persistence(PersistenceError::ArchiveWriteFailed { .. })
        )
    }

    pub fn is_database_write_failed(&self) -> bool {
        matches!(
            self,
            Self::Persistence(PersistenceError::DatabaseWriteFailed { .. })
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Schema(a), Self::Schema(b)) => a == b,
            (
                Self::Persistence(PersistenceError::ArchiveWriteFailed { path: a, .. }),
                Self::Persistence(PersistenceError::ArchiveWriteFailed { path: b, .. }),
            ) => a == b,
            (
                Self::Persistence(PersistenceError::DatabaseWriteFailed {
                    archive_path: a, ..
                }),
                Self::Persistence(PersistenceError::DatabaseWriteFailed {
                    archive_path: b, ..
                }),
            ) => a == b,
            (Self::CorruptRow { id: a, .. }, Self::CorruptRow { id: b, .. }) => a == b,
            (Self::ArchiveScan { path: a, .. }, Self::ArchiveScan { path: b, .. }) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
