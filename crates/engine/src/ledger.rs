//! Dual write of ledger entries: archive file first, database row second.
//!
//! The archive file is the durability anchor. If it cannot be written nothing
//! else happens. If the database insert fails afterwards, the file stays
//! where it is (an orphan file) and the error says so; the file is never
//! removed to restore consistency.

use std::path::PathBuf;

use sea_orm::{ActiveModelTrait, DatabaseConnection};

use crate::{
    ArchiveStore, Clock, EntryDraft, LedgerEntry, PersistenceError, ResultEngine, transactions,
};

/// Outcome of a successful dual write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recorded {
    /// Database id of the new row.
    pub id: i64,
    pub entry: LedgerEntry,
    pub archive_path: PathBuf,
}

#[derive(Debug)]
pub struct LedgerRecorder {
    database: DatabaseConnection,
    archive: ArchiveStore,
    clock: Clock,
}

impl LedgerRecorder {
    /// Only built by [`Engine`](crate::Engine), once the schema is migrated.
    pub(crate) fn new(database: DatabaseConnection, archive: ArchiveStore, clock: Clock) -> Self {
        Self {
            database,
            archive,
            clock,
        }
    }

    pub fn archive(&self) -> &ArchiveStore {
        &self.archive
    }

    /// Validates `draft` and persists it to the archive, then the database.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`](crate::ValidationError): nothing written.
    /// - [`PersistenceError::ArchiveWriteFailed`]: nothing written.
    /// - [`PersistenceError::DatabaseWriteFailed`]: the archive file exists
    ///   without a database row.
    pub async fn record(&self, draft: &EntryDraft) -> ResultEngine<Recorded> {
        let entry = draft.validate(&self.clock)?;

        let archive_path = self.archive.write(&entry).await.inspect_err(|err| {
            tracing::error!(target_store = "archive", "{err}");
        })?;

        let model = transactions::ActiveModel::from(&entry)
            .insert(&self.database)
            .await
            .map_err(|source| {
                let err = PersistenceError::DatabaseWriteFailed {
                    archive_path: archive_path.clone(),
                    timestamp: entry.timestamp_string(),
                    source,
                };
                tracing::error!(target_store = "database", "{err}");
                err
            })?;

        tracing::info!(
            id = model.id,
            debit = entry.debit().cents(),
            credit = entry.credit().cents(),
            path = %archive_path.display(),
            "recorded ledger entry"
        );

        Ok(Recorded {
            id: model.id,
            entry,
            archive_path,
        })
    }
}
