//! Double-entry ledger persisted to an archive directory and a SQLite database.
//!
//! An [`Engine`] only exists once the database schema is up to date: building
//! one finalizes the migration registry and applies every pending migration
//! before anything else is allowed to touch the database.
//!
//! ```rust,ignore
//! let mut engine = Engine::builder()
//!     .database(db)
//!     .archive_dir("/home/alice/Vault/Finance/Transactions")
//!     .build()
//!     .await?;
//!
//! let recorded = engine
//!     .record(&EntryDraft::new("Alice", "Bob", Money::new(50_00)))
//!     .await?;
//! assert_eq!(recorded.entry.debit(), Money::new(-50_00));
//! ```
use std::path::{Path, PathBuf};

use migration::MigrationRegistry;
use sea_orm::DatabaseConnection;

pub use archive::{ArchiveParseError, ArchiveStore, ArchivedEntry};
pub use entry::{Clock, EntryDraft, LedgerEntry};
pub use error::{EngineError, Field, Party, PersistenceError, ValidationError};
pub use form::EntryForm;
pub use ledger::{LedgerRecorder, Recorded};
pub use migration::SchemaError;
pub use money::Money;
pub use orphans::OrphanFile;
pub use read_model::TransactionReadModel;
pub use transactions::RecordedEntry;

pub mod archive;
mod entry;
mod error;
mod form;
mod ledger;
mod money;
mod orphans;
mod read_model;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    recorder: LedgerRecorder,
    read_model: TransactionReadModel,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Dual-writes one entry, then refreshes the read model.
    ///
    /// A refresh failure is reported as [`EngineError::Database`]; the entry
    /// is persisted in both stores at that point.
    pub async fn record(&mut self, draft: &EntryDraft) -> ResultEngine<Recorded> {
        let recorded = self.recorder.record(draft).await?;
        self.read_model.refresh(&self.database).await?;
        Ok(recorded)
    }

    /// Recorded entries in insertion order.
    pub fn transactions(&self) -> &[RecordedEntry] {
        self.read_model.entries()
    }

    pub async fn refresh(&mut self) -> ResultEngine<()> {
        self.read_model.refresh(&self.database).await
    }

    /// Archive files with no matching database row.
    pub async fn orphans(&self) -> ResultEngine<Vec<OrphanFile>> {
        orphans::find(self.recorder.archive(), &self.database).await
    }

    pub fn archive_dir(&self) -> &Path {
        self.recorder.archive().dir()
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    registry: Option<MigrationRegistry>,
    archive_dir: Option<PathBuf>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Migrations to apply; defaults to [`migration::registry`].
    pub fn registry(mut self, registry: MigrationRegistry) -> EngineBuilder {
        self.registry = Some(registry);
        self
    }

    /// Archive directory; defaults to [`archive::default_location`].
    pub fn archive_dir(mut self, dir: impl Into<PathBuf>) -> EngineBuilder {
        self.archive_dir = Some(dir.into());
        self
    }

    /// Construct `Engine`, bringing the schema up to date first.
    ///
    /// # Errors
    ///
    /// [`EngineError::Schema`] when the registry is inconsistent or a
    /// migration fails; no engine is produced then.
    pub async fn build(self) -> ResultEngine<Engine> {
        let registry = self.registry.unwrap_or_else(migration::registry);
        let applied = migration::run(&self.database, &registry).await?;
        tracing::info!(applied = applied.get(), "database schema is up to date");

        let archive_dir = self
            .archive_dir
            .unwrap_or_else(archive::default_location);
        let recorder = LedgerRecorder::new(
            self.database.clone(),
            ArchiveStore::new(archive_dir),
            Clock::new(),
        );

        let mut read_model = TransactionReadModel::new();
        read_model.refresh(&self.database).await?;

        Ok(Engine {
            database: self.database,
            recorder,
            read_model,
        })
    }
}
