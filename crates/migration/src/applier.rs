//! Applies finalized migrations to a database and tracks which versions ran.
//!
//! Applied versions live in the `ladger_migrations` table. Each pending
//! migration runs its script and records its version inside one database
//! transaction, so a failed script leaves neither schema changes nor a
//! tracking row behind.

use std::{collections::BTreeMap, fmt};

use chrono::{SecondsFormat, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, Statement, TransactionTrait, Value,
};

use crate::{MigrationDescriptor, MigrationVersion, SchemaError};

const CREATE_TRACKING_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS ladger_migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        description TEXT NOT NULL,
        applied_at TEXT NOT NULL
    );
"#;

/// Number of migrations executed by a single [`SchemaApplier::apply_pending`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppliedCount(pub usize);

impl AppliedCount {
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for AppliedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Applied/pending state of one known migration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: MigrationVersion,
    pub description: String,
    pub applied_at: Option<String>,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

/// Runs the finalized migration sequence against one database.
#[derive(Debug)]
pub struct SchemaApplier<'a> {
    db: &'a DatabaseConnection,
    migrations: Vec<MigrationDescriptor>,
}

impl<'a> SchemaApplier<'a> {
    /// `migrations` must come from [`MigrationRegistry::finalize`](crate::MigrationRegistry::finalize).
    pub fn new(db: &'a DatabaseConnection, migrations: Vec<MigrationDescriptor>) -> Self {
        Self { db, migrations }
    }

    /// Executes every migration not yet recorded as applied, in order.
    ///
    /// Already-applied versions are skipped, so running this on every process
    /// start is safe.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnknownAppliedVersion`] when the database carries a
    ///   version this build knows nothing about.
    /// - [`SchemaError::ScriptFailed`] when a script fails; earlier migrations
    ///   stay applied.
    pub async fn apply_pending(&self) -> Result<AppliedCount, SchemaError> {
        let applied = self.applied_versions().await?;
        self.ensure_known(&applied)?;

        let mut count = 0;
        for migration in &self.migrations {
            if applied.contains_key(&migration.version()) {
                tracing::debug!(version = %migration.version(), "migration already applied");
                continue;
            }
            self.apply(migration).await?;
            count += 1;
        }

        Ok(AppliedCount(count))
    }

    /// Lists every known migration with its applied timestamp, if any.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>, SchemaError> {
        let mut applied = self.applied_versions().await?;
        Ok(self
            .migrations
            .iter()
            .map(|migration| MigrationStatus {
                version: migration.version(),
                description: migration.description().to_string(),
                applied_at: applied.remove(&migration.version()),
            })
            .collect())
    }

    fn ensure_known(&self, applied: &BTreeMap<MigrationVersion, String>) -> Result<(), SchemaError> {
        match applied
            .keys()
            .find(|version| !self.migrations.iter().any(|m| m.version() == **version))
        {
            Some(version) => Err(SchemaError::UnknownAppliedVersion { version: *version }),
            None => Ok(()),
        }
    }

    async fn apply(&self, migration: &MigrationDescriptor) -> Result<(), SchemaError> {
        let script_failed = |source: DbErr| SchemaError::ScriptFailed {
            version: migration.version(),
            description: migration.description().to_string(),
            source,
        };

        let txn = self.db.begin().await?;
        txn.execute_unprepared(migration.script())
            .await
            .map_err(script_failed)?;

        let backend = txn.get_database_backend();
        txn.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO ladger_migrations (version, description, applied_at) VALUES (?, ?, ?)",
            vec![
                Value::from(version_to_db(migration.version())?),
                migration.description().into(),
                Utc::now()
                    .to_rfc3339_opts(SecondsFormat::Secs, true)
                    .into(),
            ],
        ))
        .await?;
        txn.commit().await?;

        tracing::info!(
            version = %migration.version(),
            description = migration.description(),
            "applied migration"
        );
        Ok(())
    }

    async fn applied_versions(&self) -> Result<BTreeMap<MigrationVersion, String>, SchemaError> {
        self.db.execute_unprepared(CREATE_TRACKING_TABLE).await?;

        let backend = self.db.get_database_backend();
        let rows = self
            .db
            .query_all(Statement::from_string(
                backend,
                "SELECT version, applied_at FROM ladger_migrations ORDER BY version",
            ))
            .await?;

        let mut applied = BTreeMap::new();
        for row in rows {
            let version: i64 = row.try_get("", "version")?;
            let applied_at: String = row.try_get("", "applied_at")?;
            applied.insert(version_from_db(version)?, applied_at);
        }
        Ok(applied)
    }
}

fn version_to_db(version: MigrationVersion) -> Result<i64, SchemaError> {
    i64::try_from(version.get()).map_err(|_| {
        SchemaError::Tracking(DbErr::Custom(format!(
            "migration version {version} does not fit an INTEGER column"
        )))
    })
}

fn version_from_db(value: i64) -> Result<MigrationVersion, SchemaError> {
    u64::try_from(value)
        .map(MigrationVersion::new)
        .map_err(|_| SchemaError::Tracking(DbErr::Custom(format!("negative migration version {value}"))))
}
