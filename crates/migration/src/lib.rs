//! Forward-only schema migrations for the ladger database.
//!
//! Each migration lives in its own `mYYYYMMDD_NNNNNN_<slug>.rs` module and
//! exposes a `migration()` function returning its [`MigrationDescriptor`].
//! [`registry`] collects them; the registry is finalized into the application
//! order and handed to a [`SchemaApplier`]:
//!
//! ```rust,ignore
//! let migrations = migration::registry().finalize()?;
//! let applied = migration::SchemaApplier::new(&db, migrations)
//!     .apply_pending()
//!     .await?;
//! ```

pub use applier::{AppliedCount, MigrationStatus, SchemaApplier};
pub use descriptor::{MigrationDescriptor, MigrationKind, MigrationVersion};
pub use error::SchemaError;
pub use registry::MigrationRegistry;

mod applier;
mod descriptor;
mod error;
mod registry;

mod m20260119_000001_create_transactions_table;
mod m20260119_000002_transactions_timestamp_index;

/// Registry holding every migration shipped with this build.
pub fn registry() -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();
    registry
        // Add future migrations here
        .register(m20260119_000001_create_transactions_table::migration())
        .register(m20260119_000002_transactions_timestamp_index::migration());
    registry
}

/// Finalizes `registry` and applies whatever is pending on `db`.
///
/// # Errors
///
/// Any [`SchemaError`]; the database must not be used for ledger writes then.
pub async fn run(
    db: &sea_orm::DatabaseConnection,
    registry: &MigrationRegistry,
) -> Result<AppliedCount, SchemaError> {
    let migrations = registry.finalize()?;
    SchemaApplier::new(db, migrations).apply_pending().await
}
