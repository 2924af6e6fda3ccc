use sea_orm::sea_query::{Index, SchemaStatementBuilder, SqliteQueryBuilder};

use crate::{MigrationDescriptor, m20260119_000001_create_transactions_table::Transactions};

/// One row per archive file: the timestamp doubles as the archive file name,
/// so orphaned files are found by looking timestamps up here.
pub fn migration() -> MigrationDescriptor {
    let script = Index::create()
        .if_not_exists()
        .name("idx-transactions-timestamp")
        .table(Transactions::Table)
        .col(Transactions::Timestamp)
        .unique()
        .to_string(SqliteQueryBuilder);

    MigrationDescriptor::up(
        20260119_000002,
        "unique index on transactions timestamp",
        script,
    )
}
