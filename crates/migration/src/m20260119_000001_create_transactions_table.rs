use sea_orm::{
    DeriveIden,
    sea_query::{ColumnDef, SchemaStatementBuilder, SqliteQueryBuilder, Table},
};

use crate::MigrationDescriptor;

#[derive(DeriveIden)]
pub(crate) enum Transactions {
    Table,
    Id,
    Debitor,
    Debit,
    Credit,
    Creditor,
    Timestamp,
}

/// Ledger entries. Money columns hold integer minor units.
pub fn migration() -> MigrationDescriptor {
    let script = Table::create()
        .table(Transactions::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Transactions::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Transactions::Debitor).text().not_null())
        .col(ColumnDef::new(Transactions::Debit).big_integer().not_null())
        .col(ColumnDef::new(Transactions::Credit).big_integer().not_null())
        .col(ColumnDef::new(Transactions::Creditor).text().not_null())
        .col(ColumnDef::new(Transactions::Timestamp).text().not_null())
        .to_string(SqliteQueryBuilder);

    MigrationDescriptor::up(20260119_000001, "create transactions table", script)
}
