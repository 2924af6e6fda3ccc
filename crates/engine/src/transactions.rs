//! The `transactions` table: one row per recorded ledger entry.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;

use crate::{EngineError, LedgerEntry, Money, ResultEngine, entry::parse_timestamp};

/// A ledger entry as stored in the database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordedEntry {
    pub id: i64,
    pub debitor: String,
    pub debit: Money,
    pub credit: Money,
    pub creditor: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<Model> for RecordedEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let corrupt = |reason: String| EngineError::CorruptRow {
            id: model.id,
            reason,
        };
        let debit = Money::try_from(model.debit).map_err(|err| corrupt(err.to_string()))?;
        let credit = Money::try_from(model.credit).map_err(|err| corrupt(err.to_string()))?;
        let timestamp = parse_timestamp(&model.timestamp)
            .ok_or_else(|| corrupt(format!("invalid timestamp {:?}", model.timestamp)))?;

        Ok(Self {
            id: model.id,
            debitor: model.debitor,
            debit,
            credit,
            creditor: model.creditor,
            timestamp,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub debitor: String,
    pub debit: i64,
    pub credit: i64,
    pub creditor: String,
    pub timestamp: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::NotSet,
            debitor: ActiveValue::Set(entry.debitor().to_string()),
            debit: ActiveValue::Set(entry.debit().cents()),
            credit: ActiveValue::Set(entry.credit().cents()),
            creditor: ActiveValue::Set(entry.creditor().to_string()),
            timestamp: ActiveValue::Set(entry.timestamp_string()),
        }
    }
}
