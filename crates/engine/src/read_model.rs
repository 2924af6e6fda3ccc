//! Read-only projection of the `transactions` table.

use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};

use crate::{RecordedEntry, ResultEngine, transactions};

#[derive(Clone, Debug, Default)]
pub struct TransactionReadModel {
    entries: Vec<RecordedEntry>,
}

impl TransactionReadModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order, as of the last [`refresh`](Self::refresh).
    pub fn entries(&self) -> &[RecordedEntry] {
        &self.entries
    }

    /// Replaces the projection with the full table, ordered by id.
    ///
    /// On error the previous contents are kept.
    pub async fn refresh<C: ConnectionTrait>(&mut self, db: &C) -> ResultEngine<()> {
        let models = transactions::Entity::find()
            .order_by_asc(transactions::Column::Id)
            .all(db)
            .await?;

        self.entries = models
            .into_iter()
            .map(RecordedEntry::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(())
    }
}
