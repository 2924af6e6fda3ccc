//! Operator input for one ledger entry.

use crate::{Engine, EngineError, EntryDraft, Money, Recorded, ResultEngine, ValidationError};

/// Raw field values of an entry form.
///
/// [`submit`](Self::submit) takes the form and the engine mutably, so a form
/// cannot be submitted again while a submission is in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryForm {
    pub debitor: String,
    pub creditor: String,
    /// Decimal amount as typed, e.g. `50` or `12,30`.
    pub amount: String,
}

impl EntryForm {
    pub fn new(
        debitor: impl Into<String>,
        creditor: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            debitor: debitor.into(),
            creditor: creditor.into(),
            amount: amount.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.debitor.is_empty() && self.creditor.is_empty() && self.amount.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Converts the typed amount to minor units.
    pub fn draft(&self) -> Result<EntryDraft, ValidationError> {
        let magnitude: Money = self.amount.parse()?;
        Ok(EntryDraft::new(
            self.debitor.clone(),
            self.creditor.clone(),
            magnitude,
        ))
    }

    /// Records the entry.
    ///
    /// The fields are kept when nothing was persisted (validation errors,
    /// archive failures) so the operator can retry. They are cleared once the
    /// archive file exists, including on a failed database write, since a
    /// retry would archive the same entry twice.
    pub async fn submit(&mut self, engine: &mut Engine) -> ResultEngine<Recorded> {
        let result = match self.draft() {
            Ok(draft) => engine.record(&draft).await,
            Err(err) => Err(err.into()),
        };

        if let Err(err) = &result
            && keeps_input(err)
        {
            return result;
        }
        self.clear();
        result
    }
}

fn keeps_input(err: &EngineError) -> bool {
    matches!(err, EngineError::Validation(_)) || err.is_archive_write_failed()
}
