//! The double-entry domain object.
//!
//! A [`LedgerEntry`] can only be obtained by validating an [`EntryDraft`]:
//! debit and credit are derived from one signed magnitude, so an unbalanced
//! entry cannot be expressed.
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use unicode_normalization::UnicodeNormalization;

use crate::{Money, Party, ValidationError};

/// Process clock handing out strictly increasing instants at microsecond
/// resolution.
///
/// Two entries recorded by the same process never share a timestamp, which
/// keeps archive file names unique.
#[derive(Debug, Default)]
pub struct Clock {
    last_micros: AtomicI64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_micros();
        let previous = self
            .last_micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(wall.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        let micros = wall.max(previous + 1);
        DateTime::from_timestamp_micros(micros).unwrap_or_else(Utc::now)
    }
}

/// Raw, unvalidated entry as typed by the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryDraft {
    pub debitor: String,
    pub creditor: String,
    /// Signed magnitude; only its absolute value matters.
    pub magnitude: Money,
}

impl EntryDraft {
    pub fn new(debitor: impl Into<String>, creditor: impl Into<String>, magnitude: Money) -> Self {
        Self {
            debitor: debitor.into(),
            creditor: creditor.into(),
            magnitude,
        }
    }

    /// Checks the draft and stamps it with `clock`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptyParty`] for a blank party name,
    /// [`ValidationError::ZeroAmount`] for a zero magnitude.
    pub fn validate(&self, clock: &Clock) -> Result<LedgerEntry, ValidationError> {
        let debitor = normalize_party(&self.debitor, Party::Debitor)?;
        let creditor = normalize_party(&self.creditor, Party::Creditor)?;
        if self.magnitude.is_zero() {
            return Err(ValidationError::ZeroAmount);
        }

        let credit = self.magnitude.abs();
        Ok(LedgerEntry {
            debitor,
            creditor,
            debit: -credit,
            credit,
            timestamp: clock.now(),
        })
    }
}

/// A validated double-entry record: `credit == -debit`, `debit < 0 < credit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    debitor: String,
    creditor: String,
    debit: Money,
    credit: Money,
    timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn debitor(&self) -> &str {
        &self.debitor
    }

    pub fn creditor(&self) -> &str {
        &self.creditor
    }

    pub fn debit(&self) -> Money {
        self.debit
    }

    pub fn credit(&self) -> Money {
        self.credit
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// ISO 8601 form stored in the database, e.g. `2026-01-19T10:15:30.123456Z`.
    pub fn timestamp_string(&self) -> String {
        format_timestamp(self.timestamp)
    }
}

pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Trims, collapses inner whitespace (newlines would break the archive
/// front matter) and NFC-normalizes a party name.
fn normalize_party(value: &str, party: Party) -> Result<String, ValidationError> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(ValidationError::EmptyParty(party));
    }
    Ok(collapsed.nfc().collect())
}
