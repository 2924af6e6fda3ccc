//! Errors raised while assembling or applying the schema.
//!
//! Every variant is fatal at startup: the application must not accept ledger
//! entries against an unapplied or ambiguous schema.
use sea_orm::DbErr;
use thiserror::Error;

use crate::MigrationVersion;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("duplicate migration version {version}: \"{first}\" and \"{second}\"")]
    DuplicateVersion {
        version: MigrationVersion,
        first: String,
        second: String,
    },
    #[error("migration {version} has an empty description")]
    EmptyDescription { version: MigrationVersion },
    #[error("migration {version} (\"{description}\") failed: {source}")]
    ScriptFailed {
        version: MigrationVersion,
        description: String,
        #[source]
        source: DbErr,
    },
    #[error("database has migration {version} applied but no descriptor exists for it")]
    UnknownAppliedVersion { version: MigrationVersion },
    #[error("migration tracking table: {0}")]
    Tracking(#[from] DbErr),
}

impl PartialEq for SchemaError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::DuplicateVersion {
                    version: a,
                    first: fa,
                    second: sa,
                },
                Self::DuplicateVersion {
                    version: b,
                    first: fb,
                    second: sb,
                },
            ) => a == b && fa == fb && sa == sb,
            (Self::EmptyDescription { version: a }, Self::EmptyDescription { version: b }) => {
                a == b
            }
            (Self::ScriptFailed { version: a, .. }, Self::ScriptFailed { version: b, .. }) => {
                a == b
            }
            (
                Self::UnknownAppliedVersion { version: a },
                Self::UnknownAppliedVersion { version: b },
            ) => a == b,
            (Self::Tracking(a), Self::Tracking(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
