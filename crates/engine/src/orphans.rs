//! Detection of archive files without a database row.
//!
//! Such files are left behind when the database insert of a dual write
//! fails. They are only reported here; what to do with them (insert the row,
//! flag, discard) is left to the operator.

use std::{collections::HashSet, path::PathBuf};

use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use tokio::fs;

use crate::{
    ArchiveStore, EngineError, ResultEngine,
    archive::{self, ArchiveParseError, ArchivedEntry},
    transactions,
};

/// An archive file with no matching database row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrphanFile {
    pub path: PathBuf,
    /// Parsed file contents, or why they could not be parsed.
    pub contents: Result<ArchivedEntry, ArchiveParseError>,
}

pub(crate) async fn find<C: ConnectionTrait>(
    archive: &ArchiveStore,
    db: &C,
) -> ResultEngine<Vec<OrphanFile>> {
    let scan_failed = |source| EngineError::ArchiveScan {
        path: archive.dir().to_path_buf(),
        source,
    };

    let recorded: HashSet<String> = transactions::Entity::find()
        .select_only()
        .column(transactions::Column::Timestamp)
        .into_tuple::<String>()
        .all(db)
        .await?
        .iter()
        .map(|timestamp| archive::file_name(timestamp))
        .collect();

    let mut orphans = Vec::new();
    for path in archive.list().await.map_err(scan_failed)? {
        let known = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| recorded.contains(name));
        if known {
            continue;
        }

        let text = fs::read_to_string(&path).await.map_err(scan_failed)?;
        tracing::warn!(path = %path.display(), "archive file has no database row");
        orphans.push(OrphanFile {
            contents: archive::parse(&text),
            path,
        });
    }
    Ok(orphans)
}
