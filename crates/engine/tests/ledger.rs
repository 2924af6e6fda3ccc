use std::path::PathBuf;

use engine::{
    Engine, EngineError, EntryDraft, EntryForm, Field, Money, Party, PersistenceError,
    SchemaError, ValidationError, archive,
};
use migration::{MigrationDescriptor, MigrationRegistry};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use tempfile::TempDir;

async fn memory_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:").await.unwrap()
}

async fn engine_with_archive() -> (Engine, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::builder()
        .database(memory_db().await)
        .archive_dir(dir.path().join("Vault/Finance/Transactions"))
        .build()
        .await
        .unwrap();
    (engine, dir)
}

async fn row_count(db: &DatabaseConnection) -> i64 {
    let backend = db.get_database_backend();
    db.query_one(Statement::from_string(
        backend,
        "SELECT COUNT(*) AS n FROM transactions",
    ))
    .await
    .unwrap()
    .unwrap()
    .try_get("", "n")
    .unwrap()
}

async fn inject_insert_failure(db: &DatabaseConnection) {
    db.execute_unprepared(
        "CREATE TRIGGER fail_insert BEFORE INSERT ON transactions \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .await
    .unwrap();
}

fn archive_files(engine: &Engine) -> Vec<PathBuf> {
    match std::fs::read_dir(engine.archive_dir()) {
        Ok(read_dir) => read_dir.map(|item| item.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn alice_pays_bob_end_to_end() {
    let (mut engine, _dir) = engine_with_archive().await;

    let recorded = engine
        .record(&EntryDraft::new("Alice", "Bob", Money::new(5000)))
        .await
        .unwrap();

    assert_eq!(recorded.entry.debit(), Money::new(-5000));
    assert_eq!(recorded.entry.credit(), Money::new(5000));

    let text = std::fs::read_to_string(&recorded.archive_path).unwrap();
    assert_eq!(
        text,
        "---\ndebitor: Alice\ndebit: -5000\ncredit: 5000\ncreditor: Bob\n---\n"
    );
    assert_eq!(
        recorded.archive_path.file_name().unwrap().to_str().unwrap(),
        archive::file_name(&recorded.entry.timestamp_string())
    );

    let rows = engine.transactions();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, recorded.id);
    assert_eq!(rows[0].debitor, "Alice");
    assert_eq!(rows[0].debit, Money::new(-5000));
    assert_eq!(rows[0].credit, Money::new(5000));
    assert_eq!(rows[0].creditor, "Bob");
    assert_eq!(rows[0].timestamp, recorded.entry.timestamp());
}

#[tokio::test]
async fn negative_magnitude_records_the_same_entry() {
    let (mut engine, _dir) = engine_with_archive().await;

    let recorded = engine
        .record(&EntryDraft::new("Alice", "Bob", Money::new(-5000)))
        .await
        .unwrap();

    assert_eq!(recorded.entry.debit(), Money::new(-5000));
    assert_eq!(recorded.entry.credit(), Money::new(5000));
}

#[tokio::test]
async fn read_model_lists_entries_in_insertion_order() {
    let (mut engine, _dir) = engine_with_archive().await;

    let drafts = [
        ("Alice", "Bob", 100),
        ("Bob", "Carol", -250),
        ("Carol", "Alice", 7),
    ];
    for (debitor, creditor, cents) in drafts {
        engine
            .record(&EntryDraft::new(debitor, creditor, Money::new(cents)))
            .await
            .unwrap();
    }

    let rows = engine.transactions();
    assert_eq!(
        rows.iter()
            .map(|row| (row.debitor.as_str(), row.credit.cents()))
            .collect::<Vec<_>>(),
        vec![("Alice", 100), ("Bob", 250), ("Carol", 7)]
    );
    assert!(rows.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert!(rows.iter().all(|row| row.credit == -row.debit));
    assert_eq!(archive_files(&engine).len(), 3);
}

#[tokio::test]
async fn invalid_drafts_write_nothing() {
    let (mut engine, _dir) = engine_with_archive().await;

    let err = engine
        .record(&EntryDraft::new("Alice", "Bob", Money::ZERO))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation(ValidationError::ZeroAmount));

    let err = engine
        .record(&EntryDraft::new("Alice", " ", Money::new(1)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::EmptyParty(Party::Creditor))
    );

    assert!(archive_files(&engine).is_empty());
    assert_eq!(row_count(engine.database()).await, 0);
}

#[tokio::test]
async fn archive_failure_leaves_no_database_row() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut engine = Engine::builder()
        .database(memory_db().await)
        .archive_dir(blocker.join("Transactions"))
        .build()
        .await
        .unwrap();

    let err = engine
        .record(&EntryDraft::new("Alice", "Bob", Money::new(5000)))
        .await
        .unwrap_err();

    assert!(err.is_archive_write_failed());
    assert!(!err.is_database_write_failed());
    assert_eq!(row_count(engine.database()).await, 0);
    assert!(engine.transactions().is_empty());
}

#[tokio::test]
async fn database_failure_leaves_a_detectable_orphan_file() {
    let (mut engine, _dir) = engine_with_archive().await;
    inject_insert_failure(engine.database()).await;

    let err = engine
        .record(&EntryDraft::new("Alice", "Bob", Money::new(5000)))
        .await
        .unwrap_err();

    let EngineError::Persistence(PersistenceError::DatabaseWriteFailed {
        archive_path,
        timestamp,
        ..
    }) = &err
    else {
        panic!("expected DatabaseWriteFailed, got {err:?}");
    };

    assert_eq!(
        std::fs::read_to_string(archive_path).unwrap(),
        "---\ndebitor: Alice\ndebit: -5000\ncredit: 5000\ncreditor: Bob\n---\n"
    );
    assert_eq!(
        archive_path.file_name().unwrap().to_str().unwrap(),
        archive::file_name(timestamp)
    );
    assert_eq!(row_count(engine.database()).await, 0);

    let orphans = engine.orphans().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(&orphans[0].path, archive_path);
    let contents = orphans[0].contents.as_ref().unwrap();
    assert_eq!(contents.debitor, "Alice");
    assert_eq!(contents.debit, Money::new(-5000));
}

#[tokio::test]
async fn orphans_ignore_files_with_rows() {
    let (mut engine, _dir) = engine_with_archive().await;

    engine
        .record(&EntryDraft::new("Alice", "Bob", Money::new(1)))
        .await
        .unwrap();
    assert!(engine.orphans().await.unwrap().is_empty());

    inject_insert_failure(engine.database()).await;
    engine
        .record(&EntryDraft::new("Bob", "Carol", Money::new(2)))
        .await
        .unwrap_err();
    engine
        .database()
        .execute_unprepared("DROP TRIGGER fail_insert")
        .await
        .unwrap();
    engine
        .record(&EntryDraft::new("Carol", "Dave", Money::new(3)))
        .await
        .unwrap();

    let orphans = engine.orphans().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].contents.as_ref().unwrap().debitor, "Bob");
    assert_eq!(engine.transactions().len(), 2);
    assert_eq!(archive_files(&engine).len(), 3);
}

#[tokio::test]
async fn orphans_of_a_missing_archive_directory_are_none() {
    let (engine, _dir) = engine_with_archive().await;
    assert!(engine.orphans().await.unwrap().is_empty());
}

#[tokio::test]
async fn form_keeps_input_until_something_is_persisted() {
    let (mut engine, _dir) = engine_with_archive().await;

    let mut form = EntryForm::new("Alice", "Bob", "fifty");
    let err = form.submit(&mut engine).await.unwrap_err();
    let EngineError::Validation(validation) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(validation.field(), Field::Amount);
    assert_eq!(form, EntryForm::new("Alice", "Bob", "fifty"));

    form.amount = "0".to_string();
    let err = form.submit(&mut engine).await.unwrap_err();
    assert_eq!(err, EngineError::Validation(ValidationError::ZeroAmount));
    assert!(!form.is_empty());

    form.amount = "50".to_string();
    let recorded = form.submit(&mut engine).await.unwrap();
    assert_eq!(recorded.entry.credit(), Money::new(5000));
    assert!(form.is_empty());
}

#[tokio::test]
async fn form_keeps_input_on_archive_failure_and_clears_on_database_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let mut engine = Engine::builder()
        .database(memory_db().await)
        .archive_dir(blocker.join("Transactions"))
        .build()
        .await
        .unwrap();

    let mut form = EntryForm::new("Alice", "Bob", "12,30");
    let err = form.submit(&mut engine).await.unwrap_err();
    assert!(err.is_archive_write_failed());
    assert_eq!(form, EntryForm::new("Alice", "Bob", "12,30"));

    let (mut engine, _dir) = engine_with_archive().await;
    inject_insert_failure(engine.database()).await;
    let err = form.submit(&mut engine).await.unwrap_err();
    assert!(err.is_database_write_failed());
    assert!(form.is_empty());
}

#[tokio::test]
async fn duplicate_migration_versions_prevent_the_engine_from_starting() {
    let db = memory_db().await;
    let mut registry = migration::registry();
    registry.register(MigrationDescriptor::up(
        20260119_000001,
        "conflicting transactions table",
        "CREATE TABLE transactions (id INTEGER PRIMARY KEY);",
    ));

    let err = Engine::builder()
        .database(db.clone())
        .registry(registry)
        .archive_dir(tempfile::tempdir().unwrap().path())
        .build()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Schema(SchemaError::DuplicateVersion { .. })
    ));
    let backend = db.get_database_backend();
    let table = db
        .query_one(Statement::from_string(
            backend,
            "SELECT name FROM sqlite_master WHERE name = 'transactions'",
        ))
        .await
        .unwrap();
    assert!(table.is_none());
}

#[tokio::test]
async fn restarting_the_engine_keeps_existing_entries() {
    let db = memory_db().await;
    let dir = tempfile::tempdir().unwrap();

    let mut engine = Engine::builder()
        .database(db.clone())
        .archive_dir(dir.path())
        .build()
        .await
        .unwrap();
    engine
        .record(&EntryDraft::new("Alice", "Bob", Money::new(42)))
        .await
        .unwrap();

    let restarted = Engine::builder()
        .database(db.clone())
        .registry(migration::registry())
        .archive_dir(dir.path())
        .build()
        .await
        .unwrap();
    assert_eq!(restarted.transactions().len(), 1);
    assert_eq!(restarted.transactions()[0].credit, Money::new(42));

    let extended: MigrationRegistry = migration::registry()
        .finalize()
        .unwrap()
        .into_iter()
        .chain([MigrationDescriptor::up(
            20260201_000001,
            "add note column",
            "ALTER TABLE transactions ADD COLUMN note TEXT;",
        )])
        .collect();
    let upgraded = Engine::builder()
        .database(db)
        .registry(extended)
        .archive_dir(dir.path())
        .build()
        .await
        .unwrap();
    assert_eq!(upgraded.transactions().len(), 1);
}
