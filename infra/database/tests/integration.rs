use platter_database::{Database, DatabaseError, Migration};
use serde::Deserialize;

const NOTES_V1: Migration = Migration::new(
    "notes",
    "0001",
    "DEFINE TABLE note SCHEMAFULL;
     DEFINE FIELD title ON note TYPE string;
     DEFINE INDEX note_title ON note FIELDS title UNIQUE;",
);

async fn open(migrations: Vec<Migration>) -> Result<Database, DatabaseError> {
    Database::builder().url("mem://").session("platter", "test").migrations(migrations).init().await
}

#[derive(Debug, Deserialize)]
struct Note {
    id: String,
    title: String,
}

#[tokio::test]
async fn connects_in_memory_and_answers_health() {
    let db = open(Vec::new()).await.expect("connect to mem://");
    db.health().await.expect("health check");
    assert_eq!(db.namespace(), "platter");
    assert_eq!(db.database(), "test");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));

    let err = Database::builder().url("mem://").session("", "db").init().await.unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[tokio::test]
async fn applied_migrations_are_skipped_on_rerun() {
    let db = open(vec![NOTES_V1]).await.expect("init");

    let report = db.migrate(&[NOTES_V1]).await.expect("rerun");
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped, vec!["notes:0001".to_owned()]);

    let next = Migration::new("notes", "0002", "DEFINE FIELD body ON note TYPE option<string>;");
    let report = db.migrate(&[NOTES_V1, next]).await.expect("second version");
    assert_eq!(report.applied, vec!["notes:0002".to_owned()]);
}

#[tokio::test]
async fn edited_migration_fails_checksum() {
    let db = open(vec![NOTES_V1]).await.expect("init");
    let edited = Migration::new("notes", "0001", "DEFINE TABLE note SCHEMALESS;");

    let err = db.migrate(&[edited]).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Migration { .. }), "{err}");
}

#[tokio::test]
async fn failing_script_is_not_recorded() {
    let db = open(Vec::new()).await.expect("init");
    let broken = Migration::new("broken", "0001", "THIS IS NOT SURREALQL;");

    assert!(db.migrate(&[broken]).await.is_err());

    let mut response =
        db.query("SELECT VALUE slice FROM migration WHERE slice = 'broken'").await.expect("query");
    let recorded: Vec<String> = response.take(0).expect("take");
    assert!(recorded.is_empty());
}

#[tokio::test]
async fn unique_index_violation_is_a_conflict() {
    let db = open(vec![NOTES_V1]).await.expect("init");

    let insert = "CREATE note CONTENT { title: $title } RETURN NONE";
    db.query(insert).bind(("title", "menu")).await.and_then(|r| r.check()).expect("first insert");

    let err = db
        .query(insert)
        .bind(("title", "menu"))
        .await
        .and_then(|r| r.check())
        .map_err(|e| DatabaseError::from_write(e, "creating note"))
        .unwrap_err();
    assert!(err.is_conflict(), "{err}");

    let mut response =
        db.query("SELECT *, record::id(id) AS id FROM note").await.expect("select notes");
    let notes: Vec<Note> = response.take(0).expect("take notes");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "menu");
    assert!(!notes[0].id.is_empty());
}
