use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::{debug, info};

const LEDGER: &str = "
    DEFINE TABLE IF NOT EXISTS migration SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS slice ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS version ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS checksum ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS applied_at ON migration TYPE datetime DEFAULT time::now();
";

/// One SurrealQL script owned by a feature slice.
///
/// Slices ship their scripts with `include_str!` and hand them to
/// [`crate::DatabaseBuilder::migrations`]. Scripts run in the order given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub slice: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(slice: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice, version, script }
    }

    /// Hex SHA-256 of the script text.
    #[must_use]
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.script.as_bytes()))
    }

    fn key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }
}

/// Outcome of a migration run, as `slice:version` keys.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AppliedMigration {
    slice: String,
    version: String,
    checksum: String,
}

pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self, migrations: &[Migration]) -> Result<MigrationReport, DatabaseError> {
        self.db
            .query(LEDGER)
            .await
            .and_then(surrealdb::Response::check)
            .context("Defining migration ledger")?;

        let applied = self.applied().await?;
        let mut report = MigrationReport::default();

        for migration in migrations {
            let checksum = migration.checksum();
            if let Some(existing) = applied.get(&migration.key()) {
                ensure_checksum_match(migration, &existing.checksum, &checksum)?;
                debug!(slice = migration.slice, version = migration.version, "Migration already applied");
                report.skipped.push(migration.key());
                continue;
            }

            self.apply(migration, checksum).await?;
            info!(slice = migration.slice, version = migration.version, "Applied migration");
            report.applied.push(migration.key());
        }

        Ok(report)
    }

    async fn apply(&self, migration: &Migration, checksum: String) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE type::thing('migration', [$slice, $version])
                CONTENT {{ slice: $slice, version: $version, checksum: $checksum }}
                RETURN NONE;
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(query)
            .bind(("slice", migration.slice))
            .bind(("version", migration.version))
            .bind(("checksum", checksum))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::Migration {
                message: e.to_string().into(),
                context: Some(format!("applying {}", migration.key()).into()),
            })?;

        Ok(())
    }

    async fn applied(&self) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.slice, entry.version), entry))
            .collect())
    }
}

fn ensure_checksum_match(
    migration: &Migration,
    recorded: &str,
    current: &str,
) -> Result<(), DatabaseError> {
    if recorded == current {
        return Ok(());
    }
    Err(DatabaseError::Migration {
        message: format!(
            "checksum mismatch for {} (recorded {recorded}, found {current})",
            migration.key()
        )
        .into(),
        context: Some("applied migrations must not be edited".into()),
    })
}
