use crate::model::{AccountPatch, AccountRecord};
use chrono::{DateTime, Utc};
use platter_database::{Database, DatabaseError, DatabaseErrorExt};

const SELECT: &str = "SELECT *, record::id(id) AS id FROM account";

#[derive(Debug, Clone)]
pub(crate) struct AccountRepository {
    db: Database,
}

impl AccountRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    /// # Errors
    /// [`DatabaseError::Conflict`] when the email is already registered.
    pub(crate) async fn create(&self, record: AccountRecord) -> Result<(), DatabaseError> {
        self.db
            .query("CREATE account CONTENT $record RETURN NONE")
            .bind(("record", record))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "creating account"))?;
        Ok(())
    }

    pub(crate) async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, DatabaseError> {
        let mut response = self
            .db
            .query(format!("{SELECT} WHERE email = $email LIMIT 1"))
            .bind(("email", email.to_owned()))
            .await
            .context("loading account by email")?;
        response.take::<Option<AccountRecord>>(0).context("decoding account")
    }

    pub(crate) async fn find_by_id(&self, id: &str) -> Result<Option<AccountRecord>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT *, record::id(id) AS id FROM ONLY type::thing('account', $id)")
            .bind(("id", id.to_owned()))
            .await
            .context("loading account")?;
        response.take::<Option<AccountRecord>>(0).context("decoding account")
    }

    pub(crate) async fn mark_verified(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db
            .query("UPDATE type::thing('account', $id) SET verified = true, updatedAt = $now RETURN NONE")
            .bind(("id", id.to_owned()))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .context("verifying account")?;
        Ok(())
    }

    pub(crate) async fn update_profile(
        &self,
        id: &str,
        patch: AccountPatch,
    ) -> Result<(), DatabaseError> {
        self.db
            .query("UPDATE type::thing('account', $id) MERGE $patch RETURN NONE")
            .bind(("id", id.to_owned()))
            .bind(("patch", patch))
            .await
            .and_then(surrealdb::Response::check)
            .context("updating account")?;
        Ok(())
    }

    pub(crate) async fn set_password(
        &self,
        id: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db
            .query(
                "UPDATE type::thing('account', $id) SET passwordHash = $hash, updatedAt = $now RETURN NONE",
            )
            .bind(("id", id.to_owned()))
            .bind(("hash", password_hash))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .context("changing password")?;
        Ok(())
    }
}
