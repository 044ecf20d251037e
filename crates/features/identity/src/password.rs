use crate::error::IdentityError;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Argon2id PHC string for `password`. Runs on the blocking pool.
pub(crate) async fn hash(password: String) -> Result<String, IdentityError> {
    blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| IdentityError::Internal {
                message: e.to_string().into(),
                context: Some("hashing password".into()),
            })
    })
    .await
}

/// Checks `password` against a stored PHC string.
pub(crate) async fn verify(password: String, phc: String) -> Result<bool, IdentityError> {
    blocking(move || {
        let parsed = PasswordHash::new(&phc).map_err(|e| IdentityError::Internal {
            message: e.to_string().into(),
            context: Some("parsing stored password hash".into()),
        })?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
}

async fn blocking<T, F>(f: F) -> Result<T, IdentityError>
where
    F: FnOnce() -> Result<T, IdentityError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| IdentityError::Internal {
        message: e.to_string().into(),
        context: Some("password worker".into()),
    })?
}
