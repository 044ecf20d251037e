use std::borrow::Cow;

const MAX_KEY_LEN: usize = 64;

#[platter_derive::platter_error]
pub enum ResourceGuardError {
    #[error("Resource validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Validation of record ids that arrive from clients.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Checks a client-supplied id against the table it must belong to.
    ///
    /// Accepts a bare key (`Xk3v9`) or a prefixed id (`order:Xk3v9`) and returns
    /// the bare key. Keys are 1 to 64 characters of `[A-Za-z0-9_-]`, which keeps
    /// them safe to splice into `type::thing`.
    ///
    /// # Errors
    /// [`ResourceGuardError::Validation`] when the prefix names another table or
    /// the key is malformed.
    pub fn verify<I, T>(id: I, expected_table: T) -> Result<String, ResourceGuardError>
    where
        I: AsRef<str>,
        T: AsRef<str>,
    {
        let id = id.as_ref().trim();
        let expected = expected_table.as_ref();

        let key = match id.split_once(':') {
            Some((table, _)) if table != expected => {
                return Err(ResourceGuardError::Validation {
                    message: format!("expected a '{expected}' id, got '{table}'").into(),
                    context: Some("id table mismatch".into()),
                });
            },
            Some((_, key)) => key,
            None => id,
        };

        let well_formed = !key.is_empty()
            && key.len() <= MAX_KEY_LEN
            && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !well_formed {
            return Err(ResourceGuardError::Validation {
                message: format!("malformed {expected} id").into(),
                context: None,
            });
        }

        Ok(key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_matching_prefix() {
        assert_eq!(ResourceGuard::verify("order:Ab3_x-9", "order").unwrap(), "Ab3_x-9");
        assert_eq!(ResourceGuard::verify("Ab3", "order").unwrap(), "Ab3");
    }

    #[test]
    fn rejects_foreign_tables() {
        let err = ResourceGuard::verify("account:abc", "order").unwrap_err();
        assert!(err.to_string().contains("account"));
    }

    #[test]
    fn rejects_malformed_keys() {
        for raw in ["", "order:", "a b", "x;DELETE", "⟨x⟩"] {
            assert!(ResourceGuard::verify(raw, "order").is_err(), "{raw:?}");
        }
        assert!(ResourceGuard::verify("k".repeat(65), "order").is_err());
        assert!(ResourceGuard::verify("k".repeat(64), "order").is_ok());
    }
}
