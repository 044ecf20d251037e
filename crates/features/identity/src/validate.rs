use crate::error::IdentityError;
use platter_domain::phone::normalize_phone;

const NAME_MAX: usize = 80;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 128;
const EMAIL_MAX: usize = 254;

/// Trims and lowercases; requires `local@domain.tld` without spaces.
pub(crate) fn email(raw: &str) -> Result<String, IdentityError> {
    let email = raw.trim().to_lowercase();
    let valid = email.len() <= EMAIL_MAX
        && !email.chars().any(char::is_whitespace)
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
        });
    if valid { Ok(email) } else { Err(IdentityError::validation("email address is not valid")) }
}

pub(crate) fn name(raw: &str) -> Result<String, IdentityError> {
    let name = raw.trim();
    let len = name.chars().count();
    if (1..=NAME_MAX).contains(&len) {
        Ok(name.to_owned())
    } else {
        Err(IdentityError::validation(format!("name must be 1 to {NAME_MAX} characters")))
    }
}

pub(crate) fn password(raw: &str) -> Result<(), IdentityError> {
    let len = raw.chars().count();
    if (PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        Ok(())
    } else {
        Err(IdentityError::validation(format!(
            "password must be {PASSWORD_MIN} to {PASSWORD_MAX} characters"
        )))
    }
}

pub(crate) fn phone(raw: &str) -> Result<String, IdentityError> {
    normalize_phone(raw).ok_or_else(|| IdentityError::validation("phone must have 10 to 15 digits"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(email("  Asha@Example.IN ").unwrap(), "asha@example.in");
        for bad in ["", "asha", "asha@", "@example.in", "a@b", "a b@c.in", "a@@b.in", "a@b..in"] {
            assert!(email(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(name("  Dosa Corner ").unwrap(), "Dosa Corner");
        assert!(name("   ").is_err());
        assert!(name(&"x".repeat(81)).is_err());
    }

    #[test]
    fn passwords_are_bounded() {
        assert!(password("short").is_err());
        assert!(password("long enough").is_ok());
        assert!(password(&"p".repeat(129)).is_err());
    }

    #[test]
    fn phones_keep_plus_and_digits() {
        assert_eq!(phone("+91 98765-43210").unwrap(), "+919876543210");
        assert!(phone("12345").is_err());
        assert!(phone("98765abc10").is_err());
    }
}
