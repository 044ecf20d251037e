/// Drops spaces and dashes, then requires 10 to 15 digits with an optional
/// leading `+`. Returns the compacted number.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let compact: String = raw.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    ((10..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()))
        .then_some(compact)
}

#[cfg(test)]
mod tests {
    use super::normalize_phone;

    #[test]
    fn numbers_are_compacted() {
        assert_eq!(normalize_phone("+91 98765-43210").as_deref(), Some("+919876543210"));
        assert_eq!(normalize_phone("9876543210").as_deref(), Some("9876543210"));
        for bad in ["98765", "98765abcde", "+", "", "+-"] {
            assert!(normalize_phone(bad).is_none(), "{bad:?}");
        }
    }
}
