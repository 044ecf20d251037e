use platter_kernel::{SAFE_ALPHABET, safe_nanoid};

#[test]
fn default_ids_use_the_safe_alphabet() {
    let id = safe_nanoid!();
    assert_eq!(id.len(), 12);
    assert!(id.chars().all(|ch| SAFE_ALPHABET.contains(&ch)), "unexpected character in {id}");
}

#[test]
fn custom_length() {
    assert_eq!(safe_nanoid!(20).len(), 20);
}

#[test]
fn ids_are_accepted_by_the_resource_guard() {
    use platter_kernel::security::resource::ResourceGuard;
    let id = safe_nanoid!();
    assert_eq!(ResourceGuard::verify(format!("order:{id}"), "order").unwrap(), id);
}
