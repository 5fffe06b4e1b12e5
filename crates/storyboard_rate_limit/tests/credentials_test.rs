use std::collections::HashMap;
use storyboard_rate_limit::{CredentialPool, CredentialStrategy, FirstKey, RotateByAttempt};

#[test]
fn test_pool_from_lookup_skips_gaps_and_blanks() {
    let vars: HashMap<&str, &str> = [
        ("KEY_1", "alpha"),
        ("KEY_2", "   "),
        ("KEY_4", "delta"),
        ("KEY_11", "ignored"),
    ]
    .into_iter()
    .collect();

    let pool = CredentialPool::from_lookup("KEY_", 10, |name| vars.get(name).map(|v| v.to_string()));

    assert_eq!(pool.len(), 2);
    assert_eq!(pool.get(0), Some("alpha"));
    assert_eq!(pool.get(1), Some("delta"));
}

#[test]
fn test_rotate_by_attempt_is_stateless() {
    let pool = CredentialPool::new(["a", "b", "c"]);
    let strategy = RotateByAttempt;

    let picks: Vec<_> = (0..5).map(|n| strategy.select(&pool, n)).collect();
    assert_eq!(picks, vec![Some("a"), Some("b"), Some("c"), Some("a"), Some("b")]);

    // Same input, same output.
    assert_eq!(strategy.select(&pool, 1), strategy.select(&pool, 1));
}

#[test]
fn test_empty_pool_selects_nothing() {
    let pool = CredentialPool::default();
    assert!(pool.is_empty());
    assert_eq!(RotateByAttempt.select(&pool, 3), None);
    assert_eq!(FirstKey.select(&pool, 0), None);
}

#[test]
fn test_first_key_ignores_attempt() {
    let pool = CredentialPool::new(["a", "b"]);
    assert_eq!(FirstKey.select(&pool, 7), Some("a"));
}

#[test]
fn test_debug_redacts_keys() {
    let pool = CredentialPool::new(["secret-key"]);
    assert!(!format!("{:?}", pool).contains("secret-key"));
}
