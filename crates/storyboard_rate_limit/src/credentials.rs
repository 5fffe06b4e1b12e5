//! Stateless API key selection.
//!
//! Keys are loaded once into an immutable [`CredentialPool`]. Which key a
//! request uses is a pure function of the pool and the request's attempt
//! ordinal, so concurrent calls never share a mutable rotation index.

use tracing::debug;

/// Immutable, ordered set of API keys.
///
/// # Examples
///
/// ```
/// use storyboard_rate_limit::{CredentialPool, CredentialStrategy, RotateByAttempt};
///
/// let pool = CredentialPool::new(["key-a", "key-b"]);
/// assert_eq!(RotateByAttempt.select(&pool, 0), Some("key-a"));
/// assert_eq!(RotateByAttempt.select(&pool, 1), Some("key-b"));
/// assert_eq!(RotateByAttempt.select(&pool, 2), Some("key-a"));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialPool {
    keys: Vec<String>,
}

impl std::fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPool")
            .field("keys", &format!("<{} redacted>", self.keys.len()))
            .finish()
    }
}

impl CredentialPool {
    /// Pool from explicit keys; blank keys are dropped.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(Into::into)
                .map(|k: String| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Read `{prefix}1` through `{prefix}{max_keys}` from the environment.
    ///
    /// Missing or blank variables are skipped; numbering gaps are allowed.
    pub fn from_env(prefix: &str, max_keys: usize) -> Self {
        Self::from_lookup(prefix, max_keys, |name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup<F>(prefix: &str, max_keys: usize, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pool = Self::new((1..=max_keys).filter_map(|i| lookup(&format!("{}{}", prefix, i))));
        debug!(prefix, count = pool.len(), "Loaded API keys");
        pool
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when no keys are configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }
}

/// Chooses a key for one request attempt.
pub trait CredentialStrategy: Send + Sync + std::fmt::Debug {
    /// Key for the given zero-based attempt, or `None` if the pool is empty.
    fn select<'a>(&self, pool: &'a CredentialPool, attempt: u32) -> Option<&'a str>;
}

/// Moves to the next key on every retry, wrapping around.
///
/// A rate-limited or rejected key is therefore not reused on the next attempt
/// when more than one key is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotateByAttempt;

impl CredentialStrategy for RotateByAttempt {
    fn select<'a>(&self, pool: &'a CredentialPool, attempt: u32) -> Option<&'a str> {
        if pool.is_empty() {
            return None;
        }
        pool.get(attempt as usize % pool.len())
    }
}

/// Always uses the first key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstKey;

impl CredentialStrategy for FirstKey {
    fn select<'a>(&self, pool: &'a CredentialPool, _attempt: u32) -> Option<&'a str> {
        pool.get(0)
    }
}
