//! Credential pool with a circular rotation cursor.
//!
//! Shared by all concurrent requests; rotation is a single atomic transition.

use crate::domain::DomainError;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Opaque API credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        write!(f, "ApiKey(…{})", tail)
    }
}

/// Ordered, non-empty list of keys plus a cursor in `[0, len)`.
#[derive(Debug)]
pub struct KeyPool {
    keys: Vec<ApiKey>,
    cursor: AtomicUsize,
}

impl KeyPool {
    /// Build a pool from raw key strings. Blank entries are dropped.
    ///
    /// # Errors
    /// `DomainError::Configuration` when no usable key remains.
    pub fn new<I, S>(keys: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<ApiKey> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .map(ApiKey::new)
            .collect();
        if keys.is_empty() {
            return Err(DomainError::Configuration(
                "no API keys configured (set GEMINI_API_KEY)".to_string(),
            ));
        }
        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Never true: construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current cursor position, for logging.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn current(&self) -> ApiKey {
        self.keys[self.cursor()].clone()
    }

    /// Advance the cursor one step (wrapping) and return the new current key.
    pub fn rotate(&self) -> ApiKey {
        let n = self.keys.len();
        let (Ok(prev) | Err(prev)) =
            self.cursor
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % n));
        self.keys[(prev + 1) % n].clone()
    }
}
