//! Ledger stub abstraction
//!
//! The [`ChaincodeStub`] trait is the only way contract code touches shared
//! state. Every call is scoped to one transaction; implementations decide how
//! reads are tracked and when writes become visible.

use crate::composite::{self, MAX_UNICODE_RUNE};
use crate::error::LedgerResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A key with its committed value, as returned by range scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// State key
    pub key: String,
    /// Stored value bytes
    pub value: Vec<u8>,
}

/// Lazy sequence of range-scan results in ascending key order.
pub struct StateIterator {
    inner: Box<dyn Iterator<Item = LedgerResult<KeyValue>> + Send>,
}

impl StateIterator {
    /// Wrap any iterator of results.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = LedgerResult<KeyValue>> + Send + 'static,
    {
        Self { inner: Box::new(iter) }
    }

    /// An iterator that yields nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for StateIterator {
    type Item = LedgerResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for StateIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateIterator").finish_non_exhaustive()
    }
}

/// Transaction-scoped access to the shared key-value state.
///
/// Range scans are `[start_key, end_key)`; an empty `end_key` means unbounded.
/// Simple-key scans never return composite keys.
#[async_trait]
pub trait ChaincodeStub: Send + Sync {
    /// Identifier of the transaction this stub belongs to.
    fn tx_id(&self) -> &str;

    /// Proposal timestamp of the transaction.
    fn tx_timestamp(&self) -> DateTime<Utc>;

    /// Read a committed value.
    async fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Stage a write; visible to other transactions only after commit.
    async fn put_state(&self, key: &str, value: Vec<u8>) -> LedgerResult<()>;

    /// Scan simple keys in `[start_key, end_key)`.
    async fn get_state_by_range(&self, start_key: &str, end_key: &str) -> LedgerResult<StateIterator>;

    /// Scan every composite key that extends the given namespace and leading attributes.
    async fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> LedgerResult<StateIterator>;

    /// Build a composite key in the platform encoding.
    fn create_composite_key(&self, object_type: &str, attributes: &[&str]) -> LedgerResult<String> {
        composite::create_composite_key(object_type, attributes)
    }

    /// Split a composite key into its namespace and attributes.
    fn split_composite_key(&self, key: &str) -> LedgerResult<(String, Vec<String>)> {
        composite::split_composite_key(key)
    }
}

/// Exclusive upper bound covering every key that starts with `prefix`.
pub(crate) fn prefix_end(prefix: &str) -> String {
    let mut end = String::with_capacity(prefix.len() + MAX_UNICODE_RUNE.len_utf8());
    end.push_str(prefix);
    end.push(MAX_UNICODE_RUNE);
    end
}
