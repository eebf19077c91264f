//! # Composite Keys
//!
//! Multi-part keys in the platform encoding:
//!
//! ```text
//! \u{0} namespace \u{0} attr1 \u{0} attr2 \u{0} ... attrN \u{0}
//! ```
//!
//! The leading `\u{0}` keeps composite keys out of every simple-key range scan,
//! and the trailing delimiter makes a partial key a strict prefix of every full
//! key that extends it.

use crate::error::{LedgerError, LedgerResult};

/// Prefix and delimiter of every composite key.
pub const COMPOSITE_KEY_NAMESPACE: char = '\u{0}';

/// Highest Unicode scalar value; used as the exclusive upper bound of prefix scans.
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

/// Build a composite key from a namespace and its attributes.
///
/// # Arguments
///
/// * `object_type` - Namespace of the key (e.g., `"policy"`)
/// * `attributes` - Ordered key parts
///
/// # Returns
///
/// The encoded key, or `LedgerError::InvalidKey` if any part contains
/// `\u{0}` or `\u{10FFFF}`
///
/// # Example
///
/// ```
/// use acmc_ledger::create_composite_key;
///
/// let key = create_composite_key("policy", &["Creator", "cid-1", "download"]).unwrap();
/// assert_eq!(key, "\u{0}policy\u{0}Creator\u{0}cid-1\u{0}download\u{0}");
/// ```
pub fn create_composite_key(object_type: &str, attributes: &[&str]) -> LedgerResult<String> {
    validate_component(object_type)?;

    let capacity = 2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>();
    let mut key = String::with_capacity(capacity);
    key.push(COMPOSITE_KEY_NAMESPACE);
    key.push_str(object_type);
    key.push(COMPOSITE_KEY_NAMESPACE);

    for attribute in attributes {
        validate_component(attribute)?;
        key.push_str(attribute);
        key.push(COMPOSITE_KEY_NAMESPACE);
    }

    Ok(key)
}

/// Split a composite key back into its namespace and attributes.
///
/// # Returns
///
/// `(object_type, attributes)`, or `LedgerError::InvalidKey` if the key is not
/// in composite form
///
/// # Example
///
/// ```
/// use acmc_ledger::{create_composite_key, split_composite_key};
///
/// let key = create_composite_key("policy", &["Public", "cid-9", "read"]).unwrap();
/// let (object_type, attributes) = split_composite_key(&key).unwrap();
/// assert_eq!(object_type, "policy");
/// assert_eq!(attributes, vec!["Public", "cid-9", "read"]);
/// ```
pub fn split_composite_key(key: &str) -> LedgerResult<(String, Vec<String>)> {
    let body = key
        .strip_prefix(COMPOSITE_KEY_NAMESPACE)
        .and_then(|rest| rest.strip_suffix(COMPOSITE_KEY_NAMESPACE))
        .ok_or_else(|| LedgerError::InvalidKey(format!("not a composite key: {:?}", key)))?;

    let mut parts = body.split(COMPOSITE_KEY_NAMESPACE).map(str::to_string);
    let object_type = parts
        .next()
        .ok_or_else(|| LedgerError::InvalidKey(format!("composite key without namespace: {:?}", key)))?;

    Ok((object_type, parts.collect()))
}

/// Check whether a key is in composite form.
pub fn is_composite_key(key: &str) -> bool {
    key.starts_with(COMPOSITE_KEY_NAMESPACE)
}

fn validate_component(component: &str) -> LedgerResult<()> {
    if component.contains(COMPOSITE_KEY_NAMESPACE) || component.contains(MAX_UNICODE_RUNE) {
        return Err(LedgerError::InvalidKey(format!(
            "composite key component {:?} contains a reserved character",
            component
        )));
    }
    Ok(())
}
