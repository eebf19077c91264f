//! JSON encoding of stored records

use crate::error::{RegistryError, RegistryResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn encode<T: Serialize>(key: &str, record: &T) -> RegistryResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| RegistryError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> RegistryResult<T> {
    serde_json::from_slice(bytes).map_err(|e| RegistryError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })
}
