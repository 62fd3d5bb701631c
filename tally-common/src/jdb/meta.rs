//! Typed metadata sidecar stored on the header line

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Bound for a store's metadata struct
pub trait Meta: Clone + Default + Serialize + DeserializeOwned {}

impl<T: Clone + Default + Serialize + DeserializeOwned> Meta for T {}

/// Metadata of stores that carry none; serializes to no keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoMeta {}

/// Canonical JSON of `meta`, or `""` when absent or without keys
pub fn stringify<M: Serialize>(meta: Option<&M>) -> String {
    let Some(meta) = meta else {
        return String::new();
    };
    // Map keys come out sorted, which makes the text canonical
    match serde_json::to_value(meta) {
        Ok(serde_json::Value::Null) => String::new(),
        Ok(serde_json::Value::Object(map)) if map.is_empty() => String::new(),
        Ok(value) => value.to_string(),
        Err(e) => {
            error!("Failed to serialize store metadata: {}", e);
            String::new()
        }
    }
}
