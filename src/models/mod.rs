//! Data models for the mesh node's REST payloads.
//!
//! The firmware emits addresses as JSON numbers while other builds emit
//! strings, so the helpers here accept either form.

mod message;
mod node;

pub use message::*;
pub use node::*;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a node address given as a JSON string or number.
/// A missing or `null` address becomes the empty string.
pub(crate) fn de_address<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected address string or number, got {}",
            other
        ))),
    }
}

/// Deserialize a field whose `null` means the same as a missing key.
pub(crate) fn de_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a 0/1 flag that may also arrive as a JSON boolean.
pub(crate) fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64() == Some(1)),
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected flag, got {}",
            other
        ))),
    }
}
