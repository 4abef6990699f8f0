//! Serialization layer: JSON via serde_json.
//!
//! [`JsonStore`](crate::JsonStore) and [`Cart`](crate::Cart) both write
//! through [`JsonSerializer`]; the trait keeps encoding apart from file
//! handling.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Converts stored documents to/from bytes.
pub trait Serializer: Send + Sync {
    /// Encode a document to bytes.
    fn serialize<T: Serialize>(&self, data: &T) -> Result<Vec<u8>>;

    /// Decode bytes back into a document.
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON serializer with optional pretty-printing.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON with indentation, easier to read by hand.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Serializer for JsonSerializer {
    fn serialize<T: Serialize>(&self, data: &T) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(data)
        } else {
            serde_json::to_vec(data)
        };
        bytes.map_err(|e| Error::Serialize(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}
