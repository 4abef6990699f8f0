//! Product records: the transient shape handed to `create` and the persisted
//! shape every store returns.

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque product identifier, assigned by the store on creation.
///
/// The file-backed store hands out UUID strings, a table-backed store would
/// hand out stringified integers. Callers should only compare ids, never parse
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap an existing identifier, e.g. one taken from a request path.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Fields of a product that hasn't been persisted yet (no id).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewProduct {
    /// Display title. Must not be blank.
    pub title: String,
    /// Optional image location.
    pub image_url: Option<String>,
    /// Unit price. Must not be negative.
    pub price: Decimal,
    /// Optional free-form description.
    pub description: Option<String>,
}

impl NewProduct {
    /// Title and price, no image or description.
    pub fn new(title: impl Into<String>, price: Decimal) -> Self {
        Self {
            title: title.into(),
            price,
            ..Self::default()
        }
    }

    /// Set the image URL.
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Attach an id, turning this into a persisted record.
    pub(crate) fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            description: self.description,
        }
    }
}

/// A persisted product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned id, immutable once assigned.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Optional image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Unit price, written to disk as an exact JSON number.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub(crate) fn validate(title: &str, price: Decimal) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Invalid("title must not be blank".into()));
    }
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::Invalid(format!("price must not be negative, got {price}")));
    }
    Ok(())
}
