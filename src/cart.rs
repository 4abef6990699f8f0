//! Cart accumulator: selected products, quantities, and a running total.
//!
//! Prices are pinned. A line keeps the unit price it was created with, and the
//! total is always moved by that pinned price, so `total_price` equals the sum
//! of `quantity * unit_price` over the lines no matter how the product's price
//! changes later.

use crate::error::{Error, Result};
use crate::event::{StoreEvent, StoreObserver};
use crate::model::{Product, ProductId};
use crate::persist::{atomic_write, check_path, read_blob};
use crate::serializer::{JsonSerializer, Serializer};
use crate::store::RecordStore;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Non-owning reference to a product record.
    pub product_id: ProductId,
    /// Always at least 1; the line is dropped when it would reach 0.
    pub quantity: u32,
    /// Price snapshotted when the line was created.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub unit_price: Decimal,
}

/// Read-only view of the cart, also its on-disk shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Lines in the order products were first added.
    pub lines: Vec<CartLine>,
    /// Sum of `quantity * unit_price` over `lines`.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_price: Decimal,
}

impl CartSnapshot {
    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| &l.product_id == id)
    }

    fn drop_line(&mut self, id: &ProductId) {
        self.lines.retain(|l| &l.product_id != id);
    }

    /// Every line has a quantity and the total matches the lines.
    fn check(&self) -> Result<()> {
        let mut sum = Decimal::ZERO;
        for line in &self.lines {
            if line.quantity == 0 {
                return Err(Error::Malformed(format!("cart line {} has quantity 0", line.product_id)));
            }
            sum = line_total(line)
                .and_then(|t| sum.checked_add(t))
                .ok_or_else(|| Error::Malformed("cart total overflows".into()))?;
        }
        if sum != self.total_price {
            return Err(Error::Malformed(format!(
                "cart total {} doesn't match its lines ({sum})",
                self.total_price
            )));
        }
        Ok(())
    }
}

fn line_total(line: &CartLine) -> Option<Decimal> {
    line.unit_price.checked_mul(Decimal::from(line.quantity))
}

fn overflow(id: &ProductId) -> Error {
    Error::Invalid(format!("cart arithmetic overflow on {id}"))
}

struct CartFile {
    path: PathBuf,
    serializer: JsonSerializer,
}

/// Thread-safe cart, optionally mirrored to a JSON file.
///
/// Each mutation is applied to a copy, written out (for file-backed carts),
/// and only then made visible. A failed write leaves the cart unchanged.
pub struct Cart {
    state: Mutex<CartSnapshot>,
    file: Option<CartFile>,
}

impl Cart {
    /// Cart that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(CartSnapshot::default()),
            file: None,
        }
    }

    /// Load (or start) a cart persisted at `path`. A missing or blank file is
    /// an empty cart. Unparseable content, a zero quantity, or a total that
    /// doesn't match the lines is [`Error::Malformed`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        check_path(&path)?;
        let serializer = JsonSerializer::new();
        let state = match read_blob(&path)? {
            Some(bytes) => serializer.deserialize::<CartSnapshot>(&bytes)?,
            None => CartSnapshot::default(),
        };
        state.check()?;
        debug!(path = %path.display(), lines = state.lines.len(), "cart opened");
        Ok(Self {
            state: Mutex::new(state),
            file: Some(CartFile { path, serializer }),
        })
    }

    /// Add one unit of `id`. A new line is created at `unit_price`; an
    /// existing line keeps its pinned price.
    pub fn add_product(&self, id: &ProductId, unit_price: Decimal) -> Result<()> {
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(Error::Invalid(format!("unit price must not be negative, got {unit_price}")));
        }
        self.mutate(|cart| {
            match cart.line_mut(id) {
                Some(line) => {
                    line.quantity = line.quantity.checked_add(1).ok_or_else(|| overflow(id))?;
                    let pinned = line.unit_price;
                    cart.total_price = cart.total_price.checked_add(pinned).ok_or_else(|| overflow(id))?;
                }
                None => {
                    cart.total_price = cart
                        .total_price
                        .checked_add(unit_price)
                        .ok_or_else(|| overflow(id))?;
                    cart.lines.push(CartLine {
                        product_id: id.clone(),
                        quantity: 1,
                        unit_price,
                    });
                }
            }
            Ok(true)
        })
    }

    /// Take one unit of `id` out; the line goes away at zero. No-op when the
    /// cart has no line for `id`. The total moves by the line's pinned price;
    /// `unit_price` is only compared against it.
    pub fn remove_product(&self, id: &ProductId, unit_price: Decimal) -> Result<()> {
        self.mutate(|cart| {
            let Some(line) = cart.line_mut(id) else {
                return Ok(false);
            };
            if line.unit_price != unit_price {
                debug!(%id, pinned = %line.unit_price, given = %unit_price, "removing at pinned price");
            }
            line.quantity = line.quantity.checked_sub(1).ok_or_else(|| overflow(id))?;
            let (pinned, emptied) = (line.unit_price, line.quantity == 0);
            cart.total_price = cart.total_price.checked_sub(pinned).ok_or_else(|| overflow(id))?;
            if emptied {
                cart.drop_line(id);
            }
            Ok(true)
        })
    }

    /// Drop the whole line for `id`, whatever its quantity. No-op when absent.
    pub fn delete_product(&self, id: &ProductId) -> Result<()> {
        self.mutate(|cart| {
            let Some(line) = cart.line_mut(id) else {
                return Ok(false);
            };
            let removed = line_total(line)
                .and_then(|t| cart.total_price.checked_sub(t))
                .ok_or_else(|| overflow(id))?;
            cart.total_price = removed;
            cart.drop_line(id);
            Ok(true)
        })
    }

    /// Resolve `id` through `store` and add it at the product's current price.
    pub fn add_from_store(&self, store: &dyn RecordStore, id: &ProductId) -> Result<Product> {
        let product = store
            .find_by_id(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        self.add_product(&product.id, product.price)?;
        Ok(product)
    }

    /// Current lines and total.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.state.lock().clone()
    }

    /// Ids of every product in the cart, in line order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.state
            .lock()
            .lines
            .iter()
            .map(|l| l.product_id.clone())
            .collect()
    }

    /// Apply `f` to a copy; persist and commit only if it reports a change.
    /// An error from `f` leaves the cart as it was.
    fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut CartSnapshot) -> Result<bool>,
    {
        let mut state = self.state.lock();
        let mut next = state.clone();
        if !f(&mut next)? {
            return Ok(());
        }
        if let Some(file) = &self.file {
            let bytes = file.serializer.serialize(&next)?;
            atomic_write(&file.path, &bytes)?;
        }
        *state = next;
        Ok(())
    }
}

impl StoreObserver for Cart {
    fn on_event(&self, event: &StoreEvent) -> Result<()> {
        if let StoreEvent::Deleted(product) = event {
            info!(id = %product.id, "purging deleted product from cart");
            self.delete_product(&product.id)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Cart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cart")
            .field("path", &self.file.as_ref().map(|c| &c.path))
            .field("lines", &self.state.lock().lines.len())
            .finish()
    }
}
