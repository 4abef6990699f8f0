//! In-process record store with database-style integer ids.
//!
//! Same contract as [`JsonStore`](crate::JsonStore), nothing touches disk. Ids
//! come from a counter the way an auto-increment column would hand them out,
//! so code written against [`RecordStore`] can be exercised against a second
//! id scheme.

use crate::error::{Error, Result};
use crate::event::{Observers, StoreEvent, StoreObserver};
use crate::model::{validate, NewProduct, Product, ProductId};
use crate::store::RecordStore;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Product>,
    last_id: u64,
}

/// Records held in a `RwLock<Vec<_>>`. Each mutation runs under the write
/// lock, the same single-writer discipline `JsonStore` uses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
    observers: Observers,
}

impl MemoryStore {
    /// Empty store; the first id handed out is `1`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn list(&self) -> Result<Vec<Product>> {
        Ok(self.table.read().rows.clone())
    }

    fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self.table.read().rows.iter().find(|p| &p.id == id).cloned())
    }

    fn create(&self, fields: NewProduct) -> Result<Product> {
        validate(&fields.title, fields.price)?;
        let product = {
            let mut table = self.table.write();
            table.last_id += 1;
            let product = fields.with_id(ProductId::new(table.last_id.to_string()));
            table.rows.push(product.clone());
            product
        };
        info!(id = %product.id, title = %product.title, "product created");
        self.observers.publish(&StoreEvent::Created(product.clone()))?;
        Ok(product)
    }

    fn update(&self, product: Product) -> Result<Product> {
        validate(&product.title, product.price)?;
        {
            let mut table = self.table.write();
            let slot = table
                .rows
                .iter_mut()
                .find(|p| p.id == product.id)
                .ok_or_else(|| Error::NotFound(product.id.to_string()))?;
            *slot = product.clone();
        }
        info!(id = %product.id, "product updated");
        self.observers.publish(&StoreEvent::Updated(product.clone()))?;
        Ok(product)
    }

    fn delete_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        let removed = {
            let mut table = self.table.write();
            match table.rows.iter().position(|p| &p.id == id) {
                Some(idx) => table.rows.remove(idx),
                None => {
                    debug!(%id, "delete of unknown product ignored");
                    return Ok(None);
                }
            }
        };
        info!(%id, "product deleted");
        self.observers.publish(&StoreEvent::Deleted(removed.clone()))?;
        Ok(Some(removed))
    }

    fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.observers.subscribe(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ids_count_up_and_are_not_reused() {
        let store = MemoryStore::new();
        let a = store.create(NewProduct::new("A", dec!(1))).unwrap();
        let b = store.create(NewProduct::new("B", dec!(2))).unwrap();
        assert_eq!(a.id.as_str(), "1");
        assert_eq!(b.id.as_str(), "2");

        store.delete_by_id(&b.id).unwrap();
        let c = store.create(NewProduct::new("C", dec!(3))).unwrap();
        assert_eq!(c.id.as_str(), "3");
    }
}
