//! Product record store and cart accumulator for a small catalog backend.
//!
//! Records live in a single JSON document ([`JsonStore`]) or anywhere else
//! that implements [`RecordStore`]. Carts subscribe to store events so
//! deleting a product also clears it from every cart that holds it.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use catalog_store::{Cart, JsonStore, NewProduct, RecordStore};
//! use rust_decimal::Decimal;
//!
//! let store = JsonStore::open("data/products.json").unwrap();
//! let cart = Arc::new(Cart::in_memory());
//! store.subscribe(cart.clone());
//!
//! let lamp = store.create(NewProduct::new("Lamp", Decimal::from(20))).unwrap();
//! cart.add_from_store(&store, &lamp.id).unwrap();
//! store.delete_by_id(&lamp.id).unwrap();
//! assert!(cart.snapshot().lines.is_empty());
//! ```
//!
//! **Single-process only.** Writers are serialized per store instance. If
//! multiple processes open the same file they will clobber each other; use a
//! table-backed [`RecordStore`] for that.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod cart;
pub mod error;
pub mod event;
pub mod memory;
pub mod model;
pub mod persist;
pub mod serializer;
pub mod store;

pub use cart::{Cart, CartLine, CartSnapshot};
pub use error::{Error, Result};
pub use event::{StoreEvent, StoreObserver};
pub use memory::MemoryStore;
pub use model::{NewProduct, Product, ProductId};
pub use store::{JsonStore, JsonStoreBuilder, MalformedPolicy, RecordStore};
