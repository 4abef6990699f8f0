//! The record store contract and its file-backed implementation.

use crate::error::{Error, Result};
use crate::event::{Observers, StoreEvent, StoreObserver};
use crate::model::{validate, NewProduct, Product, ProductId};
use crate::persist::{atomic_write, check_path, read_blob};
use crate::serializer::{JsonSerializer, Serializer};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// CRUD over the full collection of product records.
///
/// Implementations differ in where records live and how they keep concurrent
/// writers apart, but callers get the same results either way. Every method
/// reports completion through its return value; nothing is fire-and-forget.
pub trait RecordStore: Send + Sync {
    /// Every persisted record, in storage order.
    fn list(&self) -> Result<Vec<Product>>;

    /// The record with `id`, or `None`.
    fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self.list()?.into_iter().find(|p| &p.id == id))
    }

    /// All records whose title is exactly `title`.
    fn find_by_title(&self, title: &str) -> Result<Vec<Product>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|p| p.title == title)
            .collect())
    }

    /// The records for `ids` that exist, in the order of `ids`. Unknown ids
    /// are skipped.
    fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let all = self.list()?;
        Ok(ids
            .iter()
            .filter_map(|id| all.iter().find(|p| &p.id == id).cloned())
            .collect())
    }

    /// Assign a fresh id, persist, and return the stored record.
    ///
    /// Subscribers get a [`StoreEvent::Created`] after the write. If one of
    /// them fails the record stays persisted and the call returns
    /// [`Error::Cascade`], whose message starts with the new id.
    fn create(&self, fields: NewProduct) -> Result<Product>;

    /// Replace the record with `product.id` in place. Fails with
    /// [`Error::NotFound`] if there is no such record. An observer failure on
    /// the [`StoreEvent::Updated`] that follows is [`Error::Cascade`]; the
    /// update itself is kept.
    fn update(&self, product: Product) -> Result<Product>;

    /// Remove the record with `id`, returning it. `Ok(None)` if it wasn't
    /// there. Subscribers get a [`StoreEvent::Deleted`] after the write; if
    /// one fails the record stays deleted and the call returns
    /// [`Error::Cascade`].
    fn delete_by_id(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Register an observer for write events.
    fn subscribe(&self, observer: Arc<dyn StoreObserver>);
}

/// What to do when the backing file exists but doesn't parse.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Reads and writes both return [`Error::Malformed`].
    #[default]
    FailClosed,
    /// Reads log the parse error and return an empty collection. Writes still
    /// fail, so a corrupt file is never overwritten.
    FailOpen,
}

/// Product records stored as one JSON array in a single file.
///
/// Every mutation is a read-modify-write of the whole file done under an
/// exclusive lock, so two concurrent writers through the same `JsonStore`
/// can't lose each other's updates. Reads share the lock and never see a
/// write in progress. The file itself is replaced by temp-file + rename.
///
/// **Single-process only.** Two processes (or two `JsonStore` values) on the
/// same file are not coordinated. Share one instance behind an `Arc`.
pub struct JsonStore {
    path: PathBuf,
    serializer: JsonSerializer,
    malformed: MalformedPolicy,
    lock: RwLock<()>,
    observers: Observers,
}

impl JsonStore {
    /// Open a store at `path` with compact JSON and fail-closed parsing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).build()
    }

    /// Start configuring a new store. Call [`.build()`](JsonStoreBuilder::build)
    /// when ready.
    pub fn builder(path: impl AsRef<Path>) -> JsonStoreBuilder {
        JsonStoreBuilder::new(path)
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active malformed-content policy.
    #[must_use]
    pub fn malformed_policy(&self) -> MalformedPolicy {
        self.malformed
    }

    // ---- internal ----

    /// Read path: missing or unreadable storage is an empty collection.
    fn load_for_read(&self) -> Result<Vec<Product>> {
        let bytes = match read_blob(&self.path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(Vec::new()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store unreadable, serving empty list");
                return Ok(Vec::new());
            }
        };
        match self.serializer.deserialize::<Vec<Product>>(&bytes) {
            Err(Error::Malformed(msg)) if self.malformed == MalformedPolicy::FailOpen => {
                error!(path = %self.path.display(), error = %msg, "store content malformed, serving empty list");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Write path: anything short of a clean parse aborts the mutation.
    fn load_for_write(&self) -> Result<Vec<Product>> {
        match read_blob(&self.path)? {
            Some(bytes) => self.serializer.deserialize(&bytes),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, products: &[Product]) -> Result<()> {
        let bytes = self.serializer.serialize(&products)?;
        atomic_write(&self.path, &bytes)
    }
}

impl RecordStore for JsonStore {
    fn list(&self) -> Result<Vec<Product>> {
        let _guard = self.lock.read();
        let products = self.load_for_read()?;
        debug!(count = products.len(), "listed products");
        Ok(products)
    }

    fn create(&self, fields: NewProduct) -> Result<Product> {
        validate(&fields.title, fields.price)?;
        let product = {
            let _guard = self.lock.write();
            let mut products = self.load_for_write()?;
            let id = fresh_id(&products);
            let product = fields.with_id(id);
            products.push(product.clone());
            self.persist(&products)?;
            product
        };
        info!(id = %product.id, title = %product.title, "product created");
        self.observers.publish(&StoreEvent::Created(product.clone()))?;
        Ok(product)
    }

    fn update(&self, product: Product) -> Result<Product> {
        validate(&product.title, product.price)?;
        {
            let _guard = self.lock.write();
            let mut products = self.load_for_write()?;
            let slot = products
                .iter_mut()
                .find(|p| p.id == product.id)
                .ok_or_else(|| Error::NotFound(product.id.to_string()))?;
            *slot = product.clone();
            self.persist(&products)?;
        }
        info!(id = %product.id, "product updated");
        self.observers.publish(&StoreEvent::Updated(product.clone()))?;
        Ok(product)
    }

    fn delete_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        let removed = {
            let _guard = self.lock.write();
            let mut products = self.load_for_write()?;
            match products.iter().position(|p| &p.id == id) {
                Some(idx) => {
                    let removed = products.remove(idx);
                    self.persist(&products)?;
                    removed
                }
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

impl std::fmt::Debug for JsonStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore")
            .field("path", &self.path)
            .field("malformed", &self.malformed)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

/// Random v4 UUID, redrawn in the unlikely event it's already taken.
fn fresh_id(existing: &[Product]) -> ProductId {
    loop {
        let id = ProductId::new(uuid::Uuid::new_v4().to_string());
        if !existing.iter().any(|p| p.id == id) {
            return id;
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`JsonStore`].
///
/// ```rust,no_run
/// use catalog_store::{JsonStore, MalformedPolicy};
///
/// let store = JsonStore::builder("data/products.json")
///     .pretty(true)
///     .malformed(MalformedPolicy::FailOpen)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct JsonStoreBuilder {
    path: PathBuf,
    pretty: bool,
    malformed: MalformedPolicy,
}

impl JsonStoreBuilder {
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: false,
            malformed: MalformedPolicy::default(),
        }
    }

    /// Write human-readable JSON with indentation (default: compact).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Set the malformed-content policy (default: [`MalformedPolicy::FailClosed`]).
    pub fn malformed(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    /// Check the path and return the store. Nothing is written until the
    /// first mutation.
    pub fn build(self) -> Result<JsonStore> {
        check_path(&self.path)?;
        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };
        debug!(path = %self.path.display(), policy = ?self.malformed, "opening json store");
        Ok(JsonStore {
            path: self.path,
            serializer,
            malformed: self.malformed,
            lock: RwLock::new(()),
            observers: Observers::default(),
        })
    }
}
