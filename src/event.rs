//! Change notifications emitted by record stores.
//!
//! Stores never reach into whatever owns a cart. They publish a
//! [`StoreEvent`] after each successful write and the subscriber decides what
//! to do with it (see [`Cart`](crate::Cart)'s delete cascade).

use crate::error::{Error, Result};
use crate::model::Product;
use parking_lot::RwLock;
use std::sync::Arc;

/// What changed. Carries the record as it was written (or, for deletes, as it
/// was last stored).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A new record was persisted.
    Created(Product),
    /// An existing record was replaced.
    Updated(Product),
    /// A record was removed.
    Deleted(Product),
}

impl StoreEvent {
    /// The record the event is about.
    #[must_use]
    pub fn product(&self) -> &Product {
        match self {
            StoreEvent::Created(p) | StoreEvent::Updated(p) | StoreEvent::Deleted(p) => p,
        }
    }
}

/// Something that wants to hear about store writes.
///
/// Called after the write is durable and after the store lock is released, so
/// an observer may call back into the store.
pub trait StoreObserver: Send + Sync {
    /// React to one event. An error here doesn't roll the write back; it is
    /// reported to the caller of the mutating operation.
    fn on_event(&self, event: &StoreEvent) -> Result<()>;
}

/// Subscriber list shared by the store implementations.
#[derive(Default)]
pub(crate) struct Observers {
    inner: RwLock<Vec<Arc<dyn StoreObserver>>>,
}

impl Observers {
    pub(crate) fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.inner.write().push(observer);
    }

    /// Deliver `event` to every observer, even if an earlier one fails. The
    /// first failure comes back as [`Error::Cascade`], prefixed with the id of
    /// the record that was written.
    pub(crate) fn publish(&self, event: &StoreEvent) -> Result<()> {
        let observers: Vec<_> = self.inner.read().iter().cloned().collect();
        let mut first_err = None;
        for observer in observers {
            if let Err(e) = observer.on_event(event) {
                tracing::error!(error = %e, ?event, "store observer failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(Error::Cascade(format!("{}: {e}", event.product().id))),
            None => Ok(()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().len()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("count", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewProduct, ProductId};
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    struct Recorder(Mutex<Vec<StoreEvent>>);

    impl StoreObserver for Recorder {
        fn on_event(&self, event: &StoreEvent) -> Result<()> {
            self.0.lock().push(event.clone());
            Ok(())
        }
    }

    struct Failing;

    impl StoreObserver for Failing {
        fn on_event(&self, _: &StoreEvent) -> Result<()> {
            Err(Error::Unavailable("disk full".into()))
        }
    }

    fn sample() -> StoreEvent {
        StoreEvent::Deleted(NewProduct::new("Lamp", dec!(20)).with_id(ProductId::new("1")))
    }

    #[test]
    fn failure_does_not_stop_delivery() {
        let observers = Observers::default();
        let rec = Arc::new(Recorder(Mutex::new(Vec::new())));
        observers.subscribe(Arc::new(Failing));
        observers.subscribe(rec.clone());

        let err = observers.publish(&sample()).unwrap_err();
        assert!(matches!(err, Error::Cascade(ref m) if m.starts_with("1: ") && m.contains("disk full")));
        assert_eq!(rec.0.lock().as_slice(), &[sample()]);
    }

    #[test]
    fn publish_with_no_observers_is_ok() {
        assert!(Observers::default().publish(&sample()).is_ok());
    }
}
