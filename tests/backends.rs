use catalog_store::{Cart, JsonStore, MemoryStore, NewProduct, Product, RecordStore};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("catalog_store_backend_{}.json", name))
}

/// Runs the same catalog workflow against any backend.
fn exercise(store: &dyn RecordStore) {
    let cart = Arc::new(Cart::in_memory());
    store.subscribe(cart.clone());

    let lamp = store.create(NewProduct::new("Lamp", dec!(20))).unwrap();
    let book = store
        .create(NewProduct::new("Book", dec!(12)).description("paperback"))
        .unwrap();
    assert_ne!(lamp.id, book.id);
    assert_eq!(store.list().unwrap(), vec![lamp.clone(), book.clone()]);

    let lamp25 = Product {
        price: dec!(25),
        ..lamp.clone()
    };
    store.update(lamp25.clone()).unwrap();
    assert_eq!(store.find_by_id(&lamp.id).unwrap(), Some(lamp25));
    assert_eq!(store.find_by_title("Book").unwrap(), vec![book.clone()]);

    cart.add_from_store(store, &book.id).unwrap();
    assert_eq!(store.delete_by_id(&book.id).unwrap(), Some(book.clone()));
    assert!(cart.snapshot().lines.is_empty());
    assert_eq!(store.find_by_id(&book.id).unwrap(), None);
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn json_store_contract() {
    let path = temp_path("contract");
    let _ = std::fs::remove_file(&path);
    let store = JsonStore::open(&path).unwrap();
    exercise(&store);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn memory_store_contract() {
    exercise(&MemoryStore::new());
}

#[test]
fn boxed_backends_are_interchangeable() {
    let path = temp_path("boxed");
    let _ = std::fs::remove_file(&path);
    let backends: Vec<Box<dyn RecordStore>> = vec![
        Box::new(JsonStore::open(&path).unwrap()),
        Box::new(MemoryStore::new()),
    ];
    for store in &backends {
        let p = store.create(NewProduct::new("Pen", dec!(1))).unwrap();
        assert_eq!(store.find_many(&[p.id.clone()]).unwrap(), vec![p]);
    }
    let _ = std::fs::remove_file(&path);
}
