use catalog_store::{JsonStore, NewProduct, Product, ProductId, RecordStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("catalog_store_conc_{}.json", name))
}

#[test]
fn concurrent_creates_lose_nothing() {
    let path = temp_path("creates");
    let _ = std::fs::remove_file(&path);
    let store = JsonStore::open(&path).unwrap();
    const WRITERS: usize = 16;
    const PER_WRITER: usize = 5;

    std::thread::scope(|s| {
        for w in 0..WRITERS {
            let store = &store;
            s.spawn(move || {
                for i in 0..PER_WRITER {
                    store
                        .create(NewProduct::new(format!("w{w}-{i}"), dec!(1)))
                        .unwrap();
                }
            });
        }
    });

    let all = store.list().unwrap();
    assert_eq!(all.len(), WRITERS * PER_WRITER);
    let ids: HashSet<&ProductId> = all.iter().map(|p| &p.id).collect();
    assert_eq!(ids.len(), WRITERS * PER_WRITER);

    // and it all made it to disk
    let reopened = JsonStore::open(&path).unwrap();
    assert_eq!(reopened.list().unwrap().len(), WRITERS * PER_WRITER);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn concurrent_updates_to_different_records_all_land() {
    let path = temp_path("updates");
    let _ = std::fs::remove_file(&path);
    let store = JsonStore::open(&path).unwrap();
    let seeded: Vec<Product> = (0..10)
        .map(|i| store.create(NewProduct::new(format!("p{i}"), dec!(1))).unwrap())
        .collect();

    std::thread::scope(|s| {
        for (i, product) in seeded.iter().enumerate() {
            let store = &store;
            s.spawn(move || {
                let updated = Product {
                    price: Decimal::from(100 + i as i64),
                    ..product.clone()
                };
                store.update(updated).unwrap();
            });
        }
    });

    for (i, product) in seeded.iter().enumerate() {
        let stored = store.find_by_id(&product.id).unwrap().unwrap();
        assert_eq!(stored.price, Decimal::from(100 + i as i64));
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn readers_never_see_a_torn_collection() {
    let path = temp_path("readers");
    let _ = std::fs::remove_file(&path);
    let store = JsonStore::open(&path).unwrap();

    std::thread::scope(|s| {
        let writer = &store;
        s.spawn(move || {
            for i in 0..40 {
                writer
                    .create(NewProduct::new(format!("p{i}"), dec!(2)))
                    .unwrap();
            }
        });
        for _ in 0..4 {
            let reader = &store;
            s.spawn(move || {
                let mut last = 0;
                for _ in 0..40 {
                    let n = reader.list().unwrap().len();
                    assert!(n >= last, "collection shrank from {last} to {n}");
                    last = n;
                }
            });
        }
    });

    assert_eq!(store.list().unwrap().len(), 40);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn interleaved_create_and_delete() {
    let path = temp_path("create_delete");
    let _ = std::fs::remove_file(&path);
    let store = JsonStore::open(&path).unwrap();
    let doomed: Vec<Product> = (0..10)
        .map(|i| store.create(NewProduct::new(format!("old{i}"), dec!(1))).unwrap())
        .collect();

    std::thread::scope(|s| {
        let deleter = &store;
        let doomed = &doomed;
        s.spawn(move || {
            for p in doomed {
                deleter.delete_by_id(&p.id).unwrap();
            }
        });
        let creator = &store;
        s.spawn(move || {
            for i in 0..10 {
                creator
                    .create(NewProduct::new(format!("new{i}"), dec!(1)))
                    .unwrap();
            }
        });
    });

    let all = store.list().unwrap();
    assert_eq!(all.len(), 10);
    assert!(all.iter().all(|p| p.title.starts_with("new")));
    let _ = std::fs::remove_file(&path);
}
