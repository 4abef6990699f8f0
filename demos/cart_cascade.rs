use catalog_store::{Cart, JsonStore, MemoryStore, NewProduct, RecordStore};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Same shop flow whichever store backs it.
fn shop(store: &dyn RecordStore, cart: &Arc<Cart>) -> Result<(), catalog_store::Error> {
    store.subscribe(cart.clone());

    let mug = store.create(NewProduct::new("Mug", Decimal::from(8)))?;
    let tea = store.create(NewProduct::new("Tea", Decimal::new(350, 2)))?;

    cart.add_from_store(store, &mug.id)?;
    cart.add_from_store(store, &mug.id)?;
    cart.add_from_store(store, &tea.id)?;
    println!("cart     = {:?}", cart.snapshot());
    println!("products = {:?}", store.find_many(&cart.product_ids())?);

    // the mug is discontinued; the cart follows
    store.delete_by_id(&mug.id)?;
    println!("after delete = {:?}", cart.snapshot());
    Ok(())
}

fn main() -> Result<(), catalog_store::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let dir = std::env::temp_dir().join("catalog_store_example_cart");
    let _ = std::fs::remove_dir_all(&dir);

    println!("== file-backed");
    let store = JsonStore::open(dir.join("products.json"))?;
    let cart = Arc::new(Cart::open(dir.join("cart.json"))?);
    shop(&store, &cart)?;

    println!("\n== in-memory");
    shop(&MemoryStore::new(), &Arc::new(Cart::in_memory()))?;

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
