use catalog_store::{JsonStore, NewProduct, Product, RecordStore};
use rust_decimal::Decimal;

fn main() -> Result<(), catalog_store::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::temp_dir().join("catalog_store_example_basic.json");
    let _ = std::fs::remove_file(&path);
    let store = JsonStore::builder(&path).pretty(true).build()?;

    // create
    let lamp = store.create(
        NewProduct::new("Lamp", Decimal::from(20))
            .image_url("https://example.com/lamp.png")
            .description("Warm light for late reading"),
    )?;
    store.create(NewProduct::new("Notebook", Decimal::new(450, 2)))?;
    println!("created {} ({})", lamp.title, lamp.id);

    // read
    println!("all      = {:#?}", store.list()?);
    println!("by title = {:?}", store.find_by_title("Notebook")?);

    // update in place
    store.update(Product {
        price: Decimal::from(25),
        ..lamp.clone()
    })?;
    println!("lamp now costs {:?}", store.find_by_id(&lamp.id)?.map(|p| p.price));

    // delete
    store.delete_by_id(&lamp.id)?;
    println!("after delete: {} product(s)", store.list()?.len());

    let contents = std::fs::read_to_string(store.path())?;
    println!("\nOn-disk JSON:\n{contents}");

    let _ = std::fs::remove_file(&path);
    Ok(())
}
