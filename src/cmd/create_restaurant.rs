use bufibu::{
    config::Config,
    prelude::*,
    store::{self, NewRestaurant, StoreBackend},
};


pub(crate) async fn run(new: NewRestaurant, config: &Config) -> Result<()> {
    new.check()?;
    if config.store.backend == StoreBackend::Memory {
        warn!("Creating a restaurant in the in-memory store: it is gone once this command exits");
    }

    let store = store::open(&config.store, &config.db).await?;
    let restaurant = store.create_restaurant(new).await?;

    bunt::println!(
        "{$green+bold}✔{/$} Created restaurant {[bold]} with ID {}. Its menu is at /menu/{}",
        restaurant.name,
        restaurant.id,
        restaurant.slug,
    );
    Ok(())
}
