use async_trait::async_trait;
use deadpool_postgres::Pool;
use futures::TryStreamExt;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::{
    prelude::*,
    store::{Category, ContentItem, Id, NewRestaurant, Product, Restaurant, Store},
    theme::ThemeBlueprint,
};
use super::{
    Db,
    util::{
        dbargs, category_from_row, content_item_from_row, product_from_row, restaurant_from_row,
        CATEGORY_COLS, CONTENT_ITEM_COLS, PRODUCT_COLS, RESTAURANT_COLS,
    },
};


/// [`Store`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<deadpool_postgres::Object> {
        let before = Instant::now();
        let connection = self.pool.get().await.context("failed to obtain DB connection")?;

        let acquire_conn_time = before.elapsed();
        if acquire_conn_time > Duration::from_millis(5) {
            warn!("Acquiring DB connection from pool took {:.2?}", acquire_conn_time);
        }

        Ok(connection)
    }
}

/// Runs a query and maps all rows with `f`.
async fn query_all<T>(
    db: &Db,
    query: &str,
    restaurant: Id,
    f: impl Fn(&tokio_postgres::Row) -> Option<T>,
) -> Result<Vec<T>> {
    let rows = db.query_raw(query, dbargs![&restaurant]).await?
        .try_collect::<Vec<_>>()
        .await?;

    Ok(rows.iter().filter_map(f).collect())
}

#[async_trait]
impl Store for PgStore {
    async fn restaurant_by_slug(&self, slug: &str) -> Result<Option<Restaurant>> {
        let db = self.conn().await?;
        let query = format!("select {RESTAURANT_COLS} from restaurants where slug = $1");
        let row = db.query_opt(&query, &[&slug]).await
            .context("failed to load restaurant")?;
        Ok(row.as_ref().map(restaurant_from_row))
    }

    async fn restaurant(&self, id: Id) -> Result<Option<Restaurant>> {
        let db = self.conn().await?;
        let query = format!("select {RESTAURANT_COLS} from restaurants where id = $1");
        let row = db.query_opt(&query, &[&id]).await
            .context("failed to load restaurant")?;
        Ok(row.as_ref().map(restaurant_from_row))
    }

    async fn create_restaurant(&self, new: NewRestaurant) -> Result<Restaurant> {
        new.check()?;
        let db = self.conn().await?;
        let query = format!(
            "insert into restaurants (slug, name, slogan, theme_config) \
                values ($1, $2, $3, $4) \
                returning {RESTAURANT_COLS}"
        );
        let theme = ThemeBlueprint::default_blueprint().to_json();
        let row = db.query_one(&query, &[&new.slug, &new.name, &new.slogan, &theme]).await
            .with_context(|| format!("failed to create restaurant '{}'", new.slug))?;

        let restaurant = restaurant_from_row(&row);
        info!("Created restaurant '{}' (ID {})", restaurant.slug, restaurant.id);
        Ok(restaurant)
    }

    async fn active_categories(&self, restaurant: Id) -> Result<Vec<Category>> {
        let db = self.conn().await?;
        let query = format!(
            "select {CATEGORY_COLS} from categories \
                where restaurant_id = $1 and is_active \
                order by sort_order, id"
        );
        query_all(&db, &query, restaurant, |row| Some(category_from_row(row))).await
            .context("failed to load categories")
    }

    async fn active_products(&self, restaurant: Id) -> Result<Vec<Product>> {
        let db = self.conn().await?;
        let query = format!(
            "select {PRODUCT_COLS} from products \
                where restaurant_id = $1 and is_active \
                order by sort_order, id"
        );
        query_all(&db, &query, restaurant, |row| Some(product_from_row(row))).await
            .context("failed to load products")
    }

    async fn active_content_items(&self, restaurant: Id) -> Result<Vec<ContentItem>> {
        let db = self.conn().await?;
        let query = format!(
            "select {CONTENT_ITEM_COLS} from content_items \
                where restaurant_id = $1 and is_active \
                order by sort_order, id"
        );
        query_all(&db, &query, restaurant, |row| {
            let item = content_item_from_row(row);
            if item.is_none() {
                warn!("Skipping content item with unknown type: {:?}", row.get::<_, String>("type"));
            }
            item
        }).await.context("failed to load content items")
    }

    async fn save_theme_config(&self, restaurant: Id, blueprint: &ThemeBlueprint) -> Result<bool> {
        let db = self.conn().await?;
        let updated = db.execute(
            "update restaurants set theme_config = $2, updated_at = now() where id = $1",
            &[&restaurant, &blueprint.to_json()],
        ).await.context("failed to save theme")?;

        Ok(updated == 1)
    }

    async fn record_analytics_event(&self, restaurant: Id, kind: &str, data: Value) -> Result<()> {
        let db = self.conn().await?;
        db.execute(
            "insert into analytics_events (restaurant_id, event_type, event_data) \
                values ($1, $2, $3)",
            &[&restaurant, &kind, &data],
        ).await.context("failed to record analytics event")?;

        Ok(())
    }
}
