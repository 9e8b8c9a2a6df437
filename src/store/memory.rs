use std::{collections::VecDeque, path::Path};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{prelude::*, theme::ThemeBlueprint};
use super::{
    AnalyticsEvent, Category, ContentItem, Id, NewRestaurant, Product, Restaurant, Store,
};


/// Number of analytics events kept in memory. Older ones are dropped.
const MAX_ANALYTICS_EVENTS: usize = 1000;

/// Keeps all data in memory. Meant for development, demos and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Data>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Data {
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub content_items: Vec<ContentItem>,
    #[serde(skip)]
    pub analytics: VecDeque<AnalyticsEvent>,
}

impl MemoryStore {
    pub fn new(data: Data) -> Self {
        Self { data: RwLock::new(data) }
    }

    /// Loads initial data from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read(path).await
            .with_context(|| format!("failed to read fixture '{}'", path.display()))?;
        let data: Data = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse fixture '{}'", path.display()))?;

        info!(
            "Loaded {} restaurants, {} categories, {} products and {} content items from '{}'",
            data.restaurants.len(),
            data.categories.len(),
            data.products.len(),
            data.content_items.len(),
            path.display(),
        );
        Ok(Self::new(data))
    }

    /// The most recent analytics events, oldest first.
    pub async fn analytics_events(&self) -> Vec<AnalyticsEvent> {
        self.data.read().await.analytics.iter().cloned().collect()
    }
}

/// Clones all active rows of one restaurant, sorted by `(sort_order, id)`.
fn active_rows<T: Clone>(
    rows: &[T],
    restaurant: Id,
    key: impl Fn(&T) -> (Id, bool, i32, Id),
) -> Vec<T> {
    let mut out = rows.iter()
        .filter(|row| {
            let (owner, active, _, _) = key(row);
            owner == restaurant && active
        })
        .cloned()
        .collect::<Vec<_>>();
    out.sort_by_key(|row| {
        let (_, _, order, id) = key(row);
        (order, id)
    });
    out
}

#[async_trait]
impl Store for MemoryStore {
    async fn restaurant_by_slug(&self, slug: &str) -> Result<Option<Restaurant>> {
        let data = self.data.read().await;
        Ok(data.restaurants.iter().find(|r| r.slug == slug).cloned())
    }

    async fn restaurant(&self, id: Id) -> Result<Option<Restaurant>> {
        let data = self.data.read().await;
        Ok(data.restaurants.iter().find(|r| r.id == id).cloned())
    }

    async fn create_restaurant(&self, new: NewRestaurant) -> Result<Restaurant> {
        new.check()?;
        let mut data = self.data.write().await;
        if data.restaurants.iter().any(|r| r.slug == new.slug) {
            bail!("a restaurant with slug '{}' already exists", new.slug);
        }

        let id = data.restaurants.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let restaurant = Restaurant {
            id,
            slug: new.slug,
            name: new.name,
            slogan: new.slogan,
            logo_url: None,
            address: None,
            phone: None,
            social: Default::default(),
            theme_config: Some(ThemeBlueprint::default_blueprint().to_json()),
        };
        data.restaurants.push(restaurant.clone());
        Ok(restaurant)
    }

    async fn active_categories(&self, restaurant: Id) -> Result<Vec<Category>> {
        let data = self.data.read().await;
        Ok(active_rows(&data.categories, restaurant, |c| {
            (c.restaurant_id, c.is_active, c.sort_order, c.id)
        }))
    }

    async fn active_products(&self, restaurant: Id) -> Result<Vec<Product>> {
        let data = self.data.read().await;
        Ok(active_rows(&data.products, restaurant, |p| {
            (p.restaurant_id, p.is_active, p.sort_order, p.id)
        }))
    }

    async fn active_content_items(&self, restaurant: Id) -> Result<Vec<ContentItem>> {
        let data = self.data.read().await;
        Ok(active_rows(&data.content_items, restaurant, |c| {
            (c.restaurant_id, c.is_active, c.sort_order, c.id)
        }))
    }

    async fn save_theme_config(&self, restaurant: Id, blueprint: &ThemeBlueprint) -> Result<bool> {
        let mut data = self.data.write().await;
        match data.restaurants.iter_mut().find(|r| r.id == restaurant) {
            Some(r) => {
                r.theme_config = Some(blueprint.to_json());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_analytics_event(&self, restaurant: Id, kind: &str, data: Value) -> Result<()> {
        let mut inner = self.data.write().await;
        if inner.analytics.len() >= MAX_ANALYTICS_EVENTS {
            inner.analytics.pop_front();
        }
        inner.analytics.push_back(AnalyticsEvent {
            restaurant_id: restaurant,
            kind: kind.into(),
            data,
            created_at: chrono::Utc::now(),
        });
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::store::ContentKind;
    use super::*;


    fn fixture() -> MemoryStore {
        let data: Data = serde_json::from_value(json!({
            "restaurants": [
                { "id": 1, "slug": "kebapci", "name": "Kebapçı" },
                { "id": 2, "slug": "other", "name": "Other" },
            ],
            "categories": [
                { "id": 10, "restaurant_id": 1, "name": "Desserts", "sort_order": 2 },
                { "id": 11, "restaurant_id": 1, "name": "Mains", "sort_order": 1 },
                { "id": 12, "restaurant_id": 1, "name": "Hidden", "sort_order": 0, "is_active": false },
                { "id": 13, "restaurant_id": 2, "name": "Foreign", "sort_order": 0 },
            ],
            "products": [
                { "id": 100, "restaurant_id": 1, "category_id": 11, "name": "Adana", "price": 320.0 },
            ],
            "content_items": [
                { "id": 5, "restaurant_id": 1, "type": "advertisement", "title": "Lunch deal" },
            ],
        })).unwrap();
        MemoryStore::new(data)
    }

    #[tokio::test]
    async fn lookups() -> Result<()> {
        let store = fixture();
        assert_eq!(store.restaurant_by_slug("kebapci").await?.unwrap().id, 1);
        assert!(store.restaurant_by_slug("nope").await?.is_none());
        assert_eq!(store.restaurant(2).await?.unwrap().slug, "other");

        let categories = store.active_categories(1).await?;
        assert_eq!(categories.iter().map(|c| c.id).collect::<Vec<_>>(), [11, 10]);

        let products = store.active_products(1).await?;
        assert_eq!(products.len(), 1);
        assert!(!products[0].is_featured);

        let content = store.active_content_items(1).await?;
        assert_eq!(content[0].kind, ContentKind::Advertisement);
        assert!(store.active_content_items(2).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn new_restaurants_get_default_theme() -> Result<()> {
        let store = fixture();
        let created = store.create_restaurant(NewRestaurant {
            slug: "yeni".into(),
            name: "Yeni".into(),
            slogan: None,
        }).await?;
        assert_eq!(created.id, 3);
        assert_eq!(created.theme_config, Some(ThemeBlueprint::default_blueprint().to_json()));

        let duplicate = NewRestaurant { slug: "yeni".into(), name: "Again".into(), slogan: None };
        assert!(store.create_restaurant(duplicate).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn save_overwrites() -> Result<()> {
        let store = fixture();
        let mut bp = ThemeBlueprint::default_blueprint();
        bp.advanced_settings.colors.body = "#000000".into();

        assert!(store.save_theme_config(1, &bp).await?);
        bp.advanced_settings.colors.body = "#111111".into();
        assert!(store.save_theme_config(1, &bp).await?);
        assert!(!store.save_theme_config(99, &bp).await?);

        let stored = store.restaurant(1).await?.unwrap().theme_config.unwrap();
        assert_eq!(stored["advancedSettings"]["colors"]["body"], "#111111");
        Ok(())
    }

    #[tokio::test]
    async fn analytics_keep_only_recent_events() -> Result<()> {
        let store = fixture();
        for i in 0..MAX_ANALYTICS_EVENTS + 5 {
            store.record_analytics_event(1, "menu_view", json!({ "n": i })).await?;
        }

        let events = store.analytics_events().await;
        assert_eq!(events.len(), MAX_ANALYTICS_EVENTS);
        assert_eq!(events[0].data, json!({ "n": 5 }));
        assert_eq!(events.last().unwrap().data, json!({ "n": MAX_ANALYTICS_EVENTS + 4 }));
        Ok(())
    }

    #[tokio::test]
    async fn dev_fixture_renders() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("util/dev-config/fixture.json");
        let store = MemoryStore::load(&path).await?;

        let menu = crate::render::load_menu(&store, "kebapci-halil").await?;
        assert_eq!(menu.categories.len(), 2);
        assert_eq!(menu.featured_products().len(), 2);
        assert_eq!(menu.advertisements().len(), 1);

        // Partial stored theme: given colors win, the rest comes from the default.
        let menu = crate::render::load_menu(&store, "deniz-cafe").await?;
        let settings = menu.settings();
        assert_eq!(settings.colors.header, "#0a3d62");
        let default = ThemeBlueprint::default_blueprint().advanced_settings;
        assert_eq!(settings.colors.cards, default.colors.cards);
        assert_eq!(settings.layout, default.layout);
        Ok(())
    }
}
