//! Access to restaurant data. The theme system only needs a narrow read/write
//! surface, which is the [`Store`] trait. There are two implementations: the
//! PostgreSQL one in [`crate::db`] and [`MemoryStore`], seeded from a JSON file.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{db::DbConfig, prelude::*, theme::ThemeBlueprint};


mod memory;

pub use self::memory::MemoryStore;


pub type Id = i64;


#[derive(Debug, confique::Config)]
pub struct StoreConfig {
    /// Where restaurant data lives: "postgres" uses the `[db]` section,
    /// "memory" keeps everything in memory (seeded from `fixture`) and is
    /// only meant for development and demos. Changes are lost on restart.
    #[config(default = "postgres")]
    pub backend: StoreBackend,

    /// JSON file with initial data for the "memory" backend. Keys:
    /// `restaurants`, `categories`, `products` and `content_items`.
    pub fixture: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Opens the configured store. For PostgreSQL, this connects and runs pending
/// migrations.
pub async fn open(config: &StoreConfig, db: &DbConfig) -> Result<Arc<dyn Store>> {
    match config.backend {
        StoreBackend::Postgres => {
            let pool = crate::db::connect_and_migrate(db).await?;
            Ok(Arc::new(crate::db::PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            let store = match &config.fixture {
                Some(path) => MemoryStore::load(path).await?,
                None => {
                    warn!("Using empty in-memory store: all data is lost on restart");
                    MemoryStore::default()
                }
            };
            Ok(Arc::new(store))
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Id,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub slogan: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub social: SocialLinks,

    /// The stored theme blueprint. Kept as raw JSON: it is only interpreted
    /// by the renderer, which copes with partial documents.
    #[serde(default)]
    pub theme_config: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub x: Option<String>,
    pub website: Option<String>,
}

impl SocialLinks {
    /// All configured links as `(network, url)`.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("instagram", &self.instagram),
            ("facebook", &self.facebook),
            ("x", &self.x),
            ("website", &self.website),
        ]
            .into_iter()
            .filter_map(|(network, url)| Some((network, url.as_deref()?)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Id,
    pub restaurant_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Id,
    pub restaurant_id: Id,
    pub category_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Story,
    Advertisement,
    Featured,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Advertisement => "advertisement",
            Self::Featured => "featured",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "story" => Some(Self::Story),
            "advertisement" => Some(Self::Advertisement),
            "featured" => Some(Self::Featured),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Id,
    pub restaurant_id: Id,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewRestaurant {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub slogan: Option<String>,
}

impl NewRestaurant {
    /// Slugs end up in menu URLs: lowercase ASCII letters and digits in
    /// groups separated by single dashes, e.g. `kebapci-halil-2`. The
    /// `restaurants` table has the same check.
    pub fn check(&self) -> Result<()> {
        let groups_ok = self.slug.split('-').all(|group| {
            !group.is_empty()
                && group.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        });
        if !groups_ok {
            bail!(
                "invalid slug '{}': only lowercase letters and digits, separated by single dashes",
                self.slug,
            );
        }
        if self.name.trim().is_empty() {
            bail!("restaurant name must not be empty");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub restaurant_id: Id,
    pub kind: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}


/// The persistence operations the theme system and the menu renderer use.
/// All list operations only return active rows, sorted by `sort_order`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn restaurant_by_slug(&self, slug: &str) -> Result<Option<Restaurant>>;

    async fn restaurant(&self, id: Id) -> Result<Option<Restaurant>>;

    /// Creates a restaurant with the default theme blueprint.
    async fn create_restaurant(&self, new: NewRestaurant) -> Result<Restaurant>;

    async fn active_categories(&self, restaurant: Id) -> Result<Vec<Category>>;

    async fn active_products(&self, restaurant: Id) -> Result<Vec<Product>>;

    async fn active_content_items(&self, restaurant: Id) -> Result<Vec<ContentItem>>;

    /// Overwrites the stored blueprint unconditionally. Returns `false` if
    /// the restaurant does not exist.
    async fn save_theme_config(&self, restaurant: Id, blueprint: &ThemeBlueprint) -> Result<bool>;

    async fn record_analytics_event(&self, restaurant: Id, kind: &str, data: Value) -> Result<()>;
}


#[cfg(test)]
mod tests {
    use super::NewRestaurant;


    #[test]
    fn slugs() {
        let check = |slug: &str| NewRestaurant {
            slug: slug.into(),
            name: "Test".into(),
            slogan: None,
        }.check();

        for ok in ["kebapci", "kebapci-halil", "a-1-b2", "42"] {
            assert!(check(ok).is_ok(), "{ok}");
        }
        for bad in ["", "-", "Kebapci", "kebapçı", "a--b", "-a", "a-", "a b", "a_b"] {
            assert!(check(bad).is_err(), "{bad:?}");
        }
    }
}
