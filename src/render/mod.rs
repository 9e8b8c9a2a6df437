//! The public menu renderer: turns stored restaurant data plus the theme into
//! an ordered list of blocks (and from there into HTML, see [`html`]).

use std::collections::HashSet;

use crate::{
    prelude::*,
    store::{Category, ContentItem, ContentKind, Id, Product, Restaurant, Store},
    theme::{resolve_settings, AdvancedSettings, BlockKind},
};


pub mod html;


/// Everything needed to render one restaurant's menu.
#[derive(Debug, Clone)]
pub struct MenuData {
    pub restaurant: Restaurant,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub content_items: Vec<ContentItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("no restaurant with slug '{0}'")]
    NotFound(String),

    #[error("failed to load menu data")]
    Load(#[from] anyhow::Error),
}

/// Loads the restaurant and all its active rows. Any failure is terminal for
/// the whole page, there is no partial result.
pub async fn load_menu(store: &dyn Store, slug: &str) -> Result<MenuData, MenuError> {
    let restaurant = store.restaurant_by_slug(slug).await
        .context("failed to look up restaurant")?
        .ok_or_else(|| MenuError::NotFound(slug.to_owned()))?;

    let (categories, products, content_items) = tokio::try_join!(
        store.active_categories(restaurant.id),
        store.active_products(restaurant.id),
        store.active_content_items(restaurant.id),
    )?;

    debug!(
        "Loaded menu of '{}': {} categories, {} products, {} content items",
        restaurant.slug,
        categories.len(),
        products.len(),
        content_items.len(),
    );

    Ok(MenuData { restaurant, categories, products, content_items })
}

impl MenuData {
    /// The effective theme for this restaurant, never failing.
    pub fn settings(&self) -> AdvancedSettings {
        resolve_settings(self.restaurant.theme_config.as_ref())
    }

    pub fn featured_products(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_featured).collect()
    }

    pub fn advertisements(&self) -> Vec<&ContentItem> {
        self.content_items.iter().filter(|c| c.kind == ContentKind::Advertisement).collect()
    }

    pub fn products_in(&self, category: Id) -> Vec<&Product> {
        self.products.iter().filter(|p| p.category_id == category).collect()
    }
}


/// Which categories are currently unfolded. Initially only the first one; any
/// number of them can be open at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedCategories(HashSet<Id>);

impl ExpandedCategories {
    pub fn initial(categories: &[Category]) -> Self {
        Self(categories.first().map(|c| c.id).into_iter().collect())
    }

    /// Flips the state of one category. Returns whether it is now expanded.
    pub fn toggle(&mut self, category: Id) -> bool {
        if !self.0.remove(&category) {
            self.0.insert(category);
            return true;
        }
        false
    }

    pub fn is_expanded(&self, category: Id) -> bool {
        self.0.contains(&category)
    }
}


/// One block of the page with the data it shows.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedBlock<'a> {
    Header { restaurant: &'a Restaurant },
    AdvertisementHero { ads: Vec<&'a ContentItem> },
    FeaturedItems { products: Vec<&'a Product> },
    AdvertisementButton { ad: &'a ContentItem },
    Categories { sections: Vec<CategorySection<'a>> },
    Footer { restaurant: &'a Restaurant },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySection<'a> {
    pub category: &'a Category,
    pub products: Vec<&'a Product>,
    pub expanded: bool,
}

impl RenderedBlock<'_> {
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Header { .. } => BlockKind::Header,
            Self::AdvertisementHero { .. } => BlockKind::AdvertisementHero,
            Self::FeaturedItems { .. } => BlockKind::FeaturedItems,
            Self::AdvertisementButton { .. } => BlockKind::AdvertisementButton,
            Self::Categories { .. } => BlockKind::Categories,
            Self::Footer { .. } => BlockKind::Footer,
        }
    }
}

/// Produces the blocks of the page in `layout.blocks` order. Unknown tags and
/// gated blocks produce nothing at all. Duplicate tags render twice.
pub fn render_blocks<'a>(
    settings: &AdvancedSettings,
    data: &'a MenuData,
    expanded: &ExpandedCategories,
) -> Vec<RenderedBlock<'a>> {
    let components = &settings.components;

    settings.layout.blocks.iter()
        .filter_map(|tag| {
            let Some(kind) = BlockKind::from_tag(tag) else {
                debug!("Skipping unknown layout block '{tag}'");
                return None;
            };

            match kind {
                BlockKind::Header => Some(RenderedBlock::Header { restaurant: &data.restaurant }),
                BlockKind::AdvertisementHero => {
                    let ads = data.advertisements();
                    (!ads.is_empty()).then_some(RenderedBlock::AdvertisementHero { ads })
                }
                BlockKind::FeaturedItems => {
                    if !components.featured_section.enabled {
                        return None;
                    }
                    let products = data.featured_products();
                    (!products.is_empty()).then_some(RenderedBlock::FeaturedItems { products })
                }
                BlockKind::AdvertisementButton => {
                    if !components.advertisement_button.enabled {
                        return None;
                    }
                    data.advertisements().first()
                        .map(|&ad| RenderedBlock::AdvertisementButton { ad })
                }
                BlockKind::Categories => {
                    let sections = data.categories.iter()
                        .map(|category| CategorySection {
                            category,
                            products: data.products_in(category.id),
                            expanded: expanded.is_expanded(category.id),
                        })
                        .collect();
                    Some(RenderedBlock::Categories { sections })
                }
                BlockKind::Footer => Some(RenderedBlock::Footer { restaurant: &data.restaurant }),
            }
        })
        .collect()
}
