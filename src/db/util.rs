use tokio_postgres::Row;

use crate::store::{
    Category, ContentItem, ContentKind, Product, Restaurant, SocialLinks,
};


/// Helper macro to pass arguments to `query_raw` and similar calls.
///
/// Helps you with casting to `&dyn ToSql` and type inference. Note: use `[]` for
/// the macro invocation, e.g. `dbargs![]`.
macro_rules! dbargs {
    () => {
        [] as [&(dyn tokio_postgres::types::ToSql + Sync); 0]
    };
    ($($arg:expr),+ $(,)?) => {
        [$($arg as &(dyn tokio_postgres::types::ToSql + Sync)),+]
    };
}

pub(crate) use dbargs;


// The column lists below must match the corresponding `from_row` functions.

pub(super) const RESTAURANT_COLS: &str = "id, slug, name, slogan, logo_url, address, phone, \
    instagram_url, facebook_url, x_url, website_url, theme_config";

pub(super) const CATEGORY_COLS: &str = "id, restaurant_id, name, description, image_url, \
    sort_order, is_active";

pub(super) const PRODUCT_COLS: &str = "id, restaurant_id, category_id, name, description, \
    image_url, price::float8 as price, sort_order, is_featured, is_active";

pub(super) const CONTENT_ITEM_COLS: &str = "id, restaurant_id, type, title, image_url, \
    link_url, sort_order, is_active";


pub(super) fn restaurant_from_row(row: &Row) -> Restaurant {
    Restaurant {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        slogan: row.get("slogan"),
        logo_url: row.get("logo_url"),
        address: row.get("address"),
        phone: row.get("phone"),
        social: SocialLinks {
            instagram: row.get("instagram_url"),
            facebook: row.get("facebook_url"),
            x: row.get("x_url"),
            website: row.get("website_url"),
        },
        theme_config: row.get("theme_config"),
    }
}

pub(super) fn category_from_row(row: &Row) -> Category {
    Category {
        id: row.get("id"),
        restaurant_id: row.get("restaurant_id"),
        name: row.get("name"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        sort_order: row.get("sort_order"),
        is_active: row.get("is_active"),
    }
}

pub(super) fn product_from_row(row: &Row) -> Product {
    Product {
        id: row.get("id"),
        restaurant_id: row.get("restaurant_id"),
        category_id: row.get("category_id"),
        name: row.get("name"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        price: row.get("price"),
        sort_order: row.get("sort_order"),
        is_featured: row.get("is_featured"),
        is_active: row.get("is_active"),
    }
}

/// Returns `None` for unknown content types, which the DB constraint should
/// make impossible.
pub(super) fn content_item_from_row(row: &Row) -> Option<ContentItem> {
    Some(ContentItem {
        id: row.get("id"),
        restaurant_id: row.get("restaurant_id"),
        kind: ContentKind::parse(row.get("type"))?,
        title: row.get("title"),
        image_url: row.get("image_url"),
        link_url: row.get("link_url"),
        sort_order: row.get("sort_order"),
        is_active: row.get("is_active"),
    })
}
