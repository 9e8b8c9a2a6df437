use std::{error::Error as StdError, sync::Arc};

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::{body::Body, Method, StatusCode};
use serde_json::{json, Value};

use crate::{
    prelude::*,
    preview::preview_unsaved,
    render::{html::{self, PageOptions}, load_menu, ExpandedCategories, MenuData, MenuError},
    store::Id,
    theme::{self, color, presets, ThemeBlueprint, Validation},
};
use super::{response, Context, Request, Response};


/// Blueprints are a few KB. Anything much larger is not a theme.
const MAX_BODY_SIZE: usize = 1024 * 1024;


/// This is the main HTTP entry point, called for each incoming request.
pub(super) async fn handle<B>(req: Request<B>, ctx: Arc<Context>) -> Response
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    trace!(
        "Incoming HTTP {:?} request to '{}{}'",
        req.method(),
        req.uri().path(),
        req.uri().query().map(|q| format!("?{}", q)).unwrap_or_default(),
    );

    let method = req.method().clone();
    let path = req.uri().path().trim_end_matches('/').to_owned();
    let segments = path.split('/').skip(1).collect::<Vec<_>>();

    match segments.as_slice() {
        // ----- Public menu ---------------------------------------------------
        ["menu", slug] => match method {
            Method::GET | Method::HEAD => menu(slug, &ctx).await,
            _ => response::method_not_allowed(&[Method::GET, Method::HEAD]),
        },
        ["menu", slug, "preview"] => match method {
            Method::POST => preview(slug, req, &ctx).await,
            _ => response::method_not_allowed(&[Method::POST]),
        },

        // ----- Dashboard theme API -------------------------------------------
        ["api", "restaurants", id, "theme"] => {
            let Ok(id) = id.parse::<Id>() else {
                return response::not_found();
            };
            match method {
                Method::GET => get_theme(id, &ctx).await,
                Method::PUT => put_theme(id, req, &ctx).await,
                _ => response::method_not_allowed(&[Method::GET, Method::PUT]),
            }
        }
        ["api", "theme", "validate"] => match method {
            Method::POST => match read_json(req).await {
                Ok(doc) => response::json(StatusCode::OK, &theme::validate(&doc)),
                Err(response) => response,
            },
            _ => response::method_not_allowed(&[Method::POST]),
        },
        ["api", "theme", "default"] => match method {
            Method::GET => response::json(StatusCode::OK, &ThemeBlueprint::default_blueprint()),
            _ => response::method_not_allowed(&[Method::GET]),
        },
        ["api", "theme", "catalog"] => match method {
            Method::GET => response::json(StatusCode::OK, &catalog()),
            _ => response::method_not_allowed(&[Method::GET]),
        },

        _ => {
            debug!("Responding with 404 to {:?} '{}'", method, path);
            response::not_found()
        }
    }
}

async fn menu(slug: &str, ctx: &Arc<Context>) -> Response {
    let options = ctx.config.general.page_options();
    let data = match load_menu(&*ctx.store, slug).await {
        Ok(data) => data,
        Err(e) => return menu_error(e, options),
    };

    record_menu_view(ctx, &data);
    let expanded = ExpandedCategories::initial(&data.categories);
    let page = html::menu_page(&data.settings(), &data, &expanded, options);
    response::html(StatusCode::OK, page)
}

/// Renders the menu with a blueprint from the request body instead of the
/// stored one. Nothing is saved.
async fn preview<B>(slug: &str, req: Request<B>, ctx: &Arc<Context>) -> Response
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let blueprint = match read_blueprint(req).await {
        Ok(blueprint) => blueprint,
        Err(response) => return response,
    };

    let options = ctx.config.general.page_options();
    let ready_delay = ctx.config.preview.ready_delay;
    match preview_unsaved(Arc::clone(&ctx.store), slug, blueprint, ready_delay).await {
        Ok((data, settings)) => {
            let expanded = ExpandedCategories::initial(&data.categories);
            response::html(StatusCode::OK, html::menu_page(&settings, &data, &expanded, options))
        }
        Err(e) => menu_error(e, options),
    }
}

fn menu_error(e: MenuError, options: PageOptions<'_>) -> Response {
    match e {
        MenuError::NotFound(slug) => {
            debug!("Menu of unknown restaurant '{slug}' requested");
            let page = html::error_page(
                "Menu not found",
                &format!("There is no restaurant with the address '{slug}'."),
                options,
            );
            response::html(StatusCode::NOT_FOUND, page)
        }
        MenuError::Load(e) => {
            error!("Failed to load menu: {e:#}");
            let page = html::error_page(
                "Something went wrong",
                "The menu could not be loaded. Please try again later.",
                options,
            );
            response::html(StatusCode::INTERNAL_SERVER_ERROR, page)
        }
    }
}

/// Fire and forget: the page does not wait for this and failures are only
/// logged.
fn record_menu_view(ctx: &Arc<Context>, data: &MenuData) {
    let store = Arc::clone(&ctx.store);
    let restaurant = data.restaurant.id;
    let payload = json!({ "slug": data.restaurant.slug });
    tokio::spawn(async move {
        if let Err(e) = store.record_analytics_event(restaurant, "menu_view", payload).await {
            warn!("Failed to record menu view of restaurant {restaurant}: {e:#}");
        }
    });
}

async fn get_theme(id: Id, ctx: &Context) -> Response {
    let restaurant = match ctx.store.restaurant(id).await {
        Ok(Some(r)) => r,
        Ok(None) => return response::not_found(),
        Err(e) => {
            error!("Failed to load restaurant {id}: {e:#}");
            return response::internal_server_error();
        }
    };

    let doc = match restaurant.theme_config {
        None => ThemeBlueprint::default_blueprint().to_json(),
        Some(doc) => match theme::migrate(doc.clone()) {
            Ok(migrated) => migrated,
            Err(e) => {
                // Handed out unchanged: the editor shows the validation errors.
                warn!("Stored theme of restaurant {id} cannot be migrated: {e:#}");
                doc
            }
        },
    };

    response::json(StatusCode::OK, &doc)
}

async fn put_theme<B>(id: Id, req: Request<B>, ctx: &Context) -> Response
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let blueprint = match read_blueprint(req).await {
        Ok(blueprint) => blueprint,
        Err(response) => return response,
    };

    for warning in color::lint(&blueprint.advanced_settings.colors) {
        warn!("Theme of restaurant {id}: {warning}");
    }

    match ctx.store.save_theme_config(id, &blueprint).await {
        Ok(true) => {
            info!("Saved theme of restaurant {id}");
            response::no_content()
        }
        Ok(false) => response::not_found(),
        Err(e) => {
            error!("Failed to save theme of restaurant {id}: {e:#}");
            response::internal_server_error()
        }
    }
}

/// Reads a candidate blueprint: it has to pass validation and then parse into
/// a fully typed [`ThemeBlueprint`]. Both failures answer 400 with the same
/// `{ valid, errors }` shape as `/api/theme/validate`.
async fn read_blueprint<B>(req: Request<B>) -> Result<ThemeBlueprint, Response>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let doc = read_json(req).await?;

    let validation = theme::validate(&doc);
    if !validation.valid {
        debug!("Rejecting invalid theme: {:?}", validation.errors);
        return Err(response::json(StatusCode::BAD_REQUEST, &validation));
    }

    ThemeBlueprint::from_json(doc).map_err(|e| {
        let validation = Validation { valid: false, errors: vec![format!("{e:#}")] };
        response::json(StatusCode::BAD_REQUEST, &validation)
    })
}

async fn read_json<B>(req: Request<B>) -> Result<Value, Response>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let body = match Limited::new(req.into_body(), MAX_BODY_SIZE).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => return Err(response::payload_too_large()),
        Err(e) => {
            debug!("Failed to read request body: {e}");
            return Err(response::bad_request("failed to read request body"));
        }
    };

    serde_json::from_slice(&body).map_err(|e| response::bad_request(format!("invalid JSON: {e}")))
}

/// Everything the theme editor offers to pick from.
fn catalog() -> Value {
    json!({
        "presets": presets::theme_presets(),
        "colorSchemes": presets::COLOR_SCHEMES,
        "fonts": presets::FONT_FAMILIES,
        "iconPacks": presets::ICON_PACKS,
        "animationTypes": presets::ANIMATION_TYPES,
        "layouts": {
            "categories": presets::CATEGORY_LAYOUTS,
            "products": presets::PRODUCT_LAYOUTS,
            "blocks": theme::BlockKind::ALL.map(|kind| kind.tag()),
        },
    })
}
