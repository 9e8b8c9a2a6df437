//! Bufibu: theme blueprints for restaurant menus, their live preview and the
//! public menu renderer.

pub mod config;
pub mod db;
pub mod editor;
pub mod http;
pub mod logger;
pub mod prelude;
pub mod preview;
pub mod render;
pub mod store;
pub mod theme;
pub mod util;
pub mod version;
