//! The theme blueprint: a declarative description of everything that
//! determines how the public menu page looks.
//!
//! The blueprint is stored as one JSON document per restaurant. Only
//! `advancedSettings` is meant to be edited; `presetId` names the blueprint
//! family the settings belong to.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prelude::*;


pub mod color;
pub mod path;
pub mod presets;
pub mod validate;
mod resolve;

pub use self::{
    path::{SettingError, SettingPath},
    resolve::resolve_settings,
    validate::{validate, Validation},
};


/// The only preset family this version understands.
pub const PRESET_ID: &str = "bufibu-klasik-v1";

/// Version of the blueprint document format. Documents without a
/// `schemaVersion` field are treated as version 1.
pub const SCHEMA_VERSION: u32 = 1;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeBlueprint {
    #[serde(default = "initial_schema_version")]
    pub schema_version: u32,
    pub preset_id: String,
    pub advanced_settings: AdvancedSettings,
}

fn initial_schema_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedSettings {
    pub layout: Layout,
    pub backgrounds: Backgrounds,
    pub colors: Colors,
    pub components: Components,
    pub typography: Typography,
}


// ===== Layout ===================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Block tags in render order, top to bottom. Unknown tags are kept but
    /// never rendered.
    pub blocks: Vec<String>,
    pub category_layout: CategoryLayout,
    pub product_layout: ProductLayout,
}

/// One independently renderable section of the public menu page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Header,
    AdvertisementHero,
    FeaturedItems,
    AdvertisementButton,
    Categories,
    Footer,
}

impl BlockKind {
    pub const ALL: [BlockKind; 6] = [
        Self::Header,
        Self::AdvertisementHero,
        Self::FeaturedItems,
        Self::AdvertisementButton,
        Self::Categories,
        Self::Footer,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::AdvertisementHero => "advertisementHero",
            Self::FeaturedItems => "featuredItems",
            Self::AdvertisementButton => "advertisementButton",
            Self::Categories => "categories",
            Self::Footer => "footer",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryLayout {
    Accordion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductLayout {
    List,
}


// ===== Backgrounds ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backgrounds {
    pub global: Background,
    pub sections: SectionBackgrounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBackgrounds {
    pub header: Background,
    pub categories: Background,
}

/// A background image blended over the base color. `opacity` is the visible
/// share of the photo, the base color covers the remaining `1 - opacity`.
/// Values outside of `[0, 1]` are stored as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub url: Option<String>,
    pub opacity: f64,
}


// ===== Colors ===================================================================================

/// Hex color per semantic role. Contrast between roles is not enforced, see
/// [`color::lint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Colors {
    pub header: String,
    pub body: String,
    pub cards: String,
    pub buttons: String,
    pub labels: String,
    pub restaurant_name: String,
    pub category_name: String,
    pub product_name: String,
    pub product_price: String,
    pub product_description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorRole {
    Header,
    Body,
    Cards,
    Buttons,
    Labels,
    RestaurantName,
    CategoryName,
    ProductName,
    ProductPrice,
    ProductDescription,
}

impl ColorRole {
    pub const ALL: [ColorRole; 10] = [
        Self::Header,
        Self::Body,
        Self::Cards,
        Self::Buttons,
        Self::Labels,
        Self::RestaurantName,
        Self::CategoryName,
        Self::ProductName,
        Self::ProductPrice,
        Self::ProductDescription,
    ];
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}

impl Colors {
    pub fn get(&self, role: ColorRole) -> &str {
        match role {
            ColorRole::Header => &self.header,
            ColorRole::Body => &self.body,
            ColorRole::Cards => &self.cards,
            ColorRole::Buttons => &self.buttons,
            ColorRole::Labels => &self.labels,
            ColorRole::RestaurantName => &self.restaurant_name,
            ColorRole::CategoryName => &self.category_name,
            ColorRole::ProductName => &self.product_name,
            ColorRole::ProductPrice => &self.product_price,
            ColorRole::ProductDescription => &self.product_description,
        }
    }

    pub fn set(&mut self, role: ColorRole, value: impl Into<String>) {
        let slot = match role {
            ColorRole::Header => &mut self.header,
            ColorRole::Body => &mut self.body,
            ColorRole::Cards => &mut self.cards,
            ColorRole::Buttons => &mut self.buttons,
            ColorRole::Labels => &mut self.labels,
            ColorRole::RestaurantName => &mut self.restaurant_name,
            ColorRole::CategoryName => &mut self.category_name,
            ColorRole::ProductName => &mut self.product_name,
            ColorRole::ProductPrice => &mut self.product_price,
            ColorRole::ProductDescription => &mut self.product_description,
        };
        *slot = value.into();
    }
}


// ===== Components ===============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    pub header: HeaderComponent,
    /// Gates the `featuredItems` block.
    pub featured_section: Toggle,
    /// Gates the `advertisementButton` block.
    pub advertisement_button: Toggle,
    pub category_animation: CategoryAnimation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderComponent {
    pub logo_size: LogoSize,
    pub social_icons: SocialIcons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoSize {
    Small,
    Medium,
    Large,
}

impl LogoSize {
    /// Rendered logo height in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            Self::Small => 56,
            Self::Medium => 80,
            Self::Large => 112,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialIcons {
    pub enabled: bool,
    pub icon_pack: IconPack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconPack {
    Classic,
    Outline,
    Filled,
}

impl fmt::Display for IconPack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toggle {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnimation {
    #[serde(rename = "type")]
    pub kind: AnimationType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationType {
    None,
    BufibuKlasik,
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}


// ===== Typography ===============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub restaurant_name: TextStyle,
    pub restaurant_slogan: TextStyle,
    pub category_name: TextStyle,
    pub product_name: TextStyle,
    pub product_price: TextStyle,
    pub product_description: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextRole {
    RestaurantName,
    RestaurantSlogan,
    CategoryName,
    ProductName,
    ProductPrice,
    ProductDescription,
}

impl fmt::Display for TextRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}

impl Typography {
    pub fn get(&self, role: TextRole) -> &TextStyle {
        match role {
            TextRole::RestaurantName => &self.restaurant_name,
            TextRole::RestaurantSlogan => &self.restaurant_slogan,
            TextRole::CategoryName => &self.category_name,
            TextRole::ProductName => &self.product_name,
            TextRole::ProductPrice => &self.product_price,
            TextRole::ProductDescription => &self.product_description,
        }
    }
}

/// `font_family` is free text for custom input, presets only use names from
/// [`presets::FONT_FAMILIES`]. Sizes carry their CSS unit, e.g. "2.5rem".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: String,
    pub font_weight: String,
    pub alignment: Alignment,
}

impl TextStyle {
    pub(crate) fn new(family: &str, size: &str, weight: &str, alignment: Alignment) -> Self {
        Self {
            font_family: family.into(),
            font_size: size.into(),
            font_weight: weight.into(),
            alignment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}


// ===== Default & (de)serialization ==============================================================

static DEFAULT_BLUEPRINT: Lazy<ThemeBlueprint> = Lazy::new(|| {
    let background = |opacity| Background { url: None, opacity };

    ThemeBlueprint {
        schema_version: SCHEMA_VERSION,
        preset_id: PRESET_ID.into(),
        advanced_settings: AdvancedSettings {
            layout: Layout {
                blocks: BlockKind::ALL.iter().map(|b| b.tag().to_owned()).collect(),
                category_layout: CategoryLayout::Accordion,
                product_layout: ProductLayout::List,
            },
            backgrounds: Backgrounds {
                global: background(1.0),
                sections: SectionBackgrounds {
                    header: background(1.0),
                    categories: background(1.0),
                },
            },
            colors: Colors {
                header: "#1f1a17".into(),
                body: "#f7f3ee".into(),
                cards: "#ffffff".into(),
                buttons: "#c0392b".into(),
                labels: "#ffffff".into(),
                restaurant_name: "#ffffff".into(),
                category_name: "#2c2420".into(),
                product_name: "#2c2420".into(),
                product_price: "#c0392b".into(),
                product_description: "#6b5f57".into(),
            },
            components: Components {
                header: HeaderComponent {
                    logo_size: LogoSize::Medium,
                    social_icons: SocialIcons { enabled: true, icon_pack: IconPack::Classic },
                },
                featured_section: Toggle { enabled: true },
                advertisement_button: Toggle { enabled: true },
                category_animation: CategoryAnimation { kind: AnimationType::BufibuKlasik },
            },
            typography: Typography {
                restaurant_name: TextStyle::new("Playfair Display", "2.5rem", "700", Alignment::Center),
                restaurant_slogan: TextStyle::new("Lora", "1rem", "400", Alignment::Center),
                category_name: TextStyle::new("Montserrat", "1.25rem", "600", Alignment::Left),
                product_name: TextStyle::new("Montserrat", "1rem", "600", Alignment::Left),
                product_price: TextStyle::new("Montserrat", "1rem", "700", Alignment::Right),
                product_description: TextStyle::new("Open Sans", "0.875rem", "400", Alignment::Left),
            },
        },
    }
});

impl ThemeBlueprint {
    /// Returns an independent copy of the canonical default blueprint.
    pub fn default_blueprint() -> Self {
        DEFAULT_BLUEPRINT.clone()
    }

    /// Parses a stored blueprint document, upgrading older document versions
    /// first.
    pub fn from_json(doc: Value) -> Result<Self> {
        let doc = migrate(doc)?;
        serde_json::from_value(doc).context("blueprint does not match the expected structure")
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).expect("bug: theme blueprint not serializable")
    }
}

impl Default for ThemeBlueprint {
    fn default() -> Self {
        Self::default_blueprint()
    }
}

/// Brings a stored blueprint document to [`SCHEMA_VERSION`]. Documents written
/// by a newer version of this application are rejected.
pub fn migrate(mut doc: Value) -> Result<Value> {
    let obj = doc.as_object_mut().ok_or_else(|| anyhow!("theme blueprint must be a JSON object"))?;
    let version = match obj.get("schemaVersion") {
        None => 1,
        Some(v) => v.as_u64()
            .filter(|&v| v >= 1)
            .ok_or_else(|| anyhow!("invalid 'schemaVersion' in theme blueprint: {v}"))?,
    };

    if version > u64::from(SCHEMA_VERSION) {
        bail!(
            "theme blueprint has schema version {version}, but this application only \
                understands versions up to {SCHEMA_VERSION}",
        );
    }

    if version < u64::from(SCHEMA_VERSION) {
        debug!("Upgrading theme blueprint from schema version {version} to {SCHEMA_VERSION}");
    }
    obj.insert("schemaVersion".into(), SCHEMA_VERSION.into());

    Ok(doc)
}


#[cfg(test)]
mod tests;
