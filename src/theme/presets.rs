//! Built-in, read-only catalog of theme presets, color schemes and the
//! option lists offered by the theme editor.

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};

use super::{
    Alignment, AnimationType, BlockKind, CategoryLayout, ColorRole, Colors, IconPack, LogoSize,
    ProductLayout, TextStyle, ThemeBlueprint,
};


/// Preset that [`ThemeBlueprint::default_blueprint`] corresponds to.
pub const DEFAULT_PRESET: &str = "klasik";

/// Color scheme of the default blueprint.
pub const DEFAULT_COLOR_SCHEME: &str = "klasik";


/// A complete, ready to apply blueprint.
#[derive(Debug, Serialize)]
pub struct ThemePreset {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub preview: &'static str,
    pub blueprint: ThemeBlueprint,
}

/// A colors-only patch. Roles not listed are left untouched when applied.
#[derive(Debug, Serialize)]
pub struct ColorScheme {
    pub key: &'static str,
    pub name: &'static str,
    #[serde(serialize_with = "serialize_color_list")]
    pub colors: &'static [(ColorRole, &'static str)],
}

impl ColorScheme {
    /// Overwrites every role this scheme specifies.
    pub fn apply_to(&self, colors: &mut Colors) {
        for &(role, hex) in self.colors {
            colors.set(role, hex);
        }
    }
}

fn serialize_color_list<S: Serializer>(
    colors: &&'static [(ColorRole, &'static str)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(colors.iter().map(|(role, hex)| (role, hex)))
}

#[derive(Debug, Serialize)]
pub struct IconPackInfo {
    pub key: IconPack,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AnimationInfo {
    pub key: AnimationType,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LayoutOption<T> {
    pub key: T,
    pub name: &'static str,
    pub description: &'static str,
}


pub const FONT_FAMILIES: &[&str] = &[
    "Playfair Display",
    "Lora",
    "Montserrat",
    "Open Sans",
    "Poppins",
    "Inter",
    "Roboto",
    "Merriweather",
    "Nunito",
    "Cormorant Garamond",
];

pub const ICON_PACKS: &[IconPackInfo] = &[
    IconPackInfo {
        key: IconPack::Classic,
        name: "Classic",
        description: "Brand-colored round icons",
    },
    IconPackInfo {
        key: IconPack::Outline,
        name: "Outline",
        description: "Thin line icons that take the label color",
    },
    IconPackInfo {
        key: IconPack::Filled,
        name: "Filled",
        description: "Solid square icons on the button color",
    },
];

pub const ANIMATION_TYPES: &[AnimationInfo] = &[
    AnimationInfo { key: AnimationType::None, name: "No animation" },
    AnimationInfo { key: AnimationType::BufibuKlasik, name: "Bufibu classic slide" },
];

pub const CATEGORY_LAYOUTS: &[LayoutOption<CategoryLayout>] = &[
    LayoutOption {
        key: CategoryLayout::Accordion,
        name: "Accordion",
        description: "Full-width category cards that expand to show their products",
    },
];

pub const PRODUCT_LAYOUTS: &[LayoutOption<ProductLayout>] = &[
    LayoutOption {
        key: ProductLayout::List,
        name: "List",
        description: "One product per row with price on the right",
    },
];


pub const COLOR_SCHEMES: &[ColorScheme] = &[
    ColorScheme {
        key: "klasik",
        name: "Klasik",
        colors: &[
            (ColorRole::Header, "#1f1a17"),
            (ColorRole::Body, "#f7f3ee"),
            (ColorRole::Cards, "#ffffff"),
            (ColorRole::Buttons, "#c0392b"),
            (ColorRole::Labels, "#ffffff"),
            (ColorRole::RestaurantName, "#ffffff"),
            (ColorRole::CategoryName, "#2c2420"),
            (ColorRole::ProductName, "#2c2420"),
            (ColorRole::ProductPrice, "#c0392b"),
            (ColorRole::ProductDescription, "#6b5f57"),
        ],
    },
    ColorScheme {
        key: "ocean-blue",
        name: "Ocean Blue",
        colors: &[
            (ColorRole::Header, "#0b3c5d"),
            (ColorRole::Body, "#eef5fb"),
            (ColorRole::Cards, "#ffffff"),
            (ColorRole::Buttons, "#1d70a2"),
            (ColorRole::Labels, "#ffffff"),
            (ColorRole::RestaurantName, "#ffffff"),
            (ColorRole::CategoryName, "#0b3c5d"),
            (ColorRole::ProductName, "#12324a"),
            (ColorRole::ProductPrice, "#1d70a2"),
            (ColorRole::ProductDescription, "#5b7083"),
        ],
    },
    ColorScheme {
        key: "sunset-orange",
        name: "Sunset Orange",
        colors: &[
            (ColorRole::Header, "#7a2e0e"),
            (ColorRole::Body, "#fff6ee"),
            (ColorRole::Cards, "#ffffff"),
            (ColorRole::Buttons, "#e8590c"),
            (ColorRole::Labels, "#ffffff"),
            (ColorRole::RestaurantName, "#fff4e6"),
            (ColorRole::CategoryName, "#7a2e0e"),
            (ColorRole::ProductName, "#3d1a08"),
            (ColorRole::ProductPrice, "#d9480f"),
            (ColorRole::ProductDescription, "#8a6a58"),
        ],
    },
    ColorScheme {
        key: "forest-green",
        name: "Forest Green",
        colors: &[
            (ColorRole::Header, "#1e3d2f"),
            (ColorRole::Body, "#f1f6f1"),
            (ColorRole::Cards, "#ffffff"),
            (ColorRole::Buttons, "#2f7d4f"),
            (ColorRole::Labels, "#ffffff"),
            (ColorRole::RestaurantName, "#f1f6f1"),
            (ColorRole::CategoryName, "#1e3d2f"),
            (ColorRole::ProductName, "#1b2e24"),
            (ColorRole::ProductPrice, "#2f7d4f"),
            (ColorRole::ProductDescription, "#5c6f63"),
        ],
    },
    ColorScheme {
        key: "midnight",
        name: "Midnight",
        colors: &[
            (ColorRole::Header, "#0d0f14"),
            (ColorRole::Body, "#161a22"),
            (ColorRole::Cards, "#1f2430"),
            (ColorRole::Buttons, "#7c5cff"),
            (ColorRole::Labels, "#ffffff"),
            (ColorRole::RestaurantName, "#f5f5f7"),
            (ColorRole::CategoryName, "#e4e6eb"),
            (ColorRole::ProductName, "#f5f5f7"),
            (ColorRole::ProductPrice, "#b3a1ff"),
            (ColorRole::ProductDescription, "#a0a6b4"),
        ],
    },
    ColorScheme {
        key: "royal-gold",
        name: "Royal Gold",
        colors: &[
            (ColorRole::Header, "#111111"),
            (ColorRole::Body, "#1a1814"),
            (ColorRole::Cards, "#24211b"),
            (ColorRole::Buttons, "#c9a227"),
            (ColorRole::Labels, "#111111"),
            (ColorRole::RestaurantName, "#e6c65c"),
            (ColorRole::CategoryName, "#e6c65c"),
            (ColorRole::ProductName, "#f3ead3"),
            (ColorRole::ProductPrice, "#e6c65c"),
            (ColorRole::ProductDescription, "#b5aa8f"),
        ],
    },
];

static THEME_PRESETS: Lazy<Vec<ThemePreset>> = Lazy::new(|| vec![
    ThemePreset {
        key: "klasik",
        name: "Bufibu Klasik",
        description: "Warm, classic look with serif headings and an animated category list",
        preview: "/assets/presets/klasik.jpg",
        blueprint: ThemeBlueprint::default_blueprint(),
    },
    ThemePreset {
        key: "modern-dark",
        name: "Modern Dark",
        description: "Dark surfaces, geometric sans-serif type and a compact header",
        preview: "/assets/presets/modern-dark.jpg",
        blueprint: derive_preset("midnight", |bp| {
            let settings = &mut bp.advanced_settings;
            settings.components.header.logo_size = LogoSize::Small;
            settings.components.header.social_icons.icon_pack = IconPack::Outline;
            settings.components.category_animation.kind = AnimationType::None;
            settings.backgrounds.global.opacity = 0.35;

            let t = &mut settings.typography;
            t.restaurant_name = TextStyle::new("Poppins", "2rem", "700", Alignment::Left);
            t.restaurant_slogan = TextStyle::new("Inter", "0.95rem", "400", Alignment::Left);
            t.category_name = TextStyle::new("Poppins", "1.2rem", "600", Alignment::Left);
            t.product_name = TextStyle::new("Inter", "1rem", "600", Alignment::Left);
            t.product_price = TextStyle::new("Inter", "1rem", "700", Alignment::Right);
            t.product_description = TextStyle::new("Inter", "0.85rem", "400", Alignment::Left);
        }),
    },
    ThemePreset {
        key: "elegant-gold",
        name: "Elegant Gold",
        description: "Black and gold with large centered serif typography",
        preview: "/assets/presets/elegant-gold.jpg",
        blueprint: derive_preset("royal-gold", |bp| {
            let settings = &mut bp.advanced_settings;
            settings.components.header.logo_size = LogoSize::Large;
            settings.components.header.social_icons.icon_pack = IconPack::Filled;
            settings.backgrounds.sections.header.opacity = 0.6;

            let t = &mut settings.typography;
            t.restaurant_name = TextStyle::new("Cormorant Garamond", "3rem", "700", Alignment::Center);
            t.restaurant_slogan = TextStyle::new("Cormorant Garamond", "1.1rem", "400", Alignment::Center);
            t.category_name = TextStyle::new("Cormorant Garamond", "1.5rem", "600", Alignment::Center);
            t.product_name = TextStyle::new("Lora", "1.05rem", "600", Alignment::Left);
            t.product_price = TextStyle::new("Lora", "1.05rem", "700", Alignment::Right);
            t.product_description = TextStyle::new("Lora", "0.9rem", "400", Alignment::Left);
        }),
    },
    ThemePreset {
        key: "fresh-garden",
        name: "Fresh Garden",
        description: "Light and green, featured products first and no hero banner",
        preview: "/assets/presets/fresh-garden.jpg",
        blueprint: derive_preset("forest-green", |bp| {
            let settings = &mut bp.advanced_settings;
            settings.layout.blocks = [
                BlockKind::Header,
                BlockKind::FeaturedItems,
                BlockKind::Categories,
                BlockKind::AdvertisementButton,
                BlockKind::Footer,
            ].iter().map(|b| b.tag().to_owned()).collect();
            settings.components.header.social_icons.icon_pack = IconPack::Outline;

            let t = &mut settings.typography;
            t.restaurant_name = TextStyle::new("Nunito", "2.25rem", "800", Alignment::Center);
            t.restaurant_slogan = TextStyle::new("Nunito", "1rem", "400", Alignment::Center);
            t.category_name = TextStyle::new("Nunito", "1.25rem", "700", Alignment::Left);
            t.product_name = TextStyle::new("Open Sans", "1rem", "600", Alignment::Left);
            t.product_price = TextStyle::new("Open Sans", "1rem", "700", Alignment::Right);
            t.product_description = TextStyle::new("Open Sans", "0.875rem", "400", Alignment::Left);
        }),
    },
]);

/// Starts from the default blueprint, applies the given color scheme and then
/// the customizations in `f`.
fn derive_preset(scheme: &str, f: impl FnOnce(&mut ThemeBlueprint)) -> ThemeBlueprint {
    let mut blueprint = ThemeBlueprint::default_blueprint();
    if let Some(scheme) = color_scheme(scheme) {
        scheme.apply_to(&mut blueprint.advanced_settings.colors);
    }
    f(&mut blueprint);
    blueprint
}

pub fn theme_presets() -> &'static [ThemePreset] {
    &THEME_PRESETS
}

pub fn theme_preset(key: &str) -> Option<&'static ThemePreset> {
    THEME_PRESETS.iter().find(|p| p.key == key)
}

pub fn color_scheme(key: &str) -> Option<&'static ColorScheme> {
    COLOR_SCHEMES.iter().find(|s| s.key == key)
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;


    #[test]
    fn catalog_sizes() {
        assert!(theme_presets().len() >= 4);
        assert!(COLOR_SCHEMES.len() >= 4);
        assert!(ICON_PACKS.len() >= 3);
        assert!(ANIMATION_TYPES.len() >= 2);
        assert_eq!(CATEGORY_LAYOUTS.len(), 1);
        assert_eq!(PRODUCT_LAYOUTS.len(), 1);
    }

    #[test]
    fn keys_are_unique() {
        let presets: HashSet<_> = theme_presets().iter().map(|p| p.key).collect();
        assert_eq!(presets.len(), theme_presets().len());
        let schemes: HashSet<_> = COLOR_SCHEMES.iter().map(|s| s.key).collect();
        assert_eq!(schemes.len(), COLOR_SCHEMES.len());
    }

    #[test]
    fn schemes_cover_all_roles() {
        for scheme in COLOR_SCHEMES {
            let roles: HashSet<_> = scheme.colors.iter().map(|(role, _)| *role).collect();
            assert_eq!(roles.len(), scheme.colors.len(), "duplicate role in '{}'", scheme.key);
            for role in ColorRole::ALL {
                assert!(roles.contains(&role), "'{}' lacks {role}", scheme.key);
            }
        }
    }

    #[test]
    fn default_matches_default_entries() {
        let default = ThemeBlueprint::default_blueprint();
        assert_eq!(theme_preset(DEFAULT_PRESET).unwrap().blueprint, default);

        let mut colors = default.advanced_settings.colors.clone();
        color_scheme(DEFAULT_COLOR_SCHEME).unwrap().apply_to(&mut colors);
        assert_eq!(colors, default.advanced_settings.colors);
    }

    #[test]
    fn presets_use_catalog_fonts() {
        for preset in theme_presets() {
            let t = &preset.blueprint.advanced_settings.typography;
            for style in [
                &t.restaurant_name,
                &t.restaurant_slogan,
                &t.category_name,
                &t.product_name,
                &t.product_price,
                &t.product_description,
            ] {
                assert!(
                    FONT_FAMILIES.contains(&style.font_family.as_str()),
                    "preset '{}' uses unknown font '{}'",
                    preset.key,
                    style.font_family,
                );
            }
        }
    }

    #[test]
    fn presets_only_use_known_blocks() {
        for preset in theme_presets() {
            for tag in &preset.blueprint.advanced_settings.layout.blocks {
                assert!(BlockKind::from_tag(tag).is_some(), "'{}': {tag}", preset.key);
            }
        }
    }

    #[test]
    fn unknown_keys() {
        assert!(theme_preset("does-not-exist").is_none());
        assert!(color_scheme("").is_none());
    }

    #[test]
    fn scheme_serializes_as_map() {
        let json = serde_json::to_value(color_scheme("ocean-blue").unwrap()).unwrap();
        assert_eq!(json["colors"]["buttons"], "#1d70a2");
        assert_eq!(json["colors"]["productDescription"], "#5b7083");
    }
}
