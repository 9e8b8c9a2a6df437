use std::fmt;

use palette::{FromColor, Lch, Srgb};

use super::{ColorRole, Colors};


/// A simple sRGB color parsed from `#rrggbb`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Color(Srgb<u8>);

impl Color {
    /// Perceived lightness (L in LCH color space), 0 - 100.
    pub fn lightness(self) -> f32 {
        Lch::from_color(self.0.into_format::<f32>()).l
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

impl TryFrom<&str> for Color {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.as_bytes();
        if s.len() != 7 {
            return Err(format!("invalid color string length, expected 7, got {}", s.len()));
        }
        if s[0] != b'#' {
            return Err("invalid color string: does not start with '#'".into());
        }

        fn digit(c: u8) -> Result<u8, String> {
            match c {
                b'0'..=b'9' => Ok(c - b'0'),
                b'a'..=b'f' => Ok(c - b'a' + 10),
                b'A'..=b'F' => Ok(c - b'A' + 10),
                _ => Err("invalid hex digit in color string".into())
            }
        }

        let r = 16 * digit(s[1])? + digit(s[2])?;
        let g = 16 * digit(s[3])? + digit(s[4])?;
        let b = 16 * digit(s[5])? + digit(s[6])?;

        Ok(Self(Srgb::new(r, g, b)))
    }
}

/// Minimum lightness difference between a text role and the surface it is
/// drawn on. A difference of 30 roughly corresponds to a WCAG contrast of 3:1.
const MIN_LIGHTNESS_DIFFERENCE: f32 = 30.0;

/// Text roles and the background role they are rendered on.
const TEXT_ON_SURFACE: &[(ColorRole, ColorRole)] = &[
    (ColorRole::RestaurantName, ColorRole::Header),
    (ColorRole::CategoryName, ColorRole::Cards),
    (ColorRole::ProductName, ColorRole::Cards),
    (ColorRole::ProductPrice, ColorRole::Cards),
    (ColorRole::ProductDescription, ColorRole::Cards),
    (ColorRole::Labels, ColorRole::Buttons),
];

/// Returns human readable warnings about colors that are not valid hex colors
/// or text colors with too little contrast to their background. Nothing here
/// is enforced; a theme with warnings can still be saved and rendered.
pub fn lint(colors: &Colors) -> Vec<String> {
    let mut warnings = Vec::new();

    let parse = |role: ColorRole| Color::try_from(colors.get(role)).ok();
    for role in ColorRole::ALL {
        if let Err(e) = Color::try_from(colors.get(role)) {
            warnings.push(format!("color '{role}' ({:?}): {e}", colors.get(role)));
        }
    }

    for &(text, surface) in TEXT_ON_SURFACE {
        let (Some(fg), Some(bg)) = (parse(text), parse(surface)) else {
            continue;
        };

        let diff = (fg.lightness() - bg.lightness()).abs();
        if diff < MIN_LIGHTNESS_DIFFERENCE {
            warnings.push(format!(
                "color '{text}' ({fg}) has low contrast against '{surface}' ({bg}): \
                    lightness differs by {diff:.1}, should be at least {MIN_LIGHTNESS_DIFFERENCE}",
            ));
        }
    }

    warnings
}


#[cfg(test)]
mod tests {
    use crate::theme::{presets, ThemeBlueprint};
    use super::*;


    #[test]
    fn parse() {
        let c = Color::try_from("#C0392b").unwrap();
        assert_eq!(c.to_string(), "#c0392b");

        Color::try_from("c0392b").unwrap_err();
        Color::try_from("#c0392").unwrap_err();
        Color::try_from("#c0392g").unwrap_err();
        Color::try_from("red").unwrap_err();
    }

    #[test]
    fn lightness_extremes() {
        assert!(Color::try_from("#000000").unwrap().lightness() < 1.0);
        assert!(Color::try_from("#ffffff").unwrap().lightness() > 99.0);
    }

    #[test]
    fn schemes_have_no_warnings() {
        for scheme in presets::COLOR_SCHEMES {
            let mut colors = ThemeBlueprint::default_blueprint().advanced_settings.colors;
            scheme.apply_to(&mut colors);
            let warnings = lint(&colors);
            assert!(warnings.is_empty(), "scheme '{}': {warnings:#?}", scheme.key);
        }
    }

    #[test]
    fn low_contrast_and_garbage() {
        let mut colors = ThemeBlueprint::default_blueprint().advanced_settings.colors;
        colors.product_name = colors.cards.clone();
        colors.body = "blue".into();

        let warnings = lint(&colors);
        assert_eq!(warnings.len(), 2, "{warnings:#?}");
        assert!(warnings.iter().any(|w| w.contains("productName") && w.contains("cards")));
        assert!(warnings.iter().any(|w| w.contains("body")));
    }
}
