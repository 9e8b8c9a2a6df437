use std::path::Path;

use bufibu::{
    prelude::*,
    theme::{self, color, presets, ThemeBlueprint},
};

use crate::args::ThemeCommand;


pub(crate) async fn run(cmd: &ThemeCommand) -> Result<()> {
    match cmd {
        ThemeCommand::Default => {
            let json = serde_json::to_string_pretty(&ThemeBlueprint::default_blueprint())?;
            println!("{json}");
        }
        ThemeCommand::Validate { file } => {
            let warnings = check_file(file).await?;
            bunt::println!("{$green+bold}✔{/$} '{[bold]}' is a valid theme", file.display());
            for warning in &warnings {
                bunt::println!("  {$yellow}warning:{/$} {}", warning);
            }
        }
        ThemeCommand::Presets => {
            bunt::println!("{$bold+blue+intense}Presets{/$}");
            for preset in presets::theme_presets() {
                bunt::println!(" ▸ {[bold]}  {[dimmed]}", preset.key, preset.name);
                println!("     {}", preset.description);
            }
            println!();
            bunt::println!("{$bold+blue+intense}Color schemes{/$}");
            for scheme in presets::COLOR_SCHEMES {
                bunt::println!(" ▸ {[bold]}  {[dimmed]}", scheme.key, scheme.name);
            }
        }
    }

    Ok(())
}

/// Reads a blueprint file and runs it through the same checks as saving via
/// the API: shallow validation, full parse and color lint. Returns the lint
/// warnings.
pub(crate) async fn check_file(path: &Path) -> Result<Vec<String>> {
    let raw = tokio::fs::read(path).await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let doc: serde_json::Value = serde_json::from_slice(&raw)
        .with_context(|| format!("'{}' is not valid JSON", path.display()))?;

    let validation = theme::validate(&doc);
    if !validation.valid {
        bail!("invalid theme blueprint: {}", validation.errors.join("; "));
    }

    let blueprint = ThemeBlueprint::from_json(doc)?;
    Ok(color::lint(&blueprint.advanced_settings.colors))
}
