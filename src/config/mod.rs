use std::{
    fs, io::{self, Write}, path::{Path, PathBuf}, time::Duration,
};
use confique::Config as _;
use serde::Deserialize;

use crate::prelude::*;


mod general;

pub use self::general::GeneralConfig;


/// The locations where Bufibu will look for a configuration file. The first
/// existing file in this list is used.
const DEFAULT_PATHS: &[&str] = &[
    // For better DX, we include this special path here, but just in debug mode.
    #[cfg(debug_assertions)]
    "util/dev-config/config.toml",

    "config.toml",
    "/etc/bufibu/config.toml",
];

const BUFIBU_CONFIG_PATH_ENV: &str = "BUFIBU_CONFIG_PATH";

/// Configuration for Bufibu.
///
/// All relative paths are relative to the location of this configuration file.
/// Duration values are specified as string with a unit, e.g. "27s". Valid
/// units: 'ms', 's', 'min', 'h' and 'd'.
#[derive(Debug, confique::Config)]
pub struct Config {
    #[config(nested)]
    pub general: GeneralConfig,

    #[config(nested)]
    pub http: crate::http::HttpConfig,

    #[config(nested)]
    pub store: crate::store::StoreConfig,

    /// Only used if `store.backend` is "postgres".
    #[config(nested)]
    pub db: crate::db::DbConfig,

    #[config(nested)]
    pub log: crate::logger::LogConfig,

    #[config(nested)]
    pub preview: crate::preview::PreviewConfig,
}

impl Config {
    /// Tries to find a config file by checking `BUFIBU_CONFIG_PATH` and from a
    /// list of possible default config file locations. The first config file
    /// is loaded via [`Self::load_from`]. Returns the loaded config and the
    /// path that it was loaded from.
    pub fn from_env_or_default_locations() -> Result<(Self, PathBuf)> {
        let path = if let Some(path) = std::env::var_os(BUFIBU_CONFIG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            DEFAULT_PATHS.iter()
                .map(PathBuf::from)
                .find(|p| p.exists())
                .ok_or(anyhow!(
                    "no configuration file found. Note: we checked the following paths: {}",
                    DEFAULT_PATHS.join(", "),
                ))?
        };

        let config = Self::load_from(&path)
            .context(format!("failed to load configuration from '{}'", path.display()))?;

        Ok((config, path))
    }

    /// Loads the configuration from a specific TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Config::from_file(path)
            .context(format!("failed to read config file '{}'", path.display()))?;

        config.fix_paths(path)?;

        Ok(config)
    }

    /// Checks the config for problematic things that deserve a warning, but
    /// should not bring down Bufibu.
    pub fn lint(&self) {
        if self.store.backend == crate::store::StoreBackend::Memory {
            warn!("Using the in-memory store: all changes are lost on restart!");
        } else if self.store.fixture.is_some() {
            warn!("'store.fixture' is set, but only used by the \"memory\" store backend");
        }

        if self.general.currency_symbol.trim().is_empty() {
            warn!("'general.currency_symbol' is empty, prices will be shown without currency");
        }
    }

    /// Goes through all paths in the configuration and changes relative paths
    /// to be absolute based on the path of the configuration file itself.
    fn fix_paths(&mut self, config_path: &Path) -> Result<()> {
        fn fix_path(base_path: &Path, path: &mut PathBuf) {
            if path.is_relative() {
                *path = base_path.join(&path);
            }
        }

        let absolute_config_path = config_path.canonicalize()
            .context("failed to canonicalize config path")?;
        let base = absolute_config_path.parent()
            .ok_or_else(|| anyhow!("config file path has no parent"))?;

        if let Some(p) = &mut self.log.file {
            fix_path(base, p);
        }
        if let Some(p) = &mut self.store.fixture {
            fix_path(base, p);
        }

        Ok(())
    }
}

/// Writes the generated TOML config template file to the given destination or
/// stdout.
pub fn write_template(path: Option<&PathBuf>) -> Result<()> {
    use confique::toml::FormatOptions;

    info!(
        "Writing configuration template to '{}'",
        path.map(|p| p.display().to_string()).unwrap_or("<stdout>".into()),
    );

    let mut options = FormatOptions::default();
    options.general.nested_field_gap = 2;
    let template = confique::toml::template::<Config>(options);
    match path {
        Some(path) => fs::write(path, template)?,
        None => io::stdout().write_all(template.as_bytes())?,
    }

    Ok(())
}

/// Our custom format for durations. We allow a couple useful units and required
/// a unit to increase readability of config files.
pub(crate) fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(D::Error::custom)
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    // Allow unit-less zeroes
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let start_unit = s.find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| "no time unit for duration".to_owned())?;
    let (num, unit) = s.split_at(start_unit);
    let num: u32 = num.parse()
        .map_err(|e| format!("invalid integer for duration: {}", e))?;
    let num: u64 = num.into();

    match unit {
        "ms" => Ok(Duration::from_millis(num)),
        "s" => Ok(Duration::from_secs(num)),
        "min" => Ok(Duration::from_secs(num * 60)),
        "h" => Ok(Duration::from_secs(num * 60 * 60)),
        "d" => Ok(Duration::from_secs(num * 60 * 60 * 24)),
        _ => Err("invalid unit of time for duration".into()),
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{parse_duration, Config};


    #[test]
    fn durations() {
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("300ms"), Ok(Duration::from_millis(300)));
        assert_eq!(parse_duration("5s"), Ok(Duration::from_secs(5)));
        assert_eq!(parse_duration("2min"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_duration("1d"), Ok(Duration::from_secs(86400)));

        assert!(parse_duration("300").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("5 s").is_err());
        assert!(parse_duration("5w").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn load_with_defaults() {
        let dir = std::env::temp_dir().join(format!("bufibu-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, r#"
            [http]
            port = 4000

            [store]
            backend = "memory"
            fixture = "fixture.json"

            [preview]
            ready_delay = "1s"
        "#).unwrap();

        let expected_fixture = dir.canonicalize().unwrap().join("fixture.json");
        let config = Config::load_from(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.http.port, 4000);
        assert_eq!(config.http.address.to_string(), "127.0.0.1");
        assert_eq!(config.store.backend, crate::store::StoreBackend::Memory);
        assert_eq!(config.store.fixture, Some(expected_fixture));
        assert_eq!(config.preview.ready_delay, Duration::from_millis(1000));
        assert_eq!(config.general.site_title, "Bufibu Menu");
        assert_eq!(config.general.currency_symbol, "₺");
        assert!(config.log.stdout);
    }

    #[test]
    fn template_mentions_all_sections() {
        let template = confique::toml::template::<Config>(Default::default());
        for section in ["[general]", "[http]", "[store]", "[db]", "[log]", "[preview]"] {
            assert!(template.contains(section), "missing {section}");
        }
    }
}
