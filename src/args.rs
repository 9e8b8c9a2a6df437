//! This module defines the command line arguments Bufibu accepts.

use std::{io::IsTerminal, path::PathBuf};
use clap::{Parser, Subcommand};
use termcolor::ColorChoice;


#[derive(Debug, Parser)]
#[command(about = "Theme-driven digital menus for restaurants.")]
pub(crate) struct Args {
    #[command(subcommand)]
    pub(crate) cmd: Command,

    /// Whether to use colors in the output: "auto", "always" or "never".
    #[arg(long, global = true, default_value = "auto", value_parser = parse_color_choice)]
    pub(crate) color: ColorChoice,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Starts the HTTP server serving menus and the theme API.
    Serve {
        #[command(flatten)]
        shared: Shared,
    },

    /// Applies all pending database migrations.
    Migrate {
        #[command(flatten)]
        shared: Shared,
    },

    /// Checks the config, the store and optionally a theme file to find
    /// problems before (re)starting Bufibu. Exits with 0 if everything is Ok,
    /// and with 1 otherwise.
    Check {
        /// A theme blueprint JSON file to check as well.
        #[arg(long)]
        theme: Option<PathBuf>,

        #[command(flatten)]
        shared: Shared,
    },

    /// Outputs a template for the configuration file (which includes
    /// descriptions or all options).
    WriteConfig {
        /// Target file. If not specified, the template is written to stdout.
        target: Option<PathBuf>,
    },

    /// Theme blueprint tools. These do not need a configuration file.
    Theme {
        #[command(subcommand)]
        cmd: ThemeCommand,
    },

    /// Creates a new restaurant with the default theme.
    CreateRestaurant {
        /// Part of the menu URL, e.g. "kebapci-halil".
        #[arg(long)]
        slug: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        slogan: Option<String>,

        #[command(flatten)]
        shared: Shared,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum ThemeCommand {
    /// Prints the default blueprint as JSON.
    Default,

    /// Validates a blueprint JSON file and lints its colors.
    Validate {
        file: PathBuf,
    },

    /// Lists all built-in presets and color schemes.
    Presets,
}

#[derive(Debug, clap::Args)]
pub(crate) struct Shared {
    /// Path to the configuration file. If this is not specified, Bufibu will
    /// try opening `config.toml` or `/etc/bufibu/config.toml`.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

impl Args {
    pub(crate) fn stdout_color(&self) -> ColorChoice {
        resolve_auto(self.color, std::io::stdout().is_terminal())
    }

    pub(crate) fn stderr_color(&self) -> ColorChoice {
        resolve_auto(self.color, std::io::stderr().is_terminal())
    }
}

fn resolve_auto(choice: ColorChoice, is_terminal: bool) -> ColorChoice {
    match choice {
        ColorChoice::Auto if !is_terminal => ColorChoice::Never,
        other => other,
    }
}

fn parse_color_choice(s: &str) -> Result<ColorChoice, String> {
    match s {
        "auto" => Ok(ColorChoice::Auto),
        "always" => Ok(ColorChoice::Always),
        "never" => Ok(ColorChoice::Never),
        other => Err(format!("invalid color choice '{other}' (valid: auto, always, never)")),
    }
}


#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use termcolor::ColorChoice;

    use super::{Args, Command, ThemeCommand};


    #[test]
    fn cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parse() {
        let args = Args::try_parse_from(["bufibu", "serve", "-c", "conf.toml", "--color", "never"])
            .unwrap();
        assert_eq!(args.color, ColorChoice::Never);
        assert!(matches!(args.cmd, Command::Serve { shared } if shared.config.is_some()));

        let args = Args::try_parse_from(["bufibu", "theme", "validate", "t.json"]).unwrap();
        assert_eq!(args.color, ColorChoice::Auto);
        assert!(matches!(args.cmd, Command::Theme { cmd: ThemeCommand::Validate { .. } }));

        let args = Args::try_parse_from([
            "bufibu", "create-restaurant", "--slug", "kebapci", "--name", "Kebapçı",
        ]).unwrap();
        assert!(matches!(args.cmd, Command::CreateRestaurant { slogan: None, .. }));

        assert!(Args::try_parse_from(["bufibu", "serve", "--color", "pink"]).is_err());
        assert!(Args::try_parse_from(["bufibu", "create-restaurant", "--slug", "x"]).is_err());
    }
}
