//! The Bufibu server and command line tool.

use clap::{CommandFactory, FromArgMatches};
use std::env;

use bufibu::{
    config::{self, Config},
    db, http, logger,
    prelude::*,
    store::{self, NewRestaurant},
    version,
};
use crate::args::{Args, Command, Shared};

mod args;
mod cmd;


#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Log error in case stdout is not connected and it is logged into a file.
        error!("{:?}", e);

        // Show a somewhat nice representation of the error
        eprintln!();
        eprintln!();
        bunt::eprintln!("{$red}▶▶▶ {$bold}Error:{/$}{/$} {[yellow+intense]}", e);
        eprintln!();
        if e.chain().len() > 1 {
            bunt::eprintln!("{$red+italic}Caused by:{/$}");
        }

        for (i, cause) in e.chain().skip(1).enumerate() {
            eprint!(" {: >1$}", "", i * 2);
            eprintln!("‣ {cause}");
        }

        std::process::exit(1);
    }
}

/// Main entry point.
async fn run() -> Result<()> {
    // If `RUST_BACKTRACE` wasn't already set, we default to `1`. Panics are
    // not expected during normal operation, so the cost does not matter.
    if env::var("RUST_BACKTRACE") == Err(env::VarError::NotPresent) {
        env::set_var("RUST_BACKTRACE", "1");
    }

    // Parse CLI args. This is a bit roundabout because the version string is
    // only known at runtime.
    let args = Args::from_arg_matches(
        &Args::command()
            .version(version::full())
            .get_matches(),
    )?;

    // Configure output via `bunt`
    bunt::set_stdout_color_choice(args.stdout_color());
    bunt::set_stderr_color_choice(args.stderr_color());


    // Dispatch subcommand.
    match &args.cmd {
        Command::Serve { shared } => {
            let config = load_config_and_init_logger(shared, &args, "serve")?;
            start_server(config).await?;
        }
        Command::Migrate { shared } => {
            let config = load_config_and_init_logger(shared, &args, "migrate")?;
            db::connect_and_migrate(&config.db).await
                .context("failed to migrate database (database not running?)")?;
        }
        Command::Check { theme, shared } => cmd::check::run(shared, theme.as_deref(), &args).await?,
        Command::WriteConfig { target } => config::write_template(target.as_ref())?,
        Command::Theme { cmd: theme_cmd } => cmd::theme::run(theme_cmd).await?,
        Command::CreateRestaurant { slug, name, slogan, shared } => {
            let config = load_config_and_init_logger(shared, &args, "create-restaurant")?;
            let new = NewRestaurant {
                slug: slug.clone(),
                name: name.clone(),
                slogan: slogan.clone(),
            };
            cmd::create_restaurant::run(new, &config).await?;
        }
    }

    Ok(())
}

async fn start_server(config: Config) -> Result<()> {
    info!("Starting Bufibu {} ...", version::identifier());
    trace!("Configuration: {:#?}", config);
    config.lint();

    let store = store::open(&config.store, &config.db).await
        .context("failed to open store (database not running?)")?;

    http::serve(config, store).await
        .context("failed to start HTTP server")?;

    Ok(())
}

fn load_config_and_init_logger(shared: &Shared, args: &Args, cmd: &str) -> Result<Config> {
    // Load configuration.
    let (config, path) = match &shared.config {
        Some(path) => {
            let config = Config::load_from(path)
                .context(format!("failed to load config from '{}'", path.display()))?;
            (config, path.clone())
        }
        None => Config::from_env_or_default_locations()?,
    };

    // Initialize logger. Unfortunately, we can only do this here
    // after reading the config.
    logger::init(&config.log, args.stdout_color(), cmd)?;
    info!("Loaded config from '{}'", path.display());

    Ok(config)
}
