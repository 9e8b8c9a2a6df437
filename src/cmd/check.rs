//! A subcommand making sure various things are working. Useful for updating
//! Bufibu or changing its config, where you want to check as many things as
//! possible as early as possible.

use std::path::Path;

use bufibu::{
    config::Config,
    db::{self, MigrationPlan},
    prelude::*,
    store::{self, StoreBackend},
};

use crate::{args::{Args, Shared}, load_config_and_init_logger};


pub(crate) async fn run(shared: &Shared, theme: Option<&Path>, args: &Args) -> Result<()> {
    let config = load_config_and_init_logger(shared, args, "check")
        .context("failed to load config: cannot proceed with `check` command")?;


    // Perform main checks
    info!("Starting to verify various things...");
    config.lint();
    let store = check_store(&config).await;
    let theme = match theme {
        Some(path) => Some(check_theme(path).await),
        None => None,
    };
    info!("Done verifying various things");


    // Print summary after all log output
    let mut any_errors = false;
    println!();
    bunt::println!("{$bold+blue+intense}Summary{/$}");
    println!();
    print_outcome(&mut any_errors, "Load configuration", &Ok(()));
    print_outcome(&mut any_errors, "Open store", &store);
    if let Some(theme) = &theme {
        print_outcome(&mut any_errors, "Check theme file", theme);
    }

    println!();
    if any_errors {
        bunt::println!("{$red+intense}➡  Errors have occured!{/$}");
        std::process::exit(1);
    } else {
        bunt::println!("{$green+intense}⮕  Everything OK{/$} \
            {$dimmed}(Bufibu probably works in this environment){/$}");
        println!();
        Ok(())
    }
}

pub(crate) fn print_outcome<T>(any_errors: &mut bool, label: &str, result: &Result<T>) {
    match result {
        Ok(_) => {
            bunt::println!(" ▸ {[bold+intense]}  {$green+bold}✔ ok{/$}", label);
        }
        Err(e) => {
            *any_errors = true;
            bunt::println!(" ▸ {[bold+intense]}  {$red+bold}✘ error{/$}", label);
            bunt::println!("      {$red}▶▶▶ {$bold}Error:{/$}{/$} {[yellow+intense]}", e);
            println!();

            if e.chain().len() > 1 {
                bunt::println!("      {$red+italic}Caused by:{/$}");
            }
            for (i, cause) in e.chain().skip(1).enumerate() {
                print!("       {: >1$}", "", i * 2);
                println!("‣ {cause}");
            }
            println!();
        }
    }
}

/// For PostgreSQL, connects and inspects the migration state without changing
/// anything. For the memory backend, loads the fixture.
async fn check_store(config: &Config) -> Result<()> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config.db).await?;
            let mut conn = pool.get().await.context("failed to get DB connection")?;
            let tx = conn.transaction().await?;
            match MigrationPlan::build(&tx).await? {
                MigrationPlan::UpToDate => info!("Database schema is up to date"),
                MigrationPlan::EmptyDb => {
                    warn!("Database is empty. `bufibu migrate` or `bufibu serve` will set it up.");
                }
                MigrationPlan::Migrate { new_migrations } => {
                    warn!("Database is missing {new_migrations} migrations. \
                        `bufibu migrate` or `bufibu serve` will apply them.");
                }
            }
        }
        StoreBackend::Memory => {
            store::open(&config.store, &config.db).await?;
        }
    }

    Ok(())
}

async fn check_theme(path: &Path) -> Result<()> {
    for warning in super::theme::check_file(path).await? {
        warn!("{warning}");
    }
    Ok(())
}
