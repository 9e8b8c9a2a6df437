use chrono::{DateTime, Utc};
use deadpool_postgres::Transaction;
use futures::TryStreamExt;
use once_cell::sync::Lazy;
use std::{collections::BTreeMap, time::Duration, num::NonZeroU64};
use tokio_postgres::{GenericClient, IsolationLevel, error::SqlState};

use crate::prelude::*;
use super::{Db, util::dbargs};


/// Describes the actions needed to bring the database into a state that we
/// expect.
#[derive(Debug, PartialEq, Eq)]
pub enum MigrationPlan {
    /// The database is completely empty: we need to create the meta table and
    /// apply all migrations.
    EmptyDb,

    /// The database is completely up to date and all migrations match.
    UpToDate,

    /// The DB can be migrated to the state we expect by applying that many new
    /// migrations.
    Migrate {
        new_migrations: NonZeroU64,
    },
}

impl MigrationPlan {
    /// Builds a migration plan by querying the current state of the DB. If the
    /// DB is in a state that we cannot fix, `Err` is returned. Does not modify
    /// the DB.
    pub async fn build(tx: &Transaction<'_>) -> Result<Self> {
        if !does_table_exist(&**tx, "__db_migrations").await? {
            // Other tables without the meta table means someone else owns this
            // database.
            let tables = all_table_names(&**tx).await?;
            if !tables.is_empty() {
                bail!(
                    "migration table '__db_migrations' does not exist, but some other \
                        tables ({}) do exist. Is this really the Bufibu database?",
                    tables.join(", "),
                );
            }

            return Ok(Self::EmptyDb);
        }

        debug!("Checking DB migrations");
        let active_migrations = tx
            .query_raw("select id, name, applied_on, script from __db_migrations", dbargs![])
            .await
            .context("failed to query meta migrations table")?
            .map_ok(|row| (
                row.get::<_, i64>("id") as u64,
                AppliedMigration {
                    name: row.get("name"),
                    applied_on: row.get("applied_on"),
                    script: row.get("script"),
                },
            ))
            .try_collect::<BTreeMap<_, _>>()
            .await?;

        check_applied(&active_migrations, &MIGRATIONS)
    }

    /// Executes this plan on the database, bringing it into the state we expect.
    pub async fn execute(&self, tx: &Transaction<'_>) -> Result<()> {
        let new_migrations = match self {
            Self::UpToDate => {
                info!("All migrations are already applied: database schema is up to date.");
                return Ok(());
            }
            Self::EmptyDb => {
                info!("Database is empty. Creating table '__db_migrations'...");
                tx.batch_execute(include_str!("db-migrations.sql"))
                    .await
                    .context("could not create migrations meta table")?;
                MIGRATIONS.len() as u64
            }
            Self::Migrate { new_migrations } => new_migrations.get(),
        };

        info!("The database is missing {new_migrations} migrations. Applying them now.");
        for (id, migration) in MIGRATIONS.range(MIGRATIONS.len() as u64 - new_migrations + 1..) {
            debug!("Applying migration '{}-{}' ...", id, migration.name);
            trace!("Executing:\n{}", migration.script);

            tx.batch_execute(migration.script)
                .await
                .with_context(|| format!("failed to run script for '{}-{}'", id, migration.name))?;

            let query = "insert into __db_migrations (id, name, applied_on, script) \
                values ($1, $2, now(), $3)";
            tx.execute(query, &[&(*id as i64), &migration.name, &migration.script])
                .await
                .context("failed to update __db_migrations")?;
        }

        info!("Applied {new_migrations} migrations. DB is up to date now.");

        Ok(())
    }
}

#[derive(Debug)]
struct AppliedMigration {
    name: String,
    applied_on: DateTime<Utc>,
    script: String,
}

/// Compares the migrations recorded in the DB with the ones compiled into this
/// binary.
fn check_applied(
    applied: &BTreeMap<u64, AppliedMigration>,
    known: &BTreeMap<u64, Migration>,
) -> Result<MigrationPlan> {
    if !applied.keys().copied().eq(1..applied.len() as u64 + 1) {
        bail!("The IDs of the active migrations are not consecutive. This is unexpected.");
    }

    for (id, actual) in applied {
        let expected = known.get(id).ok_or_else(|| anyhow!(
            "The migration '{}-{}' is active in the database (applied on {}), but no \
                such migration is known to this Bufibu version. Was the database used \
                with a newer version?",
            id,
            actual.name,
            actual.applied_on,
        ))?;

        if actual.script != expected.script {
            debug!("Expected script for '{}-{}':\n{}", id, expected.name, expected.script);
            debug!("Actual (in database) script for '{}-{}':\n{}", id, actual.name, actual.script);

            bail!(
                "The script of active migration '{}-{}' (applied on {}) does not match the \
                    expected script for that migration. This is unexpected.",
                id,
                actual.name,
                actual.applied_on,
            );
        }
    }

    // All applied ones are known, so `known` is at least as long.
    match NonZeroU64::new(known.len() as u64 - applied.len() as u64) {
        None => Ok(MigrationPlan::UpToDate),
        Some(new_migrations) => Ok(MigrationPlan::Migrate { new_migrations }),
    }
}


/// Makes sure the database schema is up to date by checking the active
/// migrations and applying all missing ones.
///
/// If anything unexpected is noticed, an error is returned to notify the user
/// they have to manually deal with it.
pub async fn migrate(db: &mut Db) -> Result<()> {
    // Everything runs in one serializable transaction so that only one
    // instance ever migrates. If two instances start at the same time, the
    // loser's commit fails and on retry it sees the finished migrations.
    loop {
        let tx = db.build_transaction()
            .isolation_level(IsolationLevel::Serializable)
            .start()
            .await?;

        let plan = MigrationPlan::build(&tx).await?;
        plan.execute(&tx).await?;

        match tx.commit().await {
            Ok(_) => return Ok(()),

            Err(e) if e.code() == Some(&SqlState::T_R_SERIALIZATION_FAILURE) => {
                let backoff_duration = Duration::from_millis(500);
                warn!(
                    "Database migration transaction failed to commit, likely because another \
                        Bufibu instance migrated concurrently. Trying again in {:?}.",
                    backoff_duration,
                );

                tokio::time::sleep(backoff_duration).await;
                continue;
            }

            Err(e) => Err(e)?,
        }
    }
}

/// Returns the names of all tables in the `public` schema.
async fn all_table_names(db: &impl GenericClient) -> Result<Vec<String>> {
    let rows = db.query_raw(
            "select table_name from information_schema.tables \
                where table_schema = 'public' and table_type = 'BASE TABLE'",
            dbargs![],
        )
        .await?
        .map_ok(|row| row.get::<_, String>(0));

    Ok(rows.try_collect().await?)
}

async fn does_table_exist(db: &impl GenericClient, table_name: &str) -> Result<bool> {
    let row = db.query_one(
        "select exists(
            select * from information_schema.tables
                where table_schema='public' and table_name=$1
        )",
        &[&table_name],
    ).await?;

    Ok(row.get::<_, bool>(0))
}


// Helper macro to include migrations in the `migations` folder and add them to
// a map. The `assert!` and `panic!` in there should ideally be compile errors,
// but panics are fine for now.
macro_rules! include_migrations {
    ( $( $id:literal : $name:literal ,)+ ) => {
        Lazy::new(|| {
            let mut m = BTreeMap::new();
            $(
                let prev = m.insert($id, Migration {
                    name: $name,
                    script: include_str!(
                        concat!("migrations/", stringify!($id), "-", $name, ".sql")
                    ),
                });

                assert!(prev.is_none(), "duplicate key in `include_migrations!`");
            )+

            if !m.keys().copied().eq(1..m.len() as u64 + 1) {
                panic!("migration IDs in `include_migrations!` are not consecutive");
            }

            m
        })

    };
}

#[derive(Debug)]
struct Migration {
    name: &'static str,
    script: &'static str,
}

static MIGRATIONS: Lazy<BTreeMap<u64, Migration>> = include_migrations![
    01: "restaurants",
    02: "menu",
    03: "content-items",
    04: "analytics-events",
];


#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;


    fn applied(ids: &[u64]) -> BTreeMap<u64, AppliedMigration> {
        ids.iter()
            .map(|id| {
                let known = &MIGRATIONS[id];
                (*id, AppliedMigration {
                    name: known.name.into(),
                    applied_on: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                    script: known.script.into(),
                })
            })
            .collect()
    }

    #[test]
    fn migrations_are_consecutive() {
        assert!(MIGRATIONS.keys().copied().eq(1..=MIGRATIONS.len() as u64));
        assert!(MIGRATIONS.values().all(|m| !m.script.trim().is_empty()));
    }

    #[test]
    fn plans() {
        let all = MIGRATIONS.keys().copied().collect::<Vec<_>>();
        assert_eq!(check_applied(&applied(&all), &MIGRATIONS).unwrap(), MigrationPlan::UpToDate);

        let plan = check_applied(&applied(&all[..1]), &MIGRATIONS).unwrap();
        assert_eq!(plan, MigrationPlan::Migrate {
            new_migrations: NonZeroU64::new(MIGRATIONS.len() as u64 - 1).unwrap(),
        });
    }

    #[test]
    fn unexpected_states() {
        // Gap in IDs
        assert!(check_applied(&applied(&[1, 3]), &MIGRATIONS).is_err());

        // Modified script
        let mut modified = applied(&[1, 2]);
        modified.get_mut(&2).unwrap().script.push_str("\n-- changed");
        assert!(check_applied(&modified, &MIGRATIONS).is_err());

        // Unknown migration from a newer version
        let mut newer = applied(&MIGRATIONS.keys().copied().collect::<Vec<_>>());
        let next = MIGRATIONS.len() as u64 + 1;
        newer.insert(next, AppliedMigration {
            name: "future".into(),
            applied_on: Utc::now(),
            script: "select 1;".into(),
        });
        assert!(check_applied(&newer, &MIGRATIONS).is_err());
    }
}
