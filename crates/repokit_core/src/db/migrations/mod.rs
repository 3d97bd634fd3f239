//! SQLite migration executor.
//!
//! # Responsibility
//! - Validate that registered migrations are strictly increasing.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;

/// One schema step owned by the application that binds record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: u32,
    pub sql: &'static str,
}

impl Migration {
    pub const fn new(version: u32, sql: &'static str) -> Self {
        Self { version, sql }
    }
}

/// Returns the latest version in `migrations`, or `0` when empty.
pub fn latest_version(migrations: &[Migration]) -> u32 {
    migrations.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    ensure_monotonic(migrations)?;

    let current_version = current_user_version(conn)?;
    let latest = latest_version(migrations);

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in migrations {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        debug!(
            "event=db_migrate module=db status=ok version={}",
            migration.version
        );
    }
    tx.commit()?;

    Ok(())
}

fn ensure_monotonic(migrations: &[Migration]) -> DbResult<()> {
    let mut previous = 0;
    for migration in migrations {
        if migration.version <= previous {
            return Err(DbError::InvalidMigrationOrder {
                previous,
                next: migration.version,
            });
        }
        previous = migration.version;
    }
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{ensure_monotonic, latest_version, Migration};
    use crate::db::DbError;

    #[test]
    fn latest_version_of_empty_list_is_zero() {
        assert_eq!(latest_version(&[]), 0);
    }

    #[test]
    fn rejects_repeated_or_decreasing_versions() {
        let migrations = [
            Migration::new(1, "SELECT 1;"),
            Migration::new(3, "SELECT 1;"),
            Migration::new(2, "SELECT 1;"),
        ];
        let err = ensure_monotonic(&migrations).unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidMigrationOrder {
                previous: 3,
                next: 2
            }
        ));
    }

    #[test]
    fn version_zero_is_not_a_valid_step() {
        let err = ensure_monotonic(&[Migration::new(0, "SELECT 1;")]).unwrap_err();
        assert!(matches!(err, DbError::InvalidMigrationOrder { .. }));
    }
}
