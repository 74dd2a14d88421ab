//! Table layout steps for the key-value database.
//!
//! Each step is an SQL file applied once, in order, inside one transaction
//! together with the `user_version` bump that records it.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(layout version, sql)`; versions start at 1 and increase by one.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_kv_entries.sql"))];

/// Layout version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings the layout up to [`latest_version`]; returns how many steps ran.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::LayoutTooNew { found, supported });
    }

    let pending = STEPS
        .iter()
        .filter(|(version, _)| *version > found)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", *version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        found,
        supported,
        pending.len()
    );
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version};
    use rusqlite::Connection;

    #[test]
    fn second_run_applies_nothing() {
        let mut conn = Connection::open_in_memory().expect("open memory db");
        assert_eq!(
            apply_migrations(&mut conn).expect("first run"),
            latest_version() as usize
        );
        assert_eq!(apply_migrations(&mut conn).expect("second run"), 0);
    }
}
