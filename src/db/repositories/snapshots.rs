use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{
    connection::Database,
    helpers::{from_millis, to_millis, to_u64},
    models::{SnapshotWrite, StoredSnapshot},
};

const SNAPSHOT_ID: i64 = 1;

/// Lookup and write share one transaction.
fn upsert_snapshot_row(
    conn: &mut Connection,
    json: &str,
    now: DateTime<Utc>,
) -> Result<SnapshotWrite> {
    let tx = conn.transaction()?;
    let existing: Option<i64> = tx
        .query_row("SELECT id FROM stats LIMIT 1", [], |row| row.get(0))
        .optional()?;

    let outcome = match existing {
        Some(id) => {
            tx.execute(
                "UPDATE stats SET json = ?1, updated_at = ?2 WHERE id = ?3",
                params![json, to_millis(now), id],
            )
            .context("failed to update stats snapshot")?;
            SnapshotWrite::Updated
        }
        None => {
            tx.execute(
                "INSERT INTO stats (id, json, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                params![SNAPSHOT_ID, json, to_millis(now)],
            )
            .context("failed to insert stats snapshot")?;
            SnapshotWrite::Inserted
        }
    };

    tx.commit().context("failed to commit stats snapshot")?;
    Ok(outcome)
}

impl Database {
    pub async fn find_snapshot(&self) -> Result<Option<StoredSnapshot>> {
        self.execute(|conn| {
            let row = conn
                .query_row(
                    "SELECT json, created_at, updated_at FROM stats LIMIT 1",
                    [],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )
                .optional()?;

            match row {
                Some((json, created_at, updated_at)) => Ok(Some(StoredSnapshot {
                    json,
                    created_at: from_millis(created_at, "created_at")?,
                    updated_at: from_millis(updated_at, "updated_at")?,
                })),
                None => Ok(None),
            }
        })
        .await
    }

    /// Replaces the snapshot document, creating it on first use.
    pub async fn upsert_snapshot(&self, json: String, now: DateTime<Utc>) -> Result<SnapshotWrite> {
        self.execute(move |conn| upsert_snapshot_row(conn, &json, now)).await
    }

    /// Like `upsert_snapshot`, but the deadline is checked on the store
    /// thread right before writing. `None` means the deadline passed while
    /// the write was queued and nothing was written.
    pub async fn upsert_snapshot_before(
        &self,
        json: String,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<Option<SnapshotWrite>> {
        self.execute(move |conn| {
            if Instant::now() >= deadline {
                return Ok(None);
            }
            upsert_snapshot_row(conn, &json, now).map(Some)
        })
        .await
    }

    pub async fn snapshot_count(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM stats", [], |row| row.get(0))?;
            to_u64(count, "snapshot count")
        })
        .await
    }
}
