use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{from_millis, parse_engine, to_millis, to_u64},
    models::{ChatRecord, Engine},
};

fn row_to_chat(row: &Row) -> Result<ChatRecord> {
    let engine: String = row.get("engine")?;
    let created_at: i64 = row.get("created_at")?;
    let updated_at: i64 = row.get("updated_at")?;

    Ok(ChatRecord {
        id: row.get("id")?,
        engine: parse_engine(&engine)?,
        google_language: row.get("google_language")?,
        wit_language: row.get("wit_language")?,
        yandex_language: row.get("yandex_language")?,
        admin_locked: row.get("admin_locked")?,
        silent: row.get("silent")?,
        files_banned: row.get("files_banned")?,
        created_at: from_millis(created_at, "created_at")?,
        updated_at: from_millis(updated_at, "updated_at")?,
    })
}

fn insert_chat_row(conn: &rusqlite::Connection, record: &ChatRecord) -> Result<()> {
    record
        .validate()
        .with_context(|| format!("chat {} failed validation", record.id))?;
    conn.execute(
        "INSERT INTO chats (id, engine, google_language, wit_language, yandex_language,
                            admin_locked, silent, files_banned, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            record.id,
            record.engine.as_str(),
            record.google_language,
            record.wit_language,
            record.yandex_language,
            record.admin_locked,
            record.silent,
            record.files_banned,
            to_millis(record.created_at),
            to_millis(record.updated_at),
        ],
    )
    .with_context(|| "failed to insert chat")?;
    Ok(())
}

impl Database {
    pub async fn insert_chat(&self, chat: &ChatRecord) -> Result<()> {
        let record = chat.clone();
        self.execute(move |conn| insert_chat_row(conn, &record)).await
    }

    pub async fn insert_chats(&self, chats: Vec<ChatRecord>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            for record in &chats {
                insert_chat_row(&tx, record)?;
            }
            tx.commit().context("failed to commit chat batch")?;
            Ok(())
        })
        .await
    }

    pub async fn find_chat(&self, chat_id: &str) -> Result<Option<ChatRecord>> {
        let chat_id = chat_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, engine, google_language, wit_language, yandex_language,
                        admin_locked, silent, files_banned, created_at, updated_at
                 FROM chats
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![chat_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_chat(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn count_chats(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM chats", [], |row| row.get(0))?;
            to_u64(count, "chat count")
        })
        .await
    }

    pub async fn count_chats_by_engine(&self, engine: Engine) -> Result<u64> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM chats WHERE engine = ?1",
                params![engine.as_str()],
                |row| row.get(0),
            )?;
            to_u64(count, "chat count")
        })
        .await
    }

    /// Cheapest possible round trip through the store.
    pub async fn health_check(&self) -> Result<()> {
        self.execute(|conn| {
            conn.query_row("SELECT id FROM chats LIMIT 1", [], |row| row.get::<_, String>(0))
                .optional()
                .context("health probe query failed")?;
            Ok(())
        })
        .await
    }
}
