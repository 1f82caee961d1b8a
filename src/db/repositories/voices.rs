use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{from_millis, parse_engine, to_i64, to_millis, to_u64},
    models::{Engine, VoiceRecord},
};

fn row_to_voice(row: &Row) -> Result<VoiceRecord> {
    let engine: String = row.get("engine")?;
    let duration: i64 = row.get("duration")?;
    let created_at: i64 = row.get("created_at")?;
    let updated_at: i64 = row.get("updated_at")?;

    Ok(VoiceRecord {
        id: row.get("id")?,
        url: row.get("url")?,
        engine: parse_engine(&engine)?,
        duration: u32::try_from(duration).context("duration out of range")?,
        language: row.get("language")?,
        text: row.get("text")?,
        created_at: from_millis(created_at, "created_at")?,
        updated_at: from_millis(updated_at, "updated_at")?,
    })
}

fn insert_voice_row(conn: &rusqlite::Connection, record: &VoiceRecord) -> Result<()> {
    record
        .validate()
        .with_context(|| format!("voice {} failed validation", record.id))?;
    conn.execute(
        "INSERT INTO voices (id, url, engine, duration, language, text, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.id,
            record.url,
            record.engine.as_str(),
            record.duration,
            record.language,
            record.text,
            to_millis(record.created_at),
            to_millis(record.updated_at),
        ],
    )
    .with_context(|| "failed to insert voice")?;
    Ok(())
}

impl Database {
    pub async fn insert_voice(&self, voice: &VoiceRecord) -> Result<()> {
        let record = voice.clone();
        self.execute(move |conn| insert_voice_row(conn, &record)).await
    }

    /// All-or-nothing insert of several voices.
    pub async fn insert_voices(&self, voices: Vec<VoiceRecord>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            for record in &voices {
                insert_voice_row(&tx, record)?;
            }
            tx.commit().context("failed to commit voice batch")?;
            Ok(())
        })
        .await
    }

    pub async fn get_voice(&self, voice_id: &str) -> Result<Option<VoiceRecord>> {
        let voice_id = voice_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, engine, duration, language, text, created_at, updated_at
                 FROM voices
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![voice_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_voice(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn count_voices(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM voices", [], |row| row.get(0))?;
            to_u64(count, "voice count")
        })
        .await
    }

    pub async fn count_voices_by_engine(&self, engine: Engine) -> Result<u64> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM voices WHERE engine = ?1",
                params![engine.as_str()],
                |row| row.get(0),
            )?;
            to_u64(count, "voice count")
        })
        .await
    }

    /// Summed duration in seconds; an empty table sums to zero.
    pub async fn sum_voice_duration(&self) -> Result<u64> {
        self.execute(|conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(duration), 0) FROM voices",
                [],
                |row| row.get(0),
            )?;
            to_u64(total, "summed duration")
        })
        .await
    }

    /// Keyset page of non-null transcripts, ordered by rowid. Pass the last
    /// rowid of the previous page (or 0) as `after_rowid`.
    pub async fn voice_texts_page(&self, after_rowid: i64, limit: usize) -> Result<Vec<(i64, String)>> {
        let limit = to_i64(limit as u64)?;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT rowid, text
                 FROM voices
                 WHERE text IS NOT NULL AND rowid > ?1
                 ORDER BY rowid ASC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![after_rowid, limit], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut page = Vec::new();
            for row in rows {
                page.push(row?);
            }
            Ok(page)
        })
        .await
    }
}
