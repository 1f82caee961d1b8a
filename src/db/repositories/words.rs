//! Word-frequency table. Rebuilds go through a shadow table that replaces
//! the live one in a single transaction, so readers never see a partially
//! written table.

use anyhow::{Context, Result};
use rusqlite::params;

use crate::db::{
    connection::Database,
    helpers::{to_i64, to_u64},
    models::WordCount,
};

const SHADOW_TABLE_DDL: &str = "DROP TABLE IF EXISTS words_rebuild;
     CREATE TABLE words_rebuild (
         word TEXT PRIMARY KEY,
         count INTEGER NOT NULL CHECK (count >= 1)
     );";

const SWAP_DDL: &str = "DROP TABLE words;
     ALTER TABLE words_rebuild RENAME TO words;
     CREATE INDEX IF NOT EXISTS idx_words_count ON words(count DESC);";

impl Database {
    /// Creates an empty shadow table, discarding leftovers of an earlier
    /// failed rebuild.
    pub async fn begin_word_rebuild(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute_batch(SHADOW_TABLE_DDL)
                .context("failed to create shadow word table")
        })
        .await
    }

    pub async fn insert_rebuild_words(&self, batch: Vec<WordCount>) -> Result<usize> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt =
                    tx.prepare("INSERT INTO words_rebuild (word, count) VALUES (?1, ?2)")?;
                for entry in &batch {
                    entry
                        .validate()
                        .with_context(|| format!("word '{}' failed validation", entry.word))?;
                    stmt.execute(params![entry.word, to_i64(entry.count)?])
                        .with_context(|| format!("failed to insert word '{}'", entry.word))?;
                }
            }
            tx.commit().context("failed to commit word batch")?;
            Ok(batch.len())
        })
        .await
    }

    /// Replaces the live word table with the shadow table.
    pub async fn commit_word_rebuild(&self) -> Result<()> {
        self.execute(|conn| {
            let tx = conn.transaction()?;
            tx.execute_batch(SWAP_DDL)
                .context("failed to swap in rebuilt word table")?;
            tx.commit().context("failed to commit word table swap")?;
            Ok(())
        })
        .await
    }

    pub async fn discard_word_rebuild(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute_batch("DROP TABLE IF EXISTS words_rebuild;")
                .context("failed to drop shadow word table")
        })
        .await
    }

    /// Most frequent words first; equal counts fall back to alphabetical order.
    pub async fn top_words(&self, limit: usize) -> Result<Vec<WordCount>> {
        let limit = to_i64(limit as u64)?;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT word, count FROM words ORDER BY count DESC, word ASC LIMIT ?1",
            )?;
            let mut rows = stmt.query(params![limit])?;
            let mut words = Vec::new();
            while let Some(row) = rows.next()? {
                words.push(WordCount {
                    word: row.get(0)?,
                    count: to_u64(row.get(1)?, "count")?,
                });
            }
            Ok(words)
        })
        .await
    }

    pub async fn all_words(&self) -> Result<Vec<WordCount>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT word, count FROM words ORDER BY word ASC")?;
            let mut rows = stmt.query([])?;
            let mut words = Vec::new();
            while let Some(row) = rows.next()? {
                words.push(WordCount {
                    word: row.get(0)?,
                    count: to_u64(row.get(1)?, "count")?,
                });
            }
            Ok(words)
        })
        .await
    }
}
