use std::{collections::HashMap, sync::Arc, time::Instant};

use log::{info, warn};
use tokio::sync::Mutex;

use crate::db::{
    models::word::validation::{validate_word, MAX_WORD_COUNT},
    Database, WordCount,
};
use crate::error::{StatsError, StatsResult};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
const TEXT_PAGE_SIZE: usize = 5000;
const MIN_LEN: usize = 3;

/// Removed before splitting.
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`',
    '~', '(', ')',
];

/// Lowercased, punctuation-stripped tokens longer than three characters.
/// Texts of three characters or fewer yield nothing.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.chars().count() <= MIN_LEN {
        return Vec::new();
    }

    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();

    cleaned
        .split(' ')
        .filter(|token| token.chars().count() > MIN_LEN)
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Default)]
pub struct WordCounter {
    counts: HashMap<String, u64>,
    texts: usize,
}

impl WordCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_text(&mut self, text: &str) {
        self.texts += 1;
        for token in tokenize(text) {
            *self.counts.entry(token).or_insert(0) += 1;
        }
    }

    pub fn texts(&self) -> usize {
        self.texts
    }

    /// Valid entries sorted by word, plus the number of distinct tokens
    /// rejected by word validation. Counts are clamped to the table maximum.
    pub fn into_word_counts(self) -> (Vec<WordCount>, usize) {
        let mut rejected = 0;
        let mut words: Vec<WordCount> = self
            .counts
            .into_iter()
            .filter_map(|(word, count)| {
                if validate_word(&word).is_err() {
                    rejected += 1;
                    return None;
                }
                Some(WordCount {
                    word,
                    count: count.min(MAX_WORD_COUNT),
                })
            })
            .collect();
        words.sort_by(|a, b| a.word.cmp(&b.word));
        (words, rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordIndexReport {
    pub texts: usize,
    pub words: usize,
    pub rejected: usize,
    pub batches: usize,
}

/// Rebuilds the word table from every stored transcript.
#[derive(Clone)]
pub struct WordFrequencyIndexer {
    db: Database,
    batch_size: usize,
    rebuild_lock: Arc<Mutex<()>>,
}

impl WordFrequencyIndexer {
    pub fn new(db: Database, batch_size: usize) -> Self {
        Self {
            db,
            batch_size: batch_size.max(1),
            rebuild_lock: Arc::new(Mutex::new(())),
        }
    }

    /// On failure the previous table stays live and the shadow table is
    /// dropped.
    pub async fn rebuild(&self) -> StatsResult<WordIndexReport> {
        let _guard = self.rebuild_lock.lock().await;
        let started = Instant::now();
        info!("Starting word count generation");

        match self.rebuild_inner().await {
            Ok(report) => {
                info!(
                    "Word count generation completed in {}ms: {} texts, {} words, {} rejected, {} batches",
                    started.elapsed().as_millis(),
                    report.texts,
                    report.words,
                    report.rejected,
                    report.batches
                );
                Ok(report)
            }
            Err(err) => {
                if let Err(cleanup) = self.db.discard_word_rebuild().await {
                    warn!("failed to drop shadow word table: {cleanup:#}");
                }
                Err(StatsError::rebuild(err))
            }
        }
    }

    async fn rebuild_inner(&self) -> anyhow::Result<WordIndexReport> {
        let mut counter = WordCounter::new();
        let mut after_rowid = 0;
        loop {
            let page = self.db.voice_texts_page(after_rowid, TEXT_PAGE_SIZE).await?;
            let Some((last_rowid, _)) = page.last() else {
                break;
            };
            after_rowid = *last_rowid;
            for (_, text) in &page {
                counter.add_text(text);
            }
        }

        let texts = counter.texts();
        let (words, rejected) = counter.into_word_counts();
        info!("Processing {} unique words", words.len());

        self.db.begin_word_rebuild().await?;
        let mut batches = 0;
        for batch in words.chunks(self.batch_size) {
            self.db.insert_rebuild_words(batch.to_vec()).await?;
            batches += 1;
        }
        self.db.commit_word_rebuild().await?;

        Ok(WordIndexReport {
            texts,
            words: words.len(),
            rejected,
            batches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_words_are_dropped() {
        assert!(tokenize("the cat sat on a mat").is_empty());
        assert_eq!(tokenize("the cat jumped"), vec!["jumped"]);
    }

    #[test]
    fn punctuation_is_stripped_before_measuring() {
        assert_eq!(tokenize("Hello, World! (again)"), vec!["hello", "world", "again"]);
        assert!(tokenize("c.a.t. d-o-g").is_empty());
        assert_eq!(tokenize("well-known"), vec!["wellknown"]);
    }

    #[test]
    fn splits_on_single_spaces_only() {
        assert_eq!(tokenize("alpha  beta\tgamma"), vec!["alpha", "beta\tgamma"]);
    }

    #[test]
    fn very_short_texts_yield_nothing() {
        assert!(tokenize("abc").is_empty());
    }

    #[test]
    fn counter_rejects_non_letter_tokens() {
        let mut counter = WordCounter::new();
        counter.add_text("Meeting at 2024 about café plans, café again");
        counter.add_text("don't forget the plans");

        let (words, rejected) = counter.into_word_counts();
        let lookup: HashMap<_, _> = words.iter().map(|w| (w.word.as_str(), w.count)).collect();
        assert_eq!(lookup.get("café"), Some(&2));
        assert_eq!(lookup.get("plans"), Some(&2));
        assert_eq!(lookup.get("meeting"), Some(&1));
        assert!(!lookup.contains_key("2024"));
        assert!(!lookup.contains_key("don't"));
        assert_eq!(rejected, 2);
    }
}
