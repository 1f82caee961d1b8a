use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

impl WordCount {
    pub fn validate(&self) -> Result<()> {
        validation::validate_word(&self.word)?;
        validation::validate_count(self.count)
    }
}

pub mod validation {
    use anyhow::{bail, Result};

    pub const MAX_WORD_LEN: usize = 100;
    pub const MAX_WORD_COUNT: u64 = 1_000_000;

    /// Latin letters, Latin-1 letters and the Latin Extended blocks.
    pub fn is_word_char(c: char) -> bool {
        c.is_ascii_alphabetic()
            || matches!(c, '\u{00C0}'..='\u{00FF}')
            || matches!(c, '\u{0100}'..='\u{017F}')
            || matches!(c, '\u{0180}'..='\u{024F}')
            || matches!(c, '\u{1E00}'..='\u{1EFF}')
    }

    pub fn validate_word(word: &str) -> Result<()> {
        if word.is_empty() {
            bail!("Word is required");
        }
        if word.chars().count() > MAX_WORD_LEN {
            bail!("Word cannot exceed {MAX_WORD_LEN} characters");
        }
        if !word.chars().all(is_word_char) {
            bail!("Word must contain only letters");
        }
        Ok(())
    }

    pub fn validate_count(count: u64) -> Result<()> {
        if count == 0 {
            bail!("Count must be at least 1");
        }
        if count > MAX_WORD_COUNT {
            bail!("Count cannot exceed {MAX_WORD_COUNT}");
        }
        Ok(())
    }
}
