use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::stats::{words::DEFAULT_BATCH_SIZE, DEFAULT_WINDOW_DAYS};

/// Voices removed by the retention cleanup, one term per purge batch. The
/// public totals still include them.
pub const EXTRA_VOICE_COUNT: u64 =
    16_472_966 + 140_155 + 10_228_067 + 24_327_202 + 23_724_547 + 48_066_867;

/// Summed duration in seconds of the voices counted in `EXTRA_VOICE_COUNT`.
pub const EXTRA_DURATION: u64 = 185_936_897
    + 2_245_600
    + 147_045_183
    + 344_688_480
    + 7_780_507
    + 352_478_725
    + 297_266_368;

pub const CONFIG_PATH_ENV: &str = "VOICY_STATS_CONFIG";

/// Historical corrections added on top of what the store still holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalOffsets {
    pub extra_voice_count: u64,
    pub extra_duration: u64,
}

impl Default for HistoricalOffsets {
    fn default() -> Self {
        Self {
            extra_voice_count: EXTRA_VOICE_COUNT,
            extra_duration: EXTRA_DURATION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsConfig {
    pub database_path: PathBuf,
    pub response_log_path: PathBuf,
    pub stats_interval_secs: u64,
    pub word_index_interval_secs: u64,
    /// Rebuild the word table right after startup instead of waiting a full
    /// interval.
    pub word_index_on_start: bool,
    pub run_timeout_secs: u64,
    pub window_days: u32,
    pub word_batch_size: usize,
    pub offsets: HistoricalOffsets,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("voicy.sqlite3"),
            response_log_path: PathBuf::from("../voicy/updates.log"),
            stats_interval_secs: 300,
            word_index_interval_secs: 24 * 60 * 60,
            word_index_on_start: true,
            run_timeout_secs: 120,
            window_days: DEFAULT_WINDOW_DAYS,
            word_batch_size: DEFAULT_BATCH_SIZE,
            offsets: HistoricalOffsets::default(),
        }
    }
}

impl StatsConfig {
    /// Defaults, then the JSON file named by `VOICY_STATS_CONFIG` (if any),
    /// then individual environment variables.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("VOICY_STATS_DB") {
            self.database_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("VOICY_UPDATES_LOG") {
            self.response_log_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("VOICY_STATS_INTERVAL_SECS") {
            self.stats_interval_secs = parse_var("VOICY_STATS_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = lookup("VOICY_WORDS_INTERVAL_SECS") {
            self.word_index_interval_secs = parse_var("VOICY_WORDS_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = lookup("VOICY_WORDS_ON_START") {
            self.word_index_on_start = parse_var("VOICY_WORDS_ON_START", &value)?;
        }
        if let Some(value) = lookup("VOICY_STATS_RUN_TIMEOUT_SECS") {
            self.run_timeout_secs = parse_var("VOICY_STATS_RUN_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("VOICY_EXTRA_VOICE_COUNT") {
            self.offsets.extra_voice_count = parse_var("VOICY_EXTRA_VOICE_COUNT", &value)?;
        }
        if let Some(value) = lookup("VOICY_EXTRA_DURATION") {
            self.offsets.extra_duration = parse_var("VOICY_EXTRA_DURATION", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.stats_interval_secs == 0 || self.word_index_interval_secs == 0 {
            bail!("scheduler intervals must be greater than zero");
        }
        if self.run_timeout_secs == 0 {
            bail!("run timeout must be greater than zero");
        }
        if self.window_days == 0 {
            bail!("bucket window must cover at least one day");
        }
        if self.word_batch_size == 0 {
            bail!("word batch size must be at least 1");
        }
        Ok(())
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    pub fn word_index_interval(&self) -> Duration {
        Duration::from_secs(self.word_index_interval_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{key} has invalid value '{value}'"))
}
