//! Transcribed voice messages. Written by the bot, read-only to the stats
//! pipeline.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Engine;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceRecord {
    pub id: String,
    pub url: String,
    pub engine: Engine,
    /// Seconds.
    pub duration: u32,
    pub language: String,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VoiceRecord {
    pub fn new(
        url: impl Into<String>,
        engine: Engine,
        duration: u32,
        language: impl Into<String>,
        text: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            engine,
            duration,
            language: language.into(),
            text,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_url(&self.url)?;
        validation::validate_duration(self.duration)?;
        validation::validate_language(&self.language)?;
        if let Some(text) = &self.text {
            validation::validate_text(text)?;
        }
        Ok(())
    }
}

pub mod validation {
    use anyhow::{bail, Context, Result};
    use url::Url;

    pub const MAX_DURATION_SECS: u32 = 3600;
    pub const MAX_LANGUAGE_LEN: usize = 10;
    pub const MAX_TEXT_LEN: usize = 10_000;

    pub fn validate_duration(duration: u32) -> Result<()> {
        if duration > MAX_DURATION_SECS {
            bail!("Duration cannot exceed {MAX_DURATION_SECS} seconds");
        }
        Ok(())
    }

    pub fn validate_language(language: &str) -> Result<()> {
        if language.is_empty() {
            bail!("Language code is required");
        }
        if language.chars().count() > MAX_LANGUAGE_LEN {
            bail!("Language code cannot exceed {MAX_LANGUAGE_LEN} characters");
        }
        Ok(())
    }

    pub fn validate_text(text: &str) -> Result<()> {
        if text.chars().count() > MAX_TEXT_LEN {
            bail!("Transcribed text cannot exceed {MAX_TEXT_LEN} characters");
        }
        Ok(())
    }

    /// Must parse as an absolute URL.
    pub fn validate_url(url: &str) -> Result<()> {
        Url::parse(url).with_context(|| format!("URL must be a valid URL: '{url}'"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(duration: u32) -> VoiceRecord {
        VoiceRecord::new(
            "https://api.telegram.org/file/voice.oga",
            Engine::Google,
            duration,
            "en-US",
            Some("hello there".into()),
            Utc::now(),
        )
    }

    #[test]
    fn accepts_a_well_formed_voice() {
        voice(3600).validate().unwrap();
    }

    #[test]
    fn rejects_overlong_duration() {
        assert!(voice(3601).validate().is_err());
    }

    #[test]
    fn rejects_relative_urls() {
        let mut record = voice(5);
        record.url = "/file/voice.oga".into();
        assert!(record.validate().is_err());
        record.url = "https ://x".into();
        assert!(record.validate().is_err());
    }

    #[test]
    fn rejects_oversized_text() {
        let mut record = voice(5);
        record.text = Some("a".repeat(validation::MAX_TEXT_LEN + 1));
        assert!(record.validate().is_err());
    }

    #[test]
    fn rejects_urls_without_a_usable_host() {
        for url in ["https://", "http://[", "https://exa%mple:99999/x"] {
            assert!(validation::validate_url(url).is_err(), "{url}");
        }
        validation::validate_url("https://api.telegram.org:443/file/bot/voice.oga").unwrap();
    }
}
