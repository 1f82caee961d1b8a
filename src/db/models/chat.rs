use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Engine;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    /// Telegram chat id, a signed 64-bit integer kept in its string form.
    pub id: String,
    pub engine: Engine,
    pub google_language: String,
    pub wit_language: String,
    pub yandex_language: String,
    pub admin_locked: bool,
    pub silent: bool,
    pub files_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatRecord {
    /// A chat with the defaults the bot assigns on first contact.
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            engine: Engine::Wit,
            google_language: "en-US".into(),
            wit_language: "English".into(),
            yandex_language: "en-US".into(),
            admin_locked: false,
            silent: false,
            files_banned: true,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_chat_id(&self.id)?;
        validation::validate_locale(&self.google_language, "Google language")?;
        validation::validate_locale(&self.yandex_language, "Yandex language")?;
        validation::validate_wit_language(&self.wit_language)?;
        Ok(())
    }
}

pub mod validation {
    use anyhow::{bail, Result};

    const MAX_WIT_LANGUAGE_LEN: usize = 50;

    pub fn validate_chat_id(id: &str) -> Result<()> {
        let digits = id.strip_prefix('-').unwrap_or(id);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            bail!("Chat ID must be a numeric string");
        }
        if id.parse::<i64>().is_err() {
            bail!("Chat ID must be a valid 64-bit signed integer string");
        }
        Ok(())
    }

    /// `xx-XX`, e.g. `en-US`.
    pub fn validate_locale(value: &str, field: &str) -> Result<()> {
        let bytes = value.as_bytes();
        let ok = bytes.len() == 5
            && bytes[..2].iter().all(u8::is_ascii_lowercase)
            && bytes[2] == b'-'
            && bytes[3..].iter().all(u8::is_ascii_uppercase);
        if !ok {
            bail!("{field} must be in format xx-XX");
        }
        Ok(())
    }

    pub fn validate_wit_language(value: &str) -> Result<()> {
        if value.chars().count() > MAX_WIT_LANGUAGE_LEN {
            bail!("Wit language name cannot exceed {MAX_WIT_LANGUAGE_LEN} characters");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;

    #[test]
    fn chat_ids_cover_the_signed_range() {
        validate_chat_id("-1001234567890").unwrap();
        validate_chat_id("9223372036854775807").unwrap();
        validate_chat_id("-9223372036854775808").unwrap();
        assert!(validate_chat_id("9223372036854775808").is_err());
        assert!(validate_chat_id("+42").is_err());
        assert!(validate_chat_id("-").is_err());
        assert!(validate_chat_id("12a").is_err());
    }

    #[test]
    fn locales_need_language_and_region() {
        validate_locale("ru-RU", "Google language").unwrap();
        assert!(validate_locale("en", "Google language").is_err());
        assert!(validate_locale("EN-us", "Google language").is_err());
    }
}
