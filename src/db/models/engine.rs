use serde::{Deserialize, Serialize};

/// Speech recognition backend a chat or voice was handled by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Wit,
    Google,
    Yandex,
    Ashmanov,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Wit => "wit",
            Engine::Google => "google",
            Engine::Yandex => "yandex",
            Engine::Ashmanov => "ashmanov",
        }
    }
}
