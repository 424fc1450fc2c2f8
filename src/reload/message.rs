//! Live reload message protocol.
//!
//! JSON text frames sent from the dev server to browser clients:
//!
//! - `{"type":"connected","version":"…"}` on handshake
//! - `{"type":"css","path":"styles.css"}` swap one style-sheet in place
//! - `{"type":"reload"}` full page reload

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    Connected {
        /// Server version for compatibility checks.
        version: String,
    },

    /// Style-only update.
    Css {
        /// Style-sheet file name, matched against `<link href>` suffixes.
        path: String,
    },

    Reload,
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
