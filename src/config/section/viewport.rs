//! `[viewport]` section configuration.
//!
//! Passed through to templates as the `viewport` context object.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportMode {
    #[default]
    Responsive,
    Adaptive,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    pub mode: ViewportMode,
    /// Layout width in pixels when `mode = "fixed"`.
    pub fixed_width: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            mode: ViewportMode::Responsive,
            fixed_width: 1600,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    use super::*;

    #[test]
    fn test_viewport_config() {
        let config = test_parse_config("[viewport]\nmode = \"fixed\"\nfixedWidth = 1280");
        assert_eq!(config.viewport.mode, ViewportMode::Fixed);
        assert_eq!(config.viewport.fixed_width, 1280);
    }

    #[test]
    fn test_viewport_serializes_camel_case() {
        let json = serde_json::to_value(ViewportConfig::default()).unwrap();
        assert_eq!(json["mode"], "responsive");
        assert_eq!(json["fixedWidth"], 1600);
    }
}
