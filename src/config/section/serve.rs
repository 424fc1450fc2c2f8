//! `[dev]` section configuration.
//!
//! Development server and live-reload settings.
//!
//! # Example
//!
//! ```toml
//! [dev]
//! host = "127.0.0.1"   # Network interface (127.0.0.1 = localhost only)
//! port = 3000          # HTTP port number
//! open = true          # Open the browser once the server is up
//! notify = false       # Log reload activity in the browser console
//! logLevel = "info"    # info | debug | silent
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Verbosity of the dev server output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevLogLevel {
    #[default]
    Info,
    Debug,
    Silent,
}

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DevConfig {
    /// Network interface to bind.
    pub host: IpAddr,

    /// HTTP port number. The reload socket uses a separate fixed port.
    pub port: u16,

    /// Open the site in a browser after the first build.
    pub open: bool,

    /// Log reload activity in the browser console.
    pub notify: bool,

    pub log_level: DevLogLevel,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            open: true,
            notify: false,
            log_level: DevLogLevel::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::DevLogLevel;
    use crate::config::test_parse_config;

    #[test]
    fn test_dev_config() {
        let config = test_parse_config(
            "[dev]\nhost = \"0.0.0.0\"\nport = 8080\nopen = false\nlogLevel = \"debug\"",
        );

        assert_eq!(config.dev.host, IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        assert_eq!(config.dev.port, 8080);
        assert!(!config.dev.open);
        assert_eq!(config.dev.log_level, DevLogLevel::Debug);
    }

    #[test]
    fn test_dev_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.dev.host, IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));
        assert_eq!(config.dev.port, 3000);
        assert!(config.dev.open);
        assert!(!config.dev.notify);
        assert_eq!(config.dev.log_level, DevLogLevel::Info);
    }

    #[test]
    fn test_dev_config_port_range() {
        let config = test_parse_config("[dev]\nport = 1");
        assert_eq!(config.dev.port, 1);

        let config = test_parse_config("[dev]\nport = 65535");
        assert_eq!(config.dev.port, 65535);
    }
}
