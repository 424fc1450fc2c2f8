//! Build modes chosen once per invocation.

/// Environment variable selecting [`BuildEnv`].
pub const ENV_VAR: &str = "TESSERA_ENV";

/// How URLs in generated documents are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    /// Root-relative (`/assets/...`), for the dev server.
    DevelopmentAbsolute,
    /// Parent-relative (`./assets/...`, `../assets/...`), for a distributable
    /// tree opened from any location.
    ProductionRelative,
}

/// Compilation profile for style output and template context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildEnv {
    /// Expanded styles with source maps.
    #[default]
    Development,
    /// Compressed styles, no source maps.
    Production,
}

impl BuildEnv {
    /// Read from `TESSERA_ENV`; only `production` selects Production.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(ENV_VAR).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Emit `.map` files next to compiled style-sheets.
    #[inline]
    pub const fn source_maps(self) -> bool {
        !self.is_production()
    }

    /// Tag exposed to templates as `env`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_env_parse() {
        assert_eq!(BuildEnv::parse(None), BuildEnv::Development);
        assert_eq!(BuildEnv::parse(Some("production")), BuildEnv::Production);
        assert_eq!(BuildEnv::parse(Some("PRODUCTION")), BuildEnv::Production);
        assert_eq!(BuildEnv::parse(Some("staging")), BuildEnv::Development);
    }

    #[test]
    fn test_build_env_flags() {
        assert!(BuildEnv::Development.source_maps());
        assert!(!BuildEnv::Production.source_maps());
        assert_eq!(BuildEnv::Production.as_str(), "production");
    }
}
