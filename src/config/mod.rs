//! Site configuration management for `site.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths]
//! │   ├── aliases    # [pathAliases]
//! │   ├── files      # [files]
//! │   ├── build/     # [build.html], [build.css], [build.assets]
//! │   ├── viewport   # [viewport]
//! │   └── serve      # [dev]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The loaded config is resolved once against the project root and then
//! shared read-only as `Arc<SiteConfig>`.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BuildSectionConfig, DevConfig, DevLogLevel, FilesConfig, IncludeBase, PathAliases,
    PathsConfig, ViewportConfig, ViewportMode,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands},
    core::BuildEnv,
    debug, log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file name looked up when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "site.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `site.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// Absolute path to the config file, `None` when running on defaults.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory (config file's parent, or the cwd).
    #[serde(skip)]
    pub root: PathBuf,

    /// Build profile from `TESSERA_ENV`.
    #[serde(skip)]
    pub env: BuildEnv,

    /// Document language tag substituted for `{prefix}language`.
    pub language: String,

    pub paths: PathsConfig,
    pub path_aliases: PathAliases,
    pub files: FilesConfig,
    pub build: BuildSectionConfig,
    pub viewport: ViewportConfig,
    pub dev: DevConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            root: PathBuf::new(),
            env: BuildEnv::Development,
            language: "ko".into(),
            paths: PathsConfig::default(),
            path_aliases: PathAliases::default(),
            files: FilesConfig::default(),
            build: BuildSectionConfig::default(),
            viewport: ViewportConfig::default(),
            dev: DevConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. Without one, defaults
    /// apply and the cwd becomes the project root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(normalize_path(&path));
                config
            }
            None if cli.config != Path::new(DEFAULT_CONFIG) => {
                bail!("config file '{}' not found", cli.config.display());
            }
            None => {
                debug!("config"; "no {} found, using defaults", DEFAULT_CONFIG);
                Self::default()
            }
        };

        let root = config
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or(cwd, Path::to_path_buf);

        config.env = BuildEnv::from_env();
        config.finalize(&root);
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Resolve every path field against `root`.
    pub(crate) fn finalize(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.paths.resolve(&root);
        self.build.resolve(&root);
        self.root = root;
    }

    /// Apply command-specific overrides and logging flags.
    fn apply_command_options(&mut self, cli: &Cli) {
        match self.dev.log_level {
            DevLogLevel::Debug => crate::logger::set_verbose(true),
            DevLogLevel::Silent => crate::logger::set_quiet(true),
            DevLogLevel::Info => {}
        }
        if cli.verbose {
            crate::logger::set_verbose(true);
        }

        if let Commands::Serve {
            interface,
            port,
            no_open,
        } = cli.command()
        {
            Self::update_option(&mut self.dev.host, interface.as_ref());
            Self::update_option(&mut self.dev.port, port.as_ref());
            if no_open {
                self.dev.open = false;
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // derived paths
    // ========================================================================

    /// Root document source (`{paths.src}/{files.html.index}`).
    pub fn root_document_src(&self) -> PathBuf {
        self.paths.src.join(&self.files.html.index)
    }

    /// Root document output (`{paths.dist}/{files.html.index}`).
    pub fn root_document_out(&self) -> PathBuf {
        self.paths.dist.join(&self.files.html.index)
    }

    /// Primary style entry, compiled before any other.
    pub fn style_entry(&self) -> PathBuf {
        self.paths.scss.src.join(&self.files.scss.entry)
    }

    /// Primary compiled style-sheet.
    pub fn style_output(&self) -> PathBuf {
        self.paths.scss.dest.join(&self.files.scss.output)
    }

    pub fn favicon_src(&self) -> PathBuf {
        self.paths.public.src.join(&self.files.favicon)
    }

    pub fn favicon_out(&self) -> PathBuf {
        self.paths.dist.join(&self.files.favicon)
    }

    /// Path relative to the project root, for log lines.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the resolved configuration, reporting every error at once.
    pub fn validate(&self) -> Result<()> {
        let diag = self.diagnostics();
        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    fn diagnostics(&self) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();

        if self.language.trim().is_empty() {
            diag.error(FieldPath::new("language"), "language tag must not be empty");
        }
        self.path_aliases.validate(&mut diag);
        self.files.validate(&mut diag);
        self.build.validate(&mut diag);
        self.validate_dist(&mut diag);
        self.validate_style_entry(&mut diag);
        diag
    }

    /// The primary entry must exist and compile to `files.scss.output`.
    /// Problems are warnings: the style stage still compiles every entry.
    fn validate_style_entry(&self, diag: &mut ConfigDiagnostics) {
        let field = FieldPath::new("files.scss.entry");
        let entry = Path::new(&self.files.scss.entry);

        let is_partial = entry
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('_'));
        if is_partial {
            diag.warn(field, format!("`{}` is a partial and is never compiled", entry.display()));
            return;
        }

        let compiled = entry.with_extension("css");
        if compiled != Path::new(&self.files.scss.output) {
            diag.warn(
                field,
                format!(
                    "`{}` compiles to `{}`, not files.scss.output `{}`",
                    entry.display(),
                    compiled.display(),
                    self.files.scss.output
                ),
            );
        }
        if self.paths.scss.src.is_dir() && !self.style_entry().is_file() {
            diag.warn(
                field,
                format!(
                    "`{}` not found in {}",
                    entry.display(),
                    self.root_relative(&self.paths.scss.src).display()
                ),
            );
        }
    }

    /// `clean` removes the whole output tree, so it must not contain sources.
    fn validate_dist(&self, diag: &mut ConfigDiagnostics) {
        let dist = &self.paths.dist;
        let sources = [
            &self.root,
            &self.paths.src,
            &self.paths.html.src,
            &self.paths.scss.src,
            &self.paths.js.src,
            &self.paths.public.src,
        ];
        if sources.iter().any(|src| src.starts_with(dist)) {
            diag.error_with_hint(
                FieldPath::new("paths.dist"),
                format!("output directory `{}` contains source files", dist.display()),
                "point paths.dist at a dedicated directory such as \"./dist\"",
            );
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config text. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Default config resolved against `root`.
#[cfg(test)]
pub fn test_site_config(root: &Path) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.finalize(root);
    config
}

// ============================================================================
// tests
// ============================================================================
