//! Style-sheet compilation stage.
//!
//! Every non-partial `*.scss` under the style source root is compiled to the
//! same relative path under the style output root. Compilation goes through
//! the [`StyleCompiler`] trait; [`SassCommand`] drives the `sass` CLI.

use super::BoxFuture;
use crate::artifact::{ArtifactState, BuildArtifact, FileWaiter};
use crate::config::SiteConfig;
use crate::core::BuildEnv;
use crate::utils::exec::{Cmd, FilterRule, strip_ansi};
use crate::utils::walk::collect_files_with_ext;
use crate::{debug, log};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// File-name marker of include-only sources.
const PARTIAL_PREFIX: char = '_';

// ============================================================================
// Compiler contract
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Expanded,
    Compressed,
}

impl OutputStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expanded => "expanded",
            Self::Compressed => "compressed",
        }
    }
}

/// One compilation request. The compiler writes `output` (and
/// `output.map` when `source_map` is set) itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub load_paths: Vec<PathBuf>,
    pub style: OutputStyle,
    pub source_map: bool,
    /// Silence warnings from dependencies on the load path.
    pub quiet_deps: bool,
}

impl StyleJob {
    pub fn map_path(&self) -> PathBuf {
        let mut name = self.output.as_os_str().to_owned();
        name.push(".map");
        PathBuf::from(name)
    }
}

/// Position of a compile error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(file) = &self.file else {
            return Ok(());
        };
        write!(f, "{}", file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        write!(f, ": ")
    }
}

#[derive(Debug, Error)]
pub enum StyleError {
    /// Source rejected by the compiler. Aborts the build.
    #[error("{location}{message}")]
    Syntax {
        message: String,
        location: SourceLocation,
    },

    #[error("style compiler `{0}` not found, install dart-sass or add it to node_modules")]
    CompilerNotFound(String),

    #[error("failed to run style compiler")]
    Launch(#[source] anyhow::Error),

    #[error("failed to create `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Source-text to CSS transform.
pub trait StyleCompiler: Send + Sync {
    fn compile<'a>(&'a self, job: &'a StyleJob) -> BoxFuture<'a, Result<(), StyleError>>;
}

// ============================================================================
// sass CLI adapter
// ============================================================================

/// Dependency deprecation chatter that `--quiet-deps` does not cover.
static SASS_FILTER: FilterRule = FilterRule::new(&["More info", "Recommendation:"]);

/// `file line:col` trailer of a dart-sass error report.
static SASS_TRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(\S+)\s+(\d+):(\d+)\b").unwrap());

/// Runs the `sass` executable found on `PATH` or in `node_modules/.bin`.
#[derive(Debug, Clone)]
pub struct SassCommand {
    root: PathBuf,
}

impl SassCommand {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self) -> Result<PathBuf, StyleError> {
        let local = self.root.join("node_modules/.bin").join(if cfg!(windows) {
            "sass.cmd"
        } else {
            "sass"
        });
        if local.is_file() {
            return Ok(local);
        }
        which::which("sass").map_err(|_| StyleError::CompilerNotFound("sass".into()))
    }

    fn command(program: &Path, job: &StyleJob) -> Cmd {
        let mut cmd = Cmd::new(program)
            .arg(format!("--style={}", job.style.as_str()))
            .arg("--no-error-css")
            .arg(if job.source_map {
                "--source-map"
            } else {
                "--no-source-map"
            });
        if job.quiet_deps {
            cmd = cmd.arg("--quiet-deps");
        }
        for path in &job.load_paths {
            let mut arg = std::ffi::OsString::from("--load-path=");
            arg.push(path);
            cmd = cmd.arg(arg);
        }
        cmd.arg(&job.input).arg(&job.output)
    }
}

impl StyleCompiler for SassCommand {
    fn compile<'a>(&'a self, job: &'a StyleJob) -> BoxFuture<'a, Result<(), StyleError>> {
        Box::pin(async move {
            let program = self.locate()?;
            let output = Self::command(&program, job)
                .cwd(&self.root)
                .output()
                .await
                .map_err(StyleError::Launch)?;

            let stderr = String::from_utf8_lossy(&output.stderr);
            if !output.status.success() {
                return Err(parse_sass_error(&stderr, &job.input));
            }
            SASS_FILTER.log("sass", stderr.trim());
            Ok(())
        })
    }
}

/// Build a [`StyleError::Syntax`] from dart-sass stderr.
///
/// The first line carries the message (`Error: ...`); the stack trailer
/// carries `file line:col`. Without a trailer the entry file is reported.
pub fn parse_sass_error(stderr: &str, entry: &Path) -> StyleError {
    let plain = strip_ansi(stderr);
    let message = plain
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("compilation failed")
        .trim_start_matches("Error:")
        .trim()
        .to_owned();

    let location = match SASS_TRACE.captures(&plain) {
        Some(caps) => SourceLocation {
            file: Some(PathBuf::from(&caps[1])),
            line: caps[2].parse().ok(),
            column: caps[3].parse().ok(),
        },
        None => SourceLocation {
            file: Some(entry.to_path_buf()),
            ..SourceLocation::default()
        },
    };

    StyleError::Syntax { message, location }
}

// ============================================================================
// Stage
// ============================================================================

/// Outcome of a style stage run.
#[derive(Debug, Default, Clone)]
pub struct StyleReport {
    /// Outputs confirmed on disk.
    pub compiled: Vec<PathBuf>,
    /// Outputs that never appeared.
    pub missing: Vec<PathBuf>,
    /// Reasons the stage produced nothing, as logged.
    pub warnings: Vec<String>,
}

impl StyleReport {
    fn warn(&mut self, message: String) {
        log!("warning"; "{message}");
        self.warnings.push(message);
    }
}

/// Non-partial `*.scss` files under `root`, sorted.
pub fn discover_entries(root: &Path) -> Vec<PathBuf> {
    collect_files_with_ext(root, &["scss"])
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| !name.starts_with(PARTIAL_PREFIX))
        })
        .collect()
}

/// Move `primary` to the front, keeping the rest sorted.
fn primary_first(entries: &mut [PathBuf], primary: &Path) {
    if let Some(index) = entries.iter().position(|e| e == primary) {
        entries[..=index].rotate_right(1);
    }
}

pub struct StyleStage<'a> {
    config: &'a SiteConfig,
    compiler: &'a dyn StyleCompiler,
    waiter: FileWaiter,
}

impl<'a> StyleStage<'a> {
    pub fn new(config: &'a SiteConfig, compiler: &'a dyn StyleCompiler, waiter: FileWaiter) -> Self {
        Self {
            config,
            compiler,
            waiter,
        }
    }

    fn job_for(&self, entry: &Path) -> StyleJob {
        let paths = &self.config.paths.scss;
        let relative = entry.strip_prefix(&paths.src).unwrap_or(entry);
        let env = self.config.env;
        StyleJob {
            input: entry.to_path_buf(),
            output: paths.dest.join(relative).with_extension("css"),
            load_paths: self.config.build.css.search_paths(&paths.src, &self.config.root),
            style: match env {
                BuildEnv::Development => OutputStyle::Expanded,
                BuildEnv::Production => OutputStyle::Compressed,
            },
            source_map: env.source_maps(),
            quiet_deps: true,
        }
    }

    /// Compile every entry. A syntax error aborts; a missing output is
    /// reported and counted.
    pub async fn run(&self) -> Result<StyleReport, StyleError> {
        let root = &self.config.paths.scss.src;
        let mut report = StyleReport::default();

        if !root.is_dir() {
            report.warn(format!(
                "style source directory not found: {}",
                self.config.root_relative(root).display()
            ));
            return Ok(report);
        }
        let mut entries = discover_entries(root);
        if entries.is_empty() {
            report.warn(format!("no style entries in {}", self.config.root_relative(root).display()));
            return Ok(report);
        }
        primary_first(&mut entries, &self.config.style_entry());

        for entry in entries {
            let job = self.job_for(&entry);
            if let Some(parent) = job.output.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StyleError::Io(parent.to_path_buf(), e))?;
            }

            debug!("css"; "compiling {}", self.config.root_relative(&entry).display());
            self.compiler.compile(&job).await?;

            let mut artifact = BuildArtifact::declare(&job.output);
            if job.source_map {
                artifact = artifact.with_companion(job.map_path());
            }
            self.waiter.verify(&mut artifact).await;
            let output = self.config.root_relative(artifact.path());
            match artifact.state() {
                ArtifactState::Verified => {
                    log!(
                        "css";
                        "compiled {} ({:.1} KB)",
                        output.display(),
                        artifact.size().unwrap_or(0) as f64 / 1024.0
                    );
                    report.compiled.push(job.output);
                }
                ArtifactState::Declared | ArtifactState::Missing => {
                    log!(
                        "warning";
                        "compiled style-sheet not found after {:?}: {}",
                        self.waiter.budget(),
                        output.display()
                    );
                    report.missing.push(job.output);
                }
            }
        }

        Ok(report)
    }
}
