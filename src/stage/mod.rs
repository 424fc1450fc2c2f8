//! Build stages.
//!
//! Each stage owns a disjoint subtree of the output directory:
//!
//! | Stage          | Reads                       | Writes                       |
//! |----------------|-----------------------------|------------------------------|
//! | [`style`]      | `paths.scss.src`            | `paths.scss.dest`            |
//! | [`markup`]     | root document, `html.src`   | root document, `html.dest`   |
//! | [`assets`]     | `js.src`, `public.src`      | `js.dest`, `public.dest`     |
//!
//! Stages are sequenced by [`crate::pipeline::Orchestrator`].

pub mod assets;
pub mod clean;
pub mod include;
pub mod markup;
pub mod style;

pub use assets::{AssetReport, AssetStage};
pub use clean::clean_dist;
pub use include::{FileInclude, IncludeError, IncludeProcessor};
pub use markup::{MarkupReport, MarkupStage};
pub use style::{SassCommand, StyleCompiler, StyleError, StyleReport, StyleStage};

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fatal stage error. Anything that reaches the orchestrator as a
/// `BuildError` aborts the current build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Include(#[from] IncludeError),

    #[error("root document not found: {}", .0.display())]
    MissingRootDocument(PathBuf),

    #[error("failed to write `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rewrite pattern")]
    Pattern(#[from] regex::Error),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
