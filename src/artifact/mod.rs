//! Produced files and bounded polling for their appearance.
//!
//! External tools (the style compiler, the include pass) report completion
//! before their output is necessarily visible. [`FileWaiter`] polls a fixed
//! number of times and reports the outcome as a `bool`; callers decide the
//! severity.

use crate::debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Verification state of a [`BuildArtifact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    /// Declared before the producing tool ran.
    Declared,
    /// Seen on disk.
    Verified,
    /// Never appeared within the polling budget.
    Missing,
}

/// A file a stage expects to produce.
#[derive(Debug, Clone)]
pub struct BuildArtifact {
    path: PathBuf,
    /// Secondary output such as a source map. Its absence is only reported.
    companion: Option<PathBuf>,
    state: ArtifactState,
    size: Option<u64>,
}

impl BuildArtifact {
    pub fn declare(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            companion: None,
            state: ArtifactState::Declared,
            size: None,
        }
    }

    pub fn with_companion(mut self, companion: impl Into<PathBuf>) -> Self {
        self.companion = Some(companion.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> ArtifactState {
        self.state
    }

    /// Size in bytes, known once verified.
    pub fn size(&self) -> Option<u64> {
        self.size
    }
}

/// Bounded existence polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileWaiter {
    max_attempts: u32,
    interval: Duration,
}

impl Default for FileWaiter {
    fn default() -> Self {
        Self::new(10, Duration::from_millis(100))
    }
}

impl FileWaiter {
    /// `max_attempts` is clamped to at least one poll.
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            interval,
        }
    }

    /// Worst-case time spent before giving up.
    pub fn budget(&self) -> Duration {
        self.interval * (self.max_attempts - 1)
    }

    /// Poll until `path` exists. Returns `false` after `max_attempts` polls.
    pub async fn wait_for(&self, path: &Path) -> bool {
        self.poll(|| path.exists()).await
    }

    /// Run `probe` up to `max_attempts` times, sleeping `interval` between
    /// polls but not after the last one.
    pub async fn poll<F>(&self, mut probe: F) -> bool
    where
        F: FnMut() -> bool,
    {
        for attempt in 1..=self.max_attempts {
            if probe() {
                return true;
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }
        false
    }

    /// Wait for `artifact` and record the outcome on it.
    ///
    /// On success the file size and companion presence are logged.
    pub async fn verify(&self, artifact: &mut BuildArtifact) -> bool {
        if !self.wait_for(&artifact.path).await {
            artifact.state = ArtifactState::Missing;
            debug!("wait"; "gave up on {} after {} polls", artifact.path.display(), self.max_attempts);
            return false;
        }

        artifact.state = ArtifactState::Verified;
        artifact.size = std::fs::metadata(&artifact.path).ok().map(|m| m.len());

        let companion = match &artifact.companion {
            Some(path) if path.exists() => "present",
            Some(_) => "missing",
            None => "none",
        };
        debug!(
            "wait";
            "{} ({} bytes, map {})",
            artifact.path.display(),
            artifact.size.unwrap_or(0),
            companion
        );
        true
    }
}
