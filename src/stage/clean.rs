//! Output tree removal.

use super::BuildError;
use crate::log;
use std::io;
use std::path::Path;

/// Remove `dist` and everything below it. A missing tree is not an error.
pub async fn clean_dist(dist: &Path) -> Result<bool, BuildError> {
    match tokio::fs::remove_dir_all(dist).await {
        Ok(()) => {
            log!("clean"; "removed {}", dist.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildError::io(dist, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clean_removes_tree() {
        let dir = TempDir::new().unwrap();
        let dist = dir.path().join("dist");
        fs::create_dir_all(dist.join("assets/css")).unwrap();
        fs::write(dist.join("index.html"), "").unwrap();

        assert!(clean_dist(&dist).await.unwrap());
        assert!(!dist.exists());
    }

    #[tokio::test]
    async fn test_clean_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(!clean_dist(&dir.path().join("dist")).await.unwrap());
    }
}
