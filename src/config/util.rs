//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`.
///
/// Walks parent directories until `config_name` is found. An absolute
/// `config_name` is returned as is when it exists.
///
/// ```text
/// /home/user/site/src/pages/  ← start
/// /home/user/site/site.toml   ← found
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_parent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.toml"), "").unwrap();
        let nested = dir.path().join("src/pages");
        fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(Path::new("site.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("site.toml"));
    }

    #[test]
    fn test_find_config_missing() {
        let dir = TempDir::new().unwrap();
        let name = Path::new("definitely-not-here-7f3a.toml");
        assert!(find_config_file(name, dir.path()).is_none());
    }

    #[test]
    fn test_find_config_absolute() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        assert!(find_config_file(&path, dir.path()).is_none());
        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }
}
