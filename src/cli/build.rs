//! `build` and `clean` commands.

use crate::{config::SiteConfig, core::PathMode, log, pipeline::Orchestrator, stage::clean_dist};
use anyhow::Result;
use std::sync::Arc;

/// Distributable build with relative paths.
pub async fn build_site(config: Arc<SiteConfig>) -> Result<()> {
    log!("build"; "{} build", config.env.as_str());
    let orchestrator = Orchestrator::new(config)?;
    orchestrator.build(PathMode::ProductionRelative).await?;
    Ok(())
}

/// Remove the output directory.
pub async fn clean_site(config: &SiteConfig) -> Result<()> {
    if !clean_dist(&config.paths.dist).await? {
        let dist = config.root_relative(&config.paths.dist);
        log!("clean"; "{} does not exist", dist.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clean_site() {
        let dir = TempDir::new().unwrap();
        let config = test_site_config(dir.path());
        fs::create_dir_all(config.paths.dist.join("html")).unwrap();
        fs::write(config.paths.dist.join("index.html"), "x").unwrap();

        clean_site(&config).await.unwrap();
        assert!(!config.paths.dist.exists());

        // Second run is a no-op.
        clean_site(&config).await.unwrap();
    }
}
