//! Build orchestration.
//!
//! ```text
//! development:   clean → styles → (markup ∥ assets)
//! distributable: clean → styles → assets → markup → style path flip
//! ```
//!
//! A fatal stage error aborts the sequence and propagates. Output already
//! written by earlier stages is left in place.

use crate::artifact::FileWaiter;
use crate::config::SiteConfig;
use crate::core::PathMode;
use crate::{debug, log};
use crate::rewrite::{Rewriter, relative_prefix};
use crate::stage::{
    AssetReport, AssetStage, BuildError, FileInclude, IncludeProcessor, MarkupReport,
    MarkupStage, SassCommand, StyleCompiler, StyleReport, StyleStage, clean_dist,
};
use crate::utils::walk::collect_files_with_ext;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

/// Progress through one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Clean,
    StylesCompiled,
    /// Development: markup and assets finished together.
    MarkupAndAssetsComplete,
    AssetsComplete,
    MarkupComplete,
    StylePathsFlipped,
}

/// Everything a finished build produced.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Final state reached.
    pub state: BuildState,
    /// Every state in the order it was reached.
    pub trail: Vec<BuildState>,
    pub styles: StyleReport,
    pub markup: MarkupReport,
    pub assets: AssetReport,
    /// Style-sheets rewritten by the flip pass.
    pub flipped: usize,
}

/// Sequences the stages for one configuration.
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<SiteConfig>,
    compiler: Arc<dyn StyleCompiler>,
    includes: Arc<dyn IncludeProcessor>,
    rewriter: Rewriter,
    waiter: FileWaiter,
}

impl Orchestrator {
    /// Orchestrator with the `sass` executable and the built-in include
    /// processor.
    pub fn new(config: Arc<SiteConfig>) -> Result<Self, BuildError> {
        let compiler = Arc::new(SassCommand::new(&config.root));
        Self::with_collaborators(config, compiler, Arc::new(FileInclude))
    }

    pub fn with_collaborators(
        config: Arc<SiteConfig>,
        compiler: Arc<dyn StyleCompiler>,
        includes: Arc<dyn IncludeProcessor>,
    ) -> Result<Self, BuildError> {
        let rewriter = Rewriter::from_config(&config)?;
        Ok(Self {
            config,
            compiler,
            includes,
            rewriter,
            waiter: FileWaiter::default(),
        })
    }

    #[cfg(test)]
    pub fn with_waiter(mut self, waiter: FileWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    pub fn config(&self) -> &Arc<SiteConfig> {
        &self.config
    }

    pub async fn build(&self, mode: PathMode) -> Result<BuildSummary, BuildError> {
        let started = Instant::now();
        let summary = match mode {
            PathMode::DevelopmentAbsolute => self.build_development().await?,
            PathMode::ProductionRelative => self.build_distributable().await?,
        };
        log!(
            "build";
            "done in {:.2}s ({} style-sheet(s), {} document(s), {} asset(s))",
            started.elapsed().as_secs_f64(),
            summary.styles.compiled.len(),
            summary.markup.written.len(),
            summary.assets.total().copied
        );
        Ok(summary)
    }

    /// Clean, styles, then markup and assets concurrently with alias paths.
    pub async fn build_development(&self) -> Result<BuildSummary, BuildError> {
        let mut trail = Vec::with_capacity(3);
        self.clean().await?;
        advance(&mut trail, BuildState::Clean);
        let styles = self.build_styles().await?;
        advance(&mut trail, BuildState::StylesCompiled);

        let (markup, assets) = tokio::join!(
            self.build_markup(PathMode::DevelopmentAbsolute),
            self.build_assets()
        );
        let markup = markup?;
        advance(&mut trail, BuildState::MarkupAndAssetsComplete);

        Ok(BuildSummary {
            state: BuildState::MarkupAndAssetsComplete,
            trail,
            styles,
            markup,
            assets,
            flipped: 0,
        })
    }

    /// Strict sequence with relative paths, ending with the style path flip.
    pub async fn build_distributable(&self) -> Result<BuildSummary, BuildError> {
        let mut trail = Vec::with_capacity(5);
        self.clean().await?;
        advance(&mut trail, BuildState::Clean);
        let styles = self.build_styles().await?;
        advance(&mut trail, BuildState::StylesCompiled);
        let assets = self.build_assets().await;
        advance(&mut trail, BuildState::AssetsComplete);
        let markup = self.build_markup(PathMode::ProductionRelative).await?;
        advance(&mut trail, BuildState::MarkupComplete);
        let flipped = self.flip_style_paths().await?;
        advance(&mut trail, BuildState::StylePathsFlipped);

        Ok(BuildSummary {
            state: BuildState::StylePathsFlipped,
            trail,
            styles,
            markup,
            assets,
            flipped,
        })
    }

    pub async fn clean(&self) -> Result<bool, BuildError> {
        clean_dist(&self.config.paths.dist).await
    }

    pub async fn build_styles(&self) -> Result<StyleReport, BuildError> {
        let stage = StyleStage::new(&self.config, self.compiler.as_ref(), self.waiter);
        Ok(stage.run().await?)
    }

    pub async fn build_markup(&self, mode: PathMode) -> Result<MarkupReport, BuildError> {
        MarkupStage::new(
            &self.config,
            self.includes.as_ref(),
            &self.rewriter,
            self.waiter,
            mode,
        )
        .run()
        .await
    }

    pub async fn build_assets(&self) -> AssetReport {
        AssetStage::new(&self.config).run().await
    }

    /// Rewrite alias `url(...)` references in every compiled style-sheet
    /// to paths relative to the sheet. Returns how many sheets changed.
    pub async fn flip_style_paths(&self) -> Result<usize, BuildError> {
        let flip = self.rewriter.css_flip();
        let public_dest = &self.config.paths.public.dest;
        let mut flipped = 0;

        for sheet in collect_files_with_ext(&self.config.paths.scss.dest, &["css"]) {
            let css = tokio::fs::read_to_string(&sheet)
                .await
                .map_err(|e| BuildError::io(&sheet, e))?;
            let prefix = relative_prefix(&sheet, public_dest);
            if let Cow::Owned(rewritten) = flip.flip(&css, &prefix)? {
                tokio::fs::write(&sheet, rewritten)
                    .await
                    .map_err(|e| BuildError::io(&sheet, e))?;
                flipped += 1;
            }
        }

        log!("css"; "relative paths in {flipped} style-sheet(s)");
        Ok(flipped)
    }
}

fn advance(trail: &mut Vec<BuildState>, state: BuildState) {
    debug!("build"; "{state:?}");
    trail.push(state);
}
