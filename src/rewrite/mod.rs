//! Path rewriting between URL representations.
//!
//! Documents reference assets and pages in three forms:
//!
//! | Form           | Example                     | Used by                   |
//! |----------------|-----------------------------|---------------------------|
//! | short          | `images/a.png`, `x.html`    | hand-written sources      |
//! | alias absolute | `/assets/images/a.png`      | dev server output         |
//! | depth relative | `./assets/…`, `../assets/…` | distributable output      |
//!
//! [`Rewriter::to_absolute`] and [`Rewriter::to_relative`] both first fold
//! short forms into alias form, then target their representation. Rules are
//! applied as ordered [`RulePipeline`]s; short-alias rules always run before
//! legacy relative rules so already-aliased output is never rewritten twice.

mod css;
mod inline_style;
mod rule;

pub use css::{CssFlip, relative_prefix};
use inline_style::{AssetLookup, retarget_icon_urls};
use rule::RulePipeline;

use crate::config::{PathAliases, SiteConfig};
use crate::core::FileLocation;
use regex::escape;
use rule::literal;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Short conventional directories folded into the assets alias.
const SHORT_DIRS: [&str; 4] = ["images", "css", "js", "fonts"];

/// Precompiled rewrite pipelines for one configuration.
#[derive(Debug, Clone)]
pub struct Rewriter {
    absolute_root: RulePipeline,
    absolute_page: RulePipeline,
    relative_root: RulePipeline,
    relative_page: RulePipeline,
    css_flip: CssFlip,
    /// Compiled style-sheet directory, target of inline icon URLs.
    style_dir: PathBuf,
    assets: AssetLookup,
}

/// Literal pieces the rules are built from.
struct Names {
    assets: String,
    pages: String,
    assets_seg: String,
    pages_seg: String,
    favicon: String,
    index: String,
}

impl Names {
    fn new(aliases: &PathAliases, favicon: &str, index: &str) -> Self {
        Self {
            assets: aliases.assets_path.clone(),
            pages: aliases.pages_path.clone(),
            assets_seg: aliases.assets_segment().to_owned(),
            pages_seg: aliases.pages_segment().to_owned(),
            favicon: favicon.to_owned(),
            index: index.to_owned(),
        }
    }
}

impl Rewriter {
    pub fn new(
        aliases: &PathAliases,
        favicon: &str,
        index: &str,
        style_dir: impl Into<PathBuf>,
    ) -> Result<Self, regex::Error> {
        let n = Names::new(aliases, favicon, index);

        let short = short_alias_rules(&n)?;
        let page_links = page_link_rules(&n)?;
        let legacy = legacy_rules(&n)?;
        let strip = crossorigin_rules()?;

        Ok(Self {
            absolute_root: short.clone().then(&legacy).then(&absolute_root_rules(&n)?),
            absolute_page: short
                .clone()
                .then(&page_links)
                .then(&legacy)
                .then(&absolute_page_rules(&n)?),
            relative_root: short.clone().then(&relative_root_rules(&n)?).then(&strip),
            relative_page: short
                .then(&page_links)
                .then(&relative_page_rules(&n)?)
                .then(&strip),
            css_flip: CssFlip::new(&aliases.assets_path),
            style_dir: style_dir.into(),
            assets: AssetLookup::default(),
        })
    }

    /// Rewriter whose inline icon checks read the asset sources, so markup
    /// output does not depend on the concurrent asset copy.
    pub fn from_config(config: &SiteConfig) -> Result<Self, regex::Error> {
        let public = &config.paths.public;
        let assets = AssetLookup::new()
            .mirror(public.dest.join("fonts/material-icons"), &config.build.assets.icon_fonts)
            .mirror(&public.dest, &public.src)
            .mirror(config.favicon_out(), config.favicon_src());
        Ok(Self::new(
            &config.path_aliases,
            &config.files.favicon,
            &config.files.html.index,
            &config.paths.scss.dest,
        )?
        .with_assets(assets))
    }

    pub fn with_assets(mut self, assets: AssetLookup) -> Self {
        self.assets = assets;
        self
    }

    /// Rewrite to alias-absolute form for the dev server.
    ///
    /// With `document` (the emitted file's path), inline `--icon-url` styles
    /// are also re-targeted relative to the style output directory.
    pub fn to_absolute<'a>(
        &self,
        content: &'a str,
        location: FileLocation,
        document: Option<&Path>,
    ) -> Cow<'a, str> {
        let pipeline = match location {
            FileLocation::Root => &self.absolute_root,
            FileLocation::Page => &self.absolute_page,
        };
        let rewritten = pipeline.apply(content);

        let Some(doc_dir) = document.and_then(Path::parent) else {
            return rewritten;
        };
        let retargeted = match retarget_icon_urls(&rewritten, doc_dir, &self.style_dir, &self.assets) {
            Cow::Owned(changed) => Some(changed),
            Cow::Borrowed(_) => None,
        };
        retargeted.map_or(rewritten, Cow::Owned)
    }

    /// Rewrite to depth-relative form for a server-less distributable.
    pub fn to_relative<'a>(&self, content: &'a str, location: FileLocation) -> Cow<'a, str> {
        match location {
            FileLocation::Root => self.relative_root.apply(content),
            FileLocation::Page => self.relative_page.apply(content),
        }
    }

    pub fn css_flip(&self) -> &CssFlip {
        &self.css_flip
    }
}

/// `images/`, `css/`, `js/`, `fonts/` and the bare favicon name.
fn short_alias_rules(n: &Names) -> Result<RulePipeline, regex::Error> {
    let mut pipeline = RulePipeline::new();
    for dir in SHORT_DIRS {
        pipeline = pipeline.rule(
            &format!(r#"(href|src)="{dir}/"#),
            format!(r#"${{1}}="{}/{dir}/"#, literal(&n.assets)),
        )?;
    }
    pipeline.rule(
        &format!(r#"(href|src)="{}""#, escape(&n.favicon)),
        format!(r#"${{1}}="/{}""#, literal(&n.favicon)),
    )
}

/// Bare same-folder page links, for page documents only.
fn page_link_rules(n: &Names) -> Result<RulePipeline, regex::Error> {
    RulePipeline::new().rule(
        r#"href="([^/"]+\.html)""#,
        format!(r#"href="{}/${{1}}""#, literal(&n.pages)),
    )
}

/// Two-levels-up forms left over from older page sources.
fn legacy_rules(n: &Names) -> Result<RulePipeline, regex::Error> {
    RulePipeline::new()
        .rule(
            &format!(r#"(href|src)="\.\./{}/"#, escape(&n.assets_seg)),
            format!(r#"${{1}}="{}/"#, literal(&n.assets)),
        )?
        .rule(
            &format!(r#"(href|src)="\.\./{}""#, escape(&n.favicon)),
            format!(r#"${{1}}="/{}""#, literal(&n.favicon)),
        )?
        .rule(
            r#"(href|src)="\.\./fonts/"#,
            format!(r#"${{1}}="{}/fonts/"#, literal(&n.assets)),
        )
}

fn absolute_root_rules(n: &Names) -> Result<RulePipeline, regex::Error> {
    RulePipeline::new()
        .rule(
            &format!(r#"(href|src)="\./{}/"#, escape(&n.assets_seg)),
            format!(r#"${{1}}="{}/"#, literal(&n.assets)),
        )?
        .rule(
            &format!(r#"(href|src)="\./{}""#, escape(&n.favicon)),
            format!(r#"${{1}}="/{}""#, literal(&n.favicon)),
        )?
        .rule(
            r#"(href|src)="\./fonts/"#,
            format!(r#"${{1}}="{}/fonts/"#, literal(&n.assets)),
        )?
        .rule(
            &format!(r#"href="\./{}/"#, escape(&n.pages_seg)),
            format!(r#"href="{}/"#, literal(&n.pages)),
        )?
        .rule(
            &format!(r#"href="\./{}""#, escape(&n.index)),
            format!(r#"href="/{}""#, literal(&n.index)),
        )
}

fn absolute_page_rules(n: &Names) -> Result<RulePipeline, regex::Error> {
    RulePipeline::new()
        .rule(
            &format!(r#"href="\.\./{}""#, escape(&n.index)),
            format!(r#"href="/{}""#, literal(&n.index)),
        )?
        .rule(
            &format!(r#"href="\.\./{}/"#, escape(&n.pages_seg)),
            format!(r#"href="{}/"#, literal(&n.pages)),
        )
}

/// Alias forms to depth-relative forms reaching the output root via `prefix`.
fn depth_rules(n: &Names, location: FileLocation) -> Result<RulePipeline, regex::Error> {
    let prefix = location.depth_prefix();
    RulePipeline::new()
        .rule(
            &format!(r#"(href|src)="{}/"#, escape(&n.assets)),
            format!(r#"${{1}}="{prefix}{}/"#, literal(&n.assets_seg)),
        )?
        .rule(
            &format!(r#"(href|src)="/{}""#, escape(&n.favicon)),
            format!(r#"${{1}}="{prefix}{}""#, literal(&n.favicon)),
        )?
        .rule(
            &format!(r#"href="{}/"#, escape(&n.pages)),
            format!(r#"href="{prefix}{}/"#, literal(&n.pages_seg)),
        )?
        .rule(
            &format!(r#"href="/{}""#, escape(&n.index)),
            format!(r#"href="{prefix}{}""#, literal(&n.index)),
        )
}

fn relative_root_rules(n: &Names) -> Result<RulePipeline, regex::Error> {
    let root = depth_rules(n, FileLocation::Root)?;
    // Page-style `../assets/` in a root document points above the output root.
    RulePipeline::new()
        .rule(
            &format!(r#"(href|src)="\.\./{}/"#, escape(&n.assets_seg)),
            format!(r#"${{1}}="./{}/"#, literal(&n.assets_seg)),
        )
        .map(|fold| root.then(&fold))
}

fn relative_page_rules(n: &Names) -> Result<RulePipeline, regex::Error> {
    depth_rules(n, FileLocation::Page)
}

/// `crossorigin="anonymous"` has no meaning for `file://` documents.
fn crossorigin_rules() -> Result<RulePipeline, regex::Error> {
    RulePipeline::new()
        .rule(r#"\s+crossorigin="anonymous""#, "")?
        .rule(r#"\s+crossorigin='anonymous'"#, "")
}
