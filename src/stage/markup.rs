//! Markup stage: include expansion followed by path rewriting.
//!
//! The root document lands at the output root, page documents one level
//! below it. Both go through two passes:
//!
//! 1. the [`IncludeProcessor`] expands directives and the result is written;
//! 2. once the written file is confirmed, the language marker is substituted
//!    and references are rewritten for the build's [`PathMode`].

use super::BuildError;
use super::include::{IncludeOptions, IncludeProcessor};
use crate::artifact::FileWaiter;
use crate::config::SiteConfig;
use crate::core::{FileLocation, PathMode};
use crate::rewrite::Rewriter;
use crate::utils::walk::list_files_with_ext;
use crate::{debug, log};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

/// Outcome of a markup stage run.
#[derive(Debug, Default, Clone)]
pub struct MarkupReport {
    /// Documents written and rewritten.
    pub written: Vec<PathBuf>,
    /// Documents whose first-pass output never appeared.
    pub missing: Vec<PathBuf>,
}

/// One document to build.
#[derive(Debug, Clone)]
struct Document {
    source: PathBuf,
    output: PathBuf,
    location: FileLocation,
}

pub struct MarkupStage<'a> {
    config: &'a SiteConfig,
    processor: &'a dyn IncludeProcessor,
    rewriter: &'a Rewriter,
    waiter: FileWaiter,
    mode: PathMode,
}

impl<'a> MarkupStage<'a> {
    pub fn new(
        config: &'a SiteConfig,
        processor: &'a dyn IncludeProcessor,
        rewriter: &'a Rewriter,
        waiter: FileWaiter,
        mode: PathMode,
    ) -> Self {
        Self {
            config,
            processor,
            rewriter,
            waiter,
            mode,
        }
    }

    /// Variables visible to every document.
    pub fn template_context(config: &SiteConfig) -> Map<String, Value> {
        let context = json!({
            "env": config.env.as_str(),
            "language": config.language,
            "viewport": config.viewport,
            "assetsPath": config.path_aliases.assets_path,
            "pagesPath": config.path_aliases.pages_path,
        });
        match context {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn include_options(&self) -> IncludeOptions {
        IncludeOptions {
            prefix: self.config.build.html.prefix.clone(),
            base: self.config.build.html.include_base(),
            context: Self::template_context(self.config),
        }
    }

    /// Root document first, then pages sorted by name.
    fn documents(&self) -> Result<Vec<Document>, BuildError> {
        let root = self.config.root_document_src();
        if !root.is_file() {
            return Err(BuildError::MissingRootDocument(root));
        }

        let mut documents = vec![Document {
            source: root,
            output: self.config.root_document_out(),
            location: FileLocation::Root,
        }];

        let pages = &self.config.paths.html;
        if !pages.src.is_dir() {
            log!("warning"; "page directory not found: {}", self.config.root_relative(&pages.src).display());
            return Ok(documents);
        }
        documents.extend(
            list_files_with_ext(&pages.src, &["html"])
                .into_iter()
                .filter_map(|source| {
                    let name = source.file_name()?.to_owned();
                    Some(Document {
                        output: pages.dest.join(name),
                        source,
                        location: FileLocation::Page,
                    })
                }),
        );
        Ok(documents)
    }

    pub async fn run(&self) -> Result<MarkupReport, BuildError> {
        let documents = self.documents()?;
        let options = self.include_options();

        for document in &documents {
            self.expand(document, &options).await?;
        }

        let mut report = MarkupReport::default();
        for document in documents {
            if self.finish(&document).await? {
                report.written.push(document.output);
            } else {
                log!("warning"; "document not produced: {}", self.config.root_relative(&document.output).display());
                report.missing.push(document.output);
            }
        }

        log!("html"; "built {} document(s)", report.written.len());
        Ok(report)
    }

    /// First pass: expand includes and write.
    async fn expand(&self, document: &Document, options: &IncludeOptions) -> Result<(), BuildError> {
        debug!("html"; "including {}", self.config.root_relative(&document.source).display());
        let expanded = self.processor.process(&document.source, options)?;
        write_file(&document.output, expanded.as_bytes()).await
    }

    /// Second pass: language marker and path rewriting. Returns `false`
    /// when the first-pass output never appeared.
    async fn finish(&self, document: &Document) -> Result<bool, BuildError> {
        let output = &document.output;
        if !self.waiter.wait_for(output).await {
            return Ok(false);
        }

        let content = tokio::fs::read_to_string(output)
            .await
            .map_err(|e| BuildError::io(output, e))?;
        let marker = format!("{}language", self.config.build.html.prefix);
        let content = content.replace(&marker, &self.config.language);

        let rewritten = match self.mode {
            PathMode::DevelopmentAbsolute => {
                self.rewriter
                    .to_absolute(&content, document.location, Some(output))
            }
            PathMode::ProductionRelative => self.rewriter.to_relative(&content, document.location),
        };
        write_file(output, rewritten.as_bytes()).await?;
        Ok(true)
    }
}

async fn write_file(path: &Path, content: &[u8]) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| BuildError::io(parent, e))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| BuildError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;
    use crate::stage::include::{FileInclude, IncludeError};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let config = test_site_config(dir.path());
        let src = &config.paths.src;
        fs::create_dir_all(src.join("templates")).unwrap();
        fs::create_dir_all(&config.paths.html.src).unwrap();
        fs::write(
            src.join("templates/head.html"),
            r#"<link rel="icon" href="favicon.svg"><link href="css/styles.css">"#,
        )
        .unwrap();
        fs::write(
            config.root_document_src(),
            r#"<html lang="@@language">@@include('./templates/head.html')<a href="./html/about.html">about</a></html>"#,
        )
        .unwrap();
        fs::write(
            config.paths.html.src.join("about.html"),
            r#"<html lang="@@language">@@include('../templates/head.html')<a href="contact.html">c</a><a href="../index.html">home</a></html>"#,
        )
        .unwrap();
        (dir, config)
    }

    async fn run(config: &SiteConfig, mode: PathMode) -> Result<MarkupReport, BuildError> {
        let rewriter = Rewriter::from_config(config).unwrap();
        let waiter = FileWaiter::new(2, Duration::from_millis(1));
        MarkupStage::new(config, &FileInclude, &rewriter, waiter, mode)
            .run()
            .await
    }

    #[tokio::test]
    async fn test_development_documents_are_absolute() {
        let (_dir, config) = setup();
        let report = run(&config, PathMode::DevelopmentAbsolute).await.unwrap();
        assert_eq!(report.written.len(), 2);
        assert!(report.missing.is_empty());

        let root = fs::read_to_string(config.root_document_out()).unwrap();
        assert_eq!(
            root,
            r#"<html lang="ko"><link rel="icon" href="/favicon.svg"><link href="/assets/css/styles.css"><a href="/html/about.html">about</a></html>"#
        );

        let page = fs::read_to_string(config.paths.html.dest.join("about.html")).unwrap();
        assert_eq!(
            page,
            r#"<html lang="ko"><link rel="icon" href="/favicon.svg"><link href="/assets/css/styles.css"><a href="/html/contact.html">c</a><a href="/index.html">home</a></html>"#
        );
    }

    #[tokio::test]
    async fn test_production_documents_are_relative() {
        let (_dir, config) = setup();
        run(&config, PathMode::ProductionRelative).await.unwrap();

        let root = fs::read_to_string(config.root_document_out()).unwrap();
        assert!(root.contains(r#"href="./favicon.svg""#));
        assert!(root.contains(r#"href="./assets/css/styles.css""#));
        assert!(root.contains(r#"href="./html/about.html""#));

        let page = fs::read_to_string(config.paths.html.dest.join("about.html")).unwrap();
        assert!(page.contains(r#"href="../assets/css/styles.css""#));
        assert!(page.contains(r#"href="../html/contact.html""#));
        assert!(page.contains(r#"href="../index.html""#));
    }

    #[tokio::test]
    async fn test_inline_icons_resolve_before_asset_copy() {
        let (_dir, config) = setup();
        let img = config.paths.public.src.join("img");
        fs::create_dir_all(&img).unwrap();
        fs::write(img.join("home.svg"), "<svg/>").unwrap();
        fs::write(
            config.paths.html.src.join("icons.html"),
            r#"<i style="--icon-url: url(../assets/img/home.svg)"></i>"#,
        )
        .unwrap();
        assert!(!config.paths.public.dest.exists());

        run(&config, PathMode::DevelopmentAbsolute).await.unwrap();

        let page = fs::read_to_string(config.paths.html.dest.join("icons.html")).unwrap();
        assert_eq!(page, r#"<i style="--icon-url: url(../img/home.svg)"></i>"#);
    }

    #[tokio::test]
    async fn test_missing_root_document_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = test_site_config(dir.path());
        let err = run(&config, PathMode::DevelopmentAbsolute).await.unwrap_err();
        assert!(matches!(err, BuildError::MissingRootDocument(_)));
    }

    #[tokio::test]
    async fn test_missing_page_directory_builds_root_only() {
        let (_dir, config) = setup();
        fs::remove_dir_all(&config.paths.html.src).unwrap();
        let report = run(&config, PathMode::DevelopmentAbsolute).await.unwrap();
        assert_eq!(report.written, vec![config.root_document_out()]);
    }

    #[tokio::test]
    async fn test_include_error_aborts() {
        let (_dir, config) = setup();
        fs::write(config.paths.html.src.join("broken.html"), "@@include('nope.html')").unwrap();
        let err = run(&config, PathMode::DevelopmentAbsolute).await.unwrap_err();
        assert!(matches!(err, BuildError::Include(IncludeError::NotFound { .. })));
    }

    #[test]
    fn test_template_context() {
        let dir = TempDir::new().unwrap();
        let config = test_site_config(dir.path());
        let context = MarkupStage::template_context(&config);
        assert_eq!(context["env"], "development");
        assert_eq!(context["language"], "ko");
        assert_eq!(context["viewport"]["mode"], "responsive");
        assert_eq!(context["viewport"]["fixedWidth"], 1600);
        assert_eq!(context["assetsPath"], "/assets");
        assert_eq!(context["pagesPath"], "/html");
    }
}
