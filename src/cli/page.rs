//! `new-page`: scaffold a source document.

use super::args::NewPageArgs;
use crate::{config::SiteConfig, embed::scaffold::{PageVars, render_page}, log};
use anyhow::{Result, bail};
use std::fs;
use std::path::PathBuf;

/// Write `{paths.html.src}/<name>.html`, refusing to overwrite.
pub fn new_page(config: &SiteConfig, args: &NewPageArgs) -> Result<PathBuf> {
    let name = page_name(&args.name)?;
    let target = config.paths.html.src.join(format!("{name}.html"));
    if target.exists() {
        bail!("page already exists: {}", config.root_relative(&target).display());
    }

    let title = args.title.clone().unwrap_or_else(|| capitalize(name));
    let description = args
        .description
        .clone()
        .unwrap_or_else(|| format!("{name} page"));
    let url = format!("{}/{name}.html", config.path_aliases.pages_path.trim_end_matches('/'));

    let html = render_page(&PageVars {
        prefix: &config.build.html.prefix,
        language: &config.language,
        name,
        title: &title,
        description: &description,
        url: &url,
        breadcrumb: args.breadcrumb,
    });

    fs::create_dir_all(&config.paths.html.src)?;
    fs::write(&target, html)?;
    log!("page"; "created {}", config.root_relative(&target).display());
    Ok(target)
}

/// Accept `about` or `about.html`; reject anything that is not a plain
/// file name.
fn page_name(raw: &str) -> Result<&str> {
    let name = raw.trim();
    let name = name.strip_suffix(".html").unwrap_or(name);
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control)
    {
        bail!("invalid page name: {raw:?}");
    }
    Ok(name)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
