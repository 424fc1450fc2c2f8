//! Tessera - a static site build pipeline.

mod artifact;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod pipeline;
mod reload;
mod rewrite;
mod stage;
mod utils;
mod watch;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;
use owo_colors::OwoColorize;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "[error]".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    // Before any blocking operation so Ctrl+C always exits.
    core::setup_shutdown_handler()?;

    let config = Arc::new(SiteConfig::load(&cli)?);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create async runtime")?;

    runtime.block_on(async move {
        match cli.command() {
            Commands::Build => cli::build::build_site(config).await,
            Commands::Serve { .. } => cli::serve::serve_site(config).await,
            Commands::Clean => cli::build::clean_site(&config).await,
            Commands::NewPage { args } => cli::page::new_page(&config, &args).map(|_| ()),
        }
    })
}
