//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// tessera static site build pipeline
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: site.toml, searched upward)
    #[arg(short = 'C', long, global = true, default_value = "site.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build a distributable site with relative paths
    #[command(visible_alias = "b")]
    Build,

    /// Build for development, serve the output and rebuild on change
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Remove the output directory
    #[command(visible_alias = "c")]
    Clean,

    /// Scaffold a new page document
    #[command(visible_alias = "n")]
    NewPage {
        #[command(flatten)]
        args: NewPageArgs,
    },
}

/// `new-page` arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct NewPageArgs {
    /// Page file name without extension (e.g. `about`)
    pub name: String,

    /// Page title (defaults to the name)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Meta description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Include the breadcrumb partial
    #[arg(short, long)]
    pub breadcrumb: bool,
}

impl Cli {
    /// Subcommand to run, `serve` when none was given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            interface: None,
            port: None,
            no_open: false,
        })
    }

    #[cfg(test)]
    pub fn is_serve(&self) -> bool {
        matches!(self.command(), Commands::Serve { .. })
    }
}
