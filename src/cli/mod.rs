//! Command-line interface module.

mod args;
pub mod build;
pub mod page;
pub mod serve;

pub use args::{Cli, Commands, NewPageArgs};
