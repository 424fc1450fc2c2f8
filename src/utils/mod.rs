//! Shared helpers.

pub mod exec;
pub mod mime;
pub mod path;
pub mod plural;
pub mod walk;
