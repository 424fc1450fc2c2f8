//! Core types shared across the pipeline.

mod location;
mod mode;
mod state;

pub use location::FileLocation;
pub use mode::{BuildEnv, PathMode};
pub use state::{is_shutdown, register_server, request_shutdown, setup_shutdown_handler, wait_for_shutdown};
