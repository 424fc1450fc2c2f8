//! Path and URL utilities.
//!
//! Pure functions for path manipulation.
//!
//! - [`fs`]: filesystem paths (`normalize_path`, `clean_join`, `relative_path`)
//! - [`route`]: URL references (`is_passthrough_ref`, `split_path_suffix`)

pub mod fs;
pub mod route;

pub use fs::{clean, clean_join, normalize_path, relative_path};
