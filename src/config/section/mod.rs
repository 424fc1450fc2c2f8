//! Configuration section definitions.
//!
//! Each module corresponds to a table in `site.toml`:
//!
//! | Module     | TOML Section    | Purpose                              |
//! |------------|-----------------|--------------------------------------|
//! | `paths`    | `[paths]`       | Source and output roots              |
//! | `aliases`  | `[pathAliases]` | URL aliases for assets and pages     |
//! | `files`    | `[files]`       | Entry, index and favicon file names  |
//! | `build`    | `[build]`       | Include, style and asset settings    |
//! | `viewport` | `[viewport]`    | Layout descriptor for templates      |
//! | `serve`    | `[dev]`         | Development server                   |

mod aliases;
pub mod build;
mod files;
mod paths;
mod serve;
mod viewport;

pub use aliases::PathAliases;
pub use build::{BuildSectionConfig, IncludeBase};
pub use files::FilesConfig;
pub use paths::PathsConfig;
pub use serve::{DevConfig, DevLogLevel};
pub use viewport::{ViewportConfig, ViewportMode};
