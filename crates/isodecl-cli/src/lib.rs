//! isodecl CLI library components.
//!
//! The `isodecl` binary is in `main.rs`; configuration loading, the build
//! driver and output formatting live here so they can be tested.

pub mod build;
pub mod config;
pub mod formatters;

pub use build::{run_build, BuildReport};
pub use config::{ConfigError, IsodeclConfig};
