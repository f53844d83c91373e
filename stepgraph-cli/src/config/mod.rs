//! Configuration for CLI runs.
//!
//! Re-exports [`RunConfig`], [`RunOptions`] and config [`Error`].

mod run_config;
mod run_options;

pub use run_config::{Error, RunConfig, PLACEHOLDER_ROLE_ARN};
pub use run_options::RunOptions;
