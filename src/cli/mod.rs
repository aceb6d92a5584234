//! Command-line interface for stickercrawl.

mod commands;
pub mod progress;

pub use commands::{is_verbose, run};
