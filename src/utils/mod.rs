//! Shared utility functions.

mod format;

pub use format::{format_size, pack_display_name};
