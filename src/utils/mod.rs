//! Utility functions and helpers

pub mod app_paths;
pub mod logging;
pub mod text_width;
