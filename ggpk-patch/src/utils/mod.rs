//! Shared utilities for the ggpk-patch CLI

pub mod progress;

pub use progress::*;
