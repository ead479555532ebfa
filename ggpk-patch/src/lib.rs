//! ggpk-patch library
//!
//! Command definitions and implementations behind the `ggpk-patch` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod utils;
