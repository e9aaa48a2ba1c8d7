//! Library components of the `vizmap` command-line harness.

pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
