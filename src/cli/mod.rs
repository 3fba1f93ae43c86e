//! CLI module for ragsift
//!
//! Handles command-line argument parsing.

pub mod args;

pub use args::{parse_filter, Args, Commands, Verbosity};
