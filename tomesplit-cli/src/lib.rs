//! tomesplit CLI library
//!
//! Command-line front end that extracts EPUB and PDF books into word-counted
//! units, plans parts with `tomesplit-core`, and writes each part as
//! markdown or as a standalone EPUB.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
