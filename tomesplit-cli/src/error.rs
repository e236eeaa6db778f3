//! Error handling for the CLI application

use std::fmt;

/// CLI-specific failures
///
/// I/O and parser errors travel as `anyhow::Error` with context attached;
/// these variants cover the conditions the CLI itself decides are fatal.
#[derive(Debug)]
pub enum CliError {
    /// File not found or inaccessible
    FileNotFound(String),
    /// Invalid file pattern
    InvalidPattern(String),
    /// Configuration error
    ConfigError(String),
    /// Input file type the splitter cannot read
    UnsupportedFormat(String),
    /// Source and output formats that cannot be combined
    UnsupportedConversion {
        /// Source format name
        from: String,
        /// Requested output format name
        to: String,
    },
    /// Extraction produced nothing to split
    EmptyDocument(String),
    /// Two inputs whose parts would be written under the same names
    DuplicateStem {
        /// Shared file stem
        stem: String,
        /// Earlier input
        first: String,
        /// Later input
        second: String,
    },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileNotFound(path) => write!(f, "File not found: {path}"),
            CliError::InvalidPattern(pattern) => write!(f, "Invalid file pattern: {pattern}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::UnsupportedFormat(path) => {
                write!(f, "Unsupported input format: {path} (expected .epub or .pdf)")
            }
            CliError::UnsupportedConversion { from, to } => {
                write!(f, "Unsupported conversion: {from} to {to}")
            }
            CliError::EmptyDocument(path) => write!(f, "No content found in {path}"),
            CliError::DuplicateStem {
                stem,
                first,
                second,
            } => write!(
                f,
                "Inputs {first} and {second} share the file stem '{stem}' and would overwrite each other's parts"
            ),
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;
