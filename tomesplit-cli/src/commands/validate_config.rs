//! Validate config command implementation

use crate::config::CliConfig;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate-config command
#[derive(Debug, Args)]
pub struct ValidateConfigArgs {
    /// Path to the configuration file to validate
    #[arg(short = 'c', long, value_name = "FILE", required = true)]
    pub config: PathBuf,
}

impl ValidateConfigArgs {
    /// Execute the validate-config command
    pub fn execute(&self) -> Result<()> {
        println!("Validating configuration: {}", self.config.display());

        match CliConfig::from_file(&self.config) {
            Ok(config) => {
                println!("✓ Configuration is valid!");
                println!("  Max words: {}", config.segmentation.max_words);
                println!(
                    "  Strict boundaries: {}",
                    config.segmentation.strict_boundaries
                );
                println!("  Output format: {}", config.output.format);
                println!("  Output directory: {}", config.output.directory.display());
                println!();
                println!("Effective configuration:");
                print!("{}", config.to_toml()?);
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid!");
                println!("  Error: {e:#}");
                Err(anyhow::anyhow!("Validation failed: {:#}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_args_debug() {
        let args = ValidateConfigArgs {
            config: PathBuf::from("test.toml"),
        };

        let debug_str = format!("{:?}", args);
        assert!(debug_str.contains("ValidateConfigArgs"));
        assert!(debug_str.contains("test.toml"));
    }

    #[test]
    fn test_validate_valid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            "[segmentation]\nmax_words = 1200\nstrict_boundaries = true\n"
        )
        .unwrap();

        let args = ValidateConfigArgs {
            config: temp_file.path().to_path_buf(),
        };
        assert!(args.execute().is_ok());
    }

    #[test]
    fn test_validate_zero_budget() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[segmentation]\nmax_words = 0\n").unwrap();

        let args = ValidateConfigArgs {
            config: temp_file.path().to_path_buf(),
        };
        let error = args.execute().unwrap_err();
        assert!(error.to_string().contains("Validation failed"));
        assert!(error.to_string().contains("max_words must be greater than 0"));
    }

    #[test]
    fn test_validate_malformed_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[segmentation\nmax_words = ").unwrap();

        let args = ValidateConfigArgs {
            config: temp_file.path().to_path_buf(),
        };
        assert!(args.execute().is_err());
    }

    #[test]
    fn test_validate_unknown_output_format() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[output]\nformat = \"docx\"\n").unwrap();

        let args = ValidateConfigArgs {
            config: temp_file.path().to_path_buf(),
        };
        assert!(args.execute().is_err());
    }
}
