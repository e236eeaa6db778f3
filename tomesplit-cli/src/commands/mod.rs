//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;

pub mod generate_config;
pub mod inspect;
pub mod split;
pub mod validate_config;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split books into parts under a word budget
    Split(split::SplitArgs),

    /// Show the units of a book and the plan a split would produce
    Inspect(inspect::InspectArgs),

    /// Write a commented configuration template
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// Check a configuration file
    ValidateConfig(validate_config::ValidateConfigArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List input and output formats
    Formats,
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Split(args) => args.execute(),
            Commands::Inspect(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::ValidateConfig(args) => args.execute(),
            Commands::List { subcommand } => {
                match subcommand {
                    ListCommands::Formats => print!("{}", formats_listing()),
                }
                Ok(())
            }
        }
    }
}

fn formats_listing() -> String {
    "Input formats:\n  \
     epub      EPUB 2/3 packages, one unit per spine document\n  \
     pdf       PDF text layer, one unit per page\n\
     \n\
     Output formats:\n  \
     markdown  One markdown file per part (any input)\n  \
     epub      One EPUB package per part (EPUB input only)\n"
        .to_string()
}

/// Initialize logging based on verbosity level
///
/// `-v` enables info, `-vv` debug and `-vvv` trace; `RUST_LOG` wins when
/// set. Quiet mode installs no logger.
pub(crate) fn init_logging(quiet: bool, verbose: u8) {
    if quiet {
        return;
    }

    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // A logger may already be installed when commands run in-process.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .try_init();
}
