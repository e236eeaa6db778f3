use anyhow::Result;
use clap::Parser;
use tomesplit_cli::commands::Commands;

/// Split EPUB and PDF books into parts under a word budget
#[derive(Debug, Parser)]
#[command(name = "tomesplit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
