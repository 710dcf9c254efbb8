use calibrator::cli::{CliArgs, run_cli};
use calibrator::output::OutputFormatter;
use clap::Parser;
use std::path::PathBuf;

/// Re-import the extra titles and formats reported by `calibredb check_library`.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Library root; defaults to the configured path or ~/checkouts/ebooks/
    library_path: Option<PathBuf>,

    /// Configuration file to use instead of the default lookup
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show what would be staged and imported without changing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    let cli = Cli::parse();
    let args = CliArgs {
        library_path: cli.library_path,
        config: cli.config,
        dry_run: cli.dry_run,
    };

    if let Err(e) = run_cli(&args) {
        OutputFormatter::error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}
