mod commands;
mod output;
mod telemetry;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "decon",
    version,
    about = "Recover base prices from a sales export by stripping process and coating surcharges"
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "info", "decon_core=debug")
    #[arg(long, global = true, default_value = "warn", value_name = "FILTER")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deconstruct a sales export (XLSX, CSV or pre-parsed JSON)
    Run {
        /// Path to the sales export
        input_file: PathBuf,

        /// Pricing rule text file ("chem Single: 50" per line)
        #[arg(short, long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Manual price entry, e.g. --set "Coating_Nano Wipe=15". Wins over the rule file
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Custom catalog JSON (default: built-in catalog)
        #[arg(short, long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Output format: table (default), json or csv
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write results to a .csv, .json or .xlsx file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// List every diagnostic and skipped row
        #[arg(long)]
        verbose: bool,
    },
    /// Check an export's columns without pricing anything
    Check {
        /// Path to the sales export
        input_file: PathBuf,

        /// Custom catalog JSON (default: built-in catalog)
        #[arg(short, long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },
    /// Inspect pricing rules and catalogs
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// Parse a rule text file and show the resolved pricing table
    Parse {
        /// Path to the rule text file
        file: PathBuf,

        /// Custom catalog JSON (default: built-in catalog)
        #[arg(short, long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Also print the recognized and implied rules in normalized rule text form
        #[arg(long)]
        normalized: bool,
    },
    /// Print the active catalog
    Catalog {
        /// Custom catalog JSON (default: built-in catalog)
        #[arg(short, long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },
    /// Validate a custom catalog file
    Validate {
        /// Path to catalog JSON
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Run {
            input_file,
            rules,
            set,
            catalog,
            output,
            out,
            verbose,
        } => commands::run::run(input_file, rules, set, catalog, &output, out, verbose),
        Commands::Check {
            input_file,
            catalog,
        } => commands::check::run(&input_file, catalog),
        Commands::Rules { action } => match action {
            RulesAction::Parse {
                file,
                catalog,
                normalized,
            } => commands::rules::parse(&file, catalog, normalized),
            RulesAction::Catalog { catalog } => commands::rules::catalog(catalog),
            RulesAction::Validate { file } => commands::rules::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
