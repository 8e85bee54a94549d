mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stmtx",
    version,
    about = "Extract transaction tables from bank and payment statements"
)]
struct Cli {
    /// Log every page and extractor decision to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a statement (PDF, XLSX or text) into a spreadsheet
    Convert {
        /// Path to the statement
        input_file: PathBuf,

        /// Spreadsheet to write
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: PathBuf,

        /// Output kind: xlsx or csv (default: from the output file extension)
        #[arg(long)]
        sink: Option<String>,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Extract and print the transaction tables without writing a spreadsheet
    Extract {
        /// Path to the statement
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Print positional date/description/debit/credit/balance records
        #[arg(long)]
        transactions: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// List the built-in bank formats
    Formats,
}

/// Engine settings shared by `convert` and `extract`. Flags override the
/// config file.
#[derive(Args)]
pub struct EngineArgs {
    /// JSON options file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pages processed in parallel
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Per-page timeout for pdftotext/OCR, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Drop cells beyond this many columns
    #[arg(long, value_name = "N")]
    max_columns: Option<usize>,

    /// Do not OCR pages without text
    #[arg(long)]
    no_ocr: bool,

    /// Bank formats to enable, in order (comma separated)
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    formats: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("stmtx_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stmtx_core=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input_file,
            out,
            sink,
            engine,
        } => commands::convert::run(input_file, out, sink.as_deref(), &engine),
        Commands::Extract {
            input_file,
            output,
            transactions,
            engine,
        } => commands::extract::run(input_file, &output, transactions, &engine),
        Commands::Formats => commands::formats::list(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
