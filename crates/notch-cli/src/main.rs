mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::serve::ServeArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "notch",
    about = "Order step/notch tracking: run the service or manage orders on disk",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding one JSON file per order (default: ./data)
    #[arg(long, global = true, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Print a stored order
    Show {
        /// Order number
        order_no: String,

        /// Print steps as `step - notch` lines (overrides --json)
        #[arg(long)]
        text: bool,
    },

    /// Parse step text and save it as an order, replacing any previous steps
    Save {
        /// Order number
        order_no: String,

        /// Read step text from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Parse step text without saving anything
    Check {
        /// Read step text from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = cli.data_dir.as_deref();

    let result = match cli.command {
        Commands::Serve(args) => cmd::serve::run(args, data_dir),
        Commands::Show { order_no, text } => cmd::order::show(data_dir, &order_no, text, cli.json),
        Commands::Save { order_no, file } => {
            cmd::order::save(data_dir, &order_no, file.as_deref(), cli.json)
        }
        Commands::Check { file } => cmd::order::check(file.as_deref(), cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
