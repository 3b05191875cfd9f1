mod aggregate;
mod cli;
mod deps;
mod error;
mod export;
mod filter;
mod fmt;
mod loader;
mod models;
mod pipeline;
mod present;
mod settings;
#[cfg(feature = "tui")]
mod tui;

use std::io::stderr;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use cli::{Cli, Commands};

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => {
            eprintln!("Invalid log level '{level}', defaulting to 'warn'");
            LevelFilter::WARN
        }
    }
}

// Stdout carries reports and JSON, so logs go to stderr.
fn setup_logging(level: LevelFilter) {
    let terminal_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(parse_log_level(&cli.log_level));

    let result = match cli.command {
        Commands::Analyze {
            source,
            filters,
            json,
            no_charts,
        } => cli::analyze::run(&source, &filters, json, no_charts),
        Commands::Options { source, year } => cli::options::run(&source, year),
        Commands::Export {
            source,
            filters,
            format,
            include_data,
            output,
        } => cli::export::run(&source, &filters, format, include_data, output),
        Commands::Dashboard { source } => cli::run_dashboard(&source),
        Commands::Deps { output } => cli::deps::run(output),
        Commands::Config { sheet, export_dir } => cli::config::run(sheet, export_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
