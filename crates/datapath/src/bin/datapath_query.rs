//! `datapath-query`: collect the nodes a DataPath matches in a document.
//!
//! Usage:
//!   datapath-query '<path>' [--origin <data-path>] [--schema <file>]
//!
//! The document is read from stdin. Each match is printed as one line of
//! JSON. Set `RUST_LOG` for diagnostics on stderr.

use clap::Parser;
use datapath::query_cli::{run_query, QueryArgs};
use std::io::{self, Read, Write};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = QueryArgs::parse();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match run_query(buf.trim(), &args) {
        Ok(lines) => {
            let mut stdout = io::stdout().lock();
            for line in lines {
                if let Err(e) = writeln!(stdout, "{line}") {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
