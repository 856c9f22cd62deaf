//! docregistry CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, prints errors to stderr
//! and exits non-zero on failure. Configuration, the ledger and all request
//! handling are owned by the CLI module.

use docregistry::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
