//! CLI module for docregistry
//!
//! A reference host around the in-memory ledger:
//! - init: Create an empty ledger snapshot
//! - exec: Run one request from stdin in one transaction
//! - batch: Run one transaction per stdin line

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{batch, exec, init, run, run_command, Session};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_requests, write_response};
