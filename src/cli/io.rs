//! Line-oriented JSON I/O
//!
//! Requests arrive one per line on stdin; each produces exactly one
//! response envelope line on stdout, flushed before the next is read.

use std::io::{self, BufRead, Write};

use crate::api::Response;

use super::errors::{CliError, CliResult};

/// First request line on stdin
pub fn read_request() -> CliResult<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(line)
}

/// Request lines from stdin until EOF; blank lines are skipped
pub fn read_requests() -> impl Iterator<Item = CliResult<String>> {
    io::stdin()
        .lock()
        .lines()
        .map(|line| line.map_err(CliError::from))
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
}

/// Writes `response` as one line on stdout
pub fn write_response(response: &Response) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", response.to_json())?;
    stdout.flush()?;
    Ok(())
}
