//! CLI command implementations
//!
//! Each request runs in its own transaction with a fresh id and the host's
//! current UTC time. A mutating request that succeeds is committed and the
//! snapshot rewritten before its response is printed; a failed request is
//! aborted and leaves the ledger untouched.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::api::{ApiHandler, Request, Response};
use crate::config::RegistryConfig;
use crate::ledger::{MemoryLedger, TxContext, TxId};
use crate::observability::{log_event, Event, RegistryMetrics};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, read_requests, write_response};

/// Main CLI entry point
///
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Exec { config } => exec(&config),
        Command::Batch { config } => batch(&config),
    }
}

fn load_config(config_path: &Path) -> CliResult<RegistryConfig> {
    let config = RegistryConfig::load_or_default(config_path)?;
    config.apply_log_level()?;
    let path = config_path.display().to_string();
    let page_size = config.scan_page_size.to_string();
    log_event(
        Event::ConfigLoaded,
        &[("path", path.as_str()), ("scan_page_size", page_size.as_str())],
    );
    Ok(config)
}

/// Create an empty ledger snapshot
///
/// Refuses to overwrite an existing snapshot.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let ledger_path = config.ledger_path.as_path();

    if ledger_path.exists() {
        return Err(CliError::already_initialized(ledger_path));
    }

    MemoryLedger::new().save(ledger_path)?;
    let path = ledger_path.display().to_string();
    log_event(Event::LedgerPersisted, &[("height", "0"), ("path", path.as_str())]);

    write_response(&Response::success(json!({"initialized": true, "ledgerPath": path})))?;
    Ok(())
}

/// Execute one request from stdin
pub fn exec(config_path: &Path) -> CliResult<()> {
    let mut session = Session::open(load_config(config_path)?)?;
    let request = read_request()?;
    let response = session.execute(&request)?;
    write_response(&response)
}

/// Execute one request per stdin line until EOF
pub fn batch(config_path: &Path) -> CliResult<()> {
    let mut session = Session::open(load_config(config_path)?)?;

    for line in read_requests() {
        match line {
            Ok(request) => {
                let response = session.execute(&request)?;
                write_response(&response)?;
            }
            Err(e) => {
                // stdin is unusable; stop reading
                write_response(&Response::failure(e.code_str(), e.message()))?;
                break;
            }
        }
    }

    Ok(())
}

/// Ledger, handler and snapshot location for one CLI invocation
pub struct Session {
    config: RegistryConfig,
    ledger: MemoryLedger,
    handler: ApiHandler,
    metrics: Arc<RegistryMetrics>,
}

impl Session {
    /// Opens the snapshot at `config.ledger_path`, or starts empty
    pub fn open(config: RegistryConfig) -> CliResult<Self> {
        let ledger = MemoryLedger::open(&config.ledger_path)?;
        let path = config.ledger_path.display().to_string();
        let height = ledger.height().to_string();
        log_event(
            Event::LedgerOpened,
            &[("height", height.as_str()), ("path", path.as_str())],
        );

        let metrics = Arc::new(RegistryMetrics::new());
        Ok(Self {
            handler: ApiHandler::new(config.registry_options(), metrics.clone()),
            config,
            ledger,
            metrics,
        })
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    /// Runs one JSON request in a fresh transaction
    ///
    /// Request failures are reported in the returned response. Only ledger
    /// commit or snapshot failures are errors.
    pub fn execute(&mut self, json_request: &str) -> CliResult<Response> {
        let context = TxContext::new(TxId::generate(), Utc::now());
        self.execute_in(context, json_request)
            .map(|(response, _)| response)
    }

    /// Runs one JSON request under `context`; reports whether it committed
    pub fn execute_in(
        &mut self,
        context: TxContext,
        json_request: &str,
    ) -> CliResult<(Response, bool)> {
        let tx_id = context.tx_id().to_string();
        let mut tx = self.ledger.begin(context);

        let (response, mutating, op) = match Request::parse(json_request) {
            Ok(request) => (
                Response::from_result(self.handler.handle(&mut tx, &request)),
                request.is_mutating(),
                request.op(),
            ),
            Err(e) => (Response::error(&e), false, "unparsed"),
        };

        if let Some(code) = response.error_code() {
            tx.abort();
            self.metrics.increment_aborts();
            log_event(
                Event::TxAborted,
                &[("code", code), ("op", op), ("tx_id", tx_id.as_str())],
            );
            return Ok((response, false));
        }

        if !mutating {
            tx.abort();
            return Ok((response, false));
        }

        let receipt = tx.commit()?;
        self.metrics.increment_commits();
        let writes = receipt.writes.to_string();
        let height = receipt.height.to_string();
        log_event(
            Event::TxCommitted,
            &[
                ("height", height.as_str()),
                ("op", op),
                ("tx_id", tx_id.as_str()),
                ("writes", writes.as_str()),
            ],
        );

        self.ledger.save(&self.config.ledger_path)?;
        let path = self.config.ledger_path.display().to_string();
        log_event(
            Event::LedgerPersisted,
            &[("height", height.as_str()), ("path", path.as_str())],
        );

        Ok((response, true))
    }
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("docregistry.json");
        let ledger_path = temp_dir.path().join("ledger.json");

        let config = json!({
            "ledger_path": ledger_path.to_string_lossy()
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    fn session(temp_dir: &TempDir) -> Session {
        let config = RegistryConfig::load(&create_config(temp_dir)).unwrap();
        Session::open(config).unwrap()
    }

    #[test]
    fn test_init_creates_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        init(&config_path).unwrap();

        let ledger = MemoryLedger::load(temp_dir.path().join("ledger.json")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_init_refuses_reinit() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        init(&config_path).unwrap();

        let result = init(&config_path);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().code(),
            &CliErrorCode::AlreadyInitialized
        );
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("docregistry.json");
        fs::write(&config_path, r#"{"scan_page_size": 0}"#).unwrap();

        let result = init(&config_path);
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_mutation_is_committed_and_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        let response = session
            .execute(r#"{"op":"createDocument","scope":"public","document":{"documentId":"d1","institution":"BankA","userId":"u1"}}"#)
            .unwrap();
        assert!(response.is_success());
        assert_eq!(session.ledger().height(), 1);
        assert_eq!(session.metrics().snapshot().transactions_committed, 1);

        let reloaded = MemoryLedger::load(temp_dir.path().join("ledger.json")).unwrap();
        assert_eq!(&reloaded, session.ledger());
    }

    #[test]
    fn test_failed_request_is_aborted() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        let response = session
            .execute(r#"{"op":"updateState","scope":"private","documentId":"ghost","newState":"APPROVED"}"#)
            .unwrap();
        assert!(!response.is_success());
        assert_eq!(session.ledger().height(), 0);
        assert_eq!(session.metrics().snapshot().transactions_aborted, 1);
        assert!(!temp_dir.path().join("ledger.json").exists());
    }

    #[test]
    fn test_reads_do_not_commit() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        let (response, committed) = session
            .execute_in(
                TxContext::from_unix(TxId::new("read1"), 1_714_557_600, 0).unwrap(),
                r#"{"op":"queryByUser","scope":"private","userId":"u2"}"#,
            )
            .unwrap();
        assert_eq!(response, Response::success(json!([])));
        assert!(!committed);
        assert_eq!(session.metrics().snapshot().transactions_committed, 0);
    }

    #[test]
    fn test_state_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut session = session(&temp_dir);
            session
                .execute(r#"{"op":"createDocument","scope":"private","document":{"documentId":"d2","institution":"BankB","userId":"u2","name":"file.pdf","path":"/path","hash":"h123","state":"DRAFT"}}"#)
                .unwrap();
        }

        let mut session = session(&temp_dir);
        let response = session
            .execute(r#"{"op":"getDocumentById","scope":"private","documentId":"d2"}"#)
            .unwrap();
        assert!(response.to_json().contains("\"state\":\"DRAFT\""));
    }
}
