//! Observability for the registry
//!
//! - Structured JSON logging (`Logger`)
//! - Typed lifecycle events (`Event`)
//! - Monotonic counters (`RegistryMetrics`)
//!
//! Observability is read-only: it never changes the outcome of an operation,
//! and a failed log write is ignored.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, RegistryMetrics};

/// Log an event at the severity its kind implies
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

fn severity_of(event: Event) -> Severity {
    if event.is_error() {
        Severity::Error
    } else if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    }
}
