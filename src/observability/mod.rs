//! Observability for tabrec
//!
//! Structured JSON-lines logging of record and dataset lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Logging never fails the operation being logged
//! 3. No async or background threads
//!
//! # Usage
//!
//! ```ignore
//! use tabrec::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::RecordSaved, &[("rows", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Severity an event is logged at.
pub fn severity_for(event: Event) -> Severity {
    if event.is_failure() {
        Severity::Error
    } else if event.is_recovered() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_for(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_for_events() {
        assert_eq!(severity_for(Event::RecordSaved), Severity::Info);
        assert_eq!(severity_for(Event::DatasetDiscoverySkipped), Severity::Warn);
        assert_eq!(severity_for(Event::RecordLoadFailed), Severity::Error);
    }

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(Event::DatasetDiscovered);
        log_event_with_fields(Event::RecordLoaded, &[("rows", "3")]);
    }
}
