//! Observability for the storage layer
//!
//! Structured JSON logging of storage events. Logging is synchronous, has no
//! side effects on the operation being logged, and never fails the caller.
//!
//! ```ignore
//! use edgedrive::observability::{log_event, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! log_event(Event::DirectoryCreated, &[("path", "/srv/data/photos")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a storage event at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
