//! Structured logging for streamhook.
//!
//! Subscriber initialisation, the signal logger behind `log_signals`, and
//! redaction of element values before they reach a log line.

pub mod logger;
pub mod redact;
pub mod signal_logger;

pub use logger::init_logger;
pub use redact::render_element;
pub use signal_logger::SignalLogger;
