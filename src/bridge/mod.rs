//! Process bridge to isolated worker processes
//!
//! The worker boundary is a message-passing channel: identifiers go in as
//! arguments, one JSON document comes back on stdout. No state survives
//! between calls.

mod worker;

pub use worker::{DEFAULT_WORKER_TIMEOUT, ERROR_MARKER, WorkerBridge, worker_error};
