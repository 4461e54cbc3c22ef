//! Acquisition of raw documents from the upstream source
//!
//! The [`Acquirer`] decides between the primary client and the worker
//! process fallback; [`is_blocking_signal`] is the single place where
//! anti-automation rejections are recognised.

mod document;
mod selector;
mod signal;

pub use document::{AcquisitionAttempt, AttemptOutcome, RawDocument, Strategy};
pub(crate) use document::is_empty_body;
pub use selector::{Acquirer, Acquisition};
pub use signal::{BLOCKED_KEYWORD, FORBIDDEN_STATUS, VENDOR_TOKEN, is_blocking_signal};
