//! Blocking-signal detection
//!
//! All heuristics for recognising anti-automation rejections live here so
//! the rules can change without touching call sites.

/// Anti-bot vendor name, matched case-sensitively
pub const VENDOR_TOKEN: &str = "Cloudflare";

/// HTTP status used by the upstream to reject automated clients
pub const FORBIDDEN_STATUS: &str = "403";

/// Generic rejection keyword, matched case-insensitively
pub const BLOCKED_KEYWORD: &str = "blocked";

/// Whether an error message indicates an anti-automation rejection rather
/// than an ordinary network or parse failure
pub fn is_blocking_signal(error_text: &str) -> bool {
    error_text.contains(VENDOR_TOKEN)
        || error_text.contains(FORBIDDEN_STATUS)
        || error_text.to_lowercase().contains(BLOCKED_KEYWORD)
}
