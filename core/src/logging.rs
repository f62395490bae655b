//! Deduplicated warn logging.
//!
//! Cross-variant binding incompatibilities are expected during search and can
//! recur thousands of times with the same message; each distinct message is
//! logged once per process.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

static WARNED: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Emit `tracing::warn!` for this message unless an identical message was
/// already logged.
pub fn unique_warn(message: &str) {
    let warned = WARNED.get_or_init(|| Mutex::new(HashSet::new()));
    let mut guard = match warned.lock() {
        Ok(g) => g,
        // A poisoned dedup set only affects log noise.
        Err(poisoned) => poisoned.into_inner(),
    };
    if guard.insert(message.to_string()) {
        tracing::warn!("{message}");
    }
}
