//! Shared contract between the gallery engine and its storage targets.
//!
//! The engine never enumerates concrete backends: a target is just a
//! [`TargetStore`] produced by a [`TargetConnector`].

pub mod error;
pub mod query;
pub mod record;
pub mod target;

pub use error::{ErrorKind, StoreError};
pub use query::FindQuery;
pub use record::{MovieDocument, MovieRecord, NewMovie};
pub use target::{StoreFuture, TargetConnector, TargetDescriptor, TargetStore};

// ════════════════════════════════════════════════════════════════
//  Utilities
// ════════════════════════════════════════════════════════════════

/// Current Unix time in milliseconds.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Case-insensitive substring match on a title.
///
/// An empty (or whitespace-only) needle matches everything.
pub fn title_matches(title: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    title.to_lowercase().contains(&needle.to_lowercase())
}
