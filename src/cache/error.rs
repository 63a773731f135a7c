//! Error types for the overlay cache service.

use thiserror::Error;

/// Errors surfaced by the public query operations.
///
/// The live cache never returns these: registration and walk failures
/// degrade internally and are only logged. The disabled service uses
/// [`CacheError::CachingDisabled`] to fail fast instead of answering with a
/// misleadingly empty result.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    #[error("caching is disabled; overlay queries are not supported")]
    CachingDisabled,
}
