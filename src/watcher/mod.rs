//! File-system watching: registration, polling, and event reduction.
//!
//! # Architecture
//!
//! ```text
//! WatchBackend (notify, non-recursive per directory)
//!       |
//! WatchRegistrar  -- recursive registration, one-poll-cycle draining
//!       |
//! reducer::reduce -- burst events -> net PathUpdate
//! ```
//!
//! Everything here is pull-based: no background thread, no timers. Draining
//! happens inside whichever caller thread validates the cache.

mod backend;
mod error;
mod reducer;
mod registrar;

pub use backend::{NotifyBackend, NullBackend, RawEvent, RawEventKind, WatchBackend};
pub use error::WatchError;
pub use reducer::reduce;
pub use registrar::WatchRegistrar;
