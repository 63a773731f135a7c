//! The overlay resolution cache: index, maintenance, and service façade.
//!
//! # Architecture
//!
//! ```text
//! FsOverlayCache (one Mutex per instance)
//!   - validate: drain poll cycle -> reduce -> UpdateLog -> apply
//!   - query: path_overlays / resolve_file against the PathIndex
//!         |
//!    +----+---------------+
//!    |                    |
//! PathIndex        CacheMaintainer
//! (name -> paths)  (creations expand, deletions cascade)
//! ```

mod error;
mod index;
mod maintainer;
mod service;

pub use error::CacheError;
pub use index::PathIndex;
pub use maintainer::CacheMaintainer;
pub use service::{DisabledCache, FsOverlayCache, OverlayCache, from_settings};
