pub mod cache;
pub mod config;
pub mod logging;
pub mod roots;
pub mod update;
pub mod walker;
pub mod watcher;

pub use cache::{CacheError, DisabledCache, FsOverlayCache, OverlayCache, PathIndex};
pub use config::Settings;
pub use roots::OverlayRoots;
pub use update::{PathUpdate, UpdateCursor, UpdateLog};
pub use watcher::{RawEvent, RawEventKind, WatchBackend, WatchError, WatchRegistrar};
