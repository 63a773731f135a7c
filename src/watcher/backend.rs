//! Watch backend abstraction over the OS notification primitive.
//!
//! Registration is always non-recursive (one call per directory); recursion
//! is the [`WatchRegistrar`](super::WatchRegistrar)'s job. Polling is
//! non-blocking: `try_events` returns whatever is immediately available and
//! never waits.

use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, unbounded};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::error::WatchError;

/// Raw event kinds delivered by the OS notification primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEventKind {
    Created,
    Modified,
    Deleted,
    /// The OS dropped events for this path; its true state is unknown.
    Overflow,
}

/// One raw watch event: a concrete path plus the observed kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub kind: RawEventKind,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, kind: RawEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// The OS notification primitive, reduced to the two operations the cache
/// needs: non-recursive per-directory registration and non-blocking polling.
pub trait WatchBackend: Send {
    /// Register a watch on a single directory (non-recursive).
    fn register(&mut self, dir: &Path) -> Result<(), WatchError>;

    /// Drain all immediately available events, in arrival order. Never blocks.
    fn try_events(&mut self) -> Vec<RawEvent>;
}

/// Production backend on top of `notify::RecommendedWatcher`.
///
/// Events are pushed from notify's callback into a crossbeam channel and
/// drained synchronously by whichever caller thread polls. Dropping the
/// backend closes the native watch handle; a poll racing with shutdown sees
/// a disconnected channel and returns empty.
pub struct NotifyBackend {
    watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
}

impl NotifyBackend {
    pub fn new() -> Result<Self, WatchError> {
        let (tx, rx) = unbounded();
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;
        Ok(Self { watcher, rx })
    }
}

impl WatchBackend for NotifyBackend {
    fn register(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::RegistrationFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn try_events(&mut self) -> Vec<RawEvent> {
        let mut out = Vec::new();
        for res in self.rx.try_iter() {
            match res {
                Ok(event) => translate(event, &mut out),
                Err(e) => {
                    tracing::error!("[backend] watch error: {e}");
                }
            }
        }
        out
    }
}

/// Map one notify event onto raw events, one per affected path.
fn translate(event: Event, out: &mut Vec<RawEvent>) {
    if event.need_rescan() {
        for path in event.paths {
            out.push(RawEvent::new(path, RawEventKind::Overflow));
        }
        return;
    }

    match event.kind {
        EventKind::Create(_) => {
            for path in event.paths {
                out.push(RawEvent::new(path, RawEventKind::Created));
            }
        }
        EventKind::Remove(_) => {
            for path in event.paths {
                out.push(RawEvent::new(path, RawEventKind::Deleted));
            }
        }
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            // A rename is a delete at the old path and a create at the new one.
            RenameMode::From => {
                for path in event.paths {
                    out.push(RawEvent::new(path, RawEventKind::Deleted));
                }
            }
            RenameMode::To => {
                for path in event.paths {
                    out.push(RawEvent::new(path, RawEventKind::Created));
                }
            }
            RenameMode::Both => {
                let mut paths = event.paths.into_iter();
                if let Some(from) = paths.next() {
                    out.push(RawEvent::new(from, RawEventKind::Deleted));
                }
                if let Some(to) = paths.next() {
                    out.push(RawEvent::new(to, RawEventKind::Created));
                }
            }
            _ => {
                for path in event.paths {
                    out.push(RawEvent::new(path, RawEventKind::Modified));
                }
            }
        },
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => {
            for path in event.paths {
                out.push(RawEvent::new(path, RawEventKind::Modified));
            }
        }
        EventKind::Access(_) => {}
    }
}

/// Backend used when the platform watcher cannot be created.
///
/// Registration succeeds silently and polling never yields anything, so the
/// cache serves its statically built index and `get_updates` stays empty.
#[derive(Debug, Default)]
pub struct NullBackend;

impl WatchBackend for NullBackend {
    fn register(&mut self, _dir: &Path) -> Result<(), WatchError> {
        Ok(())
    }

    fn try_events(&mut self) -> Vec<RawEvent> {
        Vec::new()
    }
}
