//! Burst-event reduction into net change batches.
//!
//! During one poll cycle a single path can produce many raw events (editors
//! write temp files, directories get replaced wholesale). Only the first and
//! last observed kind matter; everything in between is noise. The reduction
//! table:
//!
//! | first \ last | CREATED  | MODIFIED | DELETED |
//! |--------------|----------|----------|---------|
//! | CREATED      | CREATED  | CREATED  | (none)  |
//! | MODIFIED     | MODIFIED | MODIFIED | DELETED |
//! | DELETED      | MODIFIED | MODIFIED | DELETED |
//!
//! `OVERFLOW` as the last observed kind drops the path from the batch
//! entirely; recovery by rescan is the caller's call, not made here. An
//! `OVERFLOW` first kind means unknown prior state and is treated like
//! `MODIFIED`-first.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::roots::normalize;
use crate::update::PathUpdate;

use super::backend::{RawEvent, RawEventKind};

/// Reduce one poll cycle's raw events into a net change batch.
///
/// Pure: no file-system access. Paths are lexically normalized so the same
/// file reported with different spellings coalesces into one.
pub fn reduce(events: &[RawEvent]) -> PathUpdate {
    // First and last kind per path, in arrival order.
    let mut observed: HashMap<PathBuf, (RawEventKind, RawEventKind)> = HashMap::new();
    for event in events {
        let path = normalize(&event.path);
        observed
            .entry(path)
            .and_modify(|(_, last)| *last = event.kind)
            .or_insert((event.kind, event.kind));
    }

    let mut creations = HashSet::new();
    let mut changes = HashSet::new();
    let mut deletions = HashSet::new();

    for (path, (first, last)) in observed {
        match net_kind(first, last) {
            Some(RawEventKind::Created) => {
                creations.insert(path);
            }
            Some(RawEventKind::Modified) => {
                changes.insert(path);
            }
            Some(RawEventKind::Deleted) => {
                deletions.insert(path);
            }
            _ => {}
        }
    }

    PathUpdate::new(creations, changes, deletions)
}

/// The reduction table. `None` removes the path from the batch.
fn net_kind(first: RawEventKind, last: RawEventKind) -> Option<RawEventKind> {
    use RawEventKind::*;

    if last == Overflow {
        return None;
    }
    match first {
        Created => match last {
            Deleted => None,
            _ => Some(Created),
        },
        // DELETED followed by anything but DELETED is a modification, not a
        // creation: the object existed at some point before this cycle.
        Deleted => match last {
            Deleted => Some(Deleted),
            _ => Some(Modified),
        },
        Modified | Overflow => match last {
            Deleted => Some(Deleted),
            _ => Some(Modified),
        },
    }
}
