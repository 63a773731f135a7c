//! Append-only, multi-consumer log of change batches.
//!
//! Entries carry monotonically increasing sequence numbers and live in a
//! contiguous arena (a `VecDeque` plus the sequence number of its front).
//! Every consumer holds its own cursor; whenever any cursor advances or a
//! consumer is dropped, entries below the minimum live cursor are freed.
//! Two independent consumers always observe the exact same batch sequence.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::PathUpdate;

#[derive(Debug, Default)]
struct LogInner {
    /// Retained entries; `entries[0]` has sequence number `base_seq`.
    entries: VecDeque<Arc<PathUpdate>>,
    /// Sequence number of the oldest retained entry.
    base_seq: u64,
    /// Sequence number the next appended entry will get.
    next_seq: u64,
    /// Live consumer cursors: consumer id -> next sequence to read.
    cursors: HashMap<u64, u64>,
    next_consumer_id: u64,
}

impl LogInner {
    /// Free entries every live consumer has already read.
    ///
    /// With no live consumers nothing is retained; a consumer created later
    /// starts at the trim point, not at sequence zero.
    fn trim(&mut self) {
        let watermark = self
            .cursors
            .values()
            .min()
            .copied()
            .unwrap_or(self.next_seq);
        while self.base_seq < watermark {
            self.entries.pop_front();
            self.base_seq += 1;
        }
    }
}

/// Append-only log of [`PathUpdate`] batches with independent consumers.
#[derive(Debug, Default)]
pub struct UpdateLog {
    inner: Arc<Mutex<LogInner>>,
}

impl UpdateLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch with the next sequence number.
    pub fn append(&self, batch: PathUpdate) {
        let mut inner = self.inner.lock();
        inner.entries.push_back(Arc::new(batch));
        inner.next_seq += 1;
    }

    /// Create a consumer starting at the oldest retained entry.
    pub fn new_consumer(&self) -> UpdateCursor {
        let mut inner = self.inner.lock();
        let id = inner.next_consumer_id;
        inner.next_consumer_id += 1;
        let start = inner.base_seq;
        inner.cursors.insert(id, start);
        UpdateCursor {
            inner: Arc::clone(&self.inner),
            id,
        }
    }

    /// Number of currently retained entries.
    pub fn retained(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Sequence number the next appended batch will get.
    pub fn next_sequence(&self) -> u64 {
        self.inner.lock().next_seq
    }
}

/// A consumer's position in the log. Dropping the cursor releases the
/// entries it was keeping alive.
#[derive(Debug)]
pub struct UpdateCursor {
    inner: Arc<Mutex<LogInner>>,
    id: u64,
}

impl Iterator for UpdateCursor {
    type Item = Arc<PathUpdate>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut inner = self.inner.lock();
        let pos = inner.cursors[&self.id];
        if pos >= inner.next_seq {
            return None;
        }
        let item = Arc::clone(&inner.entries[(pos - inner.base_seq) as usize]);
        inner.cursors.insert(self.id, pos + 1);
        inner.trim();
        Some(item)
    }
}

impl Drop for UpdateCursor {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        inner.cursors.remove(&self.id);
        inner.trim();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn batch(path: &str) -> PathUpdate {
        let mut creations = HashSet::new();
        creations.insert(PathBuf::from(path));
        PathUpdate::new(creations, HashSet::new(), HashSet::new())
    }

    #[test]
    fn test_two_consumers_see_identical_sequences() {
        let log = UpdateLog::new();
        let mut a = log.new_consumer();
        let mut b = log.new_consumer();

        log.append(batch("/r/one"));
        log.append(batch("/r/two"));

        let seen_a: Vec<_> = a.by_ref().collect();
        let seen_b: Vec<_> = b.by_ref().collect();
        assert_eq!(seen_a.len(), 2);
        assert_eq!(seen_a, seen_b);
        assert!(a.next().is_none());
    }

    #[test]
    fn test_slow_consumer_pins_entries() {
        let log = UpdateLog::new();
        let mut fast = log.new_consumer();
        let _slow = log.new_consumer();

        log.append(batch("/r/one"));
        log.append(batch("/r/two"));

        assert_eq!(fast.by_ref().count(), 2);
        // The slow consumer has seen nothing, so nothing may be freed.
        assert_eq!(log.retained(), 2);
    }

    #[test]
    fn test_trim_after_all_consumers_advance() {
        let log = UpdateLog::new();
        let mut a = log.new_consumer();
        let mut b = log.new_consumer();

        log.append(batch("/r/one"));
        log.append(batch("/r/two"));

        assert_eq!(a.by_ref().count(), 2);
        assert!(b.next().is_some());
        assert_eq!(log.retained(), 1);
        assert!(b.next().is_some());
        assert_eq!(log.retained(), 0);
    }

    #[test]
    fn test_dropping_consumer_releases_its_entries() {
        let log = UpdateLog::new();
        let mut a = log.new_consumer();
        let slow = log.new_consumer();

        log.append(batch("/r/one"));
        assert_eq!(a.by_ref().count(), 1);
        assert_eq!(log.retained(), 1);

        drop(slow);
        assert_eq!(log.retained(), 0);
    }

    #[test]
    fn test_late_consumer_starts_at_trim_point() {
        let log = UpdateLog::new();
        let mut a = log.new_consumer();

        log.append(batch("/r/one"));
        log.append(batch("/r/two"));
        assert!(a.next().is_some());

        // Entry 0 is trimmed, entry 1 retained: the late consumer starts at
        // the oldest retained entry, not at "now".
        let mut late = log.new_consumer();
        let seen: Vec<_> = late.by_ref().collect();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains_creation(std::path::Path::new("/r/two")));
    }

    #[test]
    fn test_sequence_numbers_are_monotonic() {
        let log = UpdateLog::new();
        assert_eq!(log.next_sequence(), 0);
        log.append(batch("/r/one"));
        log.append(batch("/r/two"));
        assert_eq!(log.next_sequence(), 2);
    }
}
