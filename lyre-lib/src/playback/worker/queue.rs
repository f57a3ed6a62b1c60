//! Worker-side play order.

use rand::Rng;

use crate::catalog::{Catalog, Track};

/// The catalog as the worker sees it, plus what is loaded and how the worker
/// moves on when a track ends.
#[derive(Debug, Default)]
pub(super) struct PlayQueue {
    catalog: Catalog,
    current: Option<usize>,
    shuffle: bool,
}

impl PlayQueue {
    /// Replace the catalog; nothing is loaded afterwards.
    pub(super) fn load(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        self.current = None;
    }

    pub(super) fn len(&self) -> usize {
        self.catalog.len()
    }

    pub(super) fn current(&self) -> Option<usize> {
        self.current
    }

    pub(super) fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub(super) fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    /// Make `index` the current track, if it exists.
    pub(super) fn select(&mut self, index: usize) -> Option<&Track> {
        let track = self.catalog.get(index)?;
        self.current = Some(index);
        Some(track)
    }

    /// Index to play once the current track has ended.
    ///
    /// Sequential order wraps to the start; shuffle picks any other track.
    pub(super) fn next_after_completion(&self) -> Option<usize> {
        let len = self.catalog.len();
        let current = self.current?;
        if len == 0 {
            return None;
        }

        if self.shuffle && len > 1 {
            let mut index = rand::thread_rng().gen_range(0..len - 1);
            if index >= current {
                index += 1;
            }
            Some(index)
        } else {
            Some((current + 1) % len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(len: i64) -> PlayQueue {
        let mut queue = PlayQueue::default();
        queue.load(Catalog::from_scan(
            (0..len).map(|id| Track::new(id, format!("track {id:02}"), "x")),
        ));
        queue
    }

    #[test]
    fn sequential_order_wraps() {
        let mut queue = queue(3);
        assert_eq!(queue.next_after_completion(), None);
        queue.select(2);
        assert_eq!(queue.next_after_completion(), Some(0));
        queue.select(0);
        assert_eq!(queue.next_after_completion(), Some(1));
    }

    #[test]
    fn shuffle_never_repeats_the_current_track() {
        let mut queue = queue(4);
        queue.set_shuffle(true);
        queue.select(1);
        for _ in 0..100 {
            let next = queue.next_after_completion().unwrap();
            assert_ne!(next, 1);
            assert!(next < 4);
        }
    }

    #[test]
    fn shuffle_with_one_track_replays_it() {
        let mut queue = queue(1);
        queue.set_shuffle(true);
        queue.select(0);
        assert_eq!(queue.next_after_completion(), Some(0));
    }

    #[test]
    fn select_out_of_range_keeps_current() {
        let mut queue = queue(2);
        queue.select(1);
        assert!(queue.select(5).is_none());
        assert_eq!(queue.current(), Some(1));
    }

    #[test]
    fn reload_clears_current() {
        let mut queue = queue(2);
        queue.select(0);
        queue.load(Catalog::default());
        assert_eq!(queue.current(), None);
        assert_eq!(queue.len(), 0);
    }
}
