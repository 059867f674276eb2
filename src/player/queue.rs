//! The play queue.
//!
//! `items` is the order tracks will be played in. `original_order` is the
//! list as it was handed to [`Queue::set`] and is what [`Queue::unshuffle`]
//! restores. `current_index` is `None` only for an empty or never started
//! queue; otherwise it points into `items`.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::library::Track;

use super::state::RepeatMode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("index {index} is out of range for a queue of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("the playing track cannot be removed")]
    RemoveCurrent,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Clone, Default)]
pub struct Queue {
    items: Vec<Arc<Track>>,
    current_index: Option<usize>,
    original_order: Vec<Arc<Track>>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue. An empty list clears it; a start index past the
    /// end of a non-empty list is rejected and leaves the queue untouched.
    pub fn set(&mut self, tracks: Vec<Arc<Track>>, start_index: usize) -> Result<(), QueueError> {
        if tracks.is_empty() {
            self.clear();
            return Ok(());
        }
        if start_index >= tracks.len() {
            return Err(QueueError::IndexOutOfRange {
                index: start_index,
                len: tracks.len(),
            });
        }
        self.original_order = tracks.clone();
        self.items = tracks;
        self.current_index = Some(start_index);
        Ok(())
    }

    /// Add to the end of the play order. The original order is not touched.
    pub fn append(&mut self, track: Arc<Track>) {
        self.items.push(track);
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Arc<Track>, QueueError> {
        if index >= self.items.len() {
            return Err(QueueError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        if Some(index) == self.current_index {
            return Err(QueueError::RemoveCurrent);
        }
        let removed = self.items.remove(index);
        if let Some(cur) = self.current_index {
            if index < cur {
                self.current_index = Some(cur - 1);
            }
        }
        Ok(removed)
    }

    /// Move the current track to the front and permute everything after it.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.current_index {
            Some(cur) => {
                self.items.swap(0, cur);
                self.items[1..].shuffle(rng);
                self.current_index = Some(0);
            }
            None => self.items.shuffle(rng),
        }
    }

    /// Restore the original order and follow the current track into it.
    ///
    /// If the current track is not part of the original order (appended
    /// after the queue was set), the index is kept when still in bounds and
    /// clamped to the last item otherwise.
    pub fn unshuffle(&mut self) {
        let playing_id = self.current().map(|t| t.id.clone());
        self.items = self.original_order.clone();

        if self.items.is_empty() {
            self.current_index = None;
            return;
        }

        let found = playing_id
            .as_deref()
            .and_then(|id| self.items.iter().position(|t| t.id == id));
        self.current_index = match (found, self.current_index) {
            (Some(i), _) => Some(i),
            (None, Some(cur)) => Some(cur.min(self.items.len() - 1)),
            (None, None) => None,
        };
    }

    /// Step the current index. Returns the new index, or `None` when the
    /// queue is exhausted in that direction (index unchanged).
    pub fn advance(&mut self, direction: Direction, repeat: RepeatMode) -> Option<usize> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        let wrap = repeat == RepeatMode::All;
        let next = match (self.current_index, direction) {
            (None, Direction::Next) => Some(0),
            (None, Direction::Previous) => None,
            (Some(i), Direction::Next) if i + 1 < len => Some(i + 1),
            (Some(_), Direction::Next) => wrap.then_some(0),
            (Some(i), Direction::Previous) if i > 0 => Some(i - 1),
            (Some(_), Direction::Previous) => wrap.then_some(len - 1),
        };
        if next.is_some() {
            self.current_index = next;
        }
        next
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.original_order.clear();
        self.current_index = None;
    }

    pub fn current(&self) -> Option<&Arc<Track>> {
        self.current_index.and_then(|i| self.items.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Track>> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Arc<Track>] {
        &self.items
    }

    pub fn original_order(&self) -> &[Arc<Track>] {
        &self.original_order
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn can_go_next(&self, repeat: RepeatMode) -> bool {
        match self.current_index {
            _ if self.items.is_empty() => false,
            Some(i) => i + 1 < self.items.len() || repeat == RepeatMode::All,
            None => true,
        }
    }

    pub fn can_go_previous(&self, repeat: RepeatMode) -> bool {
        match self.current_index {
            _ if self.items.is_empty() => false,
            Some(i) => i > 0 || repeat == RepeatMode::All,
            None => false,
        }
    }
}
