//! Application model types: `App` and `Focus`.

use std::sync::Arc;

use crate::library::Track;

/// Which list the cursor keys move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Library,
    Queue,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Arc<Track>>,
    pub selected: usize,
    pub queue_selected: usize,
    pub focus: Focus,
    pub current_dir: Option<String>,
    pub metadata_window: bool,
    /// One-line message for the status box (last error, last action).
    pub status_message: Option<String>,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: tracks.into_iter().map(Arc::new).collect(),
            selected: 0,
            queue_selected: 0,
            focus: Focus::Library,
            current_dir: None,
            metadata_window: false,
            status_message: None,
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Library => Focus::Queue,
            Focus::Queue => Focus::Library,
        };
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Arc<Track>> {
        self.tracks.get(self.selected)
    }

    /// Move the cursor of the focused list down, stopping at the end.
    pub fn next(&mut self, queue_len: usize) {
        let (cursor, len) = self.cursor(queue_len);
        if *cursor + 1 < len {
            *cursor += 1;
        }
    }

    /// Move the cursor of the focused list up, stopping at the top.
    pub fn prev(&mut self, queue_len: usize) {
        let (cursor, _) = self.cursor(queue_len);
        *cursor = cursor.saturating_sub(1);
    }

    pub fn select_first(&mut self, queue_len: usize) {
        let (cursor, _) = self.cursor(queue_len);
        *cursor = 0;
    }

    pub fn select_last(&mut self, queue_len: usize) {
        let (cursor, len) = self.cursor(queue_len);
        *cursor = len.saturating_sub(1);
    }

    /// Keep the queue cursor inside a queue that may have shrunk.
    pub fn clamp_queue_selection(&mut self, queue_len: usize) {
        self.queue_selected = self.queue_selected.min(queue_len.saturating_sub(1));
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    fn cursor(&mut self, queue_len: usize) -> (&mut usize, usize) {
        match self.focus {
            Focus::Library => (&mut self.selected, self.tracks.len()),
            Focus::Queue => (&mut self.queue_selected, queue_len),
        }
    }
}
