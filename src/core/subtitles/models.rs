//! Subtitle Data Models
//!
//! Defines the subtitle entry record and the document that owns the ordered
//! entry sequence.
//!
//! Ownership: the document exclusively owns every entry. Edit commands and
//! drag sessions refer to entries by [`EntryId`] plus captured scalar
//! values — never through a second owning handle.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::events::{EditorEvent, EventBus};
use crate::core::{EditorError, EditorResult, EntryId, TimeCode, TimeSec};

/// Speaker assigned to entries created without one
pub const DEFAULT_SPEAKER: &str = "Speaker1";

fn generate_entry_id() -> EntryId {
    ulid::Ulid::new().to_string()
}

// =============================================================================
// Subtitle Entry
// =============================================================================

/// A single timed subtitle entry.
///
/// `index` is the 1-based display number and is recomputed after every
/// structural change. `active` tracks whether the playhead is currently
/// inside the entry; it is transient presentation state and takes no part
/// in undo history or serialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleEntry {
    /// Unique identifier (ULID)
    #[serde(default = "generate_entry_id")]
    pub id: EntryId,
    /// 1-based display number
    #[serde(default)]
    pub index: u32,
    /// Start timestamp
    pub start: TimeCode,
    /// End timestamp; callers keep this at least one tenth after `start`
    pub end: TimeCode,
    /// Speaker name
    pub speaker: String,
    /// Subtitle text (may contain line breaks)
    pub text: String,
    /// Whether the playhead is inside this entry
    #[serde(skip)]
    pub active: bool,
}

impl SubtitleEntry {
    /// Creates an empty entry at time zero
    pub fn new() -> Self {
        Self {
            id: generate_entry_id(),
            index: 0,
            start: TimeCode::ZERO,
            end: TimeCode::ZERO,
            speaker: DEFAULT_SPEAKER.to_string(),
            text: String::new(),
            active: false,
        }
    }

    /// Sets the start/end times from loose text input
    pub fn with_times(mut self, start: &str, end: &str) -> Self {
        self.start = TimeCode::normalize(start);
        self.end = TimeCode::normalize(end);
        self
    }

    /// Sets the subtitle text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the speaker
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = speaker.into();
        self
    }

    /// Duration in seconds
    pub fn duration_sec(&self) -> TimeSec {
        (self.end.to_seconds() - self.start.to_seconds()).max(0.0)
    }

    /// Returns true if the given playback time falls inside this entry
    /// (both bounds inclusive)
    pub fn contains_time(&self, time_sec: TimeSec) -> bool {
        time_sec >= self.start.to_seconds() && time_sec <= self.end.to_seconds()
    }
}

impl Default for SubtitleEntry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Subtitle Batch
// =============================================================================

/// A complete ordered entry sequence handed to the editor in one piece,
/// produced by the file-open and transcription-finished paths.
#[derive(Clone, Debug, Default)]
pub struct SubtitleBatch {
    /// Source file, if the batch came from disk. Transcription batches have
    /// none, which later forces a save-as.
    pub file_path: Option<PathBuf>,
    /// Entries in display order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleBatch {
    pub fn new(file_path: Option<PathBuf>, entries: Vec<SubtitleEntry>) -> Self {
        Self { file_path, entries }
    }

    pub fn from_entries(entries: Vec<SubtitleEntry>) -> Self {
        Self {
            file_path: None,
            entries,
        }
    }
}

// =============================================================================
// Subtitle Document
// =============================================================================

/// The ordered, exclusively-owning collection of subtitle entries.
///
/// Order is meaningful: it equals display and playback order. Inserting and
/// removing entries raises membership notifications on the bus; bulk
/// operations suppress them for their duration so notification handlers
/// cannot re-enter a structural mutation mid-rebuild.
pub struct SubtitleDocument {
    entries: Vec<SubtitleEntry>,
    bus: Rc<EventBus>,
    suppress_membership: Cell<bool>,
}

impl SubtitleDocument {
    /// Creates an empty document publishing on the given bus
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self {
            entries: Vec::new(),
            bus,
            suppress_membership: Cell::new(false),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the document has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in display order
    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    /// Looks up an entry by id
    pub fn get(&self, id: &EntryId) -> Option<&SubtitleEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Looks up an entry by id, mutably
    pub fn get_mut(&mut self, id: &EntryId) -> Option<&mut SubtitleEntry> {
        self.entries.iter_mut().find(|e| &e.id == id)
    }

    /// Position of an entry in the sequence
    pub fn position_of(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Entry at a position
    pub fn entry_at(&self, position: usize) -> Option<&SubtitleEntry> {
        self.entries.get(position)
    }

    /// Inserts an entry at the given position, appending when the position
    /// is absent or past the end. Raises an entry-added notification.
    pub fn insert(&mut self, position: Option<usize>, entry: SubtitleEntry) {
        let position = position
            .filter(|p| *p < self.entries.len())
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry.clone());
        self.notify_membership(EditorEvent::EntryAdded { entry });
    }

    /// Removes an entry by id, returning it. Raises an entry-removed
    /// notification when the entry existed.
    pub fn remove(&mut self, id: &EntryId) -> Option<SubtitleEntry> {
        let position = self.position_of(id)?;
        let entry = self.entries.remove(position);
        self.notify_membership(EditorEvent::EntryRemoved {
            entry: entry.clone(),
        });
        Some(entry)
    }

    /// Moves the entry at `from` to `to`. Reordering changes no membership,
    /// so no notification is raised.
    pub fn move_entry(&mut self, from: usize, to: usize) -> EditorResult<()> {
        let len = self.entries.len();
        for position in [from, to] {
            if position >= len {
                return Err(EditorError::PositionOutOfRange { position, len });
            }
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Renumbers every entry's display index to its 1-based position
    pub fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.index = i as u32 + 1;
        }
    }

    /// Replaces the whole document with a fresh batch, with membership
    /// notifications suppressed for the duration of the rebuild.
    pub fn replace_all(&mut self, entries: Vec<SubtitleEntry>) {
        self.suppress_membership.set(true);
        self.entries.clear();
        self.entries.extend(entries);
        self.suppress_membership.set(false);
        self.renumber();
    }

    /// Removes every entry, with membership notifications suppressed
    pub fn clear(&mut self) {
        self.suppress_membership.set(true);
        self.entries.clear();
        self.suppress_membership.set(false);
    }

    /// Updates every entry's active flag from the playhead position and
    /// returns the first active entry, if any.
    ///
    /// Active flags are transient presentation state, not edits; they
    /// bypass the command path on purpose.
    pub fn update_active_flags(&mut self, time_sec: TimeSec) -> Option<EntryId> {
        let mut first_active = None;
        for entry in &mut self.entries {
            entry.active = entry.contains_time(time_sec);
            if entry.active && first_active.is_none() {
                first_active = Some(entry.id.clone());
            }
        }
        first_active
    }

    fn notify_membership(&self, event: EditorEvent) {
        if !self.suppress_membership.get() {
            self.bus.publish(&event);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
