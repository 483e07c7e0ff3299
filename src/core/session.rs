//! Editing Session
//!
//! One session owns the subtitle document, the undo/redo stacks, the
//! selection, and the in-flight drag — the whole mutable state of one open
//! editing context. Sessions are self-contained: no command or drag session
//! ever refers to another session's state, and nothing here is a process
//! singleton.

use std::path::PathBuf;
use std::rc::Rc;

use tracing::debug;

use super::commands::{CommandStack, EditCommand, EntryField};
use super::events::{EditorEvent, EventBus};
use super::subtitles::{SubtitleBatch, SubtitleDocument, SubtitleEntry};
use super::timeline::{DragMode, DragSession, EntryGeometry, TimeScale};
use super::{EditorError, EditorResult, EntryId, TimeSec};

/// An open subtitle editing context
pub struct EditorSession {
    bus: Rc<EventBus>,
    document: SubtitleDocument,
    history: CommandStack,
    scale: TimeScale,
    selected: Option<EntryId>,
    drag: Option<DragSession>,
    /// Where the current entries came from; transcription batches have no
    /// path, which later forces a save-as
    source_path: Option<PathBuf>,
}

impl EditorSession {
    /// Creates an empty session with its own bus and default time scale
    pub fn new() -> Self {
        let bus = Rc::new(EventBus::new());
        Self {
            document: SubtitleDocument::new(Rc::clone(&bus)),
            history: CommandStack::new(Rc::clone(&bus)),
            scale: TimeScale::default(),
            selected: None,
            drag: None,
            source_path: None,
            bus,
        }
    }

    /// Overrides the timeline scale
    pub fn with_time_scale(mut self, scale: TimeScale) -> Self {
        self.scale = scale;
        self
    }

    /// The session's notification bus, for views to subscribe on
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// The subtitle document
    pub fn document(&self) -> &SubtitleDocument {
        &self.document
    }

    /// The active timeline scale
    pub fn time_scale(&self) -> TimeScale {
        self.scale
    }

    /// Source file of the current entries, if any
    pub fn source_path(&self) -> Option<&PathBuf> {
        self.source_path.as_ref()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replaces the whole document with a fresh batch (file-open and
    /// transcription-finished paths).
    ///
    /// Runs as one bulk operation with membership notifications suppressed,
    /// and drops undo history: the commands on the stacks refer to entries
    /// that no longer exist.
    pub fn load_batch(&mut self, batch: SubtitleBatch) {
        debug!(entries = batch.entries.len(), "loading subtitle batch");
        self.drag = None;
        self.selected = None;
        self.source_path = batch.file_path;
        self.document.replace_all(batch.entries);
        self.history.clear_history();
    }

    /// Removes every entry (transcription-started path)
    pub fn clear_all(&mut self) {
        self.drag = None;
        self.selected = None;
        self.source_path = None;
        self.document.clear();
        self.history.clear_history();
    }

    // =========================================================================
    // Selection and Playback
    // =========================================================================

    /// Currently selected entry
    pub fn selected(&self) -> Option<&EntryId> {
        self.selected.as_ref()
    }

    /// Selects an entry and announces it, carrying a seek position derived
    /// from the entry's start time
    pub fn select(&mut self, entry_id: &EntryId) -> EditorResult<()> {
        let entry = self
            .document
            .get(entry_id)
            .ok_or_else(|| EditorError::EntryNotFound(entry_id.clone()))?;
        let seek_sec = entry.start.to_seconds();
        self.selected = Some(entry_id.clone());
        self.bus.publish(&EditorEvent::EntrySelected {
            entry_id: entry_id.clone(),
            seek_sec,
        });
        Ok(())
    }

    /// Sets the selection without announcing it (another view already
    /// initiated the selection; re-announcing would loop)
    pub fn select_external(&mut self, entry_id: &EntryId) {
        if self.document.get(entry_id).is_some() {
            self.selected = Some(entry_id.clone());
        }
    }

    /// Updates every entry's active flag from the playhead position and
    /// returns the first active entry, if any
    pub fn set_playhead(&mut self, time_sec: TimeSec) -> Option<EntryId> {
        self.document.update_active_flags(time_sec)
    }

    // =========================================================================
    // Grid Edits
    // =========================================================================

    /// Creates a new entry after the selection (or at the end) and returns
    /// its id
    pub fn add_entry(&mut self) -> EditorResult<EntryId> {
        let position = self.selected.as_ref().and_then(|id| {
            let selected_index = self.document.position_of(id)?;
            // Appending is the default; only a selection strictly inside
            // the sequence opens a slot after itself.
            (selected_index + 1 < self.document.len()).then_some(selected_index + 1)
        });

        let entry = SubtitleEntry::new();
        let entry_id = entry.id.clone();
        self.history
            .execute(EditCommand::insert(entry, position), &mut self.document)?;
        Ok(entry_id)
    }

    /// Deletes an entry through a reversible command
    pub fn delete_entry(&mut self, entry_id: &EntryId) -> EditorResult<()> {
        let command = EditCommand::remove(&self.document, entry_id)?;
        self.history.execute(command, &mut self.document)?;
        if self.selected.as_ref() == Some(entry_id) {
            self.selected = None;
        }
        Ok(())
    }

    /// Applies an edited cell value. Unchanged values commit nothing.
    pub fn edit_field(
        &mut self,
        entry_id: &EntryId,
        field: EntryField,
        new_value: &str,
    ) -> EditorResult<()> {
        let entry = self
            .document
            .get(entry_id)
            .ok_or_else(|| EditorError::EntryNotFound(entry_id.clone()))?;
        if field.read(entry) == new_value {
            return Ok(());
        }
        let command = EditCommand::set_field(entry, field, new_value);
        self.history.execute(command, &mut self.document)
    }

    /// Moves an entry to a new position (drag-and-drop in the grid)
    pub fn reorder_entry(&mut self, old_position: usize, new_position: usize) -> EditorResult<()> {
        if old_position == new_position {
            return Ok(());
        }
        let command = EditCommand::reorder(&self.document, old_position, new_position)?;
        self.history.execute(command, &mut self.document)
    }

    // =========================================================================
    // Undo / Redo
    // =========================================================================

    /// Undoes the last command; false when there was nothing to undo
    pub fn undo(&mut self) -> EditorResult<bool> {
        self.history.undo(&mut self.document)
    }

    /// Redoes the last undone command; false when there was nothing to redo
    pub fn redo(&mut self) -> EditorResult<bool> {
        self.history.redo(&mut self.document)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // =========================================================================
    // Timeline Drags
    // =========================================================================

    /// Starts a drag over an entry block. `x_in_entry` is the pointer
    /// position relative to the block's left edge and picks the drag mode.
    pub fn pointer_down(
        &mut self,
        entry_id: &EntryId,
        pointer_x: f64,
        x_in_entry: f64,
    ) -> EditorResult<()> {
        let entry = self
            .document
            .get(entry_id)
            .ok_or_else(|| EditorError::EntryNotFound(entry_id.clone()))?;
        let geometry = self.scale.entry_geometry(entry);
        let mode = DragMode::from_hit(x_in_entry, geometry.width);
        self.drag = Some(DragSession::begin(entry, mode, pointer_x, self.scale));
        Ok(())
    }

    /// Feeds the pointer's current position into the active drag. Without
    /// an active drag this is a no-op.
    pub fn pointer_move(&mut self, pointer_x: f64) -> EditorResult<Option<EntryGeometry>> {
        match &self.drag {
            Some(session) => session.update(&mut self.document, pointer_x).map(Some),
            None => Ok(None),
        }
    }

    /// Ends the active drag, committing one command when the times changed.
    /// Returns true if a command was committed.
    pub fn pointer_up(&mut self) -> EditorResult<bool> {
        let Some(session) = self.drag.take() else {
            return Ok(false);
        };
        match session.finish(&self.document)? {
            Some(command) => {
                self.history.execute(command, &mut self.document)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Abandons the active drag (pointer capture lost), restoring the
    /// pre-drag times
    pub fn pointer_cancel(&mut self) -> EditorResult<()> {
        match self.drag.take() {
            Some(session) => session.cancel(&mut self.document),
            None => Ok(()),
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
