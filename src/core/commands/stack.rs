//! Command Stack Module
//!
//! Undo/redo engine: owns the two command stacks and the invariants
//! governing them. This is the single path through which edits reach the
//! document — views never mutate entries directly outside a drag session's
//! provisional writes.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::commands::EditCommand;
use crate::core::events::{EditorEvent, EventBus};
use crate::core::subtitles::SubtitleDocument;
use crate::core::EditorResult;

/// Default bound on retained history
const DEFAULT_MAX_HISTORY: usize = 100;

// =============================================================================
// History Entry
// =============================================================================

/// Entry in the undo/redo history
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// The executed command
    pub command: EditCommand,
    /// When the command was (re-)executed
    pub timestamp: String,
}

impl HistoryEntry {
    fn new(command: EditCommand) -> Self {
        Self {
            command,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// =============================================================================
// Command Stack
// =============================================================================

/// Executes commands and manages undo/redo history.
///
/// Invariants: executing a new command clears the redo stack; undo is
/// available iff the undo stack is non-empty, redo iff the redo stack is.
/// Undoing or redoing with an empty stack is a defined no-op, not an error.
pub struct CommandStack {
    /// Undo stack
    undo_stack: VecDeque<HistoryEntry>,
    /// Redo stack
    redo_stack: VecDeque<HistoryEntry>,
    /// Maximum history size
    max_history: usize,
    /// Notification bus for entry-updated events
    bus: Rc<EventBus>,
}

impl CommandStack {
    /// Creates an empty stack publishing on the given bus
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history: DEFAULT_MAX_HISTORY,
            bus,
        }
    }

    /// Sets the maximum history size
    pub fn with_max_history(mut self, size: usize) -> Self {
        self.max_history = size;
        self
    }

    /// Executes a command and pushes it onto the undo stack.
    ///
    /// Any redo history is invalidated: a new forward action makes the
    /// previously undone future unreachable.
    pub fn execute(
        &mut self,
        command: EditCommand,
        document: &mut SubtitleDocument,
    ) -> EditorResult<()> {
        command.apply(document)?;
        self.notify_entry_updated(&command, document);

        self.redo_stack.clear();
        self.undo_stack.push_back(HistoryEntry::new(command));
        while self.undo_stack.len() > self.max_history {
            self.undo_stack.pop_front();
        }
        Ok(())
    }

    /// Undoes the last command. Returns `Ok(false)` when there is nothing
    /// to undo.
    pub fn undo(&mut self, document: &mut SubtitleDocument) -> EditorResult<bool> {
        let Some(entry) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        entry.command.revert(document)?;
        self.notify_entry_updated(&entry.command, document);
        self.redo_stack.push_back(entry);
        Ok(true)
    }

    /// Redoes the last undone command. Returns `Ok(false)` when there is
    /// nothing to redo.
    pub fn redo(&mut self, document: &mut SubtitleDocument) -> EditorResult<bool> {
        let Some(entry) = self.redo_stack.pop_back() else {
            return Ok(false);
        };
        entry.command.apply(document)?;
        self.notify_entry_updated(&entry.command, document);
        self.undo_stack.push_back(HistoryEntry::new(entry.command));
        Ok(true)
    }

    /// Returns true if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of commands in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of commands in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Kind of the command that would be undone next
    pub fn last_command_kind(&self) -> Option<&'static str> {
        self.undo_stack.back().map(|e| e.command.kind())
    }

    /// Clears all history (undo and redo)
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Publishes an entry-updated notification for field-mutating commands.
    ///
    /// Best-effort: subscriber failures are isolated inside the bus and
    /// never unwind into command execution. Membership variants are quiet
    /// here — the document already raised added/removed notifications.
    fn notify_entry_updated(&self, command: &EditCommand, document: &SubtitleDocument) {
        if let Some(entry_id) = command.affected_entry() {
            if let Some(entry) = document.get(entry_id) {
                self.bus.publish(&EditorEvent::EntryUpdated {
                    entry: entry.clone(),
                });
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
