//! Edit Command Definitions
//!
//! One variant per mutation kind. Each command captures exactly the
//! pre-state needed to restore it losslessly, is immutable once
//! constructed, and refers to its target entry by id — the document keeps
//! sole ownership of the entries themselves.
//!
//! Commands whose revert depends on state that may have vanished by apply
//! time (`Remove`, `Reorder`) validate at construction and refuse to build
//! against a missing entry or out-of-range position, so the undo stack can
//! never hold a command it cannot revert.

use serde::Serialize;
use tracing::warn;

use crate::core::subtitles::{SubtitleDocument, SubtitleEntry};
use crate::core::{EditorError, EditorResult, EntryId, TimeCode};

// =============================================================================
// Entry Fields
// =============================================================================

/// The visible fields of a subtitle entry that can be edited in place
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryField {
    Start,
    End,
    Speaker,
    Text,
}

impl EntryField {
    /// Reads the field's current textual value
    pub fn read(&self, entry: &SubtitleEntry) -> String {
        match self {
            EntryField::Start => entry.start.to_string(),
            EntryField::End => entry.end.to_string(),
            EntryField::Speaker => entry.speaker.clone(),
            EntryField::Text => entry.text.clone(),
        }
    }

    /// Writes a textual value into the field. Time fields run through
    /// timecode normalization, so loose input never fails here.
    pub fn write(&self, entry: &mut SubtitleEntry, value: &str) {
        match self {
            EntryField::Start => entry.start = TimeCode::normalize(value),
            EntryField::End => entry.end = TimeCode::normalize(value),
            EntryField::Speaker => entry.speaker = value.to_string(),
            EntryField::Text => entry.text = value.to_string(),
        }
    }
}

// =============================================================================
// Edit Commands
// =============================================================================

/// A reversible edit to the subtitle document
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditCommand {
    /// Insert an entry at a position (append when absent or out of range)
    Insert {
        entry: SubtitleEntry,
        position: Option<usize>,
    },
    /// Remove an entry, remembering where it was
    Remove {
        entry_id: EntryId,
        entry: SubtitleEntry,
        original_position: usize,
    },
    /// Overwrite one visible field of an entry
    SetField {
        entry_id: EntryId,
        field: EntryField,
        old_value: String,
        new_value: String,
    },
    /// Shift an entry's start and end together (timeline drag, middle zone)
    Move {
        entry_id: EntryId,
        old_start: TimeCode,
        old_end: TimeCode,
        new_start: TimeCode,
        new_end: TimeCode,
    },
    /// Change an entry's start or end independently (timeline drag, edge
    /// handles)
    Resize {
        entry_id: EntryId,
        old_start: TimeCode,
        old_end: TimeCode,
        new_start: TimeCode,
        new_end: TimeCode,
    },
    /// Move an entry to a new position, renumbering the whole document
    Reorder {
        old_position: usize,
        new_position: usize,
        /// Every entry's display index before the move, restored verbatim
        /// on revert
        original_indices: Vec<(EntryId, u32)>,
    },
}

impl EditCommand {
    /// Builds an insert command
    pub fn insert(entry: SubtitleEntry, position: Option<usize>) -> Self {
        EditCommand::Insert { entry, position }
    }

    /// Builds a remove command, capturing the entry's position and a full
    /// snapshot for revert. Fails if the entry is not in the document.
    pub fn remove(document: &SubtitleDocument, entry_id: &EntryId) -> EditorResult<Self> {
        let (original_position, entry) = document
            .entries()
            .iter()
            .enumerate()
            .find(|(_, e)| &e.id == entry_id)
            .map(|(i, e)| (i, e.clone()))
            .ok_or_else(|| EditorError::EntryNotFound(entry_id.clone()))?;
        Ok(EditCommand::Remove {
            entry_id: entry_id.clone(),
            entry,
            original_position,
        })
    }

    /// Builds a field edit, capturing the field's current value as the
    /// revert target
    pub fn set_field(entry: &SubtitleEntry, field: EntryField, new_value: impl Into<String>) -> Self {
        EditCommand::SetField {
            entry_id: entry.id.clone(),
            field,
            old_value: field.read(entry),
            new_value: new_value.into(),
        }
    }

    /// Builds a move command from a drag session's snapshot and outcome
    pub fn move_entry(
        entry_id: EntryId,
        old_start: TimeCode,
        old_end: TimeCode,
        new_start: TimeCode,
        new_end: TimeCode,
    ) -> Self {
        EditCommand::Move {
            entry_id,
            old_start,
            old_end,
            new_start,
            new_end,
        }
    }

    /// Builds a resize command from a drag session's snapshot and outcome
    pub fn resize(
        entry_id: EntryId,
        old_start: TimeCode,
        old_end: TimeCode,
        new_start: TimeCode,
        new_end: TimeCode,
    ) -> Self {
        EditCommand::Resize {
            entry_id,
            old_start,
            old_end,
            new_start,
            new_end,
        }
    }

    /// Builds a reorder command, validating both positions and capturing
    /// every entry's current display index
    pub fn reorder(
        document: &SubtitleDocument,
        old_position: usize,
        new_position: usize,
    ) -> EditorResult<Self> {
        let len = document.len();
        for position in [old_position, new_position] {
            if position >= len {
                return Err(EditorError::PositionOutOfRange { position, len });
            }
        }
        let original_indices = document
            .entries()
            .iter()
            .map(|e| (e.id.clone(), e.index))
            .collect();
        Ok(EditCommand::Reorder {
            old_position,
            new_position,
            original_indices,
        })
    }

    /// Command kind name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            EditCommand::Insert { .. } => "insert",
            EditCommand::Remove { .. } => "remove",
            EditCommand::SetField { .. } => "setField",
            EditCommand::Move { .. } => "move",
            EditCommand::Resize { .. } => "resize",
            EditCommand::Reorder { .. } => "reorder",
        }
    }

    /// The entry whose visible fields this command mutates.
    ///
    /// `Some` only for the field-mutating variants (`SetField`, `Move`,
    /// `Resize`): those need an entry-updated notification after apply and
    /// revert. Membership variants return `None` — the document raises its
    /// own added/removed notifications.
    pub fn affected_entry(&self) -> Option<&EntryId> {
        match self {
            EditCommand::SetField { entry_id, .. }
            | EditCommand::Move { entry_id, .. }
            | EditCommand::Resize { entry_id, .. } => Some(entry_id),
            EditCommand::Insert { .. }
            | EditCommand::Remove { .. }
            | EditCommand::Reorder { .. } => None,
        }
    }

    /// Applies the forward mutation.
    ///
    /// For `Move`/`Resize` the semantics are "set to the new values": the
    /// drag session has usually written them provisionally already, and
    /// re-asserting them is safe.
    pub fn apply(&self, document: &mut SubtitleDocument) -> EditorResult<()> {
        match self {
            EditCommand::Insert { entry, position } => {
                document.insert(*position, entry.clone());
                document.renumber();
                Ok(())
            }
            EditCommand::Remove { entry_id, .. } => {
                document
                    .remove(entry_id)
                    .ok_or_else(|| EditorError::EntryNotFound(entry_id.clone()))?;
                document.renumber();
                Ok(())
            }
            EditCommand::SetField {
                entry_id,
                field,
                new_value,
                ..
            } => {
                let entry = document
                    .get_mut(entry_id)
                    .ok_or_else(|| EditorError::EntryNotFound(entry_id.clone()))?;
                field.write(entry, new_value);
                Ok(())
            }
            EditCommand::Move {
                entry_id,
                new_start,
                new_end,
                ..
            }
            | EditCommand::Resize {
                entry_id,
                new_start,
                new_end,
                ..
            } => {
                let entry = document
                    .get_mut(entry_id)
                    .ok_or_else(|| EditorError::EntryNotFound(entry_id.clone()))?;
                entry.start = *new_start;
                entry.end = *new_end;
                Ok(())
            }
            EditCommand::Reorder {
                old_position,
                new_position,
                ..
            } => {
                document.move_entry(*old_position, *new_position)?;
                document.renumber();
                Ok(())
            }
        }
    }

    /// Reverts the mutation, restoring the captured pre-state
    pub fn revert(&self, document: &mut SubtitleDocument) -> EditorResult<()> {
        match self {
            EditCommand::Insert { entry, .. } => {
                // Identity-based removal: the id, not the entry's current
                // field values, names what to take back out.
                document
                    .remove(&entry.id)
                    .ok_or_else(|| EditorError::EntryNotFound(entry.id.clone()))?;
                document.renumber();
                Ok(())
            }
            EditCommand::Remove {
                entry,
                original_position,
                ..
            } => {
                document.insert(Some(*original_position), entry.clone());
                document.renumber();
                Ok(())
            }
            EditCommand::SetField {
                entry_id,
                field,
                old_value,
                ..
            } => {
                let entry = document
                    .get_mut(entry_id)
                    .ok_or_else(|| EditorError::EntryNotFound(entry_id.clone()))?;
                field.write(entry, old_value);
                Ok(())
            }
            EditCommand::Move {
                entry_id,
                old_start,
                old_end,
                ..
            }
            | EditCommand::Resize {
                entry_id,
                old_start,
                old_end,
                ..
            } => {
                let entry = document
                    .get_mut(entry_id)
                    .ok_or_else(|| EditorError::EntryNotFound(entry_id.clone()))?;
                entry.start = *old_start;
                entry.end = *old_end;
                Ok(())
            }
            EditCommand::Reorder {
                old_position,
                new_position,
                original_indices,
            } => {
                // Structural edits may have shifted positions since apply;
                // clamp both ends instead of refusing the revert.
                let len = document.len();
                if len > 0 {
                    let from = (*new_position).min(len - 1);
                    let to = (*old_position).min(len - 1);
                    document.move_entry(from, to)?;
                }
                // Restore the captured index values verbatim rather than
                // renumbering. Entries removed since the capture are
                // skipped; the surviving document stays usable.
                for (entry_id, index) in original_indices {
                    match document.get_mut(entry_id) {
                        Some(entry) => entry.index = *index,
                        None => warn!(%entry_id, "reorder revert: captured entry no longer present"),
                    }
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventBus;
    use std::rc::Rc;

    fn empty_doc() -> SubtitleDocument {
        SubtitleDocument::new(Rc::new(EventBus::new()))
    }

    fn seeded_doc() -> SubtitleDocument {
        let mut doc = empty_doc();
        for (text, start, end) in [
            ("first", "00:00:00,0", "00:00:03,5"),
            ("second", "00:00:04,0", "00:00:07,2"),
            ("third", "00:00:08,0", "00:00:12,0"),
        ] {
            doc.insert(None, SubtitleEntry::new().with_text(text).with_times(start, end));
        }
        doc.renumber();
        doc
    }

    // -------------------------------------------------------------------------
    // Insert / Remove Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_insert_apply_revert_round_trip() {
        let mut doc = seeded_doc();
        let entry = SubtitleEntry::new()
            .with_text("inserted")
            .with_times("00:00:02,0", "00:00:03,0");
        let id = entry.id.clone();

        let cmd = EditCommand::insert(entry, Some(1));
        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.entries()[1].text, "inserted");
        assert_eq!(doc.entries()[1].index, 2);
        assert_eq!(doc.entries()[3].index, 4);

        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.len(), 3);
        assert!(doc.get(&id).is_none());
        let indexes: Vec<_> = doc.entries().iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_out_of_range_appends() {
        let mut doc = seeded_doc();
        let cmd = EditCommand::insert(
            SubtitleEntry::new().with_text("tail"),
            Some(42),
        );
        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.entries()[3].text, "tail");
    }

    #[test]
    fn test_remove_requires_known_entry() {
        let doc = seeded_doc();
        let err = EditCommand::remove(&doc, &"nope".to_string()).unwrap_err();
        assert!(matches!(err, EditorError::EntryNotFound(_)));
    }

    #[test]
    fn test_remove_apply_revert_round_trip() {
        let mut doc = seeded_doc();
        let snapshot = doc.entries().to_vec();
        let id = doc.entries()[1].id.clone();

        let cmd = EditCommand::remove(&doc, &id).unwrap();
        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.len(), 2);
        assert!(doc.get(&id).is_none());

        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.entries(), &snapshot[..]);
    }

    #[test]
    fn test_remove_revert_clamps_position() {
        let mut doc = seeded_doc();
        let id = doc.entries()[2].id.clone();
        let cmd = EditCommand::remove(&doc, &id).unwrap();
        cmd.apply(&mut doc).unwrap();

        // Shrink the document so the captured position is past the end.
        let first = doc.entries()[0].id.clone();
        let second = doc.entries()[1].id.clone();
        doc.remove(&first);
        doc.remove(&second);

        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.entries()[0].id, id);
    }

    // -------------------------------------------------------------------------
    // Field Edit Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_set_field_round_trip() {
        let mut doc = seeded_doc();
        let id = doc.entries()[0].id.clone();
        let cmd = EditCommand::set_field(doc.get(&id).unwrap(), EntryField::Text, "rewritten");

        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.get(&id).unwrap().text, "rewritten");

        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.get(&id).unwrap().text, "first");
    }

    #[test]
    fn test_set_field_normalizes_time_input() {
        let mut doc = seeded_doc();
        let id = doc.entries()[0].id.clone();
        let cmd = EditCommand::set_field(doc.get(&id).unwrap(), EntryField::Start, "1:30");

        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.get(&id).unwrap().start.to_string(), "00:01:30,0");

        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.get(&id).unwrap().start.to_string(), "00:00:00,0");
    }

    #[test]
    fn test_set_field_missing_entry_errors() {
        let mut doc = seeded_doc();
        let ghost = SubtitleEntry::new();
        let cmd = EditCommand::set_field(&ghost, EntryField::Speaker, "Narrator");
        assert!(matches!(
            cmd.apply(&mut doc),
            Err(EditorError::EntryNotFound(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Move / Resize Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_move_round_trip_restores_exact_times() {
        let mut doc = seeded_doc();
        let id = doc.entries()[1].id.clone();
        let cmd = EditCommand::move_entry(
            id.clone(),
            TimeCode::normalize("00:00:04,0"),
            TimeCode::normalize("00:00:07,2"),
            TimeCode::normalize("00:00:09,0"),
            TimeCode::normalize("00:00:12,2"),
        );

        cmd.apply(&mut doc).unwrap();
        let entry = doc.get(&id).unwrap();
        assert_eq!(entry.start.to_string(), "00:00:09,0");
        assert_eq!(entry.end.to_string(), "00:00:12,2");

        // Applying again is a no-op re-assert, not an error.
        cmd.apply(&mut doc).unwrap();

        cmd.revert(&mut doc).unwrap();
        let entry = doc.get(&id).unwrap();
        assert_eq!(entry.start.to_string(), "00:00:04,0");
        assert_eq!(entry.end.to_string(), "00:00:07,2");
    }

    #[test]
    fn test_resize_round_trip() {
        let mut doc = seeded_doc();
        let id = doc.entries()[0].id.clone();
        let cmd = EditCommand::resize(
            id.clone(),
            TimeCode::normalize("00:00:00,0"),
            TimeCode::normalize("00:00:03,5"),
            TimeCode::normalize("00:00:00,0"),
            TimeCode::normalize("00:00:05,0"),
        );

        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.get(&id).unwrap().end.to_string(), "00:00:05,0");

        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.get(&id).unwrap().end.to_string(), "00:00:03,5");
    }

    // -------------------------------------------------------------------------
    // Reorder Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_reorder_validates_positions() {
        let doc = seeded_doc();
        let err = EditCommand::reorder(&doc, 0, 3).unwrap_err();
        assert!(matches!(
            err,
            EditorError::PositionOutOfRange { position: 3, len: 3 }
        ));
    }

    #[test]
    fn test_reorder_renumbers_and_restores_indices() {
        let mut doc = seeded_doc();
        let order_before: Vec<_> = doc.entries().iter().map(|e| e.id.clone()).collect();

        let cmd = EditCommand::reorder(&doc, 0, 2).unwrap();
        cmd.apply(&mut doc).unwrap();

        let texts: Vec<_> = doc.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "third", "first"]);
        let indexes: Vec<_> = doc.entries().iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);

        cmd.revert(&mut doc).unwrap();
        let order_after: Vec<_> = doc.entries().iter().map(|e| e.id.clone()).collect();
        assert_eq!(order_after, order_before);
        let indexes: Vec<_> = doc.entries().iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[test]
    fn test_reorder_revert_skips_vanished_entries() {
        let mut doc = seeded_doc();
        let cmd = EditCommand::reorder(&doc, 0, 2).unwrap();
        cmd.apply(&mut doc).unwrap();

        let gone = doc.entries()[0].id.clone();
        doc.remove(&gone);

        // Revert still succeeds for the surviving entries.
        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_affected_entry_only_for_field_mutations() {
        let doc = seeded_doc();
        let id = doc.entries()[0].id.clone();

        let set = EditCommand::set_field(doc.get(&id).unwrap(), EntryField::Text, "x");
        assert_eq!(set.affected_entry(), Some(&id));

        let insert = EditCommand::insert(SubtitleEntry::new(), None);
        assert_eq!(insert.affected_entry(), None);

        let reorder = EditCommand::reorder(&doc, 0, 1).unwrap();
        assert_eq!(reorder.affected_entry(), None);
    }
}
