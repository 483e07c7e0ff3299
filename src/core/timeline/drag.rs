//! Drag Session State Machine
//!
//! Translates pointer motion over a subtitle block into provisional time
//! edits, and — at release — into at most one reversible command.
//!
//! A session is anchored at pointer-down: it snapshots the entry's current
//! times and geometry, decides its mode from the hit zone (left handle,
//! body, right handle), and keeps that mode for its whole lifetime. Every
//! pointer-move recomputes from the snapshot plus the *cumulative* delta
//! since the anchor; pointer events arrive at irregular granularity, and
//! anchoring each computation to the original snapshot keeps rounding from
//! accumulating across many small increments.
//!
//! During the drag the entry's live start/end are overwritten directly so
//! the views track the pointer. Only the commit at pointer-up constructs an
//! immutable command snapshot and reaches the undo stack; the command's
//! apply simply re-asserts the values the drag already wrote.

use crate::core::commands::EditCommand;
use crate::core::subtitles::{SubtitleDocument, SubtitleEntry};
use crate::core::timeline::{EntryGeometry, TimeScale};
use crate::core::{EditorError, EditorResult, EntryId, TimeCode};

/// Width of the resize handles on each edge of an entry block, in pixels
pub const HANDLE_WIDTH: f64 = 5.0;

/// Minimum entry duration enforced while resizing, in seconds
pub const MIN_DURATION_SECS: f64 = 1.0;

// =============================================================================
// Drag Mode
// =============================================================================

/// What a drag gesture does to the entry under it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    /// Shift the whole block, preserving its duration
    Moving,
    /// Pull the left edge: start time changes, end time stays
    ResizingStart,
    /// Pull the right edge: end time changes, start time stays
    ResizingEnd,
}

impl DragMode {
    /// Picks the mode from the pointer position within the entry block.
    ///
    /// The block is split into three zones by the fixed handle width; the
    /// zone under the initial press decides the mode for the whole session.
    pub fn from_hit(x_in_entry: f64, entry_width: f64) -> Self {
        if x_in_entry <= HANDLE_WIDTH {
            DragMode::ResizingStart
        } else if x_in_entry >= entry_width - HANDLE_WIDTH {
            DragMode::ResizingEnd
        } else {
            DragMode::Moving
        }
    }
}

// =============================================================================
// Drag Session
// =============================================================================

/// Transient state of one pointer drag over an entry block.
///
/// Created at pointer-down, fed cumulative pointer positions while the
/// button is held, and consumed at pointer-up (into one command, or
/// nothing) or on cancellation (restoring the snapshot).
#[derive(Debug)]
pub struct DragSession {
    mode: DragMode,
    entry_id: EntryId,
    anchor_x: f64,
    original_start: TimeCode,
    original_end: TimeCode,
    original_left: f64,
    original_width: f64,
    scale: TimeScale,
}

impl DragSession {
    /// Starts a session over an entry.
    ///
    /// Snapshots the entry's *current* values — a new pointer-down always
    /// re-snapshots, so consecutive drags never accumulate.
    pub fn begin(entry: &SubtitleEntry, mode: DragMode, anchor_x: f64, scale: TimeScale) -> Self {
        let geometry = scale.entry_geometry(entry);
        Self {
            mode,
            entry_id: entry.id.clone(),
            anchor_x,
            original_start: entry.start,
            original_end: entry.end,
            original_left: geometry.left,
            original_width: geometry.width,
            scale,
        }
    }

    /// The session's fixed mode
    pub fn mode(&self) -> DragMode {
        self.mode
    }

    /// The dragged entry
    pub fn entry_id(&self) -> &EntryId {
        &self.entry_id
    }

    /// Applies the pointer's current position, provisionally overwriting
    /// the entry's start/end, and returns the block's new geometry.
    pub fn update(
        &self,
        document: &mut SubtitleDocument,
        pointer_x: f64,
    ) -> EditorResult<EntryGeometry> {
        let delta = pointer_x - self.anchor_x;
        let (start, end) = match self.mode {
            DragMode::Moving => self.shifted_times(delta),
            DragMode::ResizingStart => self.resized_start_times(delta),
            DragMode::ResizingEnd => self.resized_end_times(delta),
        };

        let entry = document
            .get_mut(&self.entry_id)
            .ok_or_else(|| EditorError::EntryNotFound(self.entry_id.clone()))?;
        entry.start = start;
        entry.end = end;
        Ok(self.scale.entry_geometry(entry))
    }

    /// Both times shifted by the same delta, clamped to the timeline start
    fn shifted_times(&self, delta: f64) -> (TimeCode, TimeCode) {
        let dt = self.scale.pixel_to_time_delta(delta);
        let start = (self.original_start.to_seconds() + dt).max(0.0);
        // End derives from the same delta; the clamp against the (possibly
        // adjusted) start runs afterwards.
        let mut end = (self.original_end.to_seconds() + dt).max(0.0);
        if end < start + MIN_DURATION_SECS {
            end = start + MIN_DURATION_SECS;
        }
        (TimeCode::from_seconds(start), TimeCode::from_seconds(end))
    }

    /// Left handle: start recomputed from the pixel position, end untouched
    fn resized_start_times(&self, delta: f64) -> (TimeCode, TimeCode) {
        let mut new_left = self.original_left + delta;
        let mut new_width = self.original_width - delta;

        // Crossing the timeline start absorbs the overflow into the width.
        if new_left < 0.0 {
            new_width += new_left;
            new_left = 0.0;
        }

        // Enforce the minimum duration by pulling the left edge back.
        let min_width = self.scale.time_to_pixel(MIN_DURATION_SECS);
        if new_width < min_width {
            new_left = self.original_left + self.original_width - min_width;
        }
        if new_left < 0.0 {
            new_left = 0.0;
        }

        let start = self.scale.pixel_to_time_delta(new_left).max(0.0);
        (TimeCode::from_seconds(start), self.original_end)
    }

    /// Right handle: end recomputed from the width, start untouched
    fn resized_end_times(&self, delta: f64) -> (TimeCode, TimeCode) {
        let min_width = self.scale.time_to_pixel(MIN_DURATION_SECS);
        let new_width = (self.original_width + delta).max(min_width);
        let end = self
            .scale
            .pixel_to_time_delta(self.original_left + new_width);
        (self.original_start, TimeCode::from_seconds(end))
    }

    /// Ends the session at pointer-up.
    ///
    /// Returns `None` when the entry's times match the snapshot (a no-op
    /// drag commits nothing); otherwise exactly one command carrying the
    /// snapshot and the current values. The entry already holds the new
    /// values, so executing the command re-asserts them idempotently.
    pub fn finish(self, document: &SubtitleDocument) -> EditorResult<Option<EditCommand>> {
        let entry = document
            .get(&self.entry_id)
            .ok_or_else(|| EditorError::EntryNotFound(self.entry_id.clone()))?;

        if entry.start == self.original_start && entry.end == self.original_end {
            return Ok(None);
        }

        let command = match self.mode {
            DragMode::Moving => EditCommand::move_entry(
                self.entry_id,
                self.original_start,
                self.original_end,
                entry.start,
                entry.end,
            ),
            DragMode::ResizingStart | DragMode::ResizingEnd => EditCommand::resize(
                self.entry_id,
                self.original_start,
                self.original_end,
                entry.start,
                entry.end,
            ),
        };
        Ok(Some(command))
    }

    /// Abandons the session (pointer capture lost), restoring the
    /// snapshot. Nothing is committed.
    pub fn cancel(self, document: &mut SubtitleDocument) -> EditorResult<()> {
        let entry = document
            .get_mut(&self.entry_id)
            .ok_or_else(|| EditorError::EntryNotFound(self.entry_id.clone()))?;
        entry.start = self.original_start;
        entry.end = self.original_end;
        Ok(())
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

    fn doc_with_entry(start: &str, end: &str) -> (SubtitleDocument, EntryId) {
        let mut doc = SubtitleDocument::new(Rc::new(EventBus::new()));
        let entry = SubtitleEntry::new().with_text("cue").with_times(start, end);
        let id = entry.id.clone();
        doc.insert(None, entry);
        doc.renumber();
        (doc, id)
    }

    fn begin(doc: &SubtitleDocument, id: &EntryId, mode: DragMode) -> DragSession {
        DragSession::begin(doc.get(id).unwrap(), mode, 0.0, TimeScale::default())
    }

    fn times(doc: &SubtitleDocument, id: &EntryId) -> (String, String) {
        let entry = doc.get(id).unwrap();
        (entry.start.to_string(), entry.end.to_string())
    }

    // -------------------------------------------------------------------------
    // Hit Zone Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_hit_zones() {
        assert_eq!(DragMode::from_hit(0.0, 100.0), DragMode::ResizingStart);
        assert_eq!(DragMode::from_hit(5.0, 100.0), DragMode::ResizingStart);
        assert_eq!(DragMode::from_hit(50.0, 100.0), DragMode::Moving);
        assert_eq!(DragMode::from_hit(95.0, 100.0), DragMode::ResizingEnd);
        assert_eq!(DragMode::from_hit(100.0, 100.0), DragMode::ResizingEnd);
    }

    // -------------------------------------------------------------------------
    // Move Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_move_scenario() {
        // 500 px at 100 px/s shifts the entry by exactly five seconds.
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::Moving);

        session.update(&mut doc, 500.0).unwrap();
        assert_eq!(
            times(&doc, &id),
            ("00:00:09,0".to_string(), "00:00:12,2".to_string())
        );

        let command = session.finish(&doc).unwrap().unwrap();
        assert!(matches!(command, EditCommand::Move { .. }));

        command.revert(&mut doc).unwrap();
        assert_eq!(
            times(&doc, &id),
            ("00:00:04,0".to_string(), "00:00:07,2".to_string())
        );
    }

    #[test]
    fn test_move_deltas_are_cumulative_not_incremental() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::Moving);

        // Many intermediate positions, all anchored to the snapshot.
        for x in [30.0, 170.0, 410.0, 500.0] {
            session.update(&mut doc, x).unwrap();
        }
        assert_eq!(
            times(&doc, &id),
            ("00:00:09,0".to_string(), "00:00:12,2".to_string())
        );
    }

    #[test]
    fn test_move_clamps_at_timeline_start() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::Moving);

        session.update(&mut doc, -600.0).unwrap();
        let (start, end) = times(&doc, &id);
        assert_eq!(start, "00:00:00,0");
        // End still derives from the same delta: 7.2 - 6.0 = 1.2.
        assert_eq!(end, "00:00:01,2");
    }

    #[test]
    fn test_move_geometry_tracks_pointer() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::Moving);

        let geometry = session.update(&mut doc, 500.0).unwrap();
        assert!((geometry.left - 900.0).abs() < 1e-6);
        assert!((geometry.width - 320.0).abs() < 1e-6);
    }

    // -------------------------------------------------------------------------
    // Resize Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_resize_start_moves_left_edge_only() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::ResizingStart);

        session.update(&mut doc, -200.0).unwrap();
        assert_eq!(
            times(&doc, &id),
            ("00:00:02,0".to_string(), "00:00:07,2".to_string())
        );

        let command = session.finish(&doc).unwrap().unwrap();
        assert!(matches!(command, EditCommand::Resize { .. }));
    }

    #[test]
    fn test_resize_start_enforces_minimum_duration() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::ResizingStart);

        // Dragging the left edge past the right edge pins the entry to the
        // one-second minimum, anchored at its original end.
        session.update(&mut doc, 1000.0).unwrap();
        let (start, end) = times(&doc, &id);
        assert_eq!(start, "00:00:06,2");
        assert_eq!(end, "00:00:07,2");

        let entry = doc.get(&id).unwrap();
        assert!(entry.duration_sec() >= MIN_DURATION_SECS - 1e-9);
    }

    #[test]
    fn test_resize_start_folds_overflow_at_zero() {
        let (mut doc, id) = doc_with_entry("00:00:02,0", "00:00:08,0");
        let session = begin(&doc, &id, DragMode::ResizingStart);

        session.update(&mut doc, -500.0).unwrap();
        assert_eq!(
            times(&doc, &id),
            ("00:00:00,0".to_string(), "00:00:08,0".to_string())
        );
    }

    #[test]
    fn test_resize_end_moves_right_edge_only() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::ResizingEnd);

        session.update(&mut doc, 300.0).unwrap();
        assert_eq!(
            times(&doc, &id),
            ("00:00:04,0".to_string(), "00:00:10,2".to_string())
        );
    }

    #[test]
    fn test_resize_end_enforces_minimum_duration() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::ResizingEnd);

        session.update(&mut doc, -1000.0).unwrap();
        let (start, end) = times(&doc, &id);
        assert_eq!(start, "00:00:04,0");
        assert_eq!(end, "00:00:05,0");

        let entry = doc.get(&id).unwrap();
        assert!(entry.duration_sec() >= MIN_DURATION_SECS - 1e-9);
    }

    // -------------------------------------------------------------------------
    // Commit / Cancel Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_noop_drag_commits_nothing() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::Moving);

        // Out and back to the anchor.
        session.update(&mut doc, 240.0).unwrap();
        session.update(&mut doc, 0.0).unwrap();

        assert!(session.finish(&doc).unwrap().is_none());
        assert_eq!(
            times(&doc, &id),
            ("00:00:04,0".to_string(), "00:00:07,2".to_string())
        );
    }

    #[test]
    fn test_untouched_session_commits_nothing() {
        let (doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::ResizingEnd);
        assert!(session.finish(&doc).unwrap().is_none());
    }

    #[test]
    fn test_cancel_restores_snapshot() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");
        let session = begin(&doc, &id, DragMode::Moving);

        session.update(&mut doc, 500.0).unwrap();
        session.cancel(&mut doc).unwrap();

        assert_eq!(
            times(&doc, &id),
            ("00:00:04,0".to_string(), "00:00:07,2".to_string())
        );
    }

    #[test]
    fn test_new_session_resnapshots() {
        let (mut doc, id) = doc_with_entry("00:00:04,0", "00:00:07,2");

        let first = begin(&doc, &id, DragMode::Moving);
        first.update(&mut doc, 100.0).unwrap();
        first.finish(&doc).unwrap();

        // The second drag anchors at the entry's new position, not the
        // original one.
        let second = begin(&doc, &id, DragMode::Moving);
        second.update(&mut doc, 100.0).unwrap();
        assert_eq!(
            times(&doc, &id),
            ("00:00:06,0".to_string(), "00:00:09,2".to_string())
        );
    }
}
