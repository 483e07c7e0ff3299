//! Subreel Core Library
//!
//! Subtitle track editing engine: canonical timecodes, the reversible
//! command system with undo/redo, the time↔pixel coordinate mapping used
//! by the visual timeline, and the pointer-drag state machine that turns
//! continuous pointer motion into discrete, undoable edits.
//!
//! Playback, file format parsing/writing, and transcription are external
//! collaborators reached through the contracts in [`core::services`]; the
//! engine itself performs no I/O.

pub mod core;
