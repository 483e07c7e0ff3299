//! Subreel Error Definitions
//!
//! Defines error types used throughout the engine.

use thiserror::Error;

use super::EntryId;

/// Core engine error types
#[derive(Error, Debug)]
pub enum EditorError {
    // =========================================================================
    // Document Errors
    // =========================================================================
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Position out of range: {position} (document has {len} entries)")]
    PositionOutOfRange { position: usize, len: usize },

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Failed to parse subtitles: {0}")]
    ParseFailed(String),

    #[error("Failed to write subtitles: {0}")]
    WriteFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Unknown transcription model: {0}")]
    UnknownModel(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Core engine result type
pub type EditorResult<T> = Result<T, EditorError>;
