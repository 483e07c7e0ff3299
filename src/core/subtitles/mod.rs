//! Subtitle Document Module
//!
//! Data model for subtitle entries and the ordered document that owns them.

mod models;

pub use models::{SubtitleBatch, SubtitleDocument, SubtitleEntry, DEFAULT_SPEAKER};
