//! External Collaborator Contracts
//!
//! The engine performs no I/O itself. Reading and writing subtitle files,
//! and turning media into entries via speech recognition, are reached
//! through the contracts in this module and wired up by the host
//! application.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;

use super::subtitles::SubtitleEntry;
use super::{EditorError, EditorResult};

// =============================================================================
// Persistence Contracts
// =============================================================================

/// Parses a subtitle file into ordered entries
pub trait SubtitleParser {
    fn parse(&self, path: &Path) -> EditorResult<Vec<SubtitleEntry>>;
}

/// Writes ordered entries to a subtitle file
pub trait SubtitleWriter {
    fn write(
        &self,
        path: &Path,
        entries: &[SubtitleEntry],
        include_speaker: bool,
    ) -> EditorResult<()>;
}

// =============================================================================
// Transcription Contract
// =============================================================================

/// Available transcription model tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhisperModel {
    /// Tiny model - fastest, lowest accuracy
    Tiny,
    /// Base model - good balance
    #[default]
    Base,
    /// Medium model - high accuracy
    Medium,
    /// Large model - highest accuracy
    Large,
}

impl WhisperModel {
    /// Model name passed to the transcription backend
    pub fn name(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::Base => "base",
            WhisperModel::Medium => "medium",
            WhisperModel::Large => "large-v3",
        }
    }
}

impl FromStr for WhisperModel {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(WhisperModel::Tiny),
            "base" => Ok(WhisperModel::Base),
            "medium" => Ok(WhisperModel::Medium),
            "large" | "large-v3" => Ok(WhisperModel::Large),
            _ => Err(EditorError::UnknownModel(s.to_string())),
        }
    }
}

/// Progress report from a running transcription
#[derive(Clone, Debug)]
pub struct TranscriptionProgress {
    /// Completion percentage (0-100)
    pub percent: u8,
    /// Human-readable status
    pub message: String,
    /// True while a model download (not the transcription itself) is the
    /// thing making progress
    pub is_download: bool,
}

impl TranscriptionProgress {
    pub fn step(percent: u8, message: impl Into<String>) -> Self {
        Self {
            percent,
            message: message.into(),
            is_download: false,
        }
    }
}

/// Callback receiving progress reports
pub type ProgressFn = dyn Fn(TranscriptionProgress) + Send + Sync;

/// Turns a media file into ordered subtitle entries.
///
/// The engine consumes the finished batch synchronously through the
/// session's load path; it does not depend on how the backend chunks or
/// stitches its work.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe(
        &self,
        media_path: &Path,
        model: WhisperModel,
        language: &str,
        progress: Option<&ProgressFn>,
    ) -> EditorResult<Vec<SubtitleEntry>>;
}

// =============================================================================
// Mock Transcription
// =============================================================================

/// Deterministic transcription stand-in for tests and headless runs
pub struct MockTranscriptionService;

#[async_trait]
impl TranscriptionService for MockTranscriptionService {
    async fn transcribe(
        &self,
        _media_path: &Path,
        model: WhisperModel,
        language: &str,
        progress: Option<&ProgressFn>,
    ) -> EditorResult<Vec<SubtitleEntry>> {
        if let Some(report) = progress {
            report(TranscriptionProgress::step(0, "Starting transcription..."));
            report(TranscriptionProgress::step(50, "Transcribing speech..."));
            report(TranscriptionProgress::step(100, "Transcription finished"));
        }

        Ok(vec![
            SubtitleEntry::new()
                .with_times("00:00:00,0", "00:00:03,5")
                .with_speaker("AI")
                .with_text(format!("AI generated subtitles (language: {language})")),
            SubtitleEntry::new()
                .with_times("00:00:04,0", "00:00:07,2")
                .with_speaker("AI")
                .with_text(format!("Model: {}", model.name())),
            SubtitleEntry::new()
                .with_times("00:00:08,0", "00:00:12,0")
                .with_speaker("AI")
                .with_text("Mock transcription complete"),
        ])
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subtitles::DEFAULT_SPEAKER;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_model_names() {
        assert_eq!(WhisperModel::Base.name(), "base");
        assert_eq!(WhisperModel::Large.name(), "large-v3");
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("TINY".parse::<WhisperModel>().unwrap(), WhisperModel::Tiny);
        assert_eq!(
            "large-v3".parse::<WhisperModel>().unwrap(),
            WhisperModel::Large
        );
        assert!(matches!(
            "colossal".parse::<WhisperModel>(),
            Err(EditorError::UnknownModel(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_transcription_reports_progress() {
        let percents: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&percents);
        let report = move |p: TranscriptionProgress| {
            sink.lock().unwrap().push(p.percent);
        };

        let entries = MockTranscriptionService
            .transcribe(Path::new("video.mp4"), WhisperModel::Base, "en", Some(&report))
            .await
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].speaker, "AI");
        assert_ne!(entries[0].speaker, DEFAULT_SPEAKER);
        assert_eq!(entries[1].text, "Model: base");
        assert_eq!(*percents.lock().unwrap(), vec![0, 50, 100]);
    }
}
