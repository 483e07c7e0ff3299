//! Timeline Coordinate Mapping
//!
//! Pure conversion between elapsed time and canvas pixels.
//!
//! Entries are laid out in *content space*: `pixel = seconds × rate`,
//! with no per-entry offset. The leading blank area that lets time zero
//! sit in the middle of the screen is applied exactly once, at the
//! viewport level ([`TimelineLayout::leading_offset`]). Every consumer of
//! the canvas — entry blocks, ruler markers, waveform points — must share
//! one rate, or their positions desynchronize.

use tracing::warn;

use crate::core::subtitles::SubtitleEntry;
use crate::core::TimeSec;

/// Pixels per second of media time (fixed ratio across the whole canvas)
pub const PIXELS_PER_SECOND: f64 = 100.0;

/// Viewport width assumed before the view reports a real one
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 800.0;

/// Spacing of ruler markers, in seconds
pub const TIME_MARKER_INTERVAL_SECS: u64 = 1;

// =============================================================================
// Time Scale
// =============================================================================

/// The time↔pixel conversion rate
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    /// Pixels per second
    pub pixels_per_second: f64,
}

impl TimeScale {
    /// Creates a scale with validation
    pub fn new(pixels_per_second: f64) -> Self {
        if !pixels_per_second.is_finite() || pixels_per_second <= 0.0 {
            warn!(
                pixels_per_second,
                "TimeScale created with non-positive rate, using default"
            );
            return Self::default();
        }
        Self { pixels_per_second }
    }

    /// Content-space pixel position of a point in time
    pub fn time_to_pixel(&self, time_sec: TimeSec) -> f64 {
        time_sec * self.pixels_per_second
    }

    /// Time delta corresponding to a pixel delta
    pub fn pixel_to_time_delta(&self, delta_px: f64) -> TimeSec {
        delta_px / self.pixels_per_second
    }

    /// Content-space geometry of an entry: left edge from its start time,
    /// width from its duration (at least one pixel so degenerate entries
    /// stay visible and clickable)
    pub fn entry_geometry(&self, entry: &SubtitleEntry) -> EntryGeometry {
        let left = self.time_to_pixel(entry.start.to_seconds());
        let width = self.time_to_pixel(entry.duration_sec()).max(1.0);
        EntryGeometry { left, width }
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            pixels_per_second: PIXELS_PER_SECOND,
        }
    }
}

/// Content-space position and size of an entry block
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntryGeometry {
    pub left: f64,
    pub width: f64,
}

// =============================================================================
// Timeline Layout
// =============================================================================

/// One ruler tick
#[derive(Clone, Debug, PartialEq)]
pub struct TimeMarker {
    /// Content-space pixel position
    pub left: f64,
    /// Display label, `MM:SS`
    pub label: String,
}

/// Viewport-level layout of the timeline canvas.
///
/// Owns the single application of the leading offset: half the viewport
/// width of blank space before content, so the playhead can start centered.
#[derive(Clone, Debug)]
pub struct TimelineLayout {
    viewport_width: f64,
    total_duration_ms: u64,
    scale: TimeScale,
}

impl TimelineLayout {
    /// Creates a layout with the default viewport and scale
    pub fn new(scale: TimeScale) -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            total_duration_ms: 0,
            scale,
        }
    }

    /// The active scale
    pub fn scale(&self) -> TimeScale {
        self.scale
    }

    /// Updates the visible viewport width
    pub fn set_viewport_width(&mut self, width: f64) {
        if width > 0.0 {
            self.viewport_width = width;
        }
    }

    /// Updates the media duration in milliseconds
    pub fn set_total_duration_ms(&mut self, duration_ms: u64) {
        self.total_duration_ms = duration_ms;
    }

    /// Width of the leading blank area (half the viewport, so time zero can
    /// be centered)
    pub fn leading_offset(&self) -> f64 {
        self.viewport_width / 2.0
    }

    /// Width of the content area in pixels
    pub fn content_width(&self) -> f64 {
        self.scale
            .time_to_pixel(self.total_duration_ms as f64 / 1000.0)
    }

    /// Total canvas width: leading blank area plus content
    pub fn total_width(&self) -> f64 {
        self.leading_offset() + self.content_width()
    }

    /// Ruler markers, one per interval over the media duration
    pub fn time_markers(&self) -> Vec<TimeMarker> {
        let total_secs = self.total_duration_ms / 1000;
        (0..=total_secs)
            .step_by(TIME_MARKER_INTERVAL_SECS as usize)
            .map(|secs| TimeMarker {
                left: self.scale.time_to_pixel(secs as f64),
                label: format!("{:02}:{:02}", (secs / 60) % 60, secs % 60),
            })
            .collect()
    }
}

impl Default for TimelineLayout {
    fn default() -> Self {
        Self::new(TimeScale::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
