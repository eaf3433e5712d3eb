//! Horizontal overflow detection
//!
//! Fed by resize observations, never polled. The custom scrollbar is only
//! mounted while the observed surface overflows.

use crate::surface::SurfaceMetrics;

pub fn is_overflowing(metrics: &SurfaceMetrics) -> bool {
    metrics.scroll_width > metrics.client_width
}

#[derive(Debug, Clone, Default)]
pub struct OverflowDetector {
    overflowing: bool,
}

impl OverflowDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resize observation. Returns the new state when it flipped.
    pub fn observe(&mut self, metrics: &SurfaceMetrics) -> Option<bool> {
        let overflowing = is_overflowing(metrics);
        if overflowing == self.overflowing {
            return None;
        }
        self.overflowing = overflowing;
        Some(overflowing)
    }

    pub fn is_overflowing(&self) -> bool {
        self.overflowing
    }
}
