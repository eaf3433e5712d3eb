//! Width reconciliation between the input surface and the overlay
//!
//! The overlay's content box gets exactly the input surface's natural width,
//! so both surfaces have the same horizontal scroll range.

use crate::error::SurfaceError;
use crate::overflow::is_overflowing;
use crate::surface::{Surface, SurfaceMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentWidth {
    /// Content fits; fill the container ("100%")
    #[default]
    Full,
    /// Content overflows; use this natural width
    Exact(u32),
}

impl ContentWidth {
    pub fn from_metrics(metrics: &SurfaceMetrics) -> Self {
        if is_overflowing(metrics) {
            ContentWidth::Exact(metrics.scroll_width)
        } else {
            ContentWidth::Full
        }
    }

    /// Resolve against a container width.
    pub fn resolve(self, container: u32) -> u32 {
        match self {
            ContentWidth::Full => container,
            ContentWidth::Exact(width) => width,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WidthReconciler {
    applied: Option<ContentWidth>,
}

impl WidthReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measure<S: Surface>(source: &S) -> Result<ContentWidth, SurfaceError> {
        source.metrics().map(|metrics| ContentWidth::from_metrics(&metrics))
    }

    /// Push `width` onto the overlay if it changed since the last push.
    ///
    /// With no overlay mounted nothing is recorded, so the width is applied
    /// once the overlay appears.
    pub fn apply<S: Surface>(
        &mut self,
        width: ContentWidth,
        overlay: Option<&mut S>,
    ) -> Result<bool, SurfaceError> {
        let Some(overlay) = overlay else {
            return Ok(false);
        };
        if self.applied == Some(width) {
            return Ok(false);
        }
        overlay.set_content_width(width)?;
        self.applied = Some(width);
        Ok(true)
    }

    pub fn applied(&self) -> Option<ContentWidth> {
        self.applied
    }

    /// Forget the last pushed width (overlay remounted or content replaced).
    pub fn invalidate(&mut self) {
        self.applied = None;
    }
}
