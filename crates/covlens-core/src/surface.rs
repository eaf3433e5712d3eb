//! Scrollable surfaces as a capability interface
//!
//! A renderer juggles three horizontally scrollable surfaces: the input
//! surface (holds the natural, unwrapped text and is what the user scrolls),
//! the overlay that draws decorated rows, and an optional custom scrollbar.
//! Hosts implement [`Surface`] once per concrete surface type.

use crate::error::SurfaceError;
use crate::width::ContentWidth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    Input,
    Overlay,
    Scrollbar,
}

impl SurfaceId {
    pub const ALL: [SurfaceId; 3] = [SurfaceId::Input, SurfaceId::Overlay, SurfaceId::Scrollbar];

    fn slot(self) -> usize {
        match self {
            SurfaceId::Input => 0,
            SurfaceId::Overlay => 1,
            SurfaceId::Scrollbar => 2,
        }
    }
}

/// Horizontal geometry of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceMetrics {
    pub scroll_left: u32,
    /// Natural width of the content
    pub scroll_width: u32,
    /// Visible width
    pub client_width: u32,
    pub client_height: u32,
}

impl SurfaceMetrics {
    pub fn max_scroll_left(&self) -> u32 {
        self.scroll_width.saturating_sub(self.client_width)
    }
}

pub trait Surface {
    fn metrics(&self) -> Result<SurfaceMetrics, SurfaceError>;

    /// Set the horizontal offset directly, without dispatching a scroll event.
    fn set_scroll_left(&mut self, offset: u32) -> Result<(), SurfaceError>;

    /// Set the width of the surface's content box. Surfaces that size
    /// themselves from their content ignore this.
    fn set_content_width(&mut self, width: ContentWidth) -> Result<(), SurfaceError> {
        let _ = width;
        Ok(())
    }
}

/// Slots for the renderer's surfaces; any slot may be empty (not mounted yet)
#[derive(Debug)]
pub struct SurfaceSet<S> {
    slots: [Option<S>; 3],
}

impl<S> Default for SurfaceSet<S> {
    fn default() -> Self {
        Self {
            slots: [None, None, None],
        }
    }
}

impl<S> SurfaceSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a surface, returning whatever occupied the slot before.
    pub fn mount(&mut self, id: SurfaceId, surface: S) -> Option<S> {
        self.slots[id.slot()].replace(surface)
    }

    pub fn unmount(&mut self, id: SurfaceId) -> Option<S> {
        self.slots[id.slot()].take()
    }

    pub fn is_mounted(&self, id: SurfaceId) -> bool {
        self.slots[id.slot()].is_some()
    }

    pub fn get(&self, id: SurfaceId) -> Option<&S> {
        self.slots[id.slot()].as_ref()
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut S> {
        self.slots[id.slot()].as_mut()
    }

    pub fn clear(&mut self) {
        self.slots = [None, None, None];
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// In-memory surface that clamps like a browser scroll container
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeSurface {
        pub metrics: SurfaceMetrics,
        pub content_width: Option<ContentWidth>,
        pub scroll_writes: usize,
        pub broken: bool,
    }

    impl FakeSurface {
        pub fn new(scroll_width: u32, client_width: u32) -> Self {
            Self {
                metrics: SurfaceMetrics {
                    scroll_left: 0,
                    scroll_width,
                    client_width,
                    client_height: 20,
                },
                ..Self::default()
            }
        }
    }

    impl Surface for FakeSurface {
        fn metrics(&self) -> Result<SurfaceMetrics, SurfaceError> {
            if self.broken {
                return Err(SurfaceError::Measure("layout unavailable".into()));
            }
            Ok(self.metrics)
        }

        fn set_scroll_left(&mut self, offset: u32) -> Result<(), SurfaceError> {
            if self.broken {
                return Err(SurfaceError::Detached);
            }
            self.scroll_writes += 1;
            self.metrics.scroll_left = offset.min(self.metrics.max_scroll_left());
            Ok(())
        }

        fn set_content_width(&mut self, width: ContentWidth) -> Result<(), SurfaceError> {
            self.content_width = Some(width);
            if let ContentWidth::Exact(width) = width {
                self.metrics.scroll_width = width;
            }
            Ok(())
        }
    }
}
