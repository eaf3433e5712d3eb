//! Events the renderer reports to its host

use crate::line::{LineIdentity, Side};
use crate::pointer::PointerMode;
use crate::surface::SurfaceId;

/// Where a scrolled-to row should land in the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererEvent {
    /// The renderer moved the vertical scroll controller to show `index`
    ScrollToRequested { index: usize, align: Align },
    Highlighted { identity: LineIdentity, side: Side },
    Unhighlighted { identity: LineIdentity, side: Side },
    /// Diagnostic: a navigation token did not match any line
    UnresolvedToken { raw: String, reason: String },
    PointerModeChanged(PointerMode),
    /// Content overflows horizontally; the host should attach a scrollbar
    ScrollbarShown,
    /// Content fits again; the scrollbar surface was dropped
    ScrollbarHidden,
    /// Diagnostic: a surface failed inside an observer callback
    ObserverFailed { surface: SurfaceId, message: String },
}
