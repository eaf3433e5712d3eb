//! covlens-core - virtualized line renderer with coverage overlays
//!
//! The engine renders only the slice of a (possibly huge) line sequence that
//! intersects the viewport, keeps horizontally scrollable surfaces locked
//! together, maps navigation tokens to line indices and decorates each
//! mounted line with its coverage state. It has no terminal or DOM
//! dependency: hosts inject surfaces, a vertical scroll controller and a
//! navigation token store.

pub mod align;
pub mod anchor;
pub mod config;
pub mod coverage;
pub mod error;
pub mod events;
pub mod line;
pub mod overflow;
pub mod pointer;
pub mod renderer;
pub mod surface;
pub mod sync;
pub mod width;
pub mod window;

pub use align::{align_lines, AlignedLine, LineOrigin};
pub use anchor::{
    hash_path, AnchorMode, AnchorResolver, MemoryNavigation, NavToken, NavigationStore, Resolution,
};
pub use config::RendererConfig;
pub use coverage::{
    classify, Bar, Coverage, CoverageDecoration, CoverageLookup, CoverageMap, CoverageSummary,
    CoverageTone, GutterIcon, GutterStyle, LineCoverage,
};
pub use error::{LoadError, SurfaceError, TokenError};
pub use events::{Align, RendererEvent};
pub use line::{DiffIdentity, DiffRow, LineIdentity, LineRecord, Side};
pub use overflow::{is_overflowing, OverflowDetector};
pub use pointer::{PointerMode, PointerSuppressor};
pub use renderer::{FrameUpdate, GutterCell, RenderedRow, Renderer, ScrollController};
pub use surface::{Surface, SurfaceId, SurfaceMetrics, SurfaceSet};
pub use sync::{Registration, ScrollSync, SyncOutcome};
pub use width::{ContentWidth, WidthReconciler};
pub use window::{HeightCache, ViewportWindow, VirtualItem, WindowEngine};
