//! Windowing engine: which rows to mount and where they sit
//!
//! Row tops are kept in a cumulative offset table seeded with the estimated
//! row height. A measurement only invalidates the table from the measured row
//! forward, and the visible range is found by binary search over the table,
//! so a scroll tick costs O(log n) once the table is clean.

use crate::config::RendererConfig;
use crate::events::Align;
use std::ops::RangeInclusive;

/// A materialized row and its position in the virtual content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualItem {
    pub index: usize,
    /// Offset of the row's top from the top of the full content
    pub start: u64,
    pub size: u32,
}

impl VirtualItem {
    pub fn end(&self) -> u64 {
        self.start + self.size as u64
    }
}

/// Result of one windowing pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewportWindow {
    /// Inclusive range of mounted indices, overscan included. `None` when
    /// there is nothing to mount.
    pub visible_range: Option<RangeInclusive<usize>>,
    /// One entry per index in `visible_range`, in index order
    pub items: Vec<VirtualItem>,
    /// Height of the full virtual content
    pub total_size: u64,
}

impl ViewportWindow {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_range.is_none()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.visible_range
            .as_ref()
            .is_some_and(|range| range.contains(&index))
    }

    pub fn item(&self, index: usize) -> Option<&VirtualItem> {
        let range = self.visible_range.as_ref()?;
        if !range.contains(&index) {
            return None;
        }
        self.items.get(index - range.start())
    }
}

/// Per-index row heights plus the cumulative offset table built from them
#[derive(Debug, Clone)]
pub struct HeightCache {
    estimate: u32,
    measured: Vec<Option<u32>>,
    /// `starts[i]` is the top of row `i`; the final entry is the total size
    starts: Vec<u64>,
    /// `starts[..=clean]` is up to date
    clean: usize,
}

impl HeightCache {
    pub fn new(count: usize, estimate: u32) -> Self {
        let estimate = estimate.max(1);
        Self {
            estimate,
            measured: vec![None; count],
            starts: (0..=count as u64).map(|i| i * estimate as u64).collect(),
            clean: count,
        }
    }

    /// Drop every measurement and size the table for `count` rows.
    pub fn reset(&mut self, count: usize) {
        *self = Self::new(count, self.estimate);
    }

    pub fn len(&self) -> usize {
        self.measured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measured.is_empty()
    }

    pub fn estimate(&self) -> u32 {
        self.estimate
    }

    pub fn size(&self, index: usize) -> u32 {
        self.measured
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(self.estimate)
    }

    pub fn is_measured(&self, index: usize) -> bool {
        matches!(self.measured.get(index), Some(Some(_)))
    }

    /// Record the rendered height of a row.
    ///
    /// Zero or negative heights are clamped to the estimate. Returns true
    /// when the row's size changed, i.e. offsets below it moved.
    pub fn measure(&mut self, index: usize, height: i64) -> bool {
        if index >= self.len() {
            return false;
        }
        let height = if height <= 0 {
            tracing::debug!(index, height, "degenerate row height, using estimate");
            self.estimate
        } else {
            u32::try_from(height).unwrap_or(u32::MAX)
        };
        let old = self.size(index);
        self.measured[index] = Some(height);
        if old == height {
            return false;
        }
        self.clean = self.clean.min(index);
        true
    }

    /// Bring the offset table up to date from the first dirty row forward.
    fn refresh(&mut self) {
        let len = self.len();
        for i in self.clean..len {
            self.starts[i + 1] = self.starts[i] + self.size(i) as u64;
        }
        self.clean = len;
    }

    pub fn start(&mut self, index: usize) -> u64 {
        self.refresh();
        self.starts[index.min(self.len())]
    }

    pub fn total_size(&mut self) -> u64 {
        self.refresh();
        self.starts[self.len()]
    }

    /// Index of the row containing `offset`, clamped to the last row.
    pub fn index_at(&mut self, offset: u64) -> usize {
        self.refresh();
        let tops = &self.starts[..self.len()];
        tops.partition_point(|&top| top <= offset).saturating_sub(1)
    }
}

/// Compute the rows to mount for one scroll/resize tick.
pub fn compute(
    total_count: usize,
    scroll_offset: u64,
    viewport_size: u32,
    overscan: usize,
    measured: &mut HeightCache,
) -> ViewportWindow {
    if measured.len() != total_count {
        measured.reset(total_count);
    }
    if total_count == 0 {
        return ViewportWindow::empty();
    }

    let total_size = measured.total_size();
    let scroll = scroll_offset.min(total_size - 1);
    let first = measured.index_at(scroll);
    let last = if viewport_size == 0 {
        first
    } else {
        measured
            .index_at(scroll + viewport_size as u64 - 1)
            .max(first)
    };

    let start = first.saturating_sub(overscan);
    let end = last.saturating_add(overscan).min(total_count - 1);
    let items = (start..=end)
        .map(|index| VirtualItem {
            index,
            start: measured.start(index),
            size: measured.size(index),
        })
        .collect();

    ViewportWindow {
        visible_range: Some(start..=end),
        items,
        total_size,
    }
}

/// Owns the height cache for one line sequence
#[derive(Debug, Clone)]
pub struct WindowEngine {
    cache: HeightCache,
    overscan: usize,
}

impl WindowEngine {
    pub fn new(count: usize, config: &RendererConfig) -> Self {
        Self {
            cache: HeightCache::new(count, config.estimated_row_height),
            overscan: config.overscan,
        }
    }

    /// New line sequence: no measurement survives.
    pub fn reset(&mut self, count: usize) {
        self.cache.reset(count);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn cache(&self) -> &HeightCache {
        &self.cache
    }

    pub fn compute(&mut self, scroll_offset: u64, viewport_size: u32) -> ViewportWindow {
        let count = self.cache.len();
        compute(count, scroll_offset, viewport_size, self.overscan, &mut self.cache)
    }

    pub fn measure(&mut self, index: usize, height: i64) -> bool {
        self.cache.measure(index, height)
    }

    pub fn total_size(&mut self) -> u64 {
        self.cache.total_size()
    }

    /// Scroll offset that places `index` at `align` within the viewport.
    pub fn offset_for(&mut self, index: usize, align: Align, viewport_size: u32) -> u64 {
        if self.cache.is_empty() {
            return 0;
        }
        let index = index.min(self.cache.len() - 1);
        let start = self.cache.start(index);
        let size = self.cache.size(index) as u64;
        let viewport = viewport_size as u64;
        let offset = match align {
            Align::Start => start,
            Align::Center => (start + size / 2).saturating_sub(viewport / 2),
            Align::End => (start + size).saturating_sub(viewport),
        };
        let max_scroll = self.cache.total_size().saturating_sub(viewport);
        offset.min(max_scroll)
    }
}
