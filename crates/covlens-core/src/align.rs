//! Base/head row alignment for diff mode
//!
//! Hosts that already have the paired line numbers feed them straight into
//! the renderer. Hosts that only have two texts use [`align_lines`] to build
//! the pairs: unchanged lines carry both numbers, removed lines only a base
//! number, added lines only a head number.

use crate::line::DiffIdentity;
use imara_diff::{Algorithm, Diff, InternedInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    Equal,
    Removed,
    Added,
}

/// One row of an aligned diff; indices are 0-based into each text's lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedLine {
    pub origin: LineOrigin,
    pub base_index: Option<usize>,
    pub head_index: Option<usize>,
}

impl AlignedLine {
    fn equal(base: usize, head: usize) -> Self {
        Self {
            origin: LineOrigin::Equal,
            base_index: Some(base),
            head_index: Some(head),
        }
    }

    fn removed(base: usize) -> Self {
        Self {
            origin: LineOrigin::Removed,
            base_index: Some(base),
            head_index: None,
        }
    }

    fn added(head: usize) -> Self {
        Self {
            origin: LineOrigin::Added,
            base_index: None,
            head_index: Some(head),
        }
    }

    /// 1-based line numbers of this row
    pub fn identity(&self) -> DiffIdentity {
        DiffIdentity::new(self.base_index.map(|i| i + 1), self.head_index.map(|i| i + 1))
    }
}

pub fn align_lines(base: &str, head: &str) -> Vec<AlignedLine> {
    let input = InternedInput::new(base, head);
    let diff = Diff::compute(Algorithm::Histogram, &input);
    let base_len = input.before.len();
    let head_len = input.after.len();

    let mut rows = Vec::with_capacity(base_len.max(head_len));
    let (mut b, mut h) = (0usize, 0usize);
    for hunk in diff.hunks() {
        let removed = hunk.before.start as usize..hunk.before.end as usize;
        let added = hunk.after.start as usize..hunk.after.end as usize;
        while b < removed.start && h < added.start {
            rows.push(AlignedLine::equal(b, h));
            b += 1;
            h += 1;
        }
        rows.extend(removed.clone().map(AlignedLine::removed));
        rows.extend(added.clone().map(AlignedLine::added));
        b = removed.end;
        h = added.end;
    }
    while b < base_len && h < head_len {
        rows.push(AlignedLine::equal(b, h));
        b += 1;
        h += 1;
    }
    rows.extend((b..base_len).map(AlignedLine::removed));
    rows.extend((h..head_len).map(AlignedLine::added));

    tracing::debug!(base_len, head_len, rows = rows.len(), "aligned diff");
    rows
}
