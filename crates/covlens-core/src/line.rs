//! Line records: the unit the renderer windows over

use crate::coverage::{CoverageLookup, LineCoverage};
use serde::{Deserialize, Serialize};

/// Pane side of a diff row. Single-file lines live on the head side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Base,
    Head,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Base => Side::Head,
            Side::Head => Side::Base,
        }
    }
}

/// Base/head line numbers of a diff row; either side may be absent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DiffIdentity {
    pub base: Option<String>,
    pub head: Option<String>,
}

impl DiffIdentity {
    pub fn new(base: Option<usize>, head: Option<usize>) -> Self {
        Self {
            base: base.map(|n| n.to_string()),
            head: head.map(|n| n.to_string()),
        }
    }

    pub fn number(&self, side: Side) -> Option<&str> {
        match side {
            Side::Base => self.base.as_deref(),
            Side::Head => self.head.as_deref(),
        }
    }
}

/// Stable identity of a line, used for navigation and highlighting
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineIdentity {
    /// 1-based line number in single-file mode
    Number(usize),
    /// Base/head pair in diff mode
    Pair(DiffIdentity),
}

impl LineIdentity {
    /// Line number shown in the gutter of `side`, if the line exists there
    pub fn number(&self, side: Side) -> Option<String> {
        match self {
            LineIdentity::Number(n) => (side == Side::Head).then(|| n.to_string()),
            LineIdentity::Pair(pair) => pair.number(side).map(str::to_string),
        }
    }
}

/// One row of diff input supplied by the host
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow<T> {
    pub identity: DiffIdentity,
    pub tokens: Vec<T>,
    pub base_coverage: LineCoverage,
    pub head_coverage: LineCoverage,
}

/// One rendered line
///
/// `index` is the position in the current sequence and changes meaning
/// whenever content changes; `identity` is what navigation refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord<T> {
    pub index: usize,
    pub identity: LineIdentity,
    pub tokens: Vec<T>,
    pub base_coverage: LineCoverage,
    pub head_coverage: LineCoverage,
}

impl<T> LineRecord<T> {
    pub fn coverage(&self, side: Side) -> LineCoverage {
        match side {
            Side::Base => self.base_coverage,
            Side::Head => self.head_coverage,
        }
    }

    /// Build records for a single file from per-line tokens.
    pub fn from_file(lines: Vec<Vec<T>>, coverage: &impl CoverageLookup) -> Vec<Self> {
        lines
            .into_iter()
            .enumerate()
            .map(|(index, tokens)| LineRecord {
                index,
                identity: LineIdentity::Number(index + 1),
                tokens,
                base_coverage: LineCoverage::NONE,
                head_coverage: coverage.lookup(index + 1),
            })
            .collect()
    }

    /// Build records for a diff from host-supplied rows.
    pub fn from_diff(rows: Vec<DiffRow<T>>) -> Vec<Self> {
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| LineRecord {
                index,
                identity: LineIdentity::Pair(row.identity),
                tokens: row.tokens,
                base_coverage: row.base_coverage,
                head_coverage: row.head_coverage,
            })
            .collect()
    }
}
