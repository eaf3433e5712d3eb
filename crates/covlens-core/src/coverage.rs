//! Per-line coverage state and its visual classification

use crate::error::LoadError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Coverage state of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    Hit,
    Miss,
    Partial,
    /// No coverage data for the line. Visually neutral, distinct from `Miss`.
    #[default]
    None,
}

/// Coverage state plus optional hit counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineCoverage {
    pub coverage: Coverage,
    #[serde(default, rename = "hits", skip_serializing_if = "Option::is_none")]
    pub hit_count: Option<u64>,
}

impl LineCoverage {
    pub const NONE: LineCoverage = LineCoverage {
        coverage: Coverage::None,
        hit_count: None,
    };

    pub fn new(coverage: Coverage, hit_count: Option<u64>) -> Self {
        Self { coverage, hit_count }
    }

    pub fn decoration(&self) -> CoverageDecoration {
        classify(self.coverage, self.hit_count)
    }
}

/// Color family of a coverage bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageTone {
    /// Green
    Covered,
    /// Red
    Uncovered,
    /// Yellow
    Partial,
}

/// Colored bar drawn beside (or behind) a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bar {
    pub tone: CoverageTone,
    pub dashed: bool,
}

/// Style of the line-number gutter cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GutterStyle {
    #[default]
    Neutral,
    Covered,
    Uncovered,
    Partial,
}

/// Icon drawn in the line-number gutter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GutterIcon {
    Warning,
    PartialMarker,
}

/// Everything needed to draw a line's coverage without touching its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CoverageDecoration {
    pub bar: Option<Bar>,
    pub line_number: GutterStyle,
    pub icon: Option<GutterIcon>,
    /// Hit-count badge, only for a positive count on hit/partial lines
    pub badge: Option<u64>,
}

/// Map a coverage state and hit count to its decoration.
pub fn classify(coverage: Coverage, hit_count: Option<u64>) -> CoverageDecoration {
    let badge = hit_count.filter(|&hits| hits > 0);
    match coverage {
        Coverage::Hit => CoverageDecoration {
            bar: Some(Bar {
                tone: CoverageTone::Covered,
                dashed: false,
            }),
            line_number: GutterStyle::Covered,
            icon: None,
            badge,
        },
        Coverage::Miss => CoverageDecoration {
            bar: Some(Bar {
                tone: CoverageTone::Uncovered,
                dashed: false,
            }),
            line_number: GutterStyle::Uncovered,
            icon: Some(GutterIcon::Warning),
            badge: None,
        },
        Coverage::Partial => CoverageDecoration {
            bar: Some(Bar {
                tone: CoverageTone::Partial,
                dashed: true,
            }),
            line_number: GutterStyle::Partial,
            icon: Some(GutterIcon::PartialMarker),
            badge,
        },
        Coverage::None => CoverageDecoration::default(),
    }
}

/// Lookup from a 1-based line number to its coverage
pub trait CoverageLookup {
    fn lookup(&self, line: usize) -> LineCoverage;
}

impl<F> CoverageLookup for F
where
    F: Fn(usize) -> LineCoverage,
{
    fn lookup(&self, line: usize) -> LineCoverage {
        self(line)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoverageEntry {
    State(Coverage),
    Detailed(LineCoverage),
}

impl From<CoverageEntry> for LineCoverage {
    fn from(entry: CoverageEntry) -> Self {
        match entry {
            CoverageEntry::State(coverage) => LineCoverage::new(coverage, None),
            CoverageEntry::Detailed(line) => line,
        }
    }
}

/// Coverage keyed by 1-based line number
///
/// JSON form: `{"12": "hit", "13": {"coverage": "partial", "hits": 4}}`.
/// Lines that are not present have no coverage.
#[derive(Debug, Clone, Default)]
pub struct CoverageMap {
    lines: FxHashMap<usize, LineCoverage>,
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let raw: FxHashMap<usize, CoverageEntry> = serde_json::from_str(json)?;
        if raw.contains_key(&0) {
            return Err(LoadError::ZeroLine);
        }
        Ok(Self {
            lines: raw.into_iter().map(|(line, entry)| (line, entry.into())).collect(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, line: usize, coverage: LineCoverage) {
        self.lines.insert(line, coverage);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl FromIterator<(usize, LineCoverage)> for CoverageMap {
    fn from_iter<I: IntoIterator<Item = (usize, LineCoverage)>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl CoverageLookup for CoverageMap {
    fn lookup(&self, line: usize) -> LineCoverage {
        self.lines.get(&line).copied().unwrap_or(LineCoverage::NONE)
    }
}

/// Aggregate counts shown in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoverageSummary {
    pub hits: usize,
    pub misses: usize,
    pub partials: usize,
}

impl CoverageSummary {
    pub fn add(&mut self, coverage: Coverage) {
        match coverage {
            Coverage::Hit => self.hits += 1,
            Coverage::Miss => self.misses += 1,
            Coverage::Partial => self.partials += 1,
            Coverage::None => {}
        }
    }

    /// Lines with any coverage data
    pub fn tracked(&self) -> usize {
        self.hits + self.misses + self.partials
    }

    /// Percentage of tracked lines that were hit, partials count as not hit.
    pub fn percent(&self) -> Option<f64> {
        let tracked = self.tracked();
        if tracked == 0 {
            return None;
        }
        Some(self.hits as f64 / tracked as f64 * 100.0)
    }
}

impl FromIterator<Coverage> for CoverageSummary {
    fn from_iter<I: IntoIterator<Item = Coverage>>(iter: I) -> Self {
        let mut summary = Self::default();
        for coverage in iter {
            summary.add(coverage);
        }
        summary
    }
}
