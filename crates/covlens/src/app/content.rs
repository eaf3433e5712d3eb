//! Building renderer input from files on disk

use crate::syntax::{plain_lines, StyledSpan, SyntaxEngine};
use covlens_core::{align_lines, CoverageLookup, DiffRow};

/// Tokenize a file, highlighted or plain.
pub fn tokenize(
    syntax: Option<&SyntaxEngine>,
    content: &str,
    file_name: &str,
    language: Option<&str>,
) -> Vec<Vec<StyledSpan>> {
    match syntax {
        Some(engine) => engine.highlight(content, file_name, language),
        None => plain_lines(content),
    }
}

/// Pair base and head lines into diff rows with per-side coverage.
///
/// Unchanged rows take their tokens from the head side.
pub fn diff_rows(
    base_text: &str,
    head_text: &str,
    base_lines: Vec<Vec<StyledSpan>>,
    head_lines: Vec<Vec<StyledSpan>>,
    base_coverage: &impl CoverageLookup,
    head_coverage: &impl CoverageLookup,
) -> Vec<DiffRow<StyledSpan>> {
    let mut base_lines: Vec<Option<Vec<StyledSpan>>> = base_lines.into_iter().map(Some).collect();
    let mut head_lines: Vec<Option<Vec<StyledSpan>>> = head_lines.into_iter().map(Some).collect();

    align_lines(base_text, head_text)
        .into_iter()
        .map(|aligned| {
            let tokens = match (aligned.base_index, aligned.head_index) {
                (_, Some(head)) => head_lines.get_mut(head).and_then(Option::take),
                (Some(base), None) => base_lines.get_mut(base).and_then(Option::take),
                (None, None) => None,
            };
            DiffRow {
                identity: aligned.identity(),
                tokens: tokens.unwrap_or_default(),
                base_coverage: aligned
                    .base_index
                    .map(|i| base_coverage.lookup(i + 1))
                    .unwrap_or_default(),
                head_coverage: aligned
                    .head_index
                    .map(|i| head_coverage.lookup(i + 1))
                    .unwrap_or_default(),
            }
        })
        .collect()
}
