//! Line anchors: navigation tokens and highlight resolution
//!
//! Token grammar:
//! - single file: `#L<line>`
//! - diff: `#<hashed path>-L<base line>` or `#<hashed path>-R<head line>`
//!
//! The hashed path tells several diff renderers on one page apart. The
//! fragment is shared with the rest of the host: an empty fragment or one
//! carrying another renderer's path hash is left alone, anything else that
//! does not resolve becomes a diagnostic.

use crate::error::TokenError;
use crate::line::{LineIdentity, LineRecord, Side};
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavToken {
    Line(usize),
    Diff {
        hashed_path: String,
        side: Side,
        line: usize,
    },
}

fn parse_line(number: &str) -> Result<usize, TokenError> {
    match number.parse::<usize>() {
        Ok(line) if line > 0 => Ok(line),
        _ => Err(TokenError::BadLineNumber(number.to_string())),
    }
}

impl NavToken {
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TokenError::Empty);
        }
        let body = raw.strip_prefix('#').ok_or(TokenError::MissingHash)?;
        if body.is_empty() {
            return Err(TokenError::Empty);
        }

        if let Some((hashed_path, tail)) = body.rsplit_once('-') {
            if hashed_path.is_empty() {
                return Err(TokenError::MissingPathHash);
            }
            let mut chars = tail.chars();
            let side = match chars.next() {
                Some('L') => Side::Base,
                Some('R') => Side::Head,
                Some(other) => return Err(TokenError::UnknownSide(other)),
                None => return Err(TokenError::BadLineNumber(String::new())),
            };
            return Ok(NavToken::Diff {
                hashed_path: hashed_path.to_string(),
                side,
                line: parse_line(chars.as_str())?,
            });
        }

        match body.strip_prefix('L') {
            Some(number) => Ok(NavToken::Line(parse_line(number)?)),
            None => Err(TokenError::Unrecognized(raw.to_string())),
        }
    }
}

impl fmt::Display for NavToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavToken::Line(line) => write!(f, "#L{line}"),
            NavToken::Diff {
                hashed_path,
                side,
                line,
            } => {
                let marker = match side {
                    Side::Base => 'L',
                    Side::Head => 'R',
                };
                write!(f, "#{hashed_path}-{marker}{line}")
            }
        }
    }
}

/// Short, stable hex digest of a file path for diff tokens
pub fn hash_path(path: &str) -> String {
    let mut hasher = FxHasher::default();
    path.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Read/write access to the host's fragment
pub trait NavigationStore {
    fn token(&self) -> Option<String>;
    fn set_token(&mut self, token: Option<String>);
}

/// Fragment kept in memory, for hosts without a URL bar
#[derive(Debug, Clone, Default)]
pub struct MemoryNavigation {
    token: Option<String>,
}

impl MemoryNavigation {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl NavigationStore for MemoryNavigation {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorMode {
    File,
    Diff { hashed_path: String },
}

/// Outcome of resolving the current fragment against the loaded lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Scroll to this index
    Target(usize),
    /// No fragment, or a fragment for someone else on the page
    NotOurs,
    /// Ours, but it points nowhere
    Unresolved(String),
}

#[derive(Debug, Clone)]
pub struct AnchorResolver {
    mode: AnchorMode,
}

impl AnchorResolver {
    pub fn new(mode: AnchorMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &AnchorMode {
        &self.mode
    }

    fn mode_name(&self) -> &'static str {
        match self.mode {
            AnchorMode::File => "single-file",
            AnchorMode::Diff { .. } => "diff",
        }
    }

    /// Token naming `identity` on `side`, if the line exists there.
    pub fn token_for(&self, identity: &LineIdentity, side: Side) -> Option<NavToken> {
        match (&self.mode, identity) {
            (AnchorMode::File, LineIdentity::Number(line)) => Some(NavToken::Line(*line)),
            (AnchorMode::Diff { hashed_path }, LineIdentity::Pair(pair)) => {
                let line = pair.number(side)?.parse().ok()?;
                Some(NavToken::Diff {
                    hashed_path: hashed_path.clone(),
                    side,
                    line,
                })
            }
            _ => None,
        }
    }

    pub fn resolve<T>(&self, raw: Option<&str>, records: &[LineRecord<T>]) -> Resolution {
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            return Resolution::NotOurs;
        };
        let token = match NavToken::parse(raw) {
            Ok(token) => token,
            Err(err) => return Resolution::Unresolved(err.to_string()),
        };

        match (&self.mode, token) {
            (AnchorMode::File, NavToken::Line(line)) => {
                if line <= records.len() {
                    Resolution::Target(line - 1)
                } else {
                    Resolution::Unresolved(format!(
                        "line {line} is past the end ({} lines)",
                        records.len()
                    ))
                }
            }
            (
                AnchorMode::Diff { hashed_path },
                NavToken::Diff {
                    hashed_path: token_path,
                    side,
                    line,
                },
            ) => {
                if *hashed_path != token_path {
                    return Resolution::NotOurs;
                }
                let wanted = line.to_string();
                records
                    .iter()
                    .position(|record| match &record.identity {
                        LineIdentity::Pair(pair) => pair.number(side) == Some(wanted.as_str()),
                        LineIdentity::Number(_) => false,
                    })
                    .map(Resolution::Target)
                    .unwrap_or_else(|| {
                        Resolution::Unresolved(format!("no {side:?} line {line} in this diff"))
                    })
            }
            (_, NavToken::Line(_)) => Resolution::Unresolved(
                TokenError::WrongMode("single-file", self.mode_name()).to_string(),
            ),
            (_, NavToken::Diff { .. }) => {
                Resolution::Unresolved(TokenError::WrongMode("diff", self.mode_name()).to_string())
            }
        }
    }

    /// Whether the row identified by `identity` is highlighted on `side`
    /// given the current fragment.
    pub fn is_highlighted(
        &self,
        current: Option<&NavToken>,
        identity: &LineIdentity,
        side: Side,
    ) -> bool {
        match current {
            Some(current) => self.token_for(identity, side).as_ref() == Some(current),
            None => false,
        }
    }

    /// New fragment after a click on `clicked`: clear it if it was already
    /// the current token, otherwise replace whatever was there.
    pub fn toggle(&self, current: Option<&str>, clicked: &NavToken) -> Option<String> {
        let current = current.and_then(|raw| NavToken::parse(raw).ok());
        if current.as_ref() == Some(clicked) {
            None
        } else {
            Some(clicked.to_string())
        }
    }
}
