//! Error types for the renderer engine

use thiserror::Error;

/// Why a navigation token could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,
    #[error("token does not start with '#'")]
    MissingHash,
    #[error("invalid line number '{0}'")]
    BadLineNumber(String),
    #[error("unknown pane marker '{0}' (expected L or R)")]
    UnknownSide(char),
    #[error("token has no path hash before the pane marker")]
    MissingPathHash,
    #[error("'{0}' is not a line anchor")]
    Unrecognized(String),
    #[error("{0} token used in {1} mode")]
    WrongMode(&'static str, &'static str),
}

/// Errors raised while loading coverage or diff documents
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line number 0 in coverage map (lines are 1-based)")]
    ZeroLine,
}

/// Errors raised by a surface while measuring or scrolling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface is detached")]
    Detached,
    #[error("measurement failed: {0}")]
    Measure(String),
}
