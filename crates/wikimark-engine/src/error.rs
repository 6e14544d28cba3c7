use std::path::PathBuf;

use crate::models::variables::VarError;
use crate::parsing::position::Position;

/// Errors that abort [`Page::parse`](crate::Page::parse).
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("neither source nor file path provided")]
    NoSource,
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read page source: {0}")]
    Scan(#[from] std::io::Error),
    #[error("{pos}: {message}")]
    Syntax { pos: Position, message: String },
    #[error("option @{key}: expected {expected}")]
    OptionType { key: String, expected: &'static str },
    #[error(transparent)]
    Variable(#[from] VarError),
}

impl PageError {
    pub fn syntax(pos: Position, message: impl Into<String>) -> Self {
        PageError::Syntax {
            pos,
            message: message.into(),
        }
    }

    /// True for errors caused by how the page was set up rather than its content.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PageError::NoSource | PageError::Open { .. } | PageError::OptionType { .. }
        )
    }
}

/// A non-fatal problem found while formatting or resolving links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub pos: Position,
    pub message: String,
}

impl Warning {
    pub fn new(pos: Position, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.pos.is_none() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.pos, self.message)
        }
    }
}
