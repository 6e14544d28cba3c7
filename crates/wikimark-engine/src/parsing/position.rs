use std::fmt;

/// A location in page source: 1-based line, column of the last consumed character.
///
/// Positions advance on every consumed character and the column resets on
/// newline. A zero line means "no position" (e.g. text that did not come
/// from a page file).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Returns true if this position was never set.
    #[must_use]
    pub fn is_none(self) -> bool {
        self.line == 0 && self.column == 0
    }

    /// Advances past one character.
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A run of captured text along with the position of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosContent {
    pub content: String,
    pub pos: Position,
}

impl PosContent {
    pub fn new(content: impl Into<String>, pos: Position) -> Self {
        Self {
            content: content.into(),
            pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_columns_and_lines() {
        let mut pos = Position::new(1, 0);
        for ch in "ab\nc".chars() {
            pos.advance(ch);
        }
        assert_eq!(pos, Position::new(2, 1));
    }

    #[test]
    fn default_is_none() {
        assert!(Position::default().is_none());
        assert!(!Position::new(1, 0).is_none());
    }

    #[test]
    fn display_is_line_colon_column() {
        assert_eq!(Position::new(3, 7).to_string(), "3:7");
    }
}
