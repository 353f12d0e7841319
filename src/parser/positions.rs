//! Source positions.
//!
//! Positions track the byte offset along with a 0-indexed line and column so
//! diagnostics can point at the offending text without rescanning the source.

use serde::Serialize;

/// Position in source code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Byte offset in source
    pub byte: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub col: usize,
}

impl Position {
    pub fn new() -> Self {
        Self { byte: 0, line: 0, col: 0 }
    }

    /// Move past `text`, which must be the source slice starting at this position.
    pub fn advance_over(&mut self, text: &str) {
        for ch in text.chars() {
            self.byte += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
    }
}

/// Span in source code (a range from start position to end position)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `position`
    pub fn at(position: Position) -> Self {
        Self { start: position, end: position }
    }
}
