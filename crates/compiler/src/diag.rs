//! Diagnostic values emitted by the parser
//!
//! Every fatal parser error is a [`Diag`] carrying the source file, the
//! 1-based line number and, when known, the 0-based column of the offending
//! byte. Columns on lines produced by statement splitting are already
//! translated back to the original source line, so drivers can print them
//! as-is.

use thiserror::Error;

/// A single diagnostic with source coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "{file}:{line}{}: {message}",
    match col {
        Some(c) => format!(":{c}"),
        None => String::new(),
    }
)]
pub struct Diag {
    /// Source file the diagnostic refers to
    pub file: String,
    /// 1-based line number (0 when the failure is not tied to a line)
    pub line: usize,
    /// 0-based column, when the failure points at a specific byte
    pub col: Option<usize>,
    pub message: String,
}

impl Diag {
    /// Diagnostic at an exact byte position.
    pub fn at(file: &str, line: usize, col: usize, message: impl Into<String>) -> Self {
        Diag {
            file: file.to_string(),
            line,
            col: Some(col),
            message: message.into(),
        }
    }

    /// Diagnostic for a whole line (no column).
    pub fn on_line(file: &str, line: usize, message: impl Into<String>) -> Self {
        Diag {
            file: file.to_string(),
            line,
            col: None,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_column() {
        let d = Diag::at("main.dun", 12, 4, "unexpected token");
        assert_eq!(d.to_string(), "main.dun:12:4: unexpected token");
    }

    #[test]
    fn test_display_without_column() {
        let d = Diag::on_line("main.dun", 3, "line continuation at end of source");
        assert_eq!(d.to_string(), "main.dun:3: line continuation at end of source");
    }
}
