//! Field separator detection for delimited text uploads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The field separator of a delimited-text source.
///
/// Inferred once at load time; absent for spreadsheet sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Separator {
    /// Sniffing candidates, in priority order. Ties resolve to the
    /// earliest candidate.
    pub const CANDIDATES: [Separator; 4] = [
        Separator::Comma,
        Separator::Semicolon,
        Separator::Tab,
        Separator::Pipe,
    ];

    /// Infer the separator from a sample of the file content.
    ///
    /// The candidate with the highest occurrence count wins; ties and the
    /// all-zero case fall back to the first candidate (comma).
    pub fn sniff(sample: &str) -> Separator {
        let mut best = Separator::Comma;
        let mut best_count = 0usize;
        for candidate in Self::CANDIDATES {
            let count = sample.matches(candidate.as_char()).count();
            if count > best_count {
                best = candidate;
                best_count = count;
            }
        }
        best
    }

    pub fn as_char(&self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Semicolon => ';',
            Separator::Tab => '\t',
            Separator::Pipe => '|',
        }
    }

    pub fn as_byte(&self) -> u8 {
        self.as_char() as u8
    }

    /// Human-readable label for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            Separator::Comma => "comma (,)",
            Separator::Semicolon => "semicolon (;)",
            Separator::Tab => "tab",
            Separator::Pipe => "pipe (|)",
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
