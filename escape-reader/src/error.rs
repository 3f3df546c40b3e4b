use common_framework::Position;
use std::fmt;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EscapeError>;

/// Errors raised while reading through a [`UnicodeEscapeReader`].
///
/// [`UnicodeEscapeReader`]: crate::UnicodeEscapeReader
#[derive(Debug, Error)]
pub enum EscapeError {
    /// A `\u` escape was not followed by four hex digits, or decoded to a
    /// surrogate that has no partner.
    #[error(
        "malformed unicode escape at line {} column {}: {reason}",
        .position.line,
        .position.column
    )]
    MalformedUnicodeEscape {
        position: Position,
        reason: MalformedReason,
    },

    /// The underlying source failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The reader was read after being closed.
    #[error("reader is closed")]
    Closed,
}

impl EscapeError {
    /// Returns the position of a malformed escape, if this is one.
    pub fn position(&self) -> Option<Position> {
        match self {
            EscapeError::MalformedUnicodeEscape { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, EscapeError::MalformedUnicodeEscape { .. })
    }
}

/// Why an escape could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// A hex digit was expected; `None` means the input ended instead.
    ExpectedHexDigit { found: Option<char> },
    /// A surrogate code unit that is not part of a high/low pair.
    LoneSurrogate { unit: u16 },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::ExpectedHexDigit { found: Some(ch) } => {
                write!(f, "did not find four digit hex character code, found {ch:?}")
            }
            MalformedReason::ExpectedHexDigit { found: None } => {
                write!(f, "did not find four digit hex character code, found end of input")
            }
            MalformedReason::LoneSurrogate { unit } => {
                write!(f, "unpaired surrogate \\u{unit:04X}")
            }
        }
    }
}

impl From<EscapeError> for io::Error {
    fn from(err: EscapeError) -> Self {
        match err {
            EscapeError::Io(err) => err,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
