//! Translates `\uXXXX` escapes into characters before a tokenizer sees them.
//!
//! ```
//! use escape_reader::{StrSource, UnicodeEscapeReader};
//!
//! let mut reader = UnicodeEscapeReader::new(StrSource::new(r"caf\u00e9 \uuu0041"));
//! let mut out = String::new();
//! reader.read_to_string(&mut out).unwrap();
//! assert_eq!(out, "café A");
//! ```

pub mod bytes;
pub mod error;
pub mod reader;
pub mod source;

pub use bytes::TranslatedBytes;
pub use common_framework::{Position, PositionReporter, SharedPosition};
pub use error::{EscapeError, MalformedReason, Result};
pub use reader::{Chars, UnicodeEscapeReader};
pub use source::{CharSource, StrSource, Utf8Source};
