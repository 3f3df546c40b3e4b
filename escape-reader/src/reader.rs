use crate::bytes::TranslatedBytes;
use crate::error::{EscapeError, MalformedReason, Result};
use crate::source::CharSource;
use common_framework::{Position, PositionReporter};
use std::fmt;
use std::io;

const HIGH_SURROGATES: std::ops::RangeInclusive<u16> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u16> = 0xDC00..=0xDFFF;

/// A character read from the source but not yet handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookahead {
    Char(char),
    EndOfInput,
}

impl From<Option<char>> for Lookahead {
    fn from(value: Option<char>) -> Self {
        value.map_or(Lookahead::EndOfInput, Lookahead::Char)
    }
}

impl From<Lookahead> for Option<char> {
    fn from(value: Lookahead) -> Self {
        match value {
            Lookahead::Char(ch) => Some(ch),
            Lookahead::EndOfInput => None,
        }
    }
}

/// Translates unicode escapes (`\u0041`, `\uuu0041`, ...) read from a
/// [`CharSource`] into the characters they denote.
///
/// Everything else passes through untouched. A backslash that is not
/// followed by `u` is returned as is, and the character after it is held
/// back for the next read. That held character is never treated as the
/// start of another escape, so `\\u0041` stays literal.
///
/// Decoded characters are not re-scanned: `\u005Cu0041` yields the six
/// characters `\u0041`.
///
/// When an escape is malformed the read fails with
/// [`EscapeError::MalformedUnicodeEscape`]. The character that broke the
/// escape is kept and returned by the next read; the backslash, the `u`s
/// and any hex digits before it are gone.
pub struct UnicodeEscapeReader<S: CharSource> {
    source: S,
    pending: Option<Lookahead>,
    reporter: Option<Box<dyn PositionReporter>>,
    source_position: Position,
    closed: bool,
}

impl<S: CharSource> UnicodeEscapeReader<S> {
    /// Creates a reader filtering `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending: None,
            reporter: None,
            source_position: Position::new(),
            closed: false,
        }
    }

    /// Attaches the reporter whose position is cited in malformed-escape
    /// errors.
    pub fn with_position_reporter<P>(mut self, reporter: P) -> Self
    where
        P: PositionReporter + 'static,
    {
        self.set_position_reporter(reporter);
        self
    }

    /// Attaches or replaces the position reporter.
    ///
    /// Without a reporter, errors cite the position in the raw source.
    pub fn set_position_reporter<P>(&mut self, reporter: P)
    where
        P: PositionReporter + 'static,
    {
        self.reporter = Some(Box::new(reporter));
    }

    /// Returns the position just past the last character consumed from the
    /// underlying source.
    pub fn source_position(&self) -> Position {
        self.source_position
    }

    /// Returns a reference to the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Unwraps the reader, returning the underlying source without closing
    /// it. A held-back character is lost.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Returns an [`io::Read`] view emitting the translated text as UTF-8.
    pub fn into_bytes(self) -> TranslatedBytes<S> {
        TranslatedBytes::new(self)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Reads one translated character. `Ok(None)` is end of input.
    pub fn read_char(&mut self) -> Result<Option<char>> {
        if self.closed {
            return Err(EscapeError::Closed);
        }

        if let Some(pending) = self.pending.take() {
            return Ok(pending.into());
        }

        let ch = self.next_raw()?;
        if ch != Some('\\') {
            return Ok(ch);
        }

        let ch = self.next_raw()?;
        if ch != Some('u') {
            self.pending = Some(ch.into());
            return Ok(Some('\\'));
        }

        let unit = self.read_escape_body()?;
        let decoded = self.decode(unit)?;
        tracing::trace!(
            decoded = ?decoded,
            position = %self.source_position,
            "translated unicode escape"
        );
        Ok(Some(decoded))
    }

    /// Fills `buf` with translated characters.
    ///
    /// Returns the number of characters written, which is less than
    /// `buf.len()` only when the input ran out. Returns `Ok(None)` when the
    /// input was already exhausted and nothing was written. An empty `buf`
    /// yields `Ok(Some(0))`.
    pub fn read_chars(&mut self, buf: &mut [char]) -> Result<Option<usize>> {
        let mut count = 0;
        let mut exhausted = false;
        while count < buf.len() {
            match self.read_char()? {
                Some(ch) => {
                    buf[count] = ch;
                    count += 1;
                }
                None => {
                    exhausted = true;
                    break;
                }
            }
        }
        if count == 0 && exhausted {
            Ok(None)
        } else {
            Ok(Some(count))
        }
    }

    /// Appends every remaining translated character to `out` and returns how
    /// many were appended.
    pub fn read_to_string(&mut self, out: &mut String) -> Result<usize> {
        let mut count = 0;
        while let Some(ch) = self.read_char()? {
            out.push(ch);
            count += 1;
        }
        Ok(count)
    }

    /// Iterates over translated characters until end of input.
    pub fn chars(&mut self) -> Chars<'_, S> {
        Chars {
            reader: self,
            finished: false,
        }
    }

    /// Closes the underlying source. Later calls do nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.pending = None;
        tracing::debug!(position = %self.source_position, "closing unicode escape reader");
        self.source.close()?;
        Ok(())
    }

    fn next_raw(&mut self) -> Result<Option<char>> {
        let ch = self.source.next_char()?;
        if let Some(ch) = ch {
            self.source_position.advance(ch);
        }
        Ok(ch)
    }

    /// Reads the rest of an escape after its first `u`: any further `u`s,
    /// then exactly four hex digits.
    fn read_escape_body(&mut self) -> Result<u16> {
        let mut ch = self.next_raw()?;
        while ch == Some('u') {
            ch = self.next_raw()?;
        }

        let mut unit = self.hex_digit(ch)?;
        for _ in 0..3 {
            let ch = self.next_raw()?;
            unit = (unit << 4) | self.hex_digit(ch)?;
        }
        Ok(unit)
    }

    fn hex_digit(&mut self, ch: Option<char>) -> Result<u16> {
        // to_digit only accepts ASCII 0-9, a-f and A-F.
        match ch.and_then(|ch| ch.to_digit(16)) {
            Some(digit) => Ok(digit as u16),
            None => {
                self.pending = Some(ch.into());
                Err(self.malformed(MalformedReason::ExpectedHexDigit { found: ch }))
            }
        }
    }

    fn decode(&mut self, unit: u16) -> Result<char> {
        if LOW_SURROGATES.contains(&unit) {
            return Err(self.malformed(MalformedReason::LoneSurrogate { unit }));
        }
        if HIGH_SURROGATES.contains(&unit) {
            let low = self.read_low_surrogate(unit)?;
            return char::decode_utf16([unit, low])
                .next()
                .and_then(|decoded| decoded.ok())
                .ok_or_else(|| self.malformed(MalformedReason::LoneSurrogate { unit }));
        }
        char::from_u32(u32::from(unit))
            .ok_or_else(|| self.malformed(MalformedReason::LoneSurrogate { unit }))
    }

    /// Reads the escape that must follow a high surrogate.
    fn read_low_surrogate(&mut self, high: u16) -> Result<u16> {
        let lone = MalformedReason::LoneSurrogate { unit: high };

        let ch = self.next_raw()?;
        if ch != Some('\\') {
            self.pending = Some(ch.into());
            return Err(self.malformed(lone));
        }
        let ch = self.next_raw()?;
        if ch != Some('u') {
            self.pending = Some(ch.into());
            return Err(self.malformed(lone));
        }

        let low = self.read_escape_body()?;
        if !LOW_SURROGATES.contains(&low) {
            // A complete escape that is not a low surrogate is kept for the
            // next read. Another high surrogate cannot be held as a char.
            if let Some(ch) = char::from_u32(u32::from(low)) {
                self.pending = Some(Lookahead::Char(ch));
            }
            return Err(self.malformed(lone));
        }
        Ok(low)
    }

    fn malformed(&self, reason: MalformedReason) -> EscapeError {
        let position = self
            .reporter
            .as_ref()
            .map_or(self.source_position, |reporter| reporter.current_position());
        tracing::warn!(%position, %reason, "malformed unicode escape");
        EscapeError::MalformedUnicodeEscape { position, reason }
    }
}

impl<S: CharSource> CharSource for UnicodeEscapeReader<S> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.read_char()?)
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(UnicodeEscapeReader::close(self)?)
    }
}

impl<S: CharSource + fmt::Debug> fmt::Debug for UnicodeEscapeReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnicodeEscapeReader")
            .field("source", &self.source)
            .field("pending", &self.pending)
            .field("has_reporter", &self.reporter.is_some())
            .field("source_position", &self.source_position)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Iterator over translated characters, created by
/// [`UnicodeEscapeReader::chars`].
///
/// A malformed escape is yielded as an `Err`; iteration may continue and
/// resumes with the held-back character. Any other error ends iteration.
pub struct Chars<'a, S: CharSource> {
    reader: &'a mut UnicodeEscapeReader<S>,
    finished: bool,
}

impl<S: CharSource> Iterator for Chars<'_, S> {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.reader.read_char().transpose();
        match &item {
            None => self.finished = true,
            Some(Err(err)) if !err.is_malformed() => self.finished = true,
            _ => {}
        }
        item
    }
}
