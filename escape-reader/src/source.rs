//! Character sources the escape reader can filter.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;

/// A resource that yields characters one at a time and can be closed.
///
/// `Ok(None)` signals end of input. Once a source has returned `Ok(None)`
/// it keeps doing so.
pub trait CharSource {
    /// Reads the next character.
    fn next_char(&mut self) -> io::Result<Option<char>>;

    /// Releases the resource behind this source.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        (**self).next_char()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        (**self).next_char()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// An in-memory source over a shared text buffer.
#[derive(Debug, Clone)]
pub struct StrSource {
    buffer: Arc<str>,
    current: usize,
}

impl StrSource {
    /// Creates a source from the input string.
    pub fn new<S: Into<String>>(input: S) -> Self {
        let owned = input.into();
        Self::with_arc(Arc::<str>::from(owned))
    }

    /// Creates a source from an existing shared buffer.
    pub fn with_arc(buffer: Arc<str>) -> Self {
        Self { buffer, current: 0 }
    }

    /// Returns the current offset in bytes.
    pub fn offset(&self) -> usize {
        self.current
    }

    /// Returns true if every character has been read.
    pub fn is_eof(&self) -> bool {
        self.current >= self.buffer.len()
    }

    /// Returns the text not yet read.
    pub fn remaining(&self) -> &str {
        &self.buffer[self.current..]
    }
}

impl CharSource for StrSource {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        let ch = self.remaining().chars().next();
        if let Some(ch) = ch {
            self.current += ch.len_utf8();
        }
        Ok(ch)
    }
}

/// Decodes UTF-8 from any byte reader, such as a file or socket.
///
/// Invalid UTF-8 fails with [`io::ErrorKind::InvalidData`]. Closing drops
/// the inner reader.
#[derive(Debug)]
pub struct Utf8Source<R> {
    inner: Option<BufReader<R>>,
    offset: usize,
}

impl<R: Read> Utf8Source<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: Some(BufReader::new(reader)),
            offset: 0,
        }
    }

    /// Returns the number of bytes decoded so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl<R: Read> CharSource for Utf8Source<R> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        let offset = self.offset;
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| io::Error::other("source is closed"))?;

        let lead = match inner.fill_buf()?.first() {
            Some(&byte) => byte,
            None => return Ok(None),
        };
        inner.consume(1);
        self.offset += 1;
        let width = utf8_width(lead);
        if width == 0 {
            return Err(invalid_utf8(offset));
        }

        // Continuation bytes are only consumed once seen to be valid, so a
        // byte that breaks the sequence is read again as its own character.
        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            let next = inner.fill_buf()?.first().copied();
            match next {
                Some(byte) if is_continuation(byte) => {
                    *slot = byte;
                    inner.consume(1);
                    self.offset += 1;
                }
                _ => return Err(invalid_utf8(offset)),
            }
        }

        match std::str::from_utf8(&bytes[..width]) {
            Ok(text) => Ok(text.chars().next()),
            Err(_) => Err(invalid_utf8(offset)),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner = None;
        Ok(())
    }
}

fn invalid_utf8(offset: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("stream did not contain valid UTF-8 at byte {offset}"),
    )
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Width of the UTF-8 sequence introduced by `lead`, or 0 if `lead` cannot
/// start one.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}
