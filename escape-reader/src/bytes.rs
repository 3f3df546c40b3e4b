//! Byte-oriented view of a [`UnicodeEscapeReader`].

use crate::error::EscapeError;
use crate::reader::UnicodeEscapeReader;
use crate::source::CharSource;
use std::io::{self, Read};

/// Reads the translated text as UTF-8 bytes.
///
/// Created by [`UnicodeEscapeReader::into_bytes`]. A character that does not
/// fit in the caller's buffer is carried over to the next call. An error
/// raised after some bytes were already copied is reported by the following
/// call instead, so no bytes are dropped.
pub struct TranslatedBytes<S: CharSource> {
    reader: UnicodeEscapeReader<S>,
    encoded: [u8; 4],
    start: usize,
    end: usize,
    deferred: Option<EscapeError>,
}

impl<S: CharSource> TranslatedBytes<S> {
    pub(crate) fn new(reader: UnicodeEscapeReader<S>) -> Self {
        Self {
            reader,
            encoded: [0; 4],
            start: 0,
            end: 0,
            deferred: None,
        }
    }

    pub fn get_ref(&self) -> &UnicodeEscapeReader<S> {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut UnicodeEscapeReader<S> {
        &mut self.reader
    }

    /// Unwraps the adapter. Bytes of a partially copied character are lost.
    pub fn into_inner(self) -> UnicodeEscapeReader<S> {
        self.reader
    }
}

impl<S: CharSource> Read for TranslatedBytes<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = self.deferred.take() {
            return Err(err.into());
        }

        let mut written = 0;
        while written < buf.len() {
            if self.start == self.end {
                match self.reader.read_char() {
                    Ok(Some(ch)) => {
                        self.end = ch.encode_utf8(&mut self.encoded).len();
                        self.start = 0;
                    }
                    Ok(None) => break,
                    Err(err) if written == 0 => return Err(err.into()),
                    Err(err) => {
                        self.deferred = Some(err);
                        break;
                    }
                }
            }

            let n = (self.end - self.start).min(buf.len() - written);
            buf[written..written + n].copy_from_slice(&self.encoded[self.start..self.start + n]);
            self.start += n;
            written += n;
        }
        Ok(written)
    }
}
