use escape_reader::{CharSource, StrSource, UnicodeEscapeReader, Utf8Source};
use std::cell::Cell;
use std::io::{self, Cursor};
use std::rc::Rc;

/// Records how often it was closed.
struct CountingSource {
    inner: StrSource,
    closes: Rc<Cell<usize>>,
}

impl CharSource for CountingSource {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        self.inner.next_char()
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}

fn drain(source: &mut impl CharSource) -> io::Result<String> {
    let mut out = String::new();
    while let Some(ch) = source.next_char()? {
        out.push(ch);
    }
    Ok(out)
}

#[test]
fn test_str_source_reads_chars() {
    let mut source = StrSource::new("héllo");
    assert_eq!(source.next_char().unwrap(), Some('h'));
    assert_eq!(source.next_char().unwrap(), Some('é'));
    assert_eq!(source.offset(), 3);
    assert_eq!(source.remaining(), "llo");
    assert_eq!(drain(&mut source).unwrap(), "llo");
    assert!(source.is_eof());
    assert_eq!(source.next_char().unwrap(), None);
}

#[test]
fn test_utf8_source_decodes_multibyte() {
    let mut source = Utf8Source::new(Cursor::new("a é 你 😀".as_bytes().to_vec()));
    assert_eq!(drain(&mut source).unwrap(), "a é 你 😀");
    assert_eq!(source.offset(), "a é 你 😀".len());
}

#[test]
fn test_utf8_source_rejects_invalid_lead_byte() {
    let mut source = Utf8Source::new(Cursor::new(vec![b'a', 0xFF, b'b']));
    assert_eq!(source.next_char().unwrap(), Some('a'));
    let err = source.next_char().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(source.next_char().unwrap(), Some('b'));
}

#[test]
fn test_utf8_source_rejects_truncated_sequence() {
    let mut source = Utf8Source::new(Cursor::new(vec![0xE4, 0xBD]));
    let err = source.next_char().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn test_utf8_source_rejects_bad_continuation() {
    let mut source = Utf8Source::new(Cursor::new(vec![0xC3, b'(', b'x']));
    let err = source.next_char().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    // The byte that broke the sequence is read again on its own.
    assert_eq!(source.next_char().unwrap(), Some('('));
    assert_eq!(source.next_char().unwrap(), Some('x'));
    assert_eq!(source.next_char().unwrap(), None);
}

#[test]
fn test_utf8_source_recovers_after_truncated_sequence() {
    let mut source = Utf8Source::new(Cursor::new(vec![0xE4, 0xBD, b'z']));
    assert!(source.next_char().is_err());
    assert_eq!(source.next_char().unwrap(), Some('z'));
}

#[test]
fn test_utf8_source_close() {
    let mut source = Utf8Source::new(Cursor::new(b"abc".to_vec()));
    assert!(!source.is_closed());
    source.close().unwrap();
    assert!(source.is_closed());
    assert!(source.next_char().is_err());
}

#[test]
fn test_reader_over_byte_stream() {
    let bytes = r"caf\u00e9 \n".as_bytes().to_vec();
    let mut reader = UnicodeEscapeReader::new(Utf8Source::new(Cursor::new(bytes)));
    let mut out = String::new();
    reader.read_to_string(&mut out).unwrap();
    assert_eq!(out, r"café \n");
}

#[test]
fn test_close_propagates_exactly_once() {
    let closes = Rc::new(Cell::new(0));
    let source = CountingSource {
        inner: StrSource::new("abc"),
        closes: Rc::clone(&closes),
    };
    let mut reader = UnicodeEscapeReader::new(source);
    reader.read_char().unwrap();

    reader.close().unwrap();
    reader.close().unwrap();
    assert_eq!(closes.get(), 1);
    assert!(reader.is_closed());
}

#[test]
fn test_close_through_stacked_readers() {
    let closes = Rc::new(Cell::new(0));
    let source = CountingSource {
        inner: StrSource::new(""),
        closes: Rc::clone(&closes),
    };
    let mut outer = UnicodeEscapeReader::new(UnicodeEscapeReader::new(source));
    outer.close().unwrap();
    outer.close().unwrap();
    assert_eq!(closes.get(), 1);
    assert!(outer.get_ref().is_closed());
}

#[test]
fn test_boxed_source() {
    let source: Box<dyn CharSource> = Box::new(StrSource::new(r"\u0041"));
    let mut reader = UnicodeEscapeReader::new(source);
    assert_eq!(reader.read_char().unwrap(), Some('A'));
}

#[test]
fn test_borrowed_source_is_left_usable() {
    let mut source = StrSource::new(r"\u0041 tail");
    {
        let mut reader = UnicodeEscapeReader::new(&mut source);
        assert_eq!(reader.read_char().unwrap(), Some('A'));
    }
    assert_eq!(source.remaining(), " tail");
}
