use std::io::{self, Read};

use crate::error::{JsonError, SyntaxError};
use crate::value::{Object, Value};

/// Parse a complete document from a string.
///
/// The whole input must be exactly one document; trailing whitespace and
/// line comments are allowed, anything else is an "Input after end." error.
pub fn from_str(input: &str) -> Result<Value, JsonError> {
    from_slice(input.as_bytes())
}

/// Parse a complete document from a byte slice.
///
/// The byte form exists because string content is 8-bit clean: input such
/// as `"\xc4"` is a valid document but not valid UTF-8.
pub fn from_slice(input: &[u8]) -> Result<Value, JsonError> {
    Parser::with_mode(input, false).parse_document()
}

/// Parse exactly one document from a reader, leaving the cursor just past
/// it. A document ending in a bare number consumes one extra byte of
/// lookahead, which is lost; every other document shape stops precisely at
/// its final byte.
pub fn from_reader<R: Read>(reader: R) -> Result<Value, JsonError> {
    Parser::new(reader).parse_document()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expect a value, or `]` if the open container is an array.
    PreElement,
    /// Inside an object: expect a quoted key or `}`.
    PreKey,
    /// Inside an object, after a key: expect `:`.
    PreSep,
    /// After a complete element: expect `,`, a matching closing bracket,
    /// or end of input once no container remains open.
    PostElement,
}

/// An in-progress container. Children are built fully before being attached
/// to their parent, so no frame ever holds a reference into another.
enum Frame {
    Array(Vec<Value>),
    Object { entries: Object, key: Option<Vec<u8>> },
}

/// Stack-driven document parser over any byte source.
///
/// One parser can pull several consecutive documents from the same stream;
/// each `parse_document` call starts a fresh tree but keeps the read
/// position and line counter.
pub struct Parser<R: Read> {
    source: R,
    /// One-byte pushback slot for the number scanner's lookahead.
    pending: Option<u8>,
    line: u32,
    state: State,
    stack: Vec<Frame>,
    root: Option<Value>,
    /// Stream mode: return as soon as the root value completes instead of
    /// insisting on end of input.
    stop_after_root: bool,
}

impl<R: Read> Parser<R> {
    /// Creates a stream-mode parser: `parse_document` consumes one document
    /// and stops.
    pub fn new(source: R) -> Self {
        Self::with_mode(source, true)
    }

    fn with_mode(source: R, stop_after_root: bool) -> Self {
        Parser {
            source,
            pending: None,
            line: 1,
            state: State::PreElement,
            stack: Vec::new(),
            root: None,
            stop_after_root,
        }
    }

    /// 1-based line number of the read position, for diagnostics.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Parses one document and returns its root value. Any failure discards
    /// the tree built so far.
    pub fn parse_document(&mut self) -> Result<Value, JsonError> {
        self.state = State::PreElement;
        self.stack.clear();
        self.root = None;

        loop {
            if self.stop_after_root && self.state == State::PostElement && self.stack.is_empty() {
                // Root complete; do not touch the stream again.
                return Ok(self.root.take().unwrap_or_default());
            }

            let Some(byte) = self.next_byte()? else { break };

            // A comment is legal anywhere whitespace is being skipped.
            if byte == b'/' {
                self.skip_line_comment()?;
                continue;
            }
            if byte == b'\n' || byte == b'\r' {
                self.line += 1;
            }
            if matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
                continue;
            }

            match self.state {
                State::PreKey => match byte {
                    b'"' => {
                        let key = self.scan_string()?;
                        match self.stack.last_mut() {
                            Some(Frame::Object { key: slot, .. }) => *slot = Some(key),
                            _ => unreachable!("key scanned outside an object frame"),
                        }
                        self.state = State::PreSep;
                    }
                    b'}' => self.close(),
                    _ => return Err(self.err("Expected key or closing bracket.", byte).into()),
                },

                State::PreSep => {
                    if byte != b':' {
                        return Err(self
                            .err("Expected ':' separating key and value.", byte)
                            .into());
                    }
                    self.state = State::PreElement;
                }

                State::PreElement => match byte {
                    b']' if matches!(self.stack.last(), Some(Frame::Array(_))) => self.close(),
                    b'[' => self.stack.push(Frame::Array(Vec::new())),
                    b'{' => {
                        self.stack.push(Frame::Object {
                            entries: Object::new(),
                            key: None,
                        });
                        self.state = State::PreKey;
                    }
                    b'"' => {
                        let bytes = self.scan_string()?;
                        self.complete(Value::String(bytes));
                    }
                    b'n' => {
                        self.scan_literal(b"ull", "Expected \"null\"")?;
                        self.complete(Value::Null);
                    }
                    b't' => {
                        self.scan_literal(b"rue", "Expected \"true\"")?;
                        self.complete(Value::Boolean(true));
                    }
                    b'f' => {
                        self.scan_literal(b"alse", "Expected \"false\"")?;
                        self.complete(Value::Boolean(false));
                    }
                    b'-' | b'+' | b'0'..=b'9' => {
                        let (number, lookahead) = self.scan_number(byte)?;
                        self.complete(Value::Number(number));
                        self.pending = lookahead;
                    }
                    _ => {
                        return Err(self
                            .err(
                                "Primitive must be one of null, true, false, number or quoted string.",
                                byte,
                            )
                            .into());
                    }
                },

                State::PostElement => {
                    if self.stack.is_empty() {
                        return Err(self.err("Input after end.", byte).into());
                    }
                    match byte {
                        b',' => {
                            self.state = match self.stack.last() {
                                Some(Frame::Array(_)) => State::PreElement,
                                _ => State::PreKey,
                            };
                        }
                        b']' => match self.stack.last() {
                            Some(Frame::Array(_)) => self.close(),
                            _ => {
                                return Err(self
                                    .err("Token ']' is illegal inside object.", byte)
                                    .into());
                            }
                        },
                        b'}' => match self.stack.last() {
                            Some(Frame::Object { .. }) => self.close(),
                            _ => {
                                return Err(self
                                    .err("Token '}' is illegal inside array.", byte)
                                    .into());
                            }
                        },
                        _ => {
                            return Err(self.err("Expected ',' or closing bracket.", byte).into());
                        }
                    }
                }
            }
        }

        if self.state == State::PostElement && self.stack.is_empty() {
            Ok(self.root.take().unwrap_or_default())
        } else {
            Err(self.err("Unexpected end of file.", 0).into())
        }
    }

    /// Attaches a finished value to the open container, or installs it as
    /// the root when no container is open.
    fn complete(&mut self, value: Value) {
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Object { entries, key }) => match key.take() {
                // A duplicate key keeps the last occurrence.
                Some(key) => {
                    entries.insert(key, value);
                }
                None => unreachable!("object value completed without a key"),
            },
        }
        self.state = State::PostElement;
    }

    /// Pops the top frame and completes it as a value. The caller has
    /// already checked that the frame matches the closing bracket.
    fn close(&mut self) {
        let value = match self.stack.pop() {
            Some(Frame::Array(items)) => Value::Array(items),
            Some(Frame::Object { entries, .. }) => Value::Object(entries),
            None => unreachable!("close with no open container"),
        };
        self.complete(value);
    }

    fn next_byte(&mut self) -> Result<Option<u8>, JsonError> {
        if let Some(byte) = self.pending.take() {
            return Ok(Some(byte));
        }
        let mut buf = [0u8; 1];
        loop {
            match self.source.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(JsonError::Io(e)),
            }
        }
    }

    fn must_byte(&mut self, message: &'static str) -> Result<u8, JsonError> {
        match self.next_byte()? {
            Some(byte) => Ok(byte),
            None => Err(self.err(message, 0).into()),
        }
    }

    fn err(&self, message: &'static str, byte: u8) -> SyntaxError {
        SyntaxError {
            message,
            line: self.line,
            byte,
        }
    }

    /// Scans string content up to and including the terminating quote. The
    /// opening quote has already been consumed.
    fn scan_string(&mut self) -> Result<Vec<u8>, JsonError> {
        let mut out = Vec::new();
        loop {
            let byte = self.must_byte("Unexpected end of file while parsing string.")?;
            match byte {
                b'"' => return Ok(out),
                b'\\' => {
                    let escape = self.must_byte("Unexpected end of file while parsing string.")?;
                    match escape {
                        b'\\' => out.push(b'\\'),
                        b'"' => out.push(b'"'),
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'f' => out.push(0x0c),
                        b'b' => out.push(0x08),
                        b'/' => out.push(b'/'),
                        b'u' => {
                            let value = self.scan_hex_escape()?;
                            out.push(value);
                        }
                        _ => {
                            return Err(self.err("Illegal string escape sequence", escape).into());
                        }
                    }
                }
                0x00..=0x1f | 0x7f | 0x80..=0x9f => {
                    return Err(self.err("Control character in string.", byte).into());
                }
                _ => out.push(byte),
            }
        }
    }

    /// Scans the 4 hex digits of a `\u` escape. The document model is 8-bit,
    /// so values above 0xFF are unsupported.
    fn scan_hex_escape(&mut self) -> Result<u8, JsonError> {
        let mut digits = [0u8; 4];
        for slot in &mut digits {
            *slot =
                self.must_byte("Unexpected end of file while reading character escape sequence.")?;
        }
        let mut value: u32 = 0;
        for digit in digits {
            let nibble = match digit {
                b'0'..=b'9' => digit - b'0',
                b'a'..=b'f' => digit - b'a' + 10,
                b'A'..=b'F' => digit - b'A' + 10,
                _ => return Err(self.err("Invalid character escape sequence.", digits[0]).into()),
            };
            value = (value << 4) | u32::from(nibble);
        }
        if value > 0xff {
            return Err(self
                .err("Escape sequence above Latin-1 not implemented.", digits[0])
                .into());
        }
        Ok(value as u8)
    }

    /// Scans a number starting with the already-consumed `first` byte.
    ///
    /// More permissive than the standard grammar (a leading `+` is
    /// accepted). Numbers have no terminating delimiter, so the byte that
    /// ends one is returned for the state machine to re-dispatch.
    fn scan_number(&mut self, first: u8) -> Result<(f64, Option<u8>), JsonError> {
        let mut text = String::new();
        text.push(first as char);

        let mut lookahead = None;
        while let Some(byte) = self.next_byte()? {
            match byte {
                b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E' => text.push(byte as char),
                _ => {
                    lookahead = Some(byte);
                    break;
                }
            }
        }

        let number: f64 = text
            .parse()
            .map_err(|_| self.err("Failed to parse number", first))?;
        if !number.is_finite() {
            // Never materialize an infinity from text; the serializer would
            // turn it back into null.
            return Err(self
                .err("Failed to parse number, value out of range", first)
                .into());
        }
        Ok((number, lookahead))
    }

    /// Verifies the remainder of a literal whose first letter has been
    /// consumed and dispatched on.
    fn scan_literal(&mut self, rest: &'static [u8], message: &'static str) -> Result<(), JsonError> {
        for &want in rest {
            match self.next_byte()? {
                Some(got) if got == want => {}
                Some(got) => return Err(self.err(message, got).into()),
                None => return Err(self.err(message, 0).into()),
            }
        }
        Ok(())
    }

    /// Skips a `//` comment through the end of the line. The first slash
    /// has been consumed.
    fn skip_line_comment(&mut self) -> Result<(), JsonError> {
        match self.next_byte()? {
            Some(b'/') => {}
            Some(byte) => {
                return Err(self
                    .err("Expected second '/' to begin line comment.", byte)
                    .into());
            }
            None => {
                return Err(self
                    .err("Expected second '/' to begin line comment.", 0)
                    .into());
            }
        }
        while let Some(byte) = self.next_byte()? {
            if byte == b'\n' || byte == b'\r' {
                self.line += 1;
                break;
            }
        }
        Ok(())
    }
}
