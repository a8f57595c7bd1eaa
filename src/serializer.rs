use std::io::{self, Write};

use crate::error::JsonError;
use crate::value::Value;

/// Renders a document to a string, compact or indented.
///
/// Serialization of a well-formed tree cannot fail: non-finite numbers
/// render as `null` and every non-printable byte is escaped.
pub fn to_string(value: &Value, indent: bool) -> String {
    to_string_with_indent(value, if indent { Some(0) } else { None })
}

/// Renders a document to a string starting at an explicit indent column,
/// or compact when `indent` is `None`.
pub fn to_string_with_indent(value: &Value, indent: Option<usize>) -> String {
    let mut out = Vec::new();
    // Writing to a Vec cannot fail, and every emitted byte is ASCII.
    write_value(&mut out, value, indent).expect("in-memory serialization failed");
    String::from_utf8(out).expect("serialized output is not ASCII")
}

/// Renders a document to a writer and flushes it. Only this root-level call
/// flushes; the structural recursion below it never does.
pub fn to_writer<W: Write>(writer: W, value: &Value, indent: bool) -> Result<(), JsonError> {
    to_writer_with_indent(writer, value, if indent { Some(0) } else { None })
}

/// Renders a document to a writer at an explicit indent column, or compact
/// when `indent` is `None`, then flushes.
pub fn to_writer_with_indent<W: Write>(
    mut writer: W,
    value: &Value,
    indent: Option<usize>,
) -> Result<(), JsonError> {
    write_value(&mut writer, value, indent)?;
    writer.flush()?;
    Ok(())
}

/// Structural recursion over the tree. Depth is bounded by document depth
/// only; pathological nesting is out of scope.
fn write_value<W: Write>(w: &mut W, value: &Value, indent: Option<usize>) -> io::Result<()> {
    match value {
        Value::Null => w.write_all(b"null"),
        Value::Boolean(true) => w.write_all(b"true"),
        Value::Boolean(false) => w.write_all(b"false"),
        Value::Number(n) => {
            if n.is_finite() {
                write!(w, "{}", n)
            } else {
                // Not representable in the grammar; parseable output wins.
                w.write_all(b"null")
            }
        }
        Value::String(bytes) => write_string(w, bytes),
        Value::Array(items) => {
            if items.is_empty() {
                return w.write_all(b"[]");
            }
            w.write_all(b"[")?;
            write_gap(w, indent)?;
            let mut it = items.iter().peekable();
            while let Some(item) = it.next() {
                write_pad(w, indent.map(|col| col + 2))?;
                write_value(w, item, indent.map(|col| col + 2))?;
                if it.peek().is_some() {
                    w.write_all(b",")?;
                }
                write_gap(w, indent)?;
            }
            write_pad(w, indent)?;
            w.write_all(b"]")
        }
        Value::Object(entries) => {
            if entries.is_empty() {
                return w.write_all(b"{}");
            }
            w.write_all(b"{")?;
            write_gap(w, indent)?;
            let mut it = entries.iter().peekable();
            while let Some((key, item)) = it.next() {
                write_pad(w, indent.map(|col| col + 2))?;
                write_string(w, key)?;
                w.write_all(b": ")?;
                write_value(w, item, indent.map(|col| col + 2))?;
                if it.peek().is_some() {
                    w.write_all(b",")?;
                }
                write_gap(w, indent)?;
            }
            write_pad(w, indent)?;
            w.write_all(b"}")
        }
    }
}

/// Separator after an opening bracket and after each entry: one space in
/// compact mode, a newline in indented mode.
fn write_gap<W: Write>(w: &mut W, indent: Option<usize>) -> io::Result<()> {
    match indent {
        None => w.write_all(b" "),
        Some(_) => w.write_all(b"\n"),
    }
}

/// Leading indentation for an entry or closing bracket; nothing in compact
/// mode.
fn write_pad<W: Write>(w: &mut W, indent: Option<usize>) -> io::Result<()> {
    if let Some(col) = indent {
        for _ in 0..col {
            w.write_all(b" ")?;
        }
    }
    Ok(())
}

/// Quotes and escapes an 8-bit string. Named escapes for the common control
/// characters; everything else outside printable 7-bit range as an
/// exactly-4-digit lowercase `\u00xx` escape, so round-trips are byte-exact.
fn write_string<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    w.write_all(b"\"")?;
    for &byte in bytes {
        match byte {
            b'\\' => w.write_all(b"\\\\")?,
            b'"' => w.write_all(b"\\\"")?,
            b'\n' => w.write_all(b"\\n")?,
            b'\r' => w.write_all(b"\\r")?,
            b'\t' => w.write_all(b"\\t")?,
            0x0c => w.write_all(b"\\f")?,
            0x08 => w.write_all(b"\\b")?,
            0x00..=0x1f | 0x7f..=0xff => write!(w, "\\u{:04x}", byte)?,
            _ => w.write_all(&[byte])?,
        }
    }
    w.write_all(b"\"")
}
