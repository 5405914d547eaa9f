//! Minimal comma-separated table reading and writing.
//!
//! Fields containing a comma, a double quote or a line break are quoted, with
//! embedded quotes doubled. Records are terminated by `\n`.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

fn quote_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Write one record followed by a newline
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_record<W, S>(writer: &mut W, fields: &[S]) -> io::Result<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        writer.write_all(quote_field(field.as_ref()).as_bytes())?;
    }
    writer.write_all(b"\n")
}

/// Split one line into fields, undoing the quoting of [`write_record`]
#[must_use]
pub fn parse_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Read every non-blank line of a table as records.
///
/// # Errors
///
/// Returns any error from the underlying reader.
pub fn read_records<R: BufRead>(reader: R) -> io::Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        records.push(parse_record(line));
    }
    Ok(records)
}
