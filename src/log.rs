//! Append-only text log of `add`/`remove` operations, and snapshot write/load.
//!
//! The wire format is deliberately simple UTF-8 text (§4.6 of `SPEC_FULL.md`): one
//! record per line, fields space-separated, atoms double-quote-escaped. No external
//! "atom serialization" crate exists in the corpus for this, so the quoting is written
//! here from scratch, kept isolated in this module the way the original spec keeps it
//! behind an abstract reader/writer interface.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use crate::error::Error;

/// One logged operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Remove,
}

impl Op {
    fn token(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Remove => "remove",
        }
    }
}

/// A parsed log/snapshot record: an operation (absent for a bare snapshot line) plus
/// the three atom strings.
pub struct Record {
    pub op: Option<Op>,
    pub s: String,
    pub p: String,
    pub o: String,
}

fn quote(into: &mut String, atom: &str) {
    into.push('"');
    for ch in atom.chars() {
        if ch == '"' || ch == '\\' {
            into.push('\\');
        }
        into.push(ch);
    }
    into.push('"');
}

/// Write one `add`/`remove` log line.
pub fn write_log_record<W: Write>(w: &mut W, op: Op, s: &str, p: &str, o: &str) -> Result<(), Error> {
    let mut line = String::with_capacity(s.len() + p.len() + o.len() + 16);
    line.push_str(op.token());
    line.push(' ');
    quote(&mut line, s);
    line.push(' ');
    quote(&mut line, p);
    line.push(' ');
    quote(&mut line, o);
    line.push('\n');
    w.write_all(line.as_bytes())?;
    w.flush()?;
    Ok(())
}

/// Write one bare `s p o` snapshot line (no operation token).
pub fn write_snapshot_record<W: Write>(w: &mut W, s: &str, p: &str, o: &str) -> Result<(), Error> {
    let mut line = String::with_capacity(s.len() + p.len() + o.len() + 8);
    quote(&mut line, s);
    line.push(' ');
    quote(&mut line, p);
    line.push(' ');
    quote(&mut line, o);
    line.push('\n');
    w.write_all(line.as_bytes())?;
    Ok(())
}

/// Parse one quoted field starting at `chars`. Returns the unescaped content and
/// advances past the closing quote (and the single trailing space, if any).
fn parse_quoted(rest: &str) -> Result<(String, &str), String> {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, '"')) => {}
        _ => return Err("expected opening '\"'".to_string()),
    }
    let mut out = String::new();
    loop {
        match chars.next() {
            None => return Err("unterminated quoted atom".to_string()),
            Some((_, '\\')) => match chars.next() {
                Some((_, c)) => out.push(c),
                None => return Err("dangling escape".to_string()),
            },
            Some((i, '"')) => {
                let after = &rest[i + 1..];
                let after = after.strip_prefix(' ').unwrap_or(after);
                return Ok((out, after));
            }
            Some((_, c)) => out.push(c),
        }
    }
}

fn parse_record(line: &str) -> Result<Record, String> {
    let line = line.trim_end_matches(['\n', '\r']);
    let (op, rest) = if let Some(rest) = line.strip_prefix("add ") {
        (Some(Op::Add), rest)
    } else if let Some(rest) = line.strip_prefix("remove ") {
        (Some(Op::Remove), rest)
    } else {
        (None, line)
    };
    let (s, rest) = parse_quoted(rest)?;
    let (p, rest) = parse_quoted(rest)?;
    let (o, _rest) = parse_quoted(rest)?;
    Ok(Record { op, s, p, o })
}

/// Read every record out of `r`, failing fast on the first malformed line.
pub fn read_records<R: BufRead>(r: R) -> Result<Vec<Record>, Error> {
    let mut out = Vec::new();
    for line in r.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(&line) {
            Ok(record) => out.push(record),
            Err(reason) => return Err(Error::MalformedLogRecord(line, reason)),
        }
    }
    Ok(out)
}

/// Read every record out of `r`, collecting (rather than aborting on) malformed lines.
pub fn read_records_lenient<R: BufRead>(r: R) -> (Vec<Record>, Vec<Error>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for line in r.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                errors.push(Error::Io(err));
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(&line) {
            Ok(record) => records.push(record),
            Err(reason) => errors.push(Error::MalformedLogRecord(line, reason)),
        }
    }
    (records, errors)
}

/// An open append-only log file handle.
pub struct Log<W: Write> {
    writer: W,
}

impl<W: Write> Log<W> {
    pub fn new(writer: W) -> Log<W> {
        Log { writer }
    }

    pub fn append(&mut self, op: Op, s: &str, p: &str, o: &str) -> Result<(), Error> {
        write_log_record(&mut self.writer, op, s, p, o)
    }

    /// Consume the log handle, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Render a record back to its textual form, mainly useful for diagnostics and tests.
pub fn format_record(op: Op, s: &str, p: &str, o: &str) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} ", op.token());
    quote(&mut out, s);
    out.push(' ');
    quote(&mut out, p);
    out.push(' ');
    quote(&mut out, o);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_round_trips_through_parsing() {
        let line = format_record(Op::Add, "Alice", "knows a \"friend\"", "Bob");
        let record = parse_record(&line).unwrap();
        assert_eq!(record.op, Some(Op::Add));
        assert_eq!(record.s, "Alice");
        assert_eq!(record.p, "knows a \"friend\"");
        assert_eq!(record.o, "Bob");
    }

    #[test]
    fn snapshot_lines_have_no_operation_token() {
        let mut buf = Vec::new();
        write_snapshot_record(&mut buf, "Alice", "knows", "Bob").unwrap();
        let text = String::from_utf8(buf).unwrap();
        let record = parse_record(text.trim_end()).unwrap();
        assert!(record.op.is_none());
        assert_eq!((record.s.as_str(), record.p.as_str(), record.o.as_str()), ("Alice", "knows", "Bob"));
    }

    #[test]
    fn malformed_line_is_reported_not_panicked() {
        let err = parse_record("add \"Alice\" \"knows\"").unwrap_err();
        assert!(err.contains("unterminated") || err.contains("opening"));
    }

    #[test]
    fn read_records_lenient_skips_bad_lines_and_keeps_good_ones() {
        let input = "add \"Alice\" \"knows\" \"Bob\"\nnonsense\nremove \"Alice\" \"knows\" \"Bob\"\n";
        let (records, errors) = read_records_lenient(io::Cursor::new(input));
        assert_eq!(records.len(), 2);
        assert_eq!(errors.len(), 1);
    }
}
