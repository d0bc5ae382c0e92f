//! Text line format for balance board readings.
//!
//! Each reading is sent as one CRLF-terminated ASCII line:
//!
//! ```text
//! WiiBB: tl=<int>, tr=<int>, bl=<int>, br=<int>, temp=<int>\r\n
//! ```
//!
//! All five fields are signed decimal `i32` values.

use core::fmt::Write;

use crate::types::BalanceReading;

/// Capacity of the buffer a line is rendered into.
pub const LINE_BUFFER_SIZE: usize = 128;

/// Longest possible rendered line.
///
/// Fixed text is `WiiBB: tl=` (10) + 3 * `, xx=` (15) + `, temp=` (7) +
/// CRLF (2) = 34 bytes, plus five fields of at most 11 bytes
/// (`-2147483648`), giving 89.
pub const MAX_LINE_LENGTH: usize = 34 + 5 * 11;

const _: () = assert!(MAX_LINE_LENGTH <= LINE_BUFFER_SIZE);

const PREFIX: &[u8] = b"WiiBB: ";

/// A rendered line, ready to be written to the serial channel.
pub type LineBuffer = heapless::String<LINE_BUFFER_SIZE>;

/// Error type for rendering a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Rendered text did not fit in [`LINE_BUFFER_SIZE`] bytes.
    Overflow,
}

/// Error type for parsing a line back into a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Line does not start with `WiiBB: `.
    Prefix,
    /// A field is missing, misnamed, or out of order.
    Field,
    /// A field value is not a decimal `i32`.
    Number,
}

/// Render a reading as a CRLF-terminated line.
///
/// # Example
///
/// ```
/// use wiibb_core::{format_reading, BalanceReading};
///
/// let line = format_reading(&BalanceReading::new(120, 118, 95, 99, 24)).unwrap();
/// assert_eq!(line.as_str(), "WiiBB: tl=120, tr=118, bl=95, br=99, temp=24\r\n");
/// ```
pub fn format_reading(reading: &BalanceReading) -> Result<LineBuffer, FormatError> {
    let mut line = LineBuffer::new();
    write!(
        line,
        "WiiBB: tl={}, tr={}, bl={}, br={}, temp={}\r\n",
        reading.top_left,
        reading.top_right,
        reading.bottom_left,
        reading.bottom_right,
        reading.temperature,
    )
    .map_err(|_| FormatError::Overflow)?;
    Ok(line)
}

/// Parse a line produced by [`format_reading`].
///
/// A trailing CRLF (or bare LF) is accepted and ignored.
pub fn parse_line(line: &[u8]) -> Result<BalanceReading, ParseError> {
    let line = strip_line_ending(line);
    let body = line.strip_prefix(PREFIX).ok_or(ParseError::Prefix)?;

    let mut fields = body.split(|&b| b == b',');
    let top_left = parse_field(fields.next(), b"tl")?;
    let top_right = parse_field(fields.next(), b"tr")?;
    let bottom_left = parse_field(fields.next(), b"bl")?;
    let bottom_right = parse_field(fields.next(), b"br")?;
    let temperature = parse_field(fields.next(), b"temp")?;

    if fields.next().is_some() {
        return Err(ParseError::Field);
    }

    Ok(BalanceReading {
        top_left,
        top_right,
        bottom_left,
        bottom_right,
        temperature,
    })
}

/// Parse one `name=value` field, allowing a single leading space.
fn parse_field(field: Option<&[u8]>, name: &[u8]) -> Result<i32, ParseError> {
    let field = field.ok_or(ParseError::Field)?;
    let field = field.strip_prefix(b" ").unwrap_or(field);

    let eq = field
        .iter()
        .position(|&b| b == b'=')
        .ok_or(ParseError::Field)?;
    if &field[..eq] != name {
        return Err(ParseError::Field);
    }

    parse_i32(&field[eq + 1..])
}

/// Parse a signed decimal `i32`.
#[inline]
fn parse_i32(s: &[u8]) -> Result<i32, ParseError> {
    let (negative, digits) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    if digits.is_empty() {
        return Err(ParseError::Number);
    }

    // Accumulate as i64 so that i32::MIN's magnitude fits before negation.
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(ParseError::Number);
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as i64))
            .filter(|&v| v <= i32::MAX as i64 + 1)
            .ok_or(ParseError::Number)?;
    }

    if negative {
        value = -value;
    }

    i32::try_from(value).map_err(|_| ParseError::Number)
}

/// Strip trailing CR and/or LF from a line.
#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}
