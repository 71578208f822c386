use std::fmt::Write;

use chrono::{NaiveDateTime, Timelike};
use chrono::format::{Item, StrftimeItems};

use crate::core::error::{DateWeatherError, DateWeatherResult};

// Constants for format strings
/// The only textual time format accepted or produced, in the notation callers use
pub const DEFAULT_PATTERN: &str = "yyyy-MM-dd HH:mm:ss";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DAY_FORMAT: &str = "%A";

/// Available resource URIs for the Date & Weather MCP Server
pub const AVAILABLE_RESOURCES: &[&str] = &["datetime://status", "datetime://help"];

/// Shape of [`DEFAULT_PATTERN`]: `d` is an ASCII digit, anything else a literal
const CANONICAL_LAYOUT: &[u8; 19] = b"dddd-dd-dd dd:dd:dd";

/// Parse text in the fixed `yyyy-MM-dd HH:mm:ss` pattern. Field widths are
/// exact and leap seconds are rejected.
pub fn parse_datetime(text: &str) -> DateWeatherResult<NaiveDateTime> {
    let trimmed = text.trim();
    if !matches_canonical_layout(trimmed) {
        return Err(DateWeatherError::unparsable(text));
    }

    let parsed = NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT)
        .map_err(|_| DateWeatherError::unparsable(text))?;

    // chrono keeps second 60 as a nanosecond overflow
    if parsed.nanosecond() != 0 {
        return Err(DateWeatherError::unparsable(text));
    }

    Ok(parsed)
}

fn matches_canonical_layout(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == CANONICAL_LAYOUT.len()
        && bytes
            .iter()
            .zip(CANONICAL_LAYOUT.iter())
            .all(|(&b, &expected)| match expected {
                b'd' => b.is_ascii_digit(),
                literal => b == literal,
            })
}

/// Render a wall-clock value in the fixed pattern
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Compile a caller supplied pattern into chrono format items.
///
/// Two notations are accepted:
///
/// * date-pattern letters such as `yyyy年MM月dd日`, `MM/dd/yyyy` or
///   `EEEE HH:mm`, with `'...'` quoting literal text and `''` for a quote;
/// * strftime specifiers (`%Y/%m/%d`), chosen whenever the pattern contains `%`.
///
/// # Returns
///
/// The strftime string equivalent of `pattern`, already validated
pub fn compile_pattern(pattern: &str) -> DateWeatherResult<String> {
    if pattern.trim().is_empty() {
        return Err(invalid_pattern(pattern, "pattern is empty"));
    }

    let strftime = if pattern.contains('%') {
        pattern.to_string()
    } else {
        translate_letter_pattern(pattern)?
    };

    if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
        return Err(invalid_pattern(pattern, "unrecognized format specifier"));
    }

    Ok(strftime)
}

/// Render `dt` with a caller supplied pattern (see [`compile_pattern`])
pub fn format_with_pattern(dt: &NaiveDateTime, pattern: &str) -> DateWeatherResult<String> {
    let strftime = compile_pattern(pattern)?;

    // Specifiers that need an offset (%z, %Z) fail at render time on a naive value
    let mut rendered = String::new();
    write!(rendered, "{}", dt.format(&strftime))
        .map_err(|_| invalid_pattern(pattern, "pattern needs information a local time lacks"))?;

    Ok(rendered)
}

fn invalid_pattern(pattern: &str, reason: &str) -> DateWeatherError {
    DateWeatherError::InvalidTimeFormat {
        input: pattern.to_string(),
        reason: reason.to_string(),
    }
}

fn translate_letter_pattern(pattern: &str) -> DateWeatherResult<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' is an escaped quote, otherwise read up to the closing quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            loop {
                match chars.get(j) {
                    None => return Err(invalid_pattern(pattern, "unterminated quoted text")),
                    Some('\'') if chars.get(j + 1) == Some(&'\'') => {
                        out.push('\'');
                        j += 2;
                    }
                    Some('\'') => break,
                    Some(&literal) => {
                        out.push(literal);
                        j += 1;
                    }
                }
            }
            i = j + 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            out.push(c);
            i += 1;
            continue;
        }

        let mut run = 1;
        while chars.get(i + run) == Some(&c) {
            run += 1;
        }
        out.push_str(letter_specifier(c, run).ok_or_else(|| {
            invalid_pattern(
                pattern,
                &format!("unsupported pattern letter '{}'", c.to_string().repeat(run)),
            )
        })?);
        i += run;
    }

    Ok(out)
}

fn letter_specifier(letter: char, run: usize) -> Option<&'static str> {
    let specifier = match (letter, run) {
        ('y' | 'u', 2) => "%y",
        ('y' | 'u', _) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('D', _) => "%j",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('S', 1..=3) => "%3f",
        ('S', 4..=6) => "%6f",
        ('S', _) => "%9f",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('a', _) => "%p",
        _ => return None,
    };
    Some(specifier)
}

/// Human readable breakdown of an interval
///
/// # Arguments
///
/// * `days`, `hours`, `minutes`, `seconds` - remainder components of the interval
pub fn format_interval_summary(days: i64, hours: i64, minutes: i64, seconds: i64) -> String {
    format!(
        "{} days {} hours {} minutes {} seconds",
        days, hours, minutes, seconds
    )
}
