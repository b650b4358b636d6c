//! Line-oriented parsing of `.animation` files
//!
//! Each non-empty line starts with a keyword (`animation`, `frame`, `blank`,
//! `point`) followed by `key=value` attributes. Values are either bare
//! (terminated by whitespace) or double-quoted with backslash escapes.
//! Comments (`#`) and metadata lines (`imagePath`, `version`) are skipped.
//!
//! Numeric attributes are read from their leading numeric prefix and rounded
//! to the nearest whole pixel (`originx="7.5"` becomes 8), since every
//! coordinate addresses a pixel of the sheet. Values whose magnitude exceeds
//! [`MAX_COORDINATE`] are rejected so later geometry cannot overflow.

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::models::{find_duplicate_states, Animation, Frame, Point, Warning};

/// Error type for parsing failures.
///
/// Any error aborts the whole parse; no partial animation set is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Malformed text: bad attribute syntax, orphaned frame/point, unknown keyword.
    #[error("line {line}: {message} near \"{token}\"")]
    Format { line: usize, token: String, message: String },
    /// A required attribute is absent or empty.
    #[error("line {line}: {element} is missing required attribute '{attribute}'")]
    MissingAttribute { line: usize, element: &'static str, attribute: &'static str },
}

impl ParseError {
    /// 1-based line the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::Format { line, .. } | ParseError::MissingAttribute { line, .. } => *line,
        }
    }

    fn format(line: usize, token: &str, message: impl Into<String>) -> Self {
        ParseError::Format { line, token: token.to_string(), message: message.into() }
    }
}

/// Result of parsing an animation file.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub animations: Vec<Animation>,
    /// 1-based line of each animation's header, parallel to `animations`.
    pub lines: Vec<usize>,
    pub warnings: Vec<Warning>,
}

type Attributes = HashMap<String, String>;

/// Largest accepted magnitude of a numeric attribute.
pub const MAX_COORDINATE: i32 = 1 << 24;

/// Parse animation text into an animation set.
///
/// Duplicate state names are kept as separate entries and reported as
/// warnings; callers decide whether that is fatal.
pub fn parse_animations(text: &str) -> Result<ParseResult, ParseError> {
    let mut result = ParseResult::default();

    for (index, raw_line) in text.split('\n').enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();

        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with("imagePath")
            || line.starts_with("version")
        {
            continue;
        }

        let keyword = line.split(char::is_whitespace).next().unwrap_or(line);

        match keyword {
            "animation" => {
                let attributes = parse_attributes(line, line_number)?;
                let state = required(&attributes, "state", "animation", line_number)?;
                result.animations.push(Animation::new(state));
                result.lines.push(line_number);
            }
            "frame" | "blank" => {
                let Some(animation) = result.animations.last_mut() else {
                    return Err(ParseError::format(
                        line_number,
                        keyword,
                        "no animation state to associate frame with",
                    ));
                };
                let attributes = parse_attributes(line, line_number)?;
                animation.frames.push(frame_from_attributes(&attributes, line_number)?);
            }
            "point" => {
                let Some(frame) = result.animations.last_mut().and_then(|a| a.frames.last_mut())
                else {
                    return Err(ParseError::format(
                        line_number,
                        keyword,
                        "no frame to associate point with",
                    ));
                };
                let attributes = parse_attributes(line, line_number)?;
                let label = required(&attributes, "label", "point", line_number)?;
                frame.points.push(Point {
                    label: label.to_string(),
                    x: attribute_number(&attributes, "x", line_number)?,
                    y: attribute_number(&attributes, "y", line_number)?,
                });
            }
            _ => {
                return Err(ParseError::format(line_number, keyword, "unexpected keyword"));
            }
        }
    }

    result.warnings = find_duplicate_states(&result.animations, &result.lines);
    debug!(
        animations = result.animations.len(),
        frames = result.animations.iter().map(|a| a.frames.len()).sum::<usize>(),
        warnings = result.warnings.len(),
        "parsed animation text"
    );
    Ok(result)
}

fn required<'a>(
    attributes: &'a Attributes,
    attribute: &'static str,
    element: &'static str,
    line: usize,
) -> Result<&'a str, ParseError> {
    match attributes.get(attribute) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ParseError::MissingAttribute { line, element, attribute }),
    }
}

fn frame_from_attributes(attributes: &Attributes, line: usize) -> Result<Frame, ParseError> {
    let number = |key: &str| attribute_number(attributes, key, line).map(|v| v.unwrap_or(0));
    let flag = |key: &str| attributes.get(key).and_then(|v| parse_int_prefix(v)) == Some(1);

    Ok(Frame {
        x: number("x")?,
        y: number("y")?,
        w: number("w")?,
        h: number("h")?,
        originx: number("originx")?,
        originy: number("originy")?,
        flipx: flag("flipx"),
        flipy: flag("flipy"),
        duration: attributes.get("duration").cloned().unwrap_or_default(),
        points: Vec::new(),
    })
}

/// Rounded value of a numeric attribute; `None` when absent or unparseable.
fn attribute_number(attributes: &Attributes, key: &str, line: usize) -> Result<Option<i32>, ParseError> {
    let Some(value) = attributes.get(key) else {
        return Ok(None);
    };
    let Some(number) = parse_number_prefix(value) else {
        return Ok(None);
    };

    let rounded = number.round();
    if !rounded.is_finite() || rounded.abs() > f64::from(MAX_COORDINATE) {
        return Err(ParseError::format(
            line,
            value,
            format!("{} is out of range (limit is ±{})", key, MAX_COORDINATE),
        ));
    }
    Ok(Some(rounded as i32))
}

/// Parse the attributes following the keyword on `line`.
fn parse_attributes(line: &str, line_number: usize) -> Result<Attributes, ParseError> {
    let mut attributes = Attributes::new();
    let bytes = line.as_bytes();

    let Some(mut index) = line.find(char::is_whitespace) else {
        return Ok(attributes);
    };

    while let Some(key_start) = skip_whitespace(bytes, index) {
        let key_end = find_byte(bytes, key_start, |b| b.is_ascii_whitespace() || b == b'=')
            .unwrap_or(bytes.len());
        let key = &line[key_start..key_end];

        if key.is_empty() {
            return Err(ParseError::format(line_number, &line[key_start..], "attribute is missing a name"));
        }

        let eq_index = match skip_whitespace(bytes, key_end) {
            Some(i) if bytes[i] == b'=' => i,
            _ => return Err(ParseError::format(line_number, key, "attribute is missing \"=\"")),
        };

        let Some(value_start) = skip_whitespace(bytes, eq_index + 1) else {
            return Err(ParseError::format(line_number, key, "attribute is missing value"));
        };

        let value = if bytes[value_start] == b'"' {
            let Some(value_end) = find_closing_quote(bytes, value_start + 1) else {
                return Err(ParseError::format(
                    line_number,
                    &line[value_start..],
                    "string missing closing quote",
                ));
            };
            index = value_end + 1;
            unquote(&line[value_start + 1..value_end])
        } else {
            let value_end =
                find_byte(bytes, value_start, |b| b.is_ascii_whitespace()).unwrap_or(bytes.len());
            index = value_end;
            line[value_start..value_end].to_string()
        };

        attributes.insert(key.to_string(), value);
    }

    Ok(attributes)
}

fn find_byte(bytes: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> Option<usize> {
    bytes.iter().skip(from).position(|&b| pred(b)).map(|i| i + from)
}

fn skip_whitespace(bytes: &[u8], from: usize) -> Option<usize> {
    find_byte(bytes, from, |b| !b.is_ascii_whitespace())
}

/// True when the byte at `index` is preceded by an odd number of backslashes.
fn is_escaped(bytes: &[u8], index: usize) -> bool {
    bytes[..index].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1
}

/// Index of the next unescaped `"` at or after `from`.
fn find_closing_quote(bytes: &[u8], from: usize) -> Option<usize> {
    let mut index = from;
    loop {
        let quote = find_byte(bytes, index, |b| b == b'"')?;
        if !is_escaped(bytes, quote) {
            return Some(quote);
        }
        index = quote + 1;
    }
}

/// Resolve backslash escapes inside a quoted value (quotes already stripped).
fn unquote(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

/// Parse the longest numeric prefix of `value` (`"12px"` → 12, `"x"` → None).
pub(crate) fn parse_number_prefix(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Parse the integer prefix of `value` (`"1.0"` → 1, `"01"` → 1).
fn parse_int_prefix(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let sign_len = usize::from(s.starts_with('-') || s.starts_with('+'));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"imagePath="hero.png"
version="1.0"

# idle loop
animation state="IDLE"
frame x="0" y="0" w="16" h="16" originx="8" originy="16" duration="100"
point label="HILT" x="4" y="4"
blank duration="50"
"#;

    #[test]
    fn test_parse_sample() {
        let result = parse_animations(SAMPLE).unwrap();
        assert_eq!(result.animations.len(), 1);
        assert_eq!(result.lines, vec![5]);
        assert!(result.warnings.is_empty());

        let idle = &result.animations[0];
        assert_eq!(idle.state(), "IDLE");
        assert_eq!(idle.frames.len(), 2);

        let frame = &idle.frames[0];
        assert_eq!((frame.x, frame.y, frame.w, frame.h), (0, 0, 16, 16));
        assert_eq!((frame.originx, frame.originy), (8, 16));
        assert_eq!(frame.duration, "100");
        assert_eq!(frame.points, vec![Point::new("HILT", 4, 4)]);

        let blank = &idle.frames[1];
        assert!(blank.is_empty());
        assert_eq!(blank.duration, "50");
    }

    #[test]
    fn test_bare_values_and_attribute_order() {
        let text = "animation state=RUN\nframe h=8 w=4 flipx=1 flipy=0 x = 2";
        let result = parse_animations(text).unwrap();
        let frame = &result.animations[0].frames[0];
        assert_eq!(result.animations[0].state(), "RUN");
        assert_eq!((frame.x, frame.w, frame.h), (2, 4, 8));
        assert!(frame.flipx);
        assert!(!frame.flipy);
    }

    #[test]
    fn test_flags_only_true_for_one() {
        let text = "animation state=\"A\"\nframe flipx=\"01\" flipy=\"true\"\nframe flipx=\"1.0\" flipy=\"2\"";
        let frames = &parse_animations(text).unwrap().animations[0].frames;
        assert!(frames[0].flipx);
        assert!(!frames[0].flipy);
        assert!(frames[1].flipx);
        assert!(!frames[1].flipy);
    }

    #[test]
    fn test_escaped_quotes_in_value() {
        let text = r#"animation state="say \"hi\" \\"
frame duration="1""#;
        let result = parse_animations(text).unwrap();
        assert_eq!(result.animations[0].state(), r#"say "hi" \"#);
        assert_eq!(result.animations[0].frames[0].duration, "1");
    }

    #[test]
    fn test_numeric_defaults() {
        let text = "animation state=\"A\"\nframe x=\"abc\" w=\"12px\" originx=\"-3\"";
        let frame = &parse_animations(text).unwrap().animations[0].frames[0];
        assert_eq!(frame.x, 0);
        assert_eq!(frame.w, 12);
        assert_eq!(frame.originx, -3);
        assert_eq!(frame.h, 0);
    }

    #[test]
    fn test_fractional_numbers_round() {
        let text = "animation state=\"A\"\nframe originx=\"7.5\" originy=\"-2.4\" w=\"3.49\"";
        let frame = &parse_animations(text).unwrap().animations[0].frames[0];
        assert_eq!(frame.originx, 8);
        assert_eq!(frame.originy, -2);
        assert_eq!(frame.w, 3);
    }

    #[test]
    fn test_out_of_range_frame_number() {
        let text = "animation state=\"A\"\nframe x=\"3000000000\" w=\"4\"";
        let err = parse_animations(text).unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(matches!(err, ParseError::Format { ref token, .. } if token == "3000000000"));
    }

    #[test]
    fn test_out_of_range_point_and_origin() {
        let point = "animation state=\"A\"\nframe w=\"1\"\npoint label=\"HILT\" x=\"1\" y=\"-3e9\"";
        assert_eq!(parse_animations(point).unwrap_err().line(), 3);

        let origin = "animation state=\"A\"\nframe originx=\"1e999\"";
        assert_eq!(parse_animations(origin).unwrap_err().line(), 2);

        let limit = format!("animation state=\"A\"\nframe x=\"{}\"", MAX_COORDINATE);
        assert_eq!(parse_animations(&limit).unwrap().animations[0].frames[0].x, MAX_COORDINATE);
    }

    #[test]
    fn test_point_missing_coordinate_is_invalid() {
        let text = "animation state=\"A\"\nframe w=\"1\"\npoint label=\"TIP\" x=\"3\"";
        let frame = &parse_animations(text).unwrap().animations[0].frames[0];
        assert_eq!(frame.points[0].x, Some(3));
        assert_eq!(frame.points[0].y, None);
    }

    #[test]
    fn test_missing_state_reports_line() {
        let text = "# header\n\nanimation x=\"1\"";
        let err = parse_animations(text).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingAttribute { line: 3, element: "animation", attribute: "state" }
        );
        assert!(err.to_string().starts_with("line 3:"));
    }

    #[test]
    fn test_empty_state_is_missing() {
        let err = parse_animations("animation state=\"\"").unwrap_err();
        assert!(matches!(err, ParseError::MissingAttribute { line: 1, .. }));
    }

    #[test]
    fn test_missing_label() {
        let text = "animation state=\"A\"\nframe\npoint x=\"1\" y=\"2\"";
        let err = parse_animations(text).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingAttribute { line: 3, element: "point", attribute: "label" }
        );
    }

    #[test]
    fn test_frame_without_animation() {
        let err = parse_animations("frame x=\"1\"").unwrap_err();
        assert!(matches!(err, ParseError::Format { line: 1, ref token, .. } if token == "frame"));
    }

    #[test]
    fn test_point_without_frame() {
        let text = "animation state=\"A\"\npoint label=\"P\" x=\"1\" y=\"1\"";
        let err = parse_animations(text).unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_unknown_keyword() {
        let text = "animation state=\"A\"\n\nsprite x=\"1\"";
        let err = parse_animations(text).unwrap_err();
        match err {
            ParseError::Format { line, token, .. } => {
                assert_eq!(line, 3);
                assert_eq!(token, "sprite");
            }
            other => panic!("Expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_equals() {
        let err = parse_animations("animation state \"A\"").unwrap_err();
        assert!(err.to_string().contains("missing \"=\""));
    }

    #[test]
    fn test_missing_value() {
        let err = parse_animations("animation state=   ").unwrap_err();
        assert!(err.to_string().contains("missing value"));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_animations("animation state=\"IDLE\\\"").unwrap_err();
        assert!(err.to_string().contains("closing quote"));
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn test_duplicate_states_warn() {
        let text = "animation state=\"IDLE\"\nanimation state=\"idle\"";
        let result = parse_animations(text).unwrap();
        assert_eq!(result.animations.len(), 2);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].line, 2);
    }

    #[test]
    fn test_crlf_lines() {
        let text = "animation state=\"A\"\r\nframe w=\"2\" h=\"3\"\r\n";
        let result = parse_animations(text).unwrap();
        assert_eq!(result.animations[0].frames[0].h, 3);
    }

    #[test]
    fn test_number_prefix() {
        assert_eq!(parse_number_prefix("12px"), Some(12.0));
        assert_eq!(parse_number_prefix("  -4.5"), Some(-4.5));
        assert_eq!(parse_number_prefix(".5"), Some(0.5));
        assert_eq!(parse_number_prefix("1e2x"), Some(100.0));
        assert_eq!(parse_number_prefix("3e"), Some(3.0));
        assert_eq!(parse_number_prefix("-"), None);
        assert_eq!(parse_number_prefix("px"), None);
    }
}
