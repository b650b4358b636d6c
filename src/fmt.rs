//! Serializer and formatter for `.animation` files
//!
//! Emits one `animation` line per state, one `frame` line per frame and one
//! `point` line per point, with a blank line after each animation. Default
//! values (empty strings, zero numbers, `false` flags) are omitted, so zero
//! fields come back as their parse default rather than byte-identically.

use crate::models::{Animation, Frame, Point};
use crate::parser::{parse_animations, ParseError};

/// Serialize an animation set to text.
pub fn serialize_animations(animations: &[Animation]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for animation in animations {
        lines.push(AttributeLine::new("animation").string("state", animation.state()).finish());

        for frame in &animation.frames {
            lines.push(frame_line(frame));

            for point in &frame.points {
                lines.push(point_line(point));
            }
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

/// Parse and re-serialize animation text.
pub fn format_animations(content: &str) -> Result<String, ParseError> {
    let parsed = parse_animations(content)?;
    Ok(serialize_animations(&parsed.animations))
}

fn frame_line(frame: &Frame) -> String {
    AttributeLine::new("frame")
        .number("x", frame.x)
        .number("y", frame.y)
        .number("w", frame.w)
        .number("h", frame.h)
        .number("originx", frame.originx)
        .number("originy", frame.originy)
        .flag("flipx", frame.flipx)
        .flag("flipy", frame.flipy)
        .string("duration", &frame.duration)
        .finish()
}

// Point coordinates are emitted whenever present, zero included: an absent
// coordinate parses back as invalid, not as zero.
fn point_line(point: &Point) -> String {
    let mut line = AttributeLine::new("point").string("label", &point.label);
    if let Some(x) = point.x {
        line = line.attribute("x", &x.to_string());
    }
    if let Some(y) = point.y {
        line = line.attribute("y", &y.to_string());
    }
    line.finish()
}

/// Builder for a single keyword line. Every value is written quoted.
struct AttributeLine {
    text: String,
}

impl AttributeLine {
    fn new(keyword: &str) -> Self {
        Self { text: keyword.to_string() }
    }

    fn attribute(mut self, key: &str, value: &str) -> Self {
        self.text.push(' ');
        self.text.push_str(key);
        self.text.push('=');
        self.text.push_str(&quote(value));
        self
    }

    fn string(self, key: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.attribute(key, value)
        }
    }

    fn number(self, key: &str, value: i32) -> Self {
        if value == 0 {
            self
        } else {
            self.attribute(key, &value.to_string())
        }
    }

    fn flag(self, key: &str, value: bool) -> Self {
        if value {
            self.attribute(key, "1")
        } else {
            self
        }
    }

    fn finish(self) -> String {
        self.text
    }
}

/// Double-quote a value, escaping backslashes, quotes and control characters.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
