//! Diagnostics shared across stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-fatal message from parsing or compositing.
///
/// `line` is 1-based; 0 means the warning is not tied to a source line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warning {
    pub message: String,
    pub line: usize,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}: {}", self.line, self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}
