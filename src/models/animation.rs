//! Animation states and their normalised lookup keys.

use std::collections::HashMap;
use std::fmt;

use super::frame::Frame;
use super::object::Warning;

/// Case-insensitive identity of an animation state.
///
/// State names are upper-cased once, here, and every lookup compares keys
/// instead of re-normalising display names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(String);

impl StateKey {
    pub fn new(name: &str) -> Self {
        Self(name.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named sequence of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    state: String,
    key: StateKey,
    pub frames: Vec<Frame>,
}

impl Animation {
    pub fn new(state: impl Into<String>) -> Self {
        let state = state.into();
        let key = StateKey::new(&state);
        Self { state, key, frames: Vec::new() }
    }

    pub fn with_frames(state: impl Into<String>, frames: Vec<Frame>) -> Self {
        let mut animation = Self::new(state);
        animation.frames = frames;
        animation
    }

    /// Display name as written in the source text.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }
}

/// Report every animation whose state repeats an earlier one.
///
/// `lines` holds the 1-based source line of each animation when known; pass an
/// empty slice for generated sets (warnings then carry line 0).
pub fn find_duplicate_states(animations: &[Animation], lines: &[usize]) -> Vec<Warning> {
    let mut first_seen: HashMap<&StateKey, usize> = HashMap::new();
    let mut warnings = Vec::new();

    for (i, animation) in animations.iter().enumerate() {
        let line = lines.get(i).copied().unwrap_or(0);
        match first_seen.get(animation.key()) {
            Some(&first) => {
                let first_line = lines.get(first).copied().unwrap_or(0);
                let message = if first_line > 0 {
                    format!(
                        "Duplicate animation state '{}' (first defined on line {})",
                        animation.state(),
                        first_line
                    )
                } else {
                    format!("Duplicate animation state '{}'", animation.state())
                };
                warnings.push(Warning { message, line });
            }
            None => {
                first_seen.insert(animation.key(), i);
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key_normalised() {
        let animation = Animation::new("Character_Swing");
        assert_eq!(animation.state(), "Character_Swing");
        assert_eq!(animation.key(), &StateKey::new("CHARACTER_SWING"));
        assert_eq!(animation.key().as_str(), "CHARACTER_SWING");
    }

    #[test]
    fn test_duplicate_states_detected_case_insensitively() {
        let animations =
            vec![Animation::new("IDLE"), Animation::new("MOVE"), Animation::new("idle")];
        let warnings = find_duplicate_states(&animations, &[1, 4, 9]);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 9);
        assert!(warnings[0].message.contains("'idle'"));
        assert!(warnings[0].message.contains("line 1"));
    }

    #[test]
    fn test_duplicate_states_without_lines() {
        let animations = vec![Animation::new("A"), Animation::new("A")];
        let warnings = find_duplicate_states(&animations, &[]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 0);
    }

    #[test]
    fn test_unique_states_no_warnings() {
        let animations = vec![Animation::new("A"), Animation::new("B")];
        assert!(find_duplicate_states(&animations, &[]).is_empty());
    }
}
