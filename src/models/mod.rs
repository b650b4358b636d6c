//! Data models for animation sets (animations, frames, points)

mod animation;
mod frame;
mod object;

pub use animation::{find_duplicate_states, Animation, StateKey};
pub use frame::{Frame, Point};
pub use object::Warning;
