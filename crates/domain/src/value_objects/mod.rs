//! Value objects - immutable, self-validating vocabulary types

mod action;
mod placement;

pub use action::{CharacterAction, ThinkingKind};
pub use placement::{Direction, Position};
