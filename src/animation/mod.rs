//! Animation state shared by the scene
//!
//! Holds the two-valued scene mode and the smoothing used to ease
//! toward whichever formation is active.

mod mode;
mod transition;

pub use mode::{Mode, ModeController};
pub use transition::{Transition, approach_factor};
