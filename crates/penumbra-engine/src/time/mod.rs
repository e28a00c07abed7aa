//! Frame timing for animation.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
