//! Contract between the window runtime and applications.
//!
//! The runtime owns the event loop, windows and GPU; applications implement
//! [`App`] and receive a [`FrameCtx`] once per redraw.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
