//! Coordinate and geometry types shared by the scene, the lights and the backend.
//!
//! Canonical CPU space is 2D world space:
//! - world units (a camera decides how many fit on screen)
//! - +X right, +Y up
//!
//! Renderers convert to clip space with the camera's view-projection matrix.

mod color;
mod rect;
mod vec2;

pub use color::ColorRgba;
pub use rect::Rect;
pub use vec2::Vec2;
