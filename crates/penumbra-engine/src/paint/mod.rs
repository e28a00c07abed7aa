//! Surface color model for scene geometry.
//!
//! Geometry is filled with linear premultiplied colors and composited with
//! premultiplied "over" blending. Light colors live in `coords::ColorRgba`.

pub mod color;

pub use color::Color;
