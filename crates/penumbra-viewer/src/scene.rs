use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use penumbra_engine::coords::{ColorRgba, Rect, Vec2};
use penumbra_engine::light::{Light, LightHandle, LightSet, Texture2D};
use penumbra_engine::paint::Color;
use penumbra_engine::scene::{DrawList, Drawable, Shape, SortingLayerTable};

/// Visible world height; the width follows the window aspect.
pub const VIEW_HEIGHT: f32 = 12.0;

const COOKIE_SIZE: u32 = 64;

/// Demo content: three sorting layers, some geometry and one light of each kind.
pub struct DemoScene {
    pub draws: DrawList,
    pub lights: LightSet,
    orbit: LightHandle,
    sweep: LightHandle,
    lamp: LightHandle,
}

impl DemoScene {
    /// Fills `layers` and builds the scene against it.
    pub fn build(layers: &mut SortingLayerTable) -> Result<Self> {
        let background = layers.push("Background", -10);
        let default = layers.push("Default", 0);
        let foreground = layers.push("Foreground", 10);

        let bg = layers.get(background).context("background layer missing")?;
        let mid = layers.get(default).context("default layer missing")?;
        let fg = layers.get(foreground).context("foreground layer missing")?;

        let mut draws = DrawList::new();

        draws.push(Drawable::new(
            bg,
            Shape::rect(
                Rect::from_center_size(Vec2::zero(), Vec2::new(40.0, 40.0)),
                Color::from_straight(0.55, 0.55, 0.6, 1.0),
            ),
        ));
        for i in 0..8 {
            let x = -10.5 + i as f32 * 3.0;
            draws.push(Drawable::new(
                bg,
                Shape::rect(
                    Rect::from_center_size(Vec2::new(x, 0.0), Vec2::new(0.4, 30.0)),
                    Color::from_straight(0.35, 0.35, 0.4, 1.0),
                ),
            ));
        }

        let palette = [
            Color::from_straight(0.9, 0.3, 0.25, 1.0),
            Color::from_straight(0.25, 0.8, 0.4, 1.0),
            Color::from_straight(0.3, 0.45, 0.95, 1.0),
            Color::from_straight(0.95, 0.85, 0.3, 1.0),
        ];
        for (i, color) in palette.into_iter().enumerate() {
            let center = Vec2::new(-6.0 + i as f32 * 4.0, -1.0);
            draws.push(
                Drawable::new(mid, Shape::ellipse(Rect::from_center_size(center, Vec2::new(2.2, 2.2)), color))
                    .with_sorting_order(i as i16),
            );
        }

        draws.push(Drawable::new(
            fg,
            Shape::rect(
                Rect::from_center_size(Vec2::new(0.0, -5.0), Vec2::new(30.0, 2.0)),
                Color::from_straight(0.2, 0.18, 0.16, 1.0),
            ),
        ));
        // Pinned in front of every layer; lands in the last band.
        draws.push(
            Drawable::new(
                fg,
                Shape::ellipse(
                    Rect::from_center_size(Vec2::new(7.0, 3.5), Vec2::new(1.5, 1.5)),
                    Color::from_straight(1.0, 1.0, 1.0, 0.8),
                ),
            )
            .with_sort_value(i16::MAX),
        );

        let mut lights = LightSet::new();

        lights.add(
            Light::global(ColorRgba::new(0.35, 0.4, 0.6, 1.0), 1.0).with_layers([background]),
        );
        lights.add(Light::global(ColorRgba::new(0.2, 0.2, 0.25, 1.0), 1.0).with_layers([default]));
        // Foreground has no global light and falls back to black.

        let orbit = lights.add(
            Light::parametric(48, 2.5)
                .with_color(ColorRgba::new(1.0, 0.75, 0.45, 1.0))
                .with_intensity(1.6)
                .with_falloff(2.0, 0.4)
                .with_volume_opacity(0.15)
                .with_layers([background, default, foreground]),
        );

        let sweep = lights.add(
            Light::freeform(&[
                Vec2::new(0.0, 0.0),
                Vec2::new(6.0, -1.5),
                Vec2::new(6.0, 1.5),
            ])
            .with_color(ColorRgba::new(0.5, 0.9, 1.0, 1.0))
            .with_falloff(1.0, 0.6)
            .with_blend_style(1)
            .with_layers([default]),
        );

        let lamp = lights.add(
            Light::sprite(Vec2::new(5.0, 5.0), Some(stripe_cookie()))
                .with_color(ColorRgba::new(1.0, 0.95, 0.8, 1.0))
                .with_intensity(1.2)
                .with_layers([foreground, default])
                .at(Vec2::new(0.0, -4.0)),
        );

        Ok(Self { draws, lights, orbit, sweep, lamp })
    }

    /// Moves the animated lights to their pose at `elapsed` seconds.
    pub fn animate(&mut self, elapsed: f32) {
        if let Some(light) = self.lights.get_mut(self.orbit) {
            let (s, c) = (elapsed * 0.7).sin_cos();
            light.transform = Mat4::from_translation(Vec3::new(c * 6.0, s * 3.0, 0.0));
        }
        if let Some(light) = self.lights.get_mut(self.sweep) {
            let angle = (elapsed * 0.5).sin() * 0.9;
            light.transform = Mat4::from_translation(Vec3::new(-9.0, 3.0, 0.0))
                * Mat4::from_rotation_z(angle - 0.4);
        }
        if let Some(light) = self.lights.get_mut(self.lamp) {
            light.intensity = 1.0 + 0.3 * (elapsed * 3.1).sin();
        }
    }
}

/// Radial stripes, alpha fading toward the edge.
fn stripe_cookie() -> Texture2D {
    let n = COOKIE_SIZE;
    let mut pixels = Vec::with_capacity((n * n * 4) as usize);
    for y in 0..n {
        for x in 0..n {
            let dx = (x as f32 + 0.5) / n as f32 - 0.5;
            let dy = (y as f32 + 0.5) / n as f32 - 0.5;
            let r = (dx * dx + dy * dy).sqrt() * 2.0;
            let stripe = if (dy.atan2(dx) * 4.0).sin() > 0.0 { 255 } else { 140 };
            let alpha = ((1.0 - r).clamp(0.0, 1.0) * 255.0) as u8;
            pixels.extend_from_slice(&[stripe, stripe, stripe, alpha]);
        }
    }
    Texture2D::from_rgba8(n, n, pixels)
}
