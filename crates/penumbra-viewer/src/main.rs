mod scene;

use anyhow::Result;
use penumbra_engine::coords::Vec2;
use penumbra_engine::core::{App, AppControl, FrameCtx};
use penumbra_engine::deferred::{Deferred2DShadingPass, Renderer2DData, RenderingData};
use penumbra_engine::device::GpuInit;
use penumbra_engine::logging::{LoggingConfig, init_logging};
use penumbra_engine::paint::Color;
use penumbra_engine::render::GpuBackend;
use penumbra_engine::scene::{Camera2D, SortingLayerTable};
use penumbra_engine::window::{Runtime, RuntimeConfig};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowId;

use scene::{DemoScene, VIEW_HEIGHT};

const CLEAR: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

struct Viewer {
    backend: GpuBackend,
    pass: Deferred2DShadingPass<SortingLayerTable>,
    scene: DemoScene,
    paused: bool,
    frames_logged: u64,
}

impl Viewer {
    fn new() -> Result<Self> {
        let mut layers = SortingLayerTable::new();
        let scene = DemoScene::build(&mut layers)?;
        let pass = Deferred2DShadingPass::new(Renderer2DData::default(), layers)?;
        log::info!(
            "demo scene: {} drawables, {} lights, {} sorting layers",
            scene.draws.len(),
            scene.lights.len(),
            pass.sorting_layers().len()
        );

        Ok(Self { backend: GpuBackend::new(), pass, scene, paused: false, frames_logged: 0 })
    }
}

impl App for Viewer {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput {
            event: KeyEvent { logical_key, state: ElementState::Pressed, repeat: false, .. },
            ..
        } = event
        else {
            return AppControl::Continue;
        };

        match logical_key {
            Key::Named(NamedKey::Escape) => AppControl::Exit,
            Key::Named(NamedKey::Space) => {
                self.paused = !self.paused;
                log::info!("animation {}", if self.paused { "paused" } else { "resumed" });
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if !self.paused {
            self.scene.animate(ctx.time.elapsed);
        }

        let Self { backend, pass, scene, .. } = &mut *self;
        let control = ctx.render(CLEAR, |rctx, target| {
            let (width, height) = (target.width, target.height);
            let rendering = RenderingData {
                camera: Camera2D::for_target(Vec2::zero(), width, height, height as f32 / VIEW_HEIGHT),
                target_width: width,
                target_height: height,
            };

            let mut gpu = backend.begin_frame(*rctx, target, &scene.draws);
            let result = pass.execute(&mut gpu, &rendering, &scene.lights);
            gpu.finish();
            Ok(result?)
        });

        // Once a second at 60 Hz is plenty.
        if ctx.time.frame_index >= self.frames_logged + 60 {
            self.frames_logged = ctx.time.frame_index;
            log::debug!("{:?}", self.pass.last_stats());
        }
        control
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig { title: "penumbra viewer".to_string(), ..RuntimeConfig::default() };
    Runtime::run(config, GpuInit::default(), Viewer::new()?)
}
