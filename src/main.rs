use anyhow::Context;
use clap::Parser;
use snake3d::config::{Cli, Config};
use snake3d::gpu_render::GpuRenderer;
use snake3d::input::pressed_intents;
use snake3d::{Control, Driver, GameEvent, GameObserver};
use std::rc::Rc;
use std::time::Instant;
use winit::dpi::LogicalSize;
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};
use winit_input_helper::WinitInputHelper;

const TITLE: &str = "Snake 3D";

/// Presents score and game-over state in the window title.
struct TitleShell {
    window: Rc<Window>,
}

impl GameObserver for TitleShell {
    fn on_event(&mut self, event: &GameEvent) {
        let title = match event {
            GameEvent::Started => format!("{TITLE} | Score: 0"),
            GameEvent::ScoreChanged(score) => format!("{TITLE} | Score: {score}"),
            GameEvent::GameOver { final_score } => {
                format!("{TITLE} | GAME OVER | Final score: {final_score} | Enter to restart")
            }
        };
        self.window.set_title(&title);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = Cli::parse().resolve().and_then(run) {
        log::error!("startup failed: {err:#}");
        return Err(err);
    }
    Ok(())
}

fn run(config: Config) -> anyhow::Result<()> {
    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();

    let window = Rc::new(
        WindowBuilder::new()
            .with_title(format!("{TITLE} | Enter or P to start"))
            .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
            .build(&event_loop)
            .context("creating window")?,
    );
    let size = window.inner_size();

    let mut driver = Driver::with_rules(
        config.rules(),
        config.seed,
        config.camera(),
        config.cell_size,
        config.move_interval(),
        Instant::now(),
    );
    driver.resize(size.width, size.height);
    driver.subscribe(Box::new(TitleShell { window: Rc::clone(&window) }));

    let mut renderer = pollster::block_on(GpuRenderer::new(
        &window,
        size.width,
        size.height,
        driver.layout(),
        config.force_uniform_binding,
    ))
    .context("initialising renderer")?;
    log::info!(
        "{}x{} board, {:?} per-draw binding",
        config.grid_size,
        config.grid_size,
        renderer.binding_kind()
    );

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::RedrawRequested(_) = event {
            let frame = driver.frame(Instant::now());
            match renderer.render(&frame) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("surface lost, reconfiguring");
                    renderer.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("out of GPU memory");
                    *control_flow = ControlFlow::Exit;
                }
                Err(e) => log::warn!("frame dropped: {e}"),
            }
        }

        if input.update(&event) {
            if input.close_requested() || input.destroyed() {
                *control_flow = ControlFlow::Exit;
                return;
            }

            if let Some(size) = input.window_resized() {
                renderer.resize(size.width, size.height);
                driver.resize(size.width, size.height);
            }

            let now = Instant::now();
            for intent in pressed_intents(|k| input.key_pressed(k)) {
                if driver.handle_intent(intent, now) == Control::Exit {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }

            // Tick before redraw so a frame never shows a half-applied move.
            driver.update(now);
            window.request_redraw();
        }
    })
}
