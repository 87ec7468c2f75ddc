//! Sonic Visions - audio-reactive album showcase
//!
//! Browse a small album catalog while the featured track drives a glowing
//! orb: bass energy from the live output pulses its scale, distortion and
//! light, and each album's palette tints it.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use sonic_visions::audio::{CpalBackend, PlaybackBackend, ScriptedBackend};
use sonic_visions::catalog::Catalog;
use sonic_visions::cli::Args;
use sonic_visions::error::{Error, RenderError};
use sonic_visions::params::ShowcaseConfig;
use sonic_visions::rendering::{OrbUniforms, RenderSystem};
use sonic_visions::showcase::{FrameTime, InputEvent, Showcase};

/// Longest frame step fed to the animation (seconds)
const MAX_FRAME_DELTA_S: f32 = 0.25;

/// Main application state
struct App<B: PlaybackBackend> {
    showcase: Showcase<B>,
    config: ShowcaseConfig,

    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Time tracking
    start_time: Instant,
    last_frame: Instant,

    /// Fatal setup error raised inside the event loop
    error: Option<Error>,
}

impl<B: PlaybackBackend> App<B> {
    fn new(showcase: Showcase<B>, config: ShowcaseConfig) -> Self {
        let now = Instant::now();
        Self {
            showcase,
            config,
            window: None,
            render_system: None,
            start_time: now,
            last_frame: now,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        self.error = Some(err);
        event_loop.exit();
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        let input = match code {
            KeyCode::ArrowDown | KeyCode::ArrowRight => InputEvent::Next,
            KeyCode::ArrowUp | KeyCode::ArrowLeft => InputEvent::Previous,
            KeyCode::Enter => InputEvent::Select,
            KeyCode::Space => InputEvent::PlayFeatured,
            KeyCode::Escape if self.showcase.is_detail_open() => InputEvent::Close,
            KeyCode::Escape => {
                event_loop.exit();
                return;
            }
            KeyCode::Digit1 => InputEvent::Jump(0),
            KeyCode::Digit2 => InputEvent::Jump(1),
            KeyCode::Digit3 => InputEvent::Jump(2),
            KeyCode::Digit4 => InputEvent::Jump(3),
            KeyCode::Digit5 => InputEvent::Jump(4),
            _ => return,
        };
        self.showcase.handle_input(input);
    }

    /// Run the showcase frame and draw its snapshot
    fn render_frame(&mut self) {
        let now = Instant::now();
        let delta_s = (now - self.last_frame).as_secs_f32().min(MAX_FRAME_DELTA_S);
        self.last_frame = now;
        let elapsed_s = (now - self.start_time).as_secs_f64();

        let Some(snapshot) = self.showcase.frame(FrameTime { delta_s, elapsed_s }) else {
            return;
        };
        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        let uniforms = OrbUniforms::from_snapshot(
            &snapshot,
            render_system.size(),
            elapsed_s as f32,
            self.config.render.background,
        );
        render_system.update_uniforms(&uniforms);

        match render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(e) => warn!("Render error: {:?}", e),
        }
    }
}

impl<B: PlaybackBackend> ApplicationHandler for App<B> {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            if self.showcase.wants_frame() {
                window.request_redraw();
            }
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Sonic Visions")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.render.window_width,
                self.config.render.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, RenderError::from(err).into()),
        };

        let render_system =
            match pollster::block_on(RenderSystem::new(Arc::clone(&window), &self.config.render)) {
                Ok(render_system) => render_system,
                Err(err) => return self.fail(event_loop, err.into()),
            };

        info!("Sonic Visions is running (arrows browse, Enter opens, Space plays, Esc quits)");

        self.window = Some(window);
        self.render_system = Some(render_system);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => self.on_key(event_loop, code),
            WindowEvent::MouseWheel { delta, .. } => {
                // Positive = toward later albums
                let pixels = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * self.config.momentum.pixels_per_line,
                    MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                };
                self.showcase.handle_input(InputEvent::Wheel(pixels));
            }
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.showcase.teardown();
    }
}

fn run_windowed<B: PlaybackBackend>(
    catalog: Catalog,
    config: ShowcaseConfig,
    backend: B,
    autoplay: bool,
) -> Result<(), Error> {
    let mut showcase = Showcase::new(catalog, &config, backend);
    if autoplay {
        showcase.handle_input(InputEvent::PlayFeatured);
    }

    let mut app = App::new(showcase, config);
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Drive the pipeline without a window or audio device
fn run_headless(catalog: Catalog, config: &ShowcaseConfig, frames: u32, autoplay: bool) {
    const DELTA_S: f32 = 1.0 / 60.0;

    let mut showcase = Showcase::new(catalog, config, ScriptedBackend::auto_start());
    if autoplay {
        showcase.handle_input(InputEvent::PlayFeatured);
    }

    info!("Running {} headless frames", frames);
    for frame in 0..frames {
        // Synthetic two-beats-per-second pulse
        let t = frame as f32 * DELTA_S;
        let pulse = (t * std::f32::consts::TAU * 2.0).sin().max(0.0);
        showcase
            .playback_mut()
            .backend_mut()
            .set_level((pulse * 255.0) as u8);

        let time = FrameTime {
            delta_s: DELTA_S,
            elapsed_s: f64::from(t),
        };
        if let Some(snapshot) = showcase.frame(time) {
            if frame % 30 == 0 {
                info!(
                    "frame {:>5}: level {:.3} beat {:.3} outer scale {:.3} light {:.3}",
                    frame,
                    snapshot.level,
                    snapshot.beat,
                    snapshot.outer_scale,
                    snapshot.light_intensity
                );
            }
        }
    }
    showcase.teardown();
}

fn run() -> Result<(), Error> {
    let args = Args::parse();
    let config = args.load_config()?;
    let catalog = args.load_catalog()?;

    if let Some(frames) = args.headless {
        run_headless(catalog, &config, frames, args.autoplay);
        return Ok(());
    }

    match CpalBackend::new(&config.playback, config.analyser.clone()) {
        Ok(backend) => run_windowed(catalog, config, backend, args.autoplay),
        Err(err) => {
            warn!("Audio output unavailable ({}), running without sound", err);
            run_windowed(
                catalog,
                config,
                ScriptedBackend::new().without_tap(),
                args.autoplay,
            )
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sonic_visions=info")),
        )
        .init();

    if let Err(err) = run() {
        error!("{}", err);
        std::process::exit(1);
    }
}
