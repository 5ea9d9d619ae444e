//! Application shell: window, event loop, and the frame cycle.
//!
//! [`App`] owns the particle field, the GPU state, and the classification
//! worker. The continuous loop is the redraw-request cycle: each
//! `RedrawRequested` steps and renders the field, then requests the next
//! redraw; exiting the event loop withdraws the pending request, so teardown
//! cannot leak a running loop.
//!
//! Classification never runs on this thread. A request hands the captured
//! frame to a worker thread and the result comes back over a channel,
//! drained at the start of the next frame. While a request is in flight,
//! further triggers are suppressed.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::capture::{self, FrameSource, TestPatternSource};
use crate::command::VisionResponse;
use crate::config::Config;
use crate::error::Result;
use crate::field::ParticleField;
use crate::gpu::GpuState;
use crate::input::Pointer;
use crate::theme::Theme;
use crate::time::Time;
use crate::vision::{GeminiClassifier, GestureClassifier};

/// How often to log frame statistics, in frames.
const STATS_INTERVAL: u64 = 300;

/// The interactive particle field application.
///
/// # Controls
///
/// * Pointer move - attraction field follows the cursor
/// * Press & hold - attract particles (release repels)
/// * `1`-`5` - select a theme manually
/// * `C` - capture a frame and classify the gesture
/// * `Esc` - quit
pub struct App {
    config: Config,
    theme: Theme,
    pointer: Pointer,
    time: Time,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    field: Option<ParticleField>,
    classifier: Option<Arc<dyn GestureClassifier>>,
    frames: Option<Box<dyn FrameSource>>,
    pending: Option<Receiver<VisionResponse>>,
}

impl App {
    /// Create an app from config. The gesture path is enabled when the
    /// vision config carries an API key; otherwise the app runs with manual
    /// theme selection only.
    pub fn new(config: Config) -> Self {
        let classifier: Option<Arc<dyn GestureClassifier>> = if config.vision.enabled {
            match GeminiClassifier::from_config(&config.vision) {
                Ok(classifier) => Some(Arc::new(classifier)),
                Err(e) => {
                    warn!("gesture classification disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            theme: Theme::default(),
            pointer: Pointer::new(),
            time: Time::new(),
            window: None,
            gpu: None,
            field: None,
            classifier,
            frames: Some(Box::new(TestPatternSource::new())),
            pending: None,
        }
    }

    /// Replace the gesture classifier (e.g. with a scripted one).
    pub fn with_classifier(mut self, classifier: Arc<dyn GestureClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Replace the frame source used for capture.
    pub fn with_frame_source(mut self, frames: Box<dyn FrameSource>) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Run the app. Blocks until the window is closed.
    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn set_theme(&mut self, theme: Theme, source: &str) {
        if theme == self.theme {
            return;
        }
        info!("theme {} -> {} ({})", self.theme, theme, source);
        self.theme = theme;
        if let Some(field) = &mut self.field {
            field.set_theme(theme);
        }
    }

    fn apply_response(&mut self, response: VisionResponse) {
        info!(
            "classifier: {:?} (confidence {:.2}): {}",
            response.command, response.confidence, response.reasoning
        );
        if let Some(theme) = response.command.theme() {
            self.set_theme(theme, "gesture");
        }
    }

    /// Kick off a capture-and-classify round on a worker thread.
    ///
    /// A round already in flight suppresses the trigger; a capture failure
    /// disables the capture path for the rest of the session.
    fn request_classification(&mut self) {
        if self.pending.is_some() {
            debug!("classification already in flight, ignoring trigger");
            return;
        }
        let Some(classifier) = self.classifier.clone() else {
            warn!("no gesture classifier configured");
            return;
        };
        let Some(frames) = self.frames.as_mut() else {
            warn!("capture path disabled");
            return;
        };

        let jpeg = match frames.grab().and_then(|frame| capture::encode_jpeg(&frame)) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!("frame capture failed, disabling capture path: {}", e);
                self.frames = None;
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        self.pending = Some(rx);
        thread::spawn(move || {
            let _ = tx.send(classifier.classify(&jpeg));
        });
    }

    /// Drain a finished classification, if any. Never blocks.
    fn poll_classification(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        match rx.try_recv() {
            Ok(response) => {
                self.pending = None;
                self.apply_response(response);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                warn!("classification worker exited without a result");
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Digit1 => self.set_theme(Theme::Default, "manual"),
            KeyCode::Digit2 => self.set_theme(Theme::Fire, "manual"),
            KeyCode::Digit3 => self.set_theme(Theme::Galaxy, "manual"),
            KeyCode::Digit4 => self.set_theme(Theme::Nature, "manual"),
            KeyCode::Digit5 => self.set_theme(Theme::Love, "manual"),
            KeyCode::KeyC => self.request_classification(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("window creation failed: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                error!("GPU initialization failed: {}", e);
                event_loop.exit();
                return;
            }
        }

        let size = window.inner_size();
        let field = ParticleField::new(
            size.width as f32,
            size.height as f32,
            self.theme,
            self.config.population,
        );
        info!(
            "field {}x{} px, {} particles, theme {}",
            size.width,
            size.height,
            field.particles().len(),
            self.theme
        );
        self.field = Some(field);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.pointer.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                if let Some(field) = &mut self.field {
                    field.resize(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if code == KeyCode::Escape {
                        event_loop.exit();
                    } else {
                        self.handle_key(code);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.poll_classification();

                let (Some(gpu), Some(field)) = (self.gpu.as_mut(), self.field.as_mut()) else {
                    return;
                };

                field.step(&self.pointer);
                let connections = field.connections(&self.pointer);

                match gpu.render(field.particles(), &connections) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => gpu.resize(PhysicalSize {
                        width: gpu.config.width,
                        height: gpu.config.height,
                    }),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory");
                        event_loop.exit();
                    }
                    Err(e) => error!("render error: {:?}", e),
                }

                self.time.update();
                if self.time.frame() % STATS_INTERVAL == 0 {
                    debug!(
                        "{:.1} fps, {} particles, {} connections",
                        self.time.fps(),
                        field.particles().len(),
                        connections.len()
                    );
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}
