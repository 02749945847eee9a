use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit};
use crate::error::GridError;
use crate::grid::GridConfig;
use crate::render::FrameRenderer;
use crate::session::CellGrid;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "cellgrid".to_string(),
            initial_size: LogicalSize::new(512.0, 512.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window, builds the grid, renders one frame, and blocks until the
    /// window is closed.
    ///
    /// A setup failure stops the event loop and is returned as a [`GridError`]
    /// inside the `anyhow` chain.
    pub fn run(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        grid: GridConfig,
        renderer: FrameRenderer,
    ) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, grid, renderer);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(anyhow::Error::new(err).context("grid setup failed")),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    grid_config: GridConfig,
    renderer: FrameRenderer,

    window: Option<WindowEntry>,
    grid: Option<CellGrid>,
    rendered: bool,
    failure: Option<GridError>,
}

impl AppState {
    fn new(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        grid_config: GridConfig,
        renderer: FrameRenderer,
    ) -> Self {
        Self {
            config,
            gpu_init,
            grid_config,
            renderer,
            window: None,
            grid: None,
            rendered: false,
            failure: None,
        }
    }

    /// Records the first failure and stops the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: GridError) {
        log::error!("{}: {err}", err.kind());
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.grid = None;
        self.window = None;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<(), GridError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| GridError::UnsupportedPlatform(format!("failed to create window: {e}")))?;

        let size = window.inner_size();
        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::acquire(w, size, gpu_init)),
        }
        .try_build()?;

        entry.with_gpu(|gpu| {
            let info = gpu.adapter_info();
            let size = gpu.size();
            log::info!(
                "using adapter: {} ({:?}), surface {}x{}",
                info.name,
                info.backend,
                size.width,
                size.height
            );
        });

        let grid = entry.with_gpu(|gpu| CellGrid::new(gpu, self.grid_config))?;

        entry.with_window(|w| w.request_redraw());
        self.grid = Some(grid);
        self.window = Some(entry);
        Ok(())
    }

    fn render_once(&mut self) -> Result<(), GridError> {
        if self.rendered {
            return Ok(());
        }
        let (Some(entry), Some(grid)) = (self.window.as_ref(), self.grid.as_ref()) else {
            return Ok(());
        };

        entry.with_gpu(|gpu| grid.render(gpu, &self.renderer))?;
        self.rendered = true;
        log::info!("frame submitted");
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.grid = None;
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render_once() {
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }
}
