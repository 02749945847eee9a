use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::error::{GridError, Result};

use super::surface;
use super::{GpuFrame, GpuInit};

/// Device, queue and the configured drawing surface.
///
/// The device is the only shared resource: every buffer, pipeline and bind
/// group in the engine is created through it.
pub struct Gpu<'w> {
    /// Surface bound to the host drawing target.
    surface: wgpu::Surface<'w>,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,
}

impl<'w> Gpu<'w> {
    /// Acquires a device and configures a surface on `target`.
    ///
    /// Steps run strictly in order and stop at the first failure:
    /// backend check, surface creation, adapter, device, format query, configure.
    pub async fn acquire<W>(target: W, size: PhysicalSize<u32>, init: GpuInit) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'w,
    {
        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            power_preference,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let backends = wgpu::Instance::enabled_backend_features();
        if backends.is_empty() {
            return Err(GridError::UnsupportedPlatform(
                "no GPU backend is enabled for this platform".into(),
            ));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| GridError::UnsupportedPlatform(format!("cannot create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("cellgrid device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps.formats, prefer_srgb).ok_or_else(|| {
            GridError::UnsupportedPlatform("surface reports no formats for this adapter".into())
        })?;
        log::info!("using surface format: {format:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps.alpha_modes, alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        log::debug!("surface configured at {}x{}", config.width, config.height);

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
        })
    }

    /// Returns the configured surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the configured surface size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Acquires the current surface texture and creates an encoder.
    pub fn begin_frame(&self) -> Result<GpuFrame> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("cellgrid frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the frame.
    ///
    /// Returns once the command buffer is on the queue; GPU completion is not awaited.
    pub fn submit(&self, frame: GpuFrame) -> wgpu::SubmissionIndex {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        let index = self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
        index
    }
}
