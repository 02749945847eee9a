//! Drives the setup sequence against an offscreen texture.
//!
//! Each test returns early when the machine exposes no adapter.

use cellgrid_engine::grid::GridConfig;
use cellgrid_engine::render::{
    upload_vertices, BindingSet, CellVertex, FrameRenderer, GpuBuffer, PipelineBuilder,
    ShaderProgram, CELL_QUAD,
};
use cellgrid_engine::{CellGrid, GridError};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Target edge in pixels; 10 px per cell on the default 16x16 grid.
const TARGET_SIZE: u32 = 160;

/// `fs_main` output, (0, 0.3, 0.5, 1), as unorm8.
const CELL_RGBA: [u8; 4] = [0, 77, 128, 255];

fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok()?;

    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("cellgrid test device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::downlevel_defaults(),
        experimental_features: wgpu::ExperimentalFeatures::disabled(),
        memory_hints: wgpu::MemoryHints::Performance,
        trace: wgpu::Trace::Off,
    }))
    .ok()
}

macro_rules! require_device {
    () => {
        match headless_device() {
            Some(pair) => pair,
            None => {
                eprintln!("no GPU adapter available; skipping");
                return;
            }
        }
    };
}

fn offscreen_target(device: &wgpu::Device) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("cellgrid test target"),
        size: wgpu::Extent3d {
            width: TARGET_SIZE,
            height: TARGET_SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

/// Blocks until `staging` is mapped and returns a copy of its contents.
fn read_mapped(device: &wgpu::Device, staging: &wgpu::Buffer) -> Vec<u8> {
    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device
        .poll(wgpu::PollType::wait_indefinitely())
        .expect("device poll failed");
    rx.recv()
        .expect("map callback dropped")
        .expect("buffer map failed");

    let bytes = slice.get_mapped_range().to_vec();
    staging.unmap();
    bytes
}

fn staging_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("cellgrid test staging"),
        size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    })
}

/// Copies a square RGBA8 texture back to the CPU, row padding removed.
fn read_pixels(device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) -> Vec<u8> {
    let unpadded = TARGET_SIZE * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded = unpadded.div_ceil(align) * align;
    let staging = staging_buffer(device, u64::from(padded * TARGET_SIZE));

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("cellgrid test readback"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(TARGET_SIZE),
            },
        },
        wgpu::Extent3d {
            width: TARGET_SIZE,
            height: TARGET_SIZE,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let mapped = read_mapped(device, &staging);
    (0..TARGET_SIZE as usize)
        .flat_map(|row| {
            let start = row * padded as usize;
            mapped[start..start + unpadded as usize].to_vec()
        })
        .collect()
}

/// Copies a `COPY_SRC` buffer back to the CPU.
fn read_buffer(device: &wgpu::Device, queue: &wgpu::Queue, buffer: &GpuBuffer) -> Vec<u8> {
    let staging = staging_buffer(device, buffer.size());

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("cellgrid test buffer readback"),
    });
    encoder.copy_buffer_to_buffer(buffer.raw(), 0, &staging, 0, buffer.size());
    queue.submit(std::iter::once(encoder.finish()));

    read_mapped(device, &staging)
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * TARGET_SIZE + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

fn near(actual: [u8; 4], expected: [u8; 4]) -> bool {
    actual
        .iter()
        .zip(expected)
        .all(|(&a, e)| a.abs_diff(e) <= 2)
}

fn unorm8(color: wgpu::Color) -> [u8; 4] {
    [color.r, color.g, color.b, color.a].map(|c| (c * 255.0).round() as u8)
}

#[test]
fn full_sequence_renders_offscreen() {
    let (device, queue) = require_device!();

    let config = GridConfig::default();
    let grid = CellGrid::with_target(&device, &queue, FORMAT, config).unwrap();
    assert_eq!(grid.config(), config);

    let draw = grid.draw();
    assert_eq!(draw.vertex_count, 6);
    assert_eq!(draw.instance_count, 256);
    assert_eq!(draw.vertex_buffer.size(), 48);
    assert_eq!(draw.pipeline.target_format(), FORMAT);
    assert_eq!(grid.uniform_buffer().size(), 8);

    let renderer = FrameRenderer::default();
    let texture = offscreen_target(&device);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("cellgrid test encoder"),
    });
    renderer.encode(&mut encoder, &view, &draw);
    queue.submit(std::iter::once(encoder.finish()));

    let pixels = read_pixels(&device, &queue, &texture);
    let clear = unorm8(renderer.clear_color());
    let cell_px = TARGET_SIZE / config.width();

    // Row 0 is the bottom of clip space and the last row of the texture.
    for col in 0..config.width() {
        for row in 0..config.height() {
            let left = col * cell_px;
            let top = TARGET_SIZE - (row + 1) * cell_px;

            let center = pixel(&pixels, left + cell_px / 2, top + cell_px / 2);
            assert!(near(center, CELL_RGBA), "cell ({col}, {row}) center: {center:?}");

            let margin = pixel(&pixels, left, top);
            assert!(near(margin, clear), "cell ({col}, {row}) margin: {margin:?}");
        }
    }
}

#[test]
fn uploaded_bytes_read_back_unchanged() {
    let (device, queue) = require_device!();

    let uniform = GridConfig::new(16, 9).unwrap().uniform();
    let uniform_bytes: &[u8] = bytemuck::cast_slice(&uniform);
    let buf = GpuBuffer::with_contents(
        &device,
        &queue,
        "test uniform readback",
        wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
        uniform_bytes,
    )
    .unwrap();
    assert_eq!(buf.size(), uniform_bytes.len() as u64);
    assert_eq!(read_buffer(&device, &queue, &buf), uniform_bytes);

    let quad_bytes: &[u8] = bytemuck::cast_slice(&CELL_QUAD);
    let buf = GpuBuffer::with_contents(
        &device,
        &queue,
        "test vertex readback",
        wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
        quad_bytes,
    )
    .unwrap();
    assert_eq!(buf.size(), 48);
    assert_eq!(read_buffer(&device, &queue, &buf), quad_bytes);
}

#[test]
fn instance_count_tracks_config() {
    let (device, queue) = require_device!();

    let config = GridConfig::new(5, 3).unwrap();
    let grid = CellGrid::with_target(&device, &queue, FORMAT, config).unwrap();
    assert_eq!(grid.draw().instance_count, 15);
}

#[test]
fn pipeline_rejects_foreign_output_format() {
    let (device, _queue) = require_device!();

    let program = ShaderProgram::cell();
    let err = PipelineBuilder::new(&program, CellVertex::LAYOUT)
        .build(&device, wgpu::TextureFormat::Bgra8UnormSrgb, FORMAT)
        .unwrap_err();
    assert_eq!(err.kind(), "PipelineFormatMismatchError");
}

#[test]
fn bind_group_rejects_undeclared_slot_and_wrong_buffer() {
    let (device, queue) = require_device!();

    let program = ShaderProgram::cell();
    let pipeline = PipelineBuilder::new(&program, CellVertex::LAYOUT)
        .build(&device, FORMAT, FORMAT)
        .unwrap();

    let uniform = GpuBuffer::with_contents(
        &device,
        &queue,
        "test uniform",
        wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        bytemuck::cast_slice(&[16.0f32, 16.0]),
    )
    .unwrap();

    let err = BindingSet::with_buffer(&device, &pipeline, 0, 1, &uniform).unwrap_err();
    assert!(matches!(err, GridError::BindingMismatch { binding: 1, .. }));

    let vertices = upload_vertices(&device, &queue, "test vertices", &CELL_QUAD, &CellVertex::LAYOUT)
        .unwrap();
    let err = BindingSet::build(&device, &pipeline, &vertices).unwrap_err();
    assert_eq!(err.kind(), "BindingMismatchError");

    let bindings = BindingSet::build(&device, &pipeline, &uniform).unwrap();
    assert_eq!(bindings.group(), 0);
}

#[test]
fn buffer_writes_are_bounded_by_declared_size() {
    let (device, queue) = require_device!();

    let buf = GpuBuffer::new(
        &device,
        "test bounded",
        8,
        wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    );
    assert_eq!(buf.size(), 8);

    assert!(buf.write(&queue, 0, bytemuck::cast_slice(&[1.0f32, 2.0])).is_ok());
    let err = buf
        .write(&queue, 0, bytemuck::cast_slice(&[1.0f32, 2.0, 3.0]))
        .unwrap_err();
    assert!(matches!(
        err,
        GridError::ResourceSizeMismatch { expected: 8, actual: 12, .. }
    ));
}

#[test]
fn vertex_upload_rejects_stride_mismatch() {
    let (device, queue) = require_device!();

    let wide = [[0.0f32; 3]; 6];
    let err = upload_vertices(&device, &queue, "wide", &wide, &CellVertex::LAYOUT).unwrap_err();
    assert!(matches!(
        err,
        GridError::ResourceSizeMismatch { expected: 8, actual: 12, .. }
    ));
}
