use crate::binding::{BindingKind, DrawBinding, DrawParams, select_binding, shader_source};
use crate::mesh::{BoardLayout, CUBE_VERTICES, Vertex};
use crate::scene::{Frame, MeshKind};
use anyhow::Context;
use wgpu::util::DeviceExt;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct Mesh {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl Mesh {
    fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { buffer, vertex_count: vertices.len() as u32 }
    }
}

pub struct GpuRenderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    // Cubes and the board quad
    triangle_pipeline: wgpu::RenderPipeline,
    // Grid lines
    line_pipeline: wgpu::RenderPipeline,
    binding: Box<dyn DrawBinding>,
    cube: Mesh,
    board: Mesh,
    grid: Mesh,
    params: Vec<DrawParams>,
}

impl GpuRenderer {
    pub async fn new(
        window: &Window,
        width: u32,
        height: u32,
        layout: &BoardLayout,
        force_uniform: bool,
    ) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = unsafe { instance.create_surface(window) }.context("creating surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let kind = select_binding(adapter.features(), &adapter.limits(), force_uniform);
        log::info!("per-draw binding: {kind:?}");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: kind.required_features(),
                    limits: kind.required_limits(wgpu::Limits::default()),
                },
                None,
            )
            .await
            .context("requesting device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: caps.present_modes.first().copied().unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, config.width, config.height);

        // Push-constant layouts in particular can be refused here by some backends.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let binding = kind.create(&device);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene-shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source(kind).into()),
        });
        let triangle_pipeline = create_pipeline(
            &device,
            binding.as_ref(),
            &shader,
            format,
            wgpu::PrimitiveTopology::TriangleList,
        );
        let line_pipeline = create_pipeline(
            &device,
            binding.as_ref(),
            &shader,
            format,
            wgpu::PrimitiveTopology::LineList,
        );
        check_validation(device.pop_error_scope().await, kind)?;

        let cube = Mesh::new(&device, "cube-vb", &CUBE_VERTICES);
        let board = Mesh::new(&device, "board-vb", &layout.board_vertices());
        let grid = Mesh::new(&device, "grid-vb", &layout.grid_vertices());

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            triangle_pipeline,
            line_pipeline,
            binding,
            cube,
            board,
            grid,
            params: Vec::new(),
        })
    }

    pub fn binding_kind(&self) -> BindingKind {
        self.binding.kind()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
        log::debug!("surface resized to {width}x{height}");
    }

    fn mesh(&self, kind: MeshKind) -> (&Mesh, &wgpu::RenderPipeline) {
        match kind {
            MeshKind::Cube => (&self.cube, &self.triangle_pipeline),
            MeshKind::Board => (&self.board, &self.triangle_pipeline),
            MeshKind::Grid => (&self.grid, &self.line_pipeline),
        }
    }

    pub fn render(&mut self, frame: &Frame) -> Result<(), wgpu::SurfaceError> {
        self.params.clear();
        self.params
            .extend(frame.draws.iter().map(|d| DrawParams::new(&d.mvp, d.color)));
        self.binding.upload(&self.device, &self.queue, &self.params);

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("encoder") });

        {
            let [r, g, b] = frame.clear_color;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: true }),
                    stencil_ops: None,
                }),
            });

            for (i, draw) in frame.draws.iter().enumerate() {
                let (mesh, pipeline) = self.mesh(draw.mesh);
                rpass.set_pipeline(pipeline);
                self.binding.bind(&mut rpass, i);
                rpass.set_vertex_buffer(0, mesh.buffer.slice(..));
                rpass.draw(0..mesh.vertex_count, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Re-applies the current surface configuration after a lost/outdated surface.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn check_validation(error: Option<wgpu::Error>, kind: BindingKind) -> anyhow::Result<()> {
    match error {
        None => Ok(()),
        Some(err) => Err(anyhow::Error::msg(err.to_string()))
            .with_context(|| format!("building {kind:?} pipelines")),
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    binding: &dyn DrawBinding,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(match topology {
            wgpu::PrimitiveTopology::LineList => "line-pipeline",
            _ => "triangle-pipeline",
        }),
        layout: Some(binding.pipeline_layout()),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState { topology, cull_mode: None, ..Default::default() },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}
