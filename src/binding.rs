use crate::math::{GL_TO_WGPU_CLIP, Mat4};
use crate::scene::Color;
use std::num::NonZeroU64;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawParams {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
}

pub const DRAW_PARAMS_SIZE: u64 = std::mem::size_of::<DrawParams>() as u64;

impl DrawParams {
    /// Takes an OpenGL-convention MVP and fixes up the depth range for wgpu.
    pub fn new(mvp: &Mat4, color: Color) -> Self {
        Self {
            mvp: GL_TO_WGPU_CLIP.multiply(mvp).to_cols_array_2d(),
            color: [color[0], color[1], color[2], 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    PushConstants,
    UniformSlots,
}

pub fn select_binding(
    features: wgpu::Features,
    limits: &wgpu::Limits,
    force_uniform: bool,
) -> BindingKind {
    if !force_uniform
        && features.contains(wgpu::Features::PUSH_CONSTANTS)
        && u64::from(limits.max_push_constant_size) >= DRAW_PARAMS_SIZE
    {
        BindingKind::PushConstants
    } else {
        BindingKind::UniformSlots
    }
}

impl BindingKind {
    /// WGSL declaration of the `draw` variable the shader body reads.
    pub fn shader_prelude(self) -> &'static str {
        match self {
            BindingKind::PushConstants => "var<push_constant> draw: DrawParams;",
            BindingKind::UniformSlots => "@group(0) @binding(0) var<uniform> draw: DrawParams;",
        }
    }

    pub fn required_features(self) -> wgpu::Features {
        match self {
            BindingKind::PushConstants => wgpu::Features::PUSH_CONSTANTS,
            BindingKind::UniformSlots => wgpu::Features::empty(),
        }
    }

    pub fn required_limits(self, base: wgpu::Limits) -> wgpu::Limits {
        match self {
            BindingKind::PushConstants => wgpu::Limits {
                max_push_constant_size: DRAW_PARAMS_SIZE as u32,
                ..base
            },
            BindingKind::UniformSlots => base,
        }
    }

    pub fn create(self, device: &wgpu::Device) -> Box<dyn DrawBinding> {
        match self {
            BindingKind::PushConstants => Box::new(PushConstantBinding::new(device)),
            BindingKind::UniformSlots => Box::new(UniformSlotBinding::new(device)),
        }
    }
}

pub fn shader_source(kind: BindingKind) -> String {
    format!("{}\n{}\n", include_str!("scene.wgsl"), kind.shader_prelude())
}

pub trait DrawBinding {
    fn kind(&self) -> BindingKind;
    fn pipeline_layout(&self) -> &wgpu::PipelineLayout;
    /// Stages this frame's parameters; called once before the pass begins.
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, params: &[DrawParams]);
    fn bind<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, index: usize);
}

pub struct PushConstantBinding {
    layout: wgpu::PipelineLayout,
    params: Vec<DrawParams>,
}

impl PushConstantBinding {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("push-constant-pl"),
            bind_group_layouts: &[],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX_FRAGMENT,
                range: 0..DRAW_PARAMS_SIZE as u32,
            }],
        });
        Self { layout, params: Vec::new() }
    }
}

impl DrawBinding for PushConstantBinding {
    fn kind(&self) -> BindingKind {
        BindingKind::PushConstants
    }

    fn pipeline_layout(&self) -> &wgpu::PipelineLayout {
        &self.layout
    }

    fn upload(&mut self, _device: &wgpu::Device, _queue: &wgpu::Queue, params: &[DrawParams]) {
        self.params.clear();
        self.params.extend_from_slice(params);
    }

    fn bind<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, index: usize) {
        pass.set_push_constants(
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            0,
            bytemuck::bytes_of(&self.params[index]),
        );
    }
}

pub struct UniformSlotBinding {
    layout: wgpu::PipelineLayout,
    bind_group_layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

pub fn align_up(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

impl UniformSlotBinding {
    const INITIAL_SLOTS: usize = 256;

    pub fn new(device: &wgpu::Device) -> Self {
        let stride = align_up(
            DRAW_PARAMS_SIZE,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw-params-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(DRAW_PARAMS_SIZE),
                },
                count: None,
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("uniform-slot-pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let capacity = Self::INITIAL_SLOTS;
        let (buffer, bind_group) = Self::allocate(device, &bind_group_layout, stride, capacity);
        Self {
            layout,
            bind_group_layout,
            buffer,
            bind_group,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw-params"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw-params-bg"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(DRAW_PARAMS_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }
}

impl DrawBinding for UniformSlotBinding {
    fn kind(&self) -> BindingKind {
        BindingKind::UniformSlots
    }

    fn pipeline_layout(&self) -> &wgpu::PipelineLayout {
        &self.layout
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, params: &[DrawParams]) {
        if params.is_empty() {
            return;
        }
        if params.len() > self.capacity {
            let new_cap = params.len().next_power_of_two().max(self.capacity * 2);
            let (buffer, bind_group) =
                Self::allocate(device, &self.bind_group_layout, self.stride, new_cap);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = new_cap;
            log::debug!("draw-params buffer grown to {new_cap} slots");
        }

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(params.len() * stride, 0);
        for (slot, p) in self.staging.chunks_exact_mut(stride).zip(params) {
            slot[..DRAW_PARAMS_SIZE as usize].copy_from_slice(bytemuck::bytes_of(p));
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    fn bind<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, index: usize) {
        let offset = (index as u64 * self.stride) as u32;
        pass.set_bind_group(0, &self.bind_group, &[offset]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_fit_push_constant_budget() {
        assert_eq!(DRAW_PARAMS_SIZE, 80);
    }

    #[test]
    fn push_constants_need_feature_and_room() {
        let roomy = wgpu::Limits { max_push_constant_size: 128, ..wgpu::Limits::default() };
        let tight = wgpu::Limits { max_push_constant_size: 64, ..wgpu::Limits::default() };

        assert_eq!(
            select_binding(wgpu::Features::PUSH_CONSTANTS, &roomy, false),
            BindingKind::PushConstants
        );
        assert_eq!(
            select_binding(wgpu::Features::PUSH_CONSTANTS, &tight, false),
            BindingKind::UniformSlots
        );
        assert_eq!(
            select_binding(wgpu::Features::empty(), &roomy, false),
            BindingKind::UniformSlots
        );
        assert_eq!(
            select_binding(wgpu::Features::PUSH_CONSTANTS, &roomy, true),
            BindingKind::UniformSlots
        );
    }

    #[test]
    fn shader_gets_matching_declaration() {
        let push = shader_source(BindingKind::PushConstants);
        assert!(push.trim_end().ends_with("var<push_constant> draw: DrawParams;"));
        let uniform = shader_source(BindingKind::UniformSlots);
        assert!(uniform.contains("var<uniform> draw"));
        assert!(uniform.contains("fn vs_main"));
    }

    #[test]
    fn slots_respect_offset_alignment() {
        assert_eq!(align_up(80, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
    }

    #[test]
    fn params_are_column_major_with_depth_fix() {
        let p = DrawParams::new(&Mat4::translation(1.0, 2.0, 0.0), [0.5, 0.25, 1.0]);
        // Translation lands in the last column; z picks up the 0.5 bias.
        assert_eq!(p.mvp[3], [1.0, 2.0, 0.5, 1.0]);
        assert_eq!(p.color, [0.5, 0.25, 1.0, 1.0]);
    }
}
