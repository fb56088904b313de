use super::resources::{InstanceData, DEPTH_FORMAT};
use super::shaders::SCENE_SHADER;
use crate::mesh::Vertex;
use wgpu::*;

pub struct PipelineState {
    pub opaque_pipeline: RenderPipeline,
    pub transparent_pipeline: RenderPipeline,
    pub scene_layout: BindGroupLayout,
}

pub fn create_pipelines(device: &Device, format: TextureFormat) -> PipelineState {
    // 1. Scene Bind Group Layout
    let scene_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Scene Bind Group Layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: ShaderSource::Wgsl(SCENE_SHADER.into()),
    });

    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Render Pipeline Layout"),
        bind_group_layouts: &[&scene_layout],
        push_constant_ranges: &[],
    });

    // 2. Opaque nodes write depth; 3. translucent ones (shadow) blend over them.
    let opaque_pipeline = create_pipeline(
        device,
        &layout,
        &shader,
        format,
        "Opaque Pipeline",
        BlendState::REPLACE,
        true,
    );
    let transparent_pipeline = create_pipeline(
        device,
        &layout,
        &shader,
        format,
        "Transparent Pipeline",
        BlendState::ALPHA_BLENDING,
        false,
    );

    PipelineState {
        opaque_pipeline,
        transparent_pipeline,
        scene_layout,
    }
}

fn create_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    shader: &ShaderModule,
    format: TextureFormat,
    label: &str,
    blend: BlendState,
    depth_write_enabled: bool,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout(), InstanceData::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            // Discs and planes are single-sided
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare: CompareFunction::LessEqual,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
