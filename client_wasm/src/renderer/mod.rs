//! WebGPU renderer for the table tennis scene
//!
//! Implements `game_core::RenderSurface`: each `present` uploads the scene
//! uniform and one instance per node, then draws opaque batches followed by
//! translucent ones.

pub mod draw;
#[cfg(target_arch = "wasm32")]
pub mod init;
pub mod pipeline;
pub mod resources;
pub mod shaders;

use crate::camera::SceneUniform;
use crate::mesh::Mesh;
use bytemuck::Zeroable;
use game_core::{MeshShape, RenderError, RenderSurface, Scene};
use resources::{DepthTexture, GameBuffers};
use wgpu::*;

pub struct Renderer {
    pub device: Device,
    pub queue: Queue,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub size: (u32, u32),

    // Pipelines
    pub opaque_pipeline: RenderPipeline,
    pub transparent_pipeline: RenderPipeline,

    // Bind Groups
    pub scene_bind_group: BindGroup,

    // Resources
    pub buffers: GameBuffers,
    pub depth: DepthTexture,
    pub meshes: [Mesh; MeshShape::ALL.len()],

    pub released: bool,
}

impl Renderer {
    #[cfg(target_arch = "wasm32")]
    pub async fn new(canvas: web_sys::HtmlCanvasElement) -> Result<Self, String> {
        let ctx = init::init_wgpu(canvas).await?;
        Ok(Self::from_context(
            ctx.device,
            ctx.queue,
            ctx.surface,
            ctx.config,
        ))
    }

    pub fn from_context(
        device: Device,
        queue: Queue,
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
    ) -> Self {
        // Camera and lights are uploaded with every frame
        let buffers = resources::create_buffers(&device, &SceneUniform::zeroed());
        let depth = resources::create_depth_texture(&device, &surface_config);
        let pipes = pipeline::create_pipelines(&device, surface_config.format);
        let meshes = MeshShape::ALL.map(|shape| Mesh::for_shape(&device, &queue, shape));

        let scene_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &pipes.scene_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: buffers.scene.as_entire_binding(),
            }],
        });

        Self {
            size: (surface_config.width, surface_config.height),
            device,
            queue,
            surface,
            surface_config,
            opaque_pipeline: pipes.opaque_pipeline,
            transparent_pipeline: pipes.transparent_pipeline,
            scene_bind_group,
            buffers,
            depth,
            meshes,
            released: false,
        }
    }

    pub fn mesh(&self, shape: MeshShape) -> &Mesh {
        &self.meshes[shape as usize]
    }

    /// Re-apply the surface configuration, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
        self.depth = resources::create_depth_texture(&self.device, &self.surface_config);
    }
}

impl RenderSurface for Renderer {
    fn present(&mut self, scene: &Scene) -> Result<(), RenderError> {
        if self.released {
            return Ok(());
        }
        draw::draw_frame(self, scene)
    }

    fn resize(&mut self, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if size == self.size || self.released {
            return;
        }
        self.size = size;
        self.surface_config.width = size.0;
        self.surface_config.height = size.1;
        self.reconfigure();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.buffers.instances.destroy();
        self.buffers.scene.destroy();
        self.depth.texture.destroy();
        for mesh in &self.meshes {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
        }
        self.device.destroy();
    }
}
