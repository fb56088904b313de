use super::resources::{self, build_batches, InstanceData};
use super::Renderer;
use crate::camera::SceneUniform;
use game_core::{RenderError, Scene};
use wgpu::*;

pub fn draw_frame(renderer: &mut Renderer, scene: &Scene) -> Result<(), RenderError> {
    let output = match renderer.surface.get_current_texture() {
        Ok(output) => output,
        Err(SurfaceError::Lost | SurfaceError::Outdated) => {
            renderer.reconfigure();
            return Err(RenderError::SurfaceLost);
        }
        Err(SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
        Err(e) => return Err(RenderError::Backend(format!("{:?}", e))),
    };
    let view = output.texture.create_view(&TextureViewDescriptor::default());

    let items = scene.draw_list();
    let (instances, batches) = build_batches(&items);
    update_buffers(renderer, scene, &instances);

    let mut encoder = renderer
        .device
        .create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

    {
        let [r, g, b, a] = scene.background().map(f64::from);
        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Main Pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(Color { r, g, b, a }),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &renderer.depth.view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, &renderer.scene_bind_group, &[]);
        pass.set_vertex_buffer(1, renderer.buffers.instances.slice(..));

        // Batches arrive opaque first, so the pipeline switches at most once.
        let mut transparent = None;
        for batch in &batches {
            if transparent != Some(batch.transparent) {
                pass.set_pipeline(if batch.transparent {
                    &renderer.transparent_pipeline
                } else {
                    &renderer.opaque_pipeline
                });
                transparent = Some(batch.transparent);
            }
            let mesh = renderer.mesh(batch.shape);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint16);
            pass.draw_indexed(0..mesh.index_count, 0, batch.instances.clone());
        }
    }

    renderer.queue.submit(std::iter::once(encoder.finish()));
    output.present();

    Ok(())
}

fn update_buffers(renderer: &mut Renderer, scene: &Scene, instances: &[InstanceData]) {
    let uniform = SceneUniform::from_scene(scene);
    renderer
        .queue
        .write_buffer(&renderer.buffers.scene, 0, bytemuck::cast_slice(&[uniform]));

    if instances.len() > renderer.buffers.instance_capacity {
        let capacity = instances.len().next_power_of_two();
        renderer.buffers.instances.destroy();
        renderer.buffers.instances = resources::create_instance_buffer(&renderer.device, capacity);
        renderer.buffers.instance_capacity = capacity;
    }
    if !instances.is_empty() {
        renderer
            .queue
            .write_buffer(&renderer.buffers.instances, 0, bytemuck::cast_slice(instances));
    }
}
