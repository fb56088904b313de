use crate::camera::SceneUniform;
use game_core::{DrawItem, MeshShape};
use glam::Mat3;
use wgpu::util::DeviceExt;
use wgpu::*;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Instance data for rendering (matches shader InstanceInput).
/// Must use `repr(C)` and `bytemuck` to safely cast to raw bytes for the GPU buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3], // inverse-transpose of the model's upper 3x3
    pub color: [f32; 4],       // rgba
}

impl InstanceData {
    const ATTRIBS: [VertexAttribute; 8] = vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4
    ];

    pub fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as u64,
            step_mode: VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    pub fn from_item(item: &DrawItem) -> Self {
        let normal = Mat3::from_mat4(item.model).inverse().transpose();
        let col = |c: glam::Vec3| [c.x, c.y, c.z, 0.0];
        Self {
            model: item.model.to_cols_array_2d(),
            normal: [col(normal.x_axis), col(normal.y_axis), col(normal.z_axis)],
            color: item.color,
        }
    }
}

/// A run of instances sharing mesh and blend mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub shape: MeshShape,
    pub transparent: bool,
    pub instances: std::ops::Range<u32>,
}

/// Flatten a sorted draw list into instance data plus per-mesh batches.
pub fn build_batches(items: &[DrawItem]) -> (Vec<InstanceData>, Vec<Batch>) {
    let mut instances = Vec::with_capacity(items.len());
    let mut batches: Vec<Batch> = Vec::new();

    for item in items {
        let index = instances.len() as u32;
        instances.push(InstanceData::from_item(item));
        let transparent = item.color[3] < 1.0;

        match batches.last_mut() {
            Some(batch) if batch.shape == item.shape && batch.transparent == transparent => {
                batch.instances.end = index + 1;
            }
            _ => batches.push(Batch {
                shape: item.shape,
                transparent,
                instances: index..index + 1,
            }),
        }
    }

    (instances, batches)
}

pub struct GameBuffers {
    pub scene: Buffer,
    pub instances: Buffer,
    pub instance_capacity: usize,
}

const INITIAL_INSTANCES: usize = 64;

pub fn create_buffers(device: &Device, uniform: &SceneUniform) -> GameBuffers {
    let scene = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("Scene Uniform Buffer"),
        contents: bytemuck::cast_slice(&[*uniform]),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    });

    GameBuffers {
        scene,
        instances: create_instance_buffer(device, INITIAL_INSTANCES),
        instance_capacity: INITIAL_INSTANCES,
    }
}

pub fn create_instance_buffer(device: &Device, capacity: usize) -> Buffer {
    device.create_buffer(&BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity * std::mem::size_of::<InstanceData>()) as u64,
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub struct DepthTexture {
    pub texture: Texture,
    pub view: TextureView,
}

pub fn create_depth_texture(device: &Device, config: &SurfaceConfiguration) -> DepthTexture {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("Depth Texture"),
        size: Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&TextureViewDescriptor::default());
    DepthTexture { texture, view }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{GameConfig, Scene};
    use glam::{Mat4, Vec3};

    fn item(shape: MeshShape, alpha: f32) -> DrawItem {
        DrawItem {
            shape,
            model: Mat4::IDENTITY,
            color: [1.0, 1.0, 1.0, alpha],
        }
    }

    #[test]
    fn test_instance_layout_size() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 128);
    }

    #[test]
    fn test_batches_group_runs() {
        let items = [
            item(MeshShape::Box, 1.0),
            item(MeshShape::Box, 1.0),
            item(MeshShape::Sphere, 1.0),
            item(MeshShape::Disc, 0.3),
        ];
        let (instances, batches) = build_batches(&items);
        assert_eq!(instances.len(), 4);
        assert_eq!(
            batches,
            vec![
                Batch {
                    shape: MeshShape::Box,
                    transparent: false,
                    instances: 0..2
                },
                Batch {
                    shape: MeshShape::Sphere,
                    transparent: false,
                    instances: 2..3
                },
                Batch {
                    shape: MeshShape::Disc,
                    transparent: true,
                    instances: 3..4
                },
            ]
        );
    }

    #[test]
    fn test_scene_batches_cover_every_node() {
        let scene = Scene::new(&GameConfig::new(), 800, 600);
        let items = scene.draw_list();
        let (instances, batches) = build_batches(&items);
        let covered: u32 = batches.iter().map(|b| b.instances.len() as u32).sum();
        assert_eq!(covered as usize, instances.len());
        assert_eq!(instances.len(), scene.node_count());
    }

    #[test]
    fn test_normal_matrix_undoes_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 0.5, 1.0));
        let data = InstanceData::from_item(&DrawItem {
            shape: MeshShape::Box,
            model,
            color: [1.0; 4],
        });
        assert!((data.normal[0][0] - 0.5).abs() < 1e-6);
        assert!((data.normal[1][1] - 2.0).abs() < 1e-6);
    }
}
