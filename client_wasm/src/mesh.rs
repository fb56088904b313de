//! Mesh generation for the table tennis scene
//!
//! Unit meshes matching `game_core::MeshShape`: cube, sphere, cylinder,
//! disc and plane. Node transforms scale them to size.

use game_core::MeshShape;
use std::f32::consts::{PI, TAU};
use wgpu::*;

/// Vertex data for meshes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [VertexAttribute; 2] = vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

fn vertex(position: [f32; 3], normal: [f32; 3]) -> Vertex {
    Vertex { position, normal }
}

const SPHERE_SEGMENTS: u32 = 24;
const ROUND_SEGMENTS: u32 = 32;

/// CPU-side geometry for a shape
pub fn geometry(shape: MeshShape) -> (Vec<Vertex>, Vec<u16>) {
    match shape {
        MeshShape::Box => create_cube(),
        MeshShape::Sphere => create_sphere(SPHERE_SEGMENTS),
        MeshShape::Cylinder => create_cylinder(ROUND_SEGMENTS),
        MeshShape::Disc => create_disc(ROUND_SEGMENTS),
        MeshShape::Plane => create_plane(),
    }
}

/// Generate vertices and indices for a unit sphere
pub fn create_sphere(segments: u32) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for i in 0..=segments {
        let theta = PI * i as f32 / segments as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for j in 0..=segments {
            let phi = TAU * j as f32 / segments as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let p = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            // Normal is the position on a unit sphere
            vertices.push(vertex(p, p));
        }
    }

    for i in 0..segments {
        for j in 0..segments {
            let first = (i * (segments + 1) + j) as u16;
            let second = first + (segments + 1) as u16;
            indices.extend_from_slice(&[first, second, first + 1, second, second + 1, first + 1]);
        }
    }

    (vertices, indices)
}

/// Generate vertices and indices for a unit cube centered on the origin
pub fn create_cube() -> (Vec<Vertex>, Vec<u16>) {
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // normal, u axis, v axis
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in FACES {
        let base = vertices.len() as u16;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let p = [
                n[0] * 0.5 + u[0] * su + v[0] * sv,
                n[1] * 0.5 + u[1] * su + v[1] * sv,
                n[2] * 0.5 + u[2] * su + v[2] * sv,
            ];
            vertices.push(vertex(p, n));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    (vertices, indices)
}

/// Unit-radius cylinder, one unit tall, centered on the origin along Y
pub fn create_cylinder(segments: u32) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side wall
    for j in 0..=segments {
        let (s, c) = (TAU * j as f32 / segments as f32).sin_cos();
        vertices.push(vertex([c, -0.5, s], [c, 0.0, s]));
        vertices.push(vertex([c, 0.5, s], [c, 0.0, s]));
    }
    for j in 0..segments {
        let i = (j * 2) as u16;
        indices.extend_from_slice(&[i, i + 1, i + 2, i + 2, i + 1, i + 3]);
    }

    // Caps
    for (y, ny) in [(0.5, 1.0), (-0.5, -1.0)] {
        let center = vertices.len() as u16;
        vertices.push(vertex([0.0, y, 0.0], [0.0, ny, 0.0]));
        for j in 0..=segments {
            let (s, c) = (TAU * j as f32 / segments as f32).sin_cos();
            vertices.push(vertex([c, y, s], [0.0, ny, 0.0]));
        }
        for j in 0..segments as u16 {
            indices.extend_from_slice(&[center, center + 1 + j, center + 2 + j]);
        }
    }

    (vertices, indices)
}

/// Unit-radius disc in the XZ plane facing +Y
pub fn create_disc(segments: u32) -> (Vec<Vertex>, Vec<u16>) {
    let up = [0.0, 1.0, 0.0];
    let mut vertices = vec![vertex([0.0, 0.0, 0.0], up)];
    for j in 0..=segments {
        let (s, c) = (TAU * j as f32 / segments as f32).sin_cos();
        vertices.push(vertex([c, 0.0, s], up));
    }
    let indices = (0..segments as u16)
        .flat_map(|j| [0, j + 1, j + 2])
        .collect();
    (vertices, indices)
}

/// Unit square in the XZ plane facing +Y
pub fn create_plane() -> (Vec<Vertex>, Vec<u16>) {
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        vertex([-0.5, 0.0, -0.5], up),
        vertex([0.5, 0.0, -0.5], up),
        vertex([0.5, 0.0, 0.5], up),
        vertex([-0.5, 0.0, 0.5], up),
    ];
    let indices = vec![0, 1, 2, 2, 3, 0];
    (vertices, indices)
}

/// Mesh data with GPU buffers
pub struct Mesh {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

impl Mesh {
    pub fn new(device: &Device, queue: &Queue, vertices: &[Vertex], indices: &[u16]) -> Self {
        let vertex_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("Vertex Buffer"),
            size: std::mem::size_of_val(vertices) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&vertex_buffer, 0, bytemuck::cast_slice(vertices));

        // write_buffer needs a 4-byte multiple; pad odd index counts.
        let mut padded = indices.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let index_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("Index Buffer"),
            size: std::mem::size_of_val(padded.as_slice()) as u64,
            usage: BufferUsages::INDEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&index_buffer, 0, bytemuck::cast_slice(&padded));

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    pub fn for_shape(device: &Device, queue: &Queue, shape: MeshShape) -> Self {
        let (vertices, indices) = geometry(shape);
        Self::new(device, queue, &vertices, &indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(shape: MeshShape) {
        let (vertices, indices) = geometry(shape);
        assert!(!vertices.is_empty(), "{shape:?} has vertices");
        assert_eq!(indices.len() % 3, 0, "{shape:?} is a triangle list");
        assert!(
            indices.iter().all(|&i| (i as usize) < vertices.len()),
            "{shape:?} index out of range"
        );
        for v in &vertices {
            let n = glam::Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4, "{shape:?} normal not unit");
        }
    }

    #[test]
    fn test_all_shapes_are_valid() {
        for shape in MeshShape::ALL {
            assert_valid(shape);
        }
    }

    #[test]
    fn test_cube_is_unit() {
        let (vertices, indices) = create_cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        for v in vertices {
            for c in v.position {
                assert_eq!(c.abs(), 0.5);
            }
        }
    }

    #[test]
    fn test_sphere_is_unit_radius() {
        let (vertices, _) = create_sphere(8);
        for v in vertices {
            let r = glam::Vec3::from(v.position).length();
            assert!((r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_flat_shapes_lie_in_xz() {
        for shape in [MeshShape::Disc, MeshShape::Plane] {
            let (vertices, _) = geometry(shape);
            assert!(vertices.iter().all(|v| v.position[1] == 0.0));
            assert!(vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        }
    }

    #[test]
    fn test_cylinder_spans_unit_height() {
        let (vertices, _) = create_cylinder(16);
        let (min, max) = vertices.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v.position[1]), hi.max(v.position[1]))
        });
        assert_eq!((min, max), (-0.5, 0.5));
    }
}
