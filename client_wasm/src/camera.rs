//! Per-frame scene uniform: camera matrix plus lighting

use game_core::{Light, Scene};

/// Directional lights the shader evaluates
pub const MAX_LIGHTS: usize = 2;

/// Scene uniform data (matches WGSL struct, 256-byte aligned)
#[repr(C, align(256))]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    view_proj: [[f32; 4]; 4],             // 64 bytes (mat4x4)
    ambient: [f32; 4],                    // rgb * intensity
    light_dirs: [[f32; 4]; MAX_LIGHTS],   // unit vectors toward each light
    light_colors: [[f32; 4]; MAX_LIGHTS], // rgb * intensity
    _padding: [f32; 28],                  // pad to 256 bytes
}

impl SceneUniform {
    pub fn from_scene(scene: &Scene) -> Self {
        let mut uniform = Self {
            view_proj: scene.camera().view_proj().to_cols_array_2d(),
            ambient: [0.0; 4],
            light_dirs: [[0.0; 4]; MAX_LIGHTS],
            light_colors: [[0.0; 4]; MAX_LIGHTS],
            _padding: [0.0; 28],
        };

        let mut directional = 0;
        for light in scene.lights() {
            match *light {
                Light::Ambient { color, intensity } => {
                    for (acc, c) in uniform.ambient.iter_mut().zip(color) {
                        *acc += c * intensity;
                    }
                }
                Light::Directional {
                    position,
                    color,
                    intensity,
                } if directional < MAX_LIGHTS => {
                    let dir = position.normalize_or_zero();
                    uniform.light_dirs[directional] = [dir.x, dir.y, dir.z, 0.0];
                    uniform.light_colors[directional] =
                        [color[0] * intensity, color[1] * intensity, color[2] * intensity, 0.0];
                    directional += 1;
                }
                Light::Directional { .. } => {}
            }
        }
        uniform
    }

    pub fn ambient(&self) -> [f32; 4] {
        self.ambient
    }

    pub fn light_dir(&self, index: usize) -> Option<[f32; 4]> {
        self.light_dirs.get(index).copied()
    }
}
