//! Render host: scene nodes, camera, lights and the static table geometry.
//!
//! The scene never owns simulation state. Entities keep a [`NodeId`] for
//! their meshes and push placement through the setters here; a
//! [`RenderSurface`] implementation turns [`Scene::draw_list`] into pixels.

use std::fmt;

use glam::{Mat4, Quat, Vec3, Vec4};
use hecs::{Entity, World};

use crate::GameConfig;

/// Non-owning handle to a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Entity);

/// Unit meshes every renderer must provide.
///
/// Box is a unit cube centered on the origin, Sphere and Cylinder have unit
/// radius (the cylinder is one unit tall), Disc and Plane lie in XZ facing +Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeshShape {
    Box,
    Sphere,
    Cylinder,
    Disc,
    Plane,
}

impl MeshShape {
    pub const ALL: [MeshShape; 5] = [
        MeshShape::Box,
        MeshShape::Sphere,
        MeshShape::Cylinder,
        MeshShape::Disc,
        MeshShape::Plane,
    ];
}

/// Node placement; scale doubles as the size of the unit mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(translation: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Surface appearance. Alpha below 1 is drawn blended after opaque nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
}

impl Material {
    pub fn new(hex: u32, roughness: f32, metalness: f32) -> Self {
        Self {
            color: rgb(hex),
            roughness,
            metalness,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.color[3] < 1.0
    }
}

/// Convert 0xRRGGBB into linear-ish RGBA floats (alpha 1).
pub fn rgb(hex: u32) -> [f32; 4] {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    [r, g, b, 1.0]
}

/// Perspective camera looking down at the table at an angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 8.0, 5.5),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            aspect: aspect(width, height),
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect(width, height);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World point to normalized device coordinates.
    pub fn project(&self, point: Vec3) -> Vec3 {
        let clip = self.view_proj() * Vec4::new(point.x, point.y, point.z, 1.0);
        clip.truncate() / clip.w
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    /// Shines from `position` toward the origin.
    Directional {
        position: Vec3,
        color: [f32; 3],
        intensity: f32,
    },
}

/// Everything a renderer needs for one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub shape: MeshShape,
    pub model: Mat4,
    pub color: [f32; 4],
}

/// Why a frame could not be presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Surface must be reconfigured (lost, outdated, resized underneath us).
    SurfaceLost,
    OutOfMemory,
    Backend(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceLost => f.write_str("render surface lost"),
            RenderError::OutOfMemory => f.write_str("out of GPU memory"),
            RenderError::Backend(msg) => write!(f, "render backend error: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Drawable target the scene is presented to each tick.
pub trait RenderSurface {
    fn present(&mut self, scene: &Scene) -> Result<(), RenderError>;

    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Free GPU resources; called once from `GameEngine::dispose`.
    fn release(&mut self) {}
}

/// Surface that draws nothing and remembers what it was given.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    pub frames: u64,
    pub last_draw_count: usize,
    pub size: (u32, u32),
    pub released: bool,
    pub fail_next: Option<RenderError>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for HeadlessSurface {
    fn present(&mut self, scene: &Scene) -> Result<(), RenderError> {
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        self.frames += 1;
        self.last_draw_count = scene.draw_list().len();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn release(&mut self) {
        self.released = true;
    }
}

const BACKGROUND: u32 = 0x1a1a2e;
const TABLE_COLOR: u32 = 0x1a5f3a;
const LINE_COLOR: u32 = 0xffffff;
const NET_COLOR: u32 = 0x2a2a3e;
const LEG_COLOR: u32 = 0x3a2f28;
const FLOOR_COLOR: u32 = 0x2a2a3e;

const TABLE_THICKNESS: f32 = 0.03;
const LINE_WIDTH: f32 = 0.02;
const CENTER_LINE_WIDTH: f32 = 0.003;
const NET_HEIGHT: f32 = 0.15;
const LEG_RADIUS: f32 = 0.035;
const LEG_INSET: f32 = 0.1;
const FLOOR_SIZE: f32 = 20.0;

/// 3D scene shared by the engine's entities
pub struct Scene {
    world: World,
    camera: Camera,
    lights: Vec<Light>,
    background: [f32; 4],
}

impl Scene {
    /// Build lights, camera and the static table for a viewport.
    pub fn new(config: &GameConfig, width: u32, height: u32) -> Self {
        let mut scene = Self {
            world: World::new(),
            camera: Camera::new(width, height),
            lights: vec![
                Light::Ambient {
                    color: [1.0, 1.0, 1.0],
                    intensity: 0.6,
                },
                Light::Directional {
                    position: Vec3::new(2.0, 8.0, 3.0),
                    color: [1.0, 1.0, 1.0],
                    intensity: 0.8,
                },
                Light::Directional {
                    position: Vec3::new(-2.0, 5.0, -3.0),
                    color: [1.0, 1.0, 1.0],
                    intensity: 0.3,
                },
            ],
            background: rgb(BACKGROUND),
        };
        scene.build_table(config);
        scene.build_floor();
        scene
    }

    fn build_table(&mut self, config: &GameConfig) {
        let w = config.table_width;
        let l = config.table_length;
        let h = config.table_height;
        let line_y = h + 0.001;
        let line_thickness = TABLE_THICKNESS + 0.001;
        let line = Material::new(LINE_COLOR, 0.5, 0.0);

        self.spawn(
            MeshShape::Box,
            Transform::new(Vec3::new(0.0, h, 0.0), Vec3::new(w, TABLE_THICKNESS, l)),
            Material::new(TABLE_COLOR, 0.7, 0.1),
        );

        // Center line
        self.spawn(
            MeshShape::Box,
            Transform::new(
                Vec3::new(0.0, line_y, 0.0),
                Vec3::new(w, line_thickness, CENTER_LINE_WIDTH),
            ),
            line,
        );

        // End lines
        for z in [-l / 2.0, l / 2.0] {
            self.spawn(
                MeshShape::Box,
                Transform::new(
                    Vec3::new(0.0, line_y, z),
                    Vec3::new(w, line_thickness, LINE_WIDTH),
                ),
                line,
            );
        }

        // Side lines
        for x in [-w / 2.0, w / 2.0] {
            self.spawn(
                MeshShape::Box,
                Transform::new(
                    Vec3::new(x, line_y, 0.0),
                    Vec3::new(LINE_WIDTH, line_thickness, l),
                ),
                line,
            );
        }

        self.spawn(
            MeshShape::Box,
            Transform::new(
                Vec3::new(0.0, h + NET_HEIGHT / 2.0, 0.0),
                Vec3::new(w + 0.05, NET_HEIGHT, 0.01),
            ),
            Material::new(NET_COLOR, 0.6, 0.4),
        );

        let leg = Material::new(LEG_COLOR, 0.8, 0.0);
        let lx = w / 2.0 - LEG_INSET;
        let lz = l / 2.0 - LEG_INSET;
        for (x, z) in [(-lx, -lz), (lx, -lz), (-lx, lz), (lx, lz)] {
            self.spawn(
                MeshShape::Cylinder,
                Transform::new(
                    Vec3::new(x, h / 2.0, z),
                    Vec3::new(LEG_RADIUS, h, LEG_RADIUS),
                ),
                leg,
            );
        }
    }

    fn build_floor(&mut self) {
        self.spawn(
            MeshShape::Plane,
            Transform::new(Vec3::ZERO, Vec3::new(FLOOR_SIZE, 1.0, FLOOR_SIZE)),
            Material::new(FLOOR_COLOR, 0.9, 0.0),
        );
    }

    pub fn spawn(&mut self, shape: MeshShape, transform: Transform, material: Material) -> NodeId {
        NodeId(self.world.spawn((shape, transform, material)))
    }

    /// Remove a node; false if it was already gone.
    pub fn despawn(&mut self, id: NodeId) -> bool {
        self.world.despawn(id.0).is_ok()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.world.contains(id.0)
    }

    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        if let Ok(mut transform) = self.world.get::<&mut Transform>(id.0) {
            transform.translation = translation;
        }
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) {
        if let Ok(mut transform) = self.world.get::<&mut Transform>(id.0) {
            transform.scale = scale;
        }
    }

    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        if let Ok(mut material) = self.world.get::<&mut Material>(id.0) {
            material.color[3] = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.world.get::<&Transform>(id.0).ok().map(|t| *t)
    }

    pub fn material(&self, id: NodeId) -> Option<Material> {
        self.world.get::<&Material>(id.0).ok().map(|m| *m)
    }

    pub fn node_count(&self) -> usize {
        self.world.len() as usize
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn background(&self) -> [f32; 4] {
        self.background
    }

    /// Opaque nodes first, then translucent ones; stable by shape and spawn order.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items: Vec<(bool, MeshShape, u32, DrawItem)> = self
            .world
            .query::<(&MeshShape, &Transform, &Material)>()
            .iter()
            .map(|(entity, (shape, transform, material))| {
                (
                    material.is_transparent(),
                    *shape,
                    entity.id(),
                    DrawItem {
                        shape: *shape,
                        model: transform.matrix(),
                        color: material.color,
                    },
                )
            })
            .collect();
        items.sort_by_key(|(transparent, shape, id, _)| (*transparent, *shape, *id));
        items.into_iter().map(|(_, _, _, item)| item).collect()
    }

    /// Present the current frame.
    pub fn render(&self, surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
        surface.present(self)
    }

    /// Drop every node, static geometry included.
    pub fn clear(&mut self) {
        self.world.clear();
    }
}
