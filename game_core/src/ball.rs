//! Ball entity: damped gravity, table bounce, side-wall reflection, paddle
//! response and the out-of-bounds test that decides points.

use glam::Vec3;

use crate::{BallState, GameConfig, Material, MeshShape, NodeId, Scene, Side, Transform};

/// Surface the ball bounced off during an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contact {
    Table,
    SideWall,
}

#[derive(Debug, Clone, Copy)]
struct BallMeshes {
    body: NodeId,
    shadow: NodeId,
}

/// The ball
#[derive(Debug, Clone)]
pub struct Ball {
    pub state: BallState,
    config: GameConfig,
    /// Simulated seconds since construction.
    clock: f32,
    /// Clock value of the last bounce or paddle hit; `None` right after a serve.
    last_bounce: Option<f32>,
    meshes: Option<BallMeshes>,
}

impl Ball {
    /// Ball hovering over the net, at rest, with no scene meshes.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            state: BallState::new(
                Vec3::new(0.0, config.table_height + 0.5, 0.0),
                Vec3::ZERO,
            ),
            config: config.clone(),
            clock: 0.0,
            last_bounce: None,
            meshes: None,
        }
    }

    /// Ball with a body sphere and a table shadow attached to `scene`.
    pub fn spawn(config: &GameConfig, scene: &mut Scene) -> Self {
        let mut ball = Self::new(config);
        let body = scene.spawn(
            MeshShape::Sphere,
            Transform::new(ball.state.position, Vec3::splat(config.ball_radius)),
            Material::new(0xffffff, 0.2, 0.1),
        );
        let shadow = scene.spawn(
            MeshShape::Disc,
            Transform::new(
                Vec3::new(0.0, config.table_height + 0.001, 0.0),
                Vec3::new(config.ball_radius * 1.5, 1.0, config.ball_radius * 1.5),
            ),
            Material::new(0x000000, 1.0, 0.0),
        );
        scene.set_opacity(shadow, 0.3);
        ball.meshes = Some(BallMeshes { body, shadow });
        ball.sync(scene);
        ball
    }

    /// Launch a fresh serve from `server`'s half toward the opponent.
    pub fn reset(&mut self, server: Side) {
        let c = &self.config;
        let sign = server.end_sign();
        self.state.position = Vec3::new(
            0.0,
            c.table_height + c.serve_height,
            sign * c.table_length / 4.0,
        );
        self.state.velocity = Vec3::new(0.0, c.serve_speed_up, -sign * c.serve_speed_forward);
        self.state.spin = Vec3::ZERO;
        self.last_bounce = None;
    }

    /// Integrate one step and resolve table and side-wall contacts.
    pub fn update(&mut self, dt: f32) -> Option<Contact> {
        let c = &self.config;
        self.clock += dt;

        self.state.velocity.y -= c.gravity * c.gravity_scale * dt;
        self.state.position += self.state.velocity * dt;

        let mut contact = None;

        if self.state.position.y <= c.table_height
            && self.state.velocity.y < 0.0
            && self.is_over_table()
        {
            self.state.position.y = c.table_height;
            self.state.velocity.y = -self.state.velocity.y * c.bounce_factor;
            self.state.velocity.x *= c.table_friction;
            self.state.velocity.z *= c.table_friction;
            self.last_bounce = Some(self.clock);
            contact = Some(Contact::Table);
        }

        let half_width = c.half_width();
        if self.state.position.x.abs() > half_width && self.state.position.y > c.table_height {
            self.state.velocity.x *= -c.bounce_factor;
            self.state.position.x = self.state.position.x.signum() * half_width;
            contact = contact.or(Some(Contact::SideWall));
        }

        contact
    }

    pub fn is_over_table(&self) -> bool {
        self.state.position.x.abs() <= self.config.half_width()
            && self.state.position.z.abs() <= self.config.half_length()
    }

    /// True while inside the grace window after a bounce or hit.
    pub fn in_grace_period(&self) -> bool {
        self.last_bounce
            .is_some_and(|t| self.clock - t < self.config.grace_period)
    }

    /// Dead ball: dropped below the table, off the surface, still falling.
    ///
    /// Always false during the grace window, so an edge graze that bounces
    /// and immediately drops cannot be scored twice.
    pub fn is_out_of_bounds(&self) -> bool {
        if self.in_grace_period() {
            return false;
        }
        self.state.position.y < self.config.table_height - self.config.out_margin
            && !self.is_over_table()
            && self.state.velocity.y < 0.0
    }

    /// Return the ball off a paddle centered at `paddle_position`.
    pub fn hit_by_paddle(&mut self, paddle_position: Vec3) {
        let c = &self.config;
        let offset = self.state.position.x - paddle_position.x;

        self.state.velocity.z *= -c.hit_damping;
        self.state.velocity.x += offset * c.hit_angle_gain;
        self.state.velocity.y = self.state.velocity.y.abs() * c.hit_lift_retain + c.hit_lift;

        let speed = self.state.velocity.length();
        if speed > c.ball_speed_max {
            self.state.velocity *= c.ball_speed_max / speed;
        }

        self.last_bounce = Some(self.clock);
    }

    /// Push position to the body mesh and size/fade the shadow with height.
    pub fn sync(&self, scene: &mut Scene) {
        let Some(meshes) = self.meshes else {
            return;
        };
        let c = &self.config;
        let p = self.state.position;
        scene.set_translation(meshes.body, p);
        scene.set_translation(meshes.shadow, Vec3::new(p.x, c.table_height + 0.001, p.z));

        let height = (p.y - c.table_height).max(0.1);
        let scale = 1.0 / (1.0 + height * 0.5);
        let radius = c.ball_radius * 1.5 * scale;
        scene.set_scale(meshes.shadow, Vec3::new(radius, 1.0, radius));
        scene.set_opacity(meshes.shadow, 0.3 * scale);
    }

    /// Detach meshes from the scene.
    pub fn dispose(&mut self, scene: &mut Scene) {
        if let Some(meshes) = self.meshes.take() {
            scene.despawn(meshes.body);
            scene.despawn(meshes.shadow);
        }
    }

    pub fn body_node(&self) -> Option<NodeId> {
        self.meshes.map(|m| m.body)
    }
}
