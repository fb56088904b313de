use glam::Vec3;

use crate::{Ball, GameConfig, Material, MeshShape, NodeId, PaddleState, Scene, Side, Transform};

/// A paddle that eases toward a target X at its end of the table
#[derive(Debug, Clone)]
pub struct Paddle {
    pub side: Side,
    pub state: PaddleState,
    config: GameConfig,
    node: Option<NodeId>,
}

impl Paddle {
    /// Paddle centered at its end of the table, with no scene mesh.
    pub fn new(side: Side, config: &GameConfig) -> Self {
        let position = Vec3::new(0.0, config.paddle_y(), config.paddle_z(side));
        Self {
            side,
            state: PaddleState::new(position),
            config: config.clone(),
            node: None,
        }
    }

    /// Paddle with a box mesh attached to `scene`.
    pub fn spawn(side: Side, config: &GameConfig, scene: &mut Scene) -> Self {
        let mut paddle = Self::new(side, config);
        let color = match side {
            Side::Player => 0xcc3333,
            Side::Ai => 0x3333cc,
        };
        paddle.node = Some(scene.spawn(
            MeshShape::Box,
            Transform::new(
                paddle.state.position,
                Vec3::new(config.paddle_width, config.paddle_thickness, config.paddle_depth),
            ),
            Material::new(color, 0.5, 0.1),
        ));
        paddle
    }

    /// Record where the paddle should head; movement happens in `update`.
    pub fn set_target_x(&mut self, x: f32) {
        self.state.target_position.x = x;
    }

    pub fn target_x(&self) -> f32 {
        self.state.target_position.x
    }

    pub fn update(&mut self, dt: f32) {
        let gap = self.state.target_position.x - self.state.position.x;
        let step = gap * self.config.paddle_lerp * dt;
        self.state.velocity.x = step;
        self.state.position.x = self.config.clamp_paddle_x(self.state.position.x + step);
    }

    /// Ball sits just above the paddle face, within its footprint.
    pub fn check_ball_collision(&self, ball: &Ball) -> bool {
        let r = self.config.ball_radius;
        let d = ball.state.position - self.state.position;
        d.x.abs() < self.config.paddle_width / 2.0 + r
            && d.z.abs() < self.config.paddle_depth / 2.0 + r
            && d.y > 0.0
            && d.y < r + self.config.contact_band
    }

    /// Snap back to center with the target cleared.
    pub fn reset(&mut self) {
        self.state = PaddleState::new(Vec3::new(
            0.0,
            self.config.paddle_y(),
            self.config.paddle_z(self.side),
        ));
    }

    pub fn sync(&self, scene: &mut Scene) {
        if let Some(node) = self.node {
            scene.set_translation(node, self.state.position);
        }
    }

    pub fn dispose(&mut self, scene: &mut Scene) {
        if let Some(node) = self.node.take() {
            scene.despawn(node);
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paddle(side: Side) -> (Paddle, GameConfig) {
        let config = GameConfig::new();
        (Paddle::new(side, &config), config)
    }

    #[test]
    fn test_paddles_sit_beyond_their_ends() {
        let (player, config) = paddle(Side::Player);
        let (ai, _) = paddle(Side::Ai);
        assert!(player.state.position.z > config.half_length());
        assert!(ai.state.position.z < -config.half_length());
        assert_eq!(player.state.position.y, config.table_height + config.paddle_hover);
    }

    #[test]
    fn test_set_target_does_not_move() {
        let (mut p, _) = paddle(Side::Player);
        p.set_target_x(0.4);
        assert_eq!(p.state.position.x, 0.0, "Target alone must not move the paddle");
        assert_eq!(p.target_x(), 0.4);
    }

    #[test]
    fn test_update_eases_toward_target() {
        let (mut p, _) = paddle(Side::Player);
        p.set_target_x(0.4);

        let mut last_gap = 0.4;
        for _ in 0..120 {
            p.update(0.016);
            let gap = (0.4 - p.state.position.x).abs();
            assert!(gap <= last_gap, "Gap should shrink monotonically");
            last_gap = gap;
        }
        assert!(last_gap < 0.01, "Paddle should settle near target, gap {last_gap}");
    }

    #[test]
    fn test_single_step_is_lerp() {
        let (mut p, config) = paddle(Side::Ai);
        p.set_target_x(0.5);
        p.update(0.016);
        let expected = 0.5 * config.paddle_lerp * 0.016;
        assert!((p.state.position.x - expected).abs() < 1e-6);
        assert!((p.state.velocity.x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_position_stays_within_bounds() {
        let (mut p, config) = paddle(Side::Player);
        let limit = config.paddle_x_limit();
        for target in [10.0, -10.0, 1e6, -1e6, 0.0, 0.7, -0.7] {
            p.set_target_x(target);
            for _ in 0..50 {
                p.update(0.1);
                assert!(
                    p.state.position.x.abs() <= limit + 1e-6,
                    "x={} exceeded limit {limit} for target {target}",
                    p.state.position.x
                );
            }
        }
    }

    #[test]
    fn test_collision_footprint() {
        let (p, config) = paddle(Side::Player);
        let mut ball = Ball::new(&config);

        ball.state.position = p.state.position + Vec3::new(0.0, config.ball_radius, 0.0);
        assert!(p.check_ball_collision(&ball), "Directly above the face");

        ball.state.position = p.state.position + Vec3::new(0.0, -0.01, 0.0);
        assert!(!p.check_ball_collision(&ball), "Below the face is a miss");

        ball.state.position = p.state.position + Vec3::new(0.0, 0.1, 0.0);
        assert!(!p.check_ball_collision(&ball), "Too high above the face");

        ball.state.position = p.state.position
            + Vec3::new(config.paddle_width / 2.0 + config.ball_radius + 0.01, 0.02, 0.0);
        assert!(!p.check_ball_collision(&ball), "Wide of the paddle");

        ball.state.position = p.state.position
            + Vec3::new(0.0, 0.02, config.paddle_depth / 2.0 + config.ball_radius - 0.01);
        assert!(p.check_ball_collision(&ball), "Inside the depth reach");
    }

    #[test]
    fn test_reset_recenters() {
        let (mut p, config) = paddle(Side::Ai);
        p.set_target_x(0.5);
        for _ in 0..30 {
            p.update(0.016);
        }
        p.reset();
        assert_eq!(p.state.position.x, 0.0);
        assert_eq!(p.target_x(), 0.0);
        assert_eq!(p.state.position.z, config.paddle_z(Side::Ai));
    }

    #[test]
    fn test_spawn_sync_dispose() {
        let config = GameConfig::new();
        let mut scene = Scene::new(&config, 800, 600);
        let before = scene.node_count();
        let mut p = Paddle::spawn(Side::Player, &config, &mut scene);
        assert_eq!(scene.node_count(), before + 1);

        p.set_target_x(0.3);
        p.update(0.05);
        p.sync(&mut scene);
        let node = p.node().unwrap();
        assert_eq!(scene.transform(node).unwrap().translation, p.state.position);

        p.dispose(&mut scene);
        assert_eq!(scene.node_count(), before);
        assert!(p.node().is_none());
    }

    #[test]
    fn test_sides_have_their_own_colors() {
        let config = GameConfig::new();
        let mut scene = Scene::new(&config, 800, 600);
        let player = Paddle::spawn(Side::Player, &config, &mut scene);
        let ai = Paddle::spawn(Side::Ai, &config, &mut scene);

        let color = |p: &Paddle| scene.material(p.node().unwrap()).unwrap().color;
        assert_eq!(color(&player), crate::rgb(0xcc3333), "Player paddle is red");
        assert_eq!(color(&ai), crate::rgb(0x3333cc), "AI paddle is blue");
    }
}
