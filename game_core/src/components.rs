use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One end of the table. The player defends +Z, the AI defends -Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }

    /// Sign of Z at this side's end of the table.
    pub fn end_sign(self) -> f32 {
        match self {
            Side::Player => 1.0,
            Side::Ai => -1.0,
        }
    }

    /// Side whose half contains the given Z (the net line counts as the AI's).
    pub fn from_z(z: f32) -> Side {
        if z > 0.0 {
            Side::Player
        } else {
            Side::Ai
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("player"),
            Side::Ai => f.write_str("ai"),
        }
    }
}

/// Ball kinematics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Angular velocity; carried for future Magnus effects, not integrated yet.
    pub spin: Vec3,
}

impl BallState {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            spin: Vec3::ZERO,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// True when the ball travels toward the given side's end.
    pub fn is_moving_toward(&self, side: Side) -> bool {
        self.velocity.z * side.end_sign() > 0.0
    }
}

/// Paddle kinematics; only X moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleState {
    pub position: Vec3,
    /// Displacement applied on the last update (derived, not authoritative).
    pub velocity: Vec3,
    pub target_position: Vec3,
}

impl PaddleState {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            target_position: position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Player.opponent(), Side::Ai);
        assert_eq!(Side::Ai.opponent(), Side::Player);
    }

    #[test]
    fn test_side_from_z() {
        assert_eq!(Side::from_z(0.5), Side::Player);
        assert_eq!(Side::from_z(-0.5), Side::Ai);
    }

    #[test]
    fn test_ball_direction() {
        let ball = BallState::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));
        assert!(ball.is_moving_toward(Side::Ai));
        assert!(!ball.is_moving_toward(Side::Player));

        let still = BallState::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        assert!(!still.is_moving_toward(Side::Ai), "No Z motion means no side");
        assert!(!still.is_moving_toward(Side::Player));
    }
}
