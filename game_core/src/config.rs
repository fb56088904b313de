use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Params, Side};

/// Why a configuration was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A length, speed or duration that must be strictly positive is not.
    NonPositive { field: &'static str, value: f32 },
    /// A ratio fell outside its allowed range.
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    /// The paddle cannot fit between the table edges.
    PaddleTooWide { paddle_width: f32, table_width: f32 },
    /// Difficulty name not one of `easy`, `medium`, `hard`.
    UnknownDifficulty(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} must be within [{min}, {max}], got {value}"),
            ConfigError::PaddleTooWide {
                paddle_width,
                table_width,
            } => write!(
                f,
                "paddle width {paddle_width} does not fit on a table {table_width} wide"
            ),
            ConfigError::UnknownDifficulty(name) => write!(f, "unknown difficulty '{name}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn within(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub table_width: f32,
    pub table_length: f32,
    pub table_height: f32,
    pub ball_radius: f32,
    pub paddle_width: f32,
    pub paddle_depth: f32,
    pub paddle_thickness: f32,
    pub gravity: f32,
    pub gravity_scale: f32,
    pub bounce_factor: f32,
    pub table_friction: f32,
    pub serve_height: f32,
    pub serve_speed_up: f32,
    pub serve_speed_forward: f32,
    pub serve_delay: f32,
    pub hit_damping: f32,
    pub hit_angle_gain: f32,
    pub hit_lift: f32,
    pub hit_lift_retain: f32,
    pub ball_speed_max: f32,
    pub grace_period: f32,
    pub out_margin: f32,
    pub win_score: u32,
    pub paddle_lerp: f32,
    pub paddle_standoff: f32,
    pub paddle_hover: f32,
    pub contact_band: f32,
    pub input_sensitivity: f32,
    pub ai_error_spread: f32,
    pub max_dt: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            table_width: Params::TABLE_WIDTH,
            table_length: Params::TABLE_LENGTH,
            table_height: Params::TABLE_HEIGHT,
            ball_radius: Params::BALL_RADIUS,
            paddle_width: Params::PADDLE_WIDTH,
            paddle_depth: Params::PADDLE_DEPTH,
            paddle_thickness: Params::PADDLE_THICKNESS,
            gravity: Params::GRAVITY,
            gravity_scale: Params::GRAVITY_SCALE,
            bounce_factor: Params::BOUNCE_FACTOR,
            table_friction: Params::TABLE_FRICTION,
            serve_height: Params::SERVE_HEIGHT,
            serve_speed_up: Params::SERVE_SPEED_UP,
            serve_speed_forward: Params::SERVE_SPEED_FORWARD,
            serve_delay: Params::SERVE_DELAY,
            hit_damping: Params::HIT_DAMPING,
            hit_angle_gain: Params::HIT_ANGLE_GAIN,
            hit_lift: Params::HIT_LIFT,
            hit_lift_retain: Params::HIT_LIFT_RETAIN,
            ball_speed_max: Params::BALL_SPEED_MAX,
            grace_period: Params::GRACE_PERIOD,
            out_margin: Params::OUT_MARGIN,
            win_score: Params::WIN_SCORE,
            paddle_lerp: Params::PADDLE_LERP,
            paddle_standoff: Params::PADDLE_STANDOFF,
            paddle_hover: Params::PADDLE_HOVER,
            contact_band: Params::CONTACT_BAND,
            input_sensitivity: Params::INPUT_SENSITIVITY,
            ai_error_spread: Params::AI_ERROR_SPREAD,
            max_dt: Params::MAX_DT,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every field once; the engine refuses configs that fail this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("table_width", self.table_width)?;
        positive("table_length", self.table_length)?;
        positive("table_height", self.table_height)?;
        positive("ball_radius", self.ball_radius)?;
        positive("paddle_width", self.paddle_width)?;
        positive("paddle_depth", self.paddle_depth)?;
        positive("paddle_thickness", self.paddle_thickness)?;
        positive("gravity", self.gravity)?;
        positive("ball_speed_max", self.ball_speed_max)?;
        positive("paddle_lerp", self.paddle_lerp)?;
        positive("max_dt", self.max_dt)?;
        positive("grace_period", self.grace_period)?;
        positive("serve_delay", self.serve_delay)?;
        within("gravity_scale", self.gravity_scale, 0.0, 1.0)?;
        within("bounce_factor", self.bounce_factor, 0.0, 1.0)?;
        within("table_friction", self.table_friction, 0.0, 1.0)?;
        // A damping of 1 or more would let every return speed the ball up.
        within("hit_damping", self.hit_damping, 0.0, 0.999)?;
        within("hit_lift_retain", self.hit_lift_retain, 0.0, 1.0)?;
        within("ai_error_spread", self.ai_error_spread, 0.0, self.table_width)?;
        if self.win_score == 0 {
            return Err(ConfigError::NonPositive {
                field: "win_score",
                value: 0.0,
            });
        }
        if self.paddle_width >= self.table_width {
            return Err(ConfigError::PaddleTooWide {
                paddle_width: self.paddle_width,
                table_width: self.table_width,
            });
        }
        Ok(())
    }

    pub fn half_width(&self) -> f32 {
        self.table_width / 2.0
    }

    pub fn half_length(&self) -> f32 {
        self.table_length / 2.0
    }

    /// Largest |x| a paddle center may reach.
    pub fn paddle_x_limit(&self) -> f32 {
        self.half_width() - self.paddle_width / 2.0
    }

    /// Clamp paddle X to the table edges
    pub fn clamp_paddle_x(&self, x: f32) -> f32 {
        let limit = self.paddle_x_limit();
        x.clamp(-limit, limit)
    }

    /// Z of a paddle plane: player beyond +Z end, AI beyond -Z end.
    pub fn paddle_z(&self, side: Side) -> f32 {
        side.end_sign() * (self.half_length() + self.paddle_standoff)
    }

    /// Paddle plane height
    pub fn paddle_y(&self) -> f32 {
        self.table_height + self.paddle_hover
    }
}

/// AI difficulty preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn ai_config(self) -> AiConfig {
        match self {
            Difficulty::Easy => AiConfig {
                reaction_time: 0.4,
                accuracy: 0.5,
                speed: 2.0,
            },
            Difficulty::Medium => AiConfig {
                reaction_time: 0.2,
                accuracy: 0.75,
                speed: 4.0,
            },
            Difficulty::Hard => AiConfig {
                reaction_time: 0.1,
                accuracy: 0.95,
                speed: 7.0,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opponent behavior knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Seconds between re-samples of the predicted interception point.
    pub reaction_time: f32,
    /// 0..=1, where 1 means no prediction noise.
    pub accuracy: f32,
    /// Advisory responsiveness multiplier, kept for hosts that display it.
    pub speed: f32,
}

impl AiConfig {
    pub fn new(reaction_time: f32, accuracy: f32, speed: f32) -> Result<Self, ConfigError> {
        if reaction_time.is_nan() || reaction_time < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "reaction_time",
                value: reaction_time,
                min: 0.0,
                max: f32::MAX,
            });
        }
        within("accuracy", accuracy, 0.0, 1.0)?;
        positive("speed", speed)?;
        Ok(Self {
            reaction_time,
            accuracy,
            speed,
        })
    }
}

impl From<Difficulty> for AiConfig {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.ai_config()
    }
}
