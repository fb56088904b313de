/// Game tuning parameters for table tennis.
///
/// Physical dimensions follow ITTF proportions in meters. Gravity and ball
/// speeds are damped so rallies stay playable on a phone screen.
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Table
    pub const TABLE_WIDTH: f32 = 1.525;
    pub const TABLE_LENGTH: f32 = 2.74;
    pub const TABLE_HEIGHT: f32 = 0.76;

    // Ball
    pub const BALL_RADIUS: f32 = 0.02;
    pub const GRAVITY: f32 = 9.8;
    pub const GRAVITY_SCALE: f32 = 0.7; // fraction of g actually applied
    pub const BOUNCE_FACTOR: f32 = 0.7;
    pub const TABLE_FRICTION: f32 = 0.95; // horizontal damping per table bounce

    // Serve
    pub const SERVE_HEIGHT: f32 = 0.3; // above the table surface
    pub const SERVE_SPEED_UP: f32 = 2.5;
    pub const SERVE_SPEED_FORWARD: f32 = 1.8;
    pub const SERVE_DELAY: f32 = 1.0; // seconds between a point and the next serve

    // Paddle response
    pub const HIT_DAMPING: f32 = 0.95; // < 1 so rallies never accelerate
    pub const HIT_ANGLE_GAIN: f32 = 3.0; // x velocity per meter of off-center contact
    pub const HIT_LIFT: f32 = 2.0;
    pub const HIT_LIFT_RETAIN: f32 = 0.8;
    pub const BALL_SPEED_MAX: f32 = 5.0;

    // Scoring
    pub const GRACE_PERIOD: f32 = 0.5; // seconds after a bounce/hit with no out-of-bounds
    pub const OUT_MARGIN: f32 = 0.2; // how far below the table a dead ball must fall
    pub const WIN_SCORE: u32 = 11;

    // Paddle
    pub const PADDLE_WIDTH: f32 = 0.15;
    pub const PADDLE_DEPTH: f32 = 0.25;
    pub const PADDLE_THICKNESS: f32 = 0.015;
    pub const PADDLE_LERP: f32 = 8.0;
    pub const PADDLE_STANDOFF: f32 = 0.3; // distance beyond the table end
    pub const PADDLE_HOVER: f32 = 0.01; // height above the table plane
    pub const CONTACT_BAND: f32 = 0.02; // extra vertical reach above the ball radius

    // Input
    pub const INPUT_SENSITIVITY: f32 = 0.003; // meters per pixel of drag

    // AI
    pub const AI_ERROR_SPREAD: f32 = 0.4;

    // Loop
    pub const MAX_DT: f32 = 0.1; // Clamp to prevent large jumps
}
