//! Game engine: owns the entities, runs the per-tick update, keeps score
//! and drives the lifecycle.

use tracing::{debug, info, warn};

use crate::{
    AiController, Ball, ConfigError, Difficulty, EngineAction, EngineFsm, EngineState, GameConfig,
    GameEvent, GameListener, GameRng, GameState, InputController, ListenerId, Listeners, Paddle,
    RenderSurface, Scene, ServeTimer, Side, Time,
};

/// Table tennis match against the AI, rendered to `S`
pub struct GameEngine<S: RenderSurface> {
    config: GameConfig,
    difficulty: Difficulty,
    state: GameState,
    fsm: EngineFsm,
    time: Time,
    rng: GameRng,
    scene: Scene,
    surface: S,
    ball: Ball,
    player: Paddle,
    opponent: Paddle,
    ai: AiController,
    input: InputController,
    serve_timer: ServeTimer,
    listeners: Listeners,
}

impl<S: RenderSurface> GameEngine<S> {
    /// Validate `config`, build the scene and place the entities.
    ///
    /// The engine starts idle; call [`GameEngine::start`] to serve.
    pub fn new(
        config: GameConfig,
        difficulty: Difficulty,
        mut surface: S,
        (width, height): (u32, u32),
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut scene = Scene::new(&config, width, height);
        surface.resize(width, height);
        let ball = Ball::spawn(&config, &mut scene);
        let player = Paddle::spawn(Side::Player, &config, &mut scene);
        let opponent = Paddle::spawn(Side::Ai, &config, &mut scene);

        debug!(%difficulty, width, height, seed, "Engine created");

        Ok(Self {
            ai: AiController::new(difficulty.ai_config(), &config),
            input: InputController::new(&config),
            config,
            difficulty,
            state: GameState::new(),
            fsm: EngineFsm::new(),
            time: Time::default(),
            rng: GameRng::new(seed),
            scene,
            surface,
            ball,
            player,
            opponent,
            serve_timer: ServeTimer::new(),
            listeners: Listeners::new(),
        })
    }

    fn apply(&mut self, action: EngineAction) -> bool {
        let result = self.fsm.transition(action);
        if result.success {
            debug!(
                from = ?result.from_state,
                to = ?result.to_state,
                ?action,
                "Engine transition"
            );
        } else {
            warn!(state = ?result.from_state, ?action, "Rejected engine action");
        }
        result.success
    }

    /// Begin or resume play with a fresh serve from the current server.
    ///
    /// Rejected after the match has ended until [`GameEngine::reset`].
    pub fn start(&mut self) -> bool {
        if !self.apply(EngineAction::Start) {
            return false;
        }
        self.state.is_playing = true;
        self.serve_timer.cancel();
        self.serve();
        true
    }

    /// Stop ticking; scores and positions are kept.
    pub fn pause(&mut self) -> bool {
        if !self.apply(EngineAction::Pause) {
            return false;
        }
        self.state.is_playing = false;
        self.serve_timer.cancel();
        true
    }

    /// Zero the scores, give the serve to the player and re-rack the ball.
    ///
    /// Play continues if the engine was playing; an ended match returns to idle.
    pub fn reset(&mut self) -> bool {
        if !self.apply(EngineAction::Reset) {
            return false;
        }
        self.serve_timer.cancel();
        self.state.reset_scores();
        self.ball.reset(Side::Player);
        self.player.reset();
        self.opponent.reset();
        self.ai.reset();
        self.input.pointer_up();
        self.sync_scene();
        self.emit(GameEvent::ScoreUpdate {
            player: 0,
            ai: 0,
        });
        // Idle and paused engines serve on the next start instead
        if self.fsm.is_playing() {
            debug!(side = %Side::Player, "Serve");
            self.emit(GameEvent::Served { side: Side::Player });
        }
        true
    }

    /// Release meshes, GPU resources and listeners. Every later call is a no-op.
    pub fn dispose(&mut self) {
        if !self.apply(EngineAction::Dispose) {
            return;
        }
        self.state.is_playing = false;
        self.serve_timer.cancel();
        self.ball.dispose(&mut self.scene);
        self.player.dispose(&mut self.scene);
        self.opponent.dispose(&mut self.scene);
        self.scene.clear();
        self.surface.release();
        let listeners = self.listeners.len();
        self.listeners.clear();
        info!(listeners, "Engine disposed");
    }

    /// Advance one frame. Ignored unless playing.
    pub fn tick(&mut self, frame_dt: f32) {
        if !self.fsm.is_playing() {
            return;
        }

        // Clamp dt to prevent large jumps; NaN collapses to zero.
        let dt = frame_dt.max(0.0).min(self.config.max_dt);
        self.time.advance(dt);

        if self.serve_timer.update(dt) {
            self.serve();
        }

        if let Some(contact) = self.ball.update(dt) {
            self.emit(GameEvent::Bounce { contact });
        }

        self.player.update(dt);

        self.ai
            .update(&self.ball, &mut self.opponent, dt, &mut self.rng);
        self.opponent.update(dt);

        self.check_collisions();

        // The dead ball keeps falling until the next serve; score it once.
        if !self.serve_timer.is_pending() {
            self.check_scoring();
        }

        self.sync_scene();
        self.render();
    }

    fn serve(&mut self) {
        let side = self.state.serving;
        self.ball.reset(side);
        debug!(%side, "Serve");
        self.emit(GameEvent::Served { side });
    }

    fn check_collisions(&mut self) {
        if self.ball.state.is_moving_toward(Side::Player)
            && self.player.check_ball_collision(&self.ball)
        {
            self.ball.hit_by_paddle(self.player.state.position);
            self.emit(GameEvent::PaddleHit { side: Side::Player });
        }

        if self.ball.state.is_moving_toward(Side::Ai)
            && self.opponent.check_ball_collision(&self.ball)
        {
            self.ball.hit_by_paddle(self.opponent.state.position);
            self.emit(GameEvent::PaddleHit { side: Side::Ai });
        }
    }

    fn check_scoring(&mut self) {
        if !self.ball.is_out_of_bounds() {
            return;
        }

        // Past the player's end means the AI won the rally, and vice versa.
        let scorer = Side::from_z(self.ball.state.position.z).opponent();
        self.state.award_point(scorer);
        info!(
            %scorer,
            player = self.state.player_score,
            ai = self.state.ai_score,
            "Point"
        );
        self.emit(GameEvent::ScoreUpdate {
            player: self.state.player_score,
            ai: self.state.ai_score,
        });

        match self.state.has_winner(self.config.win_score) {
            Some(winner) => self.end_game(winner),
            None => self.serve_timer.arm(self.config.serve_delay),
        }
    }

    fn end_game(&mut self, winner: Side) {
        self.apply(EngineAction::GameOver);
        self.state.is_playing = false;
        self.serve_timer.cancel();
        info!(
            %winner,
            player = self.state.player_score,
            ai = self.state.ai_score,
            "Game over"
        );
        self.emit(GameEvent::GameEnd { winner });
    }

    fn sync_scene(&mut self) {
        self.ball.sync(&mut self.scene);
        self.player.sync(&mut self.scene);
        self.opponent.sync(&mut self.scene);
    }

    /// Present the current scene; failures are logged and the game goes on.
    pub fn render(&mut self) {
        if self.fsm.is_disposed() {
            return;
        }
        if let Err(err) = self.scene.render(&mut self.surface) {
            warn!(%err, "Frame not presented");
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.listeners.emit(event);
    }

    pub fn subscribe(&mut self, listener: Box<dyn GameListener>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Swap the opponent for a fresh AI with the new preset.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.ai = AiController::new(difficulty.ai_config(), &self.config);
        debug!(%difficulty, "Difficulty changed");
    }

    pub fn pointer_down(&mut self, x: f32) {
        if !self.fsm.is_disposed() {
            self.input.pointer_down(x);
        }
    }

    pub fn pointer_move(&mut self, x: f32) {
        if !self.fsm.is_disposed() {
            self.input.pointer_move(x, &mut self.player, &self.config);
        }
    }

    pub fn pointer_up(&mut self) {
        self.input.pointer_up();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height);
        self.surface.resize(width, height);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> EngineState {
        self.fsm.state()
    }

    pub fn is_playing(&self) -> bool {
        self.fsm.is_playing()
    }

    pub fn is_serve_pending(&self) -> bool {
        self.serve_timer.is_pending()
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    pub fn player_paddle(&self) -> &Paddle {
        &self.player
    }

    pub fn ai_paddle(&self) -> &Paddle {
        &self.opponent
    }

    pub fn ai(&self) -> &AiController {
        &self.ai
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessSurface;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<GameEvent>>>;

    fn engine() -> (GameEngine<HeadlessSurface>, Log) {
        let mut engine = GameEngine::new(
            GameConfig::new(),
            Difficulty::Medium,
            HeadlessSurface::new(),
            (800, 600),
            1,
        )
        .unwrap();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        engine.subscribe(Box::new(move |e: &GameEvent| sink.borrow_mut().push(*e)));
        (engine, log)
    }

    /// Park the ball below the table past the given side's end, falling.
    fn drop_past(engine: &mut GameEngine<HeadlessSurface>, side: Side) {
        let config = engine.config().clone();
        let z = side.end_sign() * (config.half_length() + 0.8);
        let ball = engine.ball_mut();
        ball.state.position = Vec3::new(0.0, config.table_height - 0.5, z);
        ball.state.velocity = Vec3::new(0.0, -1.0, side.end_sign());
    }

    fn scores(log: &Log) -> Vec<(u32, u32)> {
        log.borrow()
            .iter()
            .filter_map(|e| match e {
                GameEvent::ScoreUpdate { player, ai } => Some((*player, *ai)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GameConfig {
            table_width: -1.0,
            ..GameConfig::default()
        };
        let result = GameEngine::new(
            config,
            Difficulty::Easy,
            HeadlessSurface::new(),
            (800, 600),
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_new_engine_is_idle() {
        let (engine, _) = engine();
        assert_eq!(engine.phase(), EngineState::Idle);
        assert!(!engine.state().is_playing);
        assert_eq!(engine.surface().size, (800, 600));
        // 12 static nodes + ball + shadow + 2 paddles
        assert_eq!(engine.scene().node_count(), 16);
    }

    #[test]
    fn test_start_serves_from_player() {
        let (mut engine, log) = engine();
        assert!(engine.start());
        assert!(engine.state().is_playing);
        assert!(engine.ball().state.position.z > 0.0);
        assert!(engine.ball().state.velocity.z < 0.0);
        assert_eq!(log.borrow()[0], GameEvent::Served { side: Side::Player });
    }

    #[test]
    fn test_tick_ignored_when_idle() {
        let (mut engine, _) = engine();
        let before = engine.ball().state;
        engine.tick(0.016);
        assert_eq!(engine.ball().state, before);
        assert_eq!(engine.surface().frames, 0);
    }

    #[test]
    fn test_tick_clamps_dt() {
        let (mut engine, _) = engine();
        engine.start();
        engine.tick(5.0);
        assert_eq!(engine.time().dt, engine.config().max_dt);
        engine.tick(f32::NAN);
        assert_eq!(engine.time().dt, 0.0);
        assert_eq!(engine.surface().frames, 2, "Every tick renders");
    }

    #[test]
    fn test_ball_past_player_end_scores_for_ai() {
        let (mut engine, log) = engine();
        engine.start();
        drop_past(&mut engine, Side::Player);
        engine.tick(0.016);

        assert_eq!(engine.state().ai_score, 1);
        assert_eq!(engine.state().player_score, 0);
        assert_eq!(engine.state().serving, Side::Ai);
        assert_eq!(scores(&log), vec![(0, 1)]);
        assert!(engine.is_serve_pending());
    }

    #[test]
    fn test_ball_past_ai_end_scores_for_player() {
        let (mut engine, _) = engine();
        engine.start();
        drop_past(&mut engine, Side::Ai);
        engine.tick(0.016);
        assert_eq!(engine.state().player_score, 1);
        assert_eq!(engine.state().serving, Side::Player);
    }

    #[test]
    fn test_dead_ball_scores_once() {
        let (mut engine, log) = engine();
        engine.start();
        drop_past(&mut engine, Side::Player);
        for _ in 0..30 {
            engine.tick(0.016);
        }
        assert_eq!(scores(&log), vec![(0, 1)], "Falling ball must not score again");
    }

    #[test]
    fn test_serve_follows_delay() {
        let (mut engine, log) = engine();
        engine.start();
        drop_past(&mut engine, Side::Player);
        engine.tick(0.016);

        let mut elapsed = 0.0;
        while engine.is_serve_pending() {
            engine.tick(0.016);
            elapsed += 0.016;
            assert!(elapsed < 2.0, "Serve never happened");
        }
        assert!(elapsed >= engine.config().serve_delay - 0.02);

        let served: Vec<_> = log
            .borrow()
            .iter()
            .filter(|e| matches!(e, GameEvent::Served { .. }))
            .copied()
            .collect();
        assert_eq!(served.last(), Some(&GameEvent::Served { side: Side::Ai }));
        assert!(engine.ball().state.position.z < 0.0, "AI serves from its half");
    }

    #[test]
    fn test_win_ends_game() {
        let (mut engine, log) = engine();
        engine.start();
        engine.state_mut().player_score = 10;
        drop_past(&mut engine, Side::Ai);
        engine.tick(0.016);

        assert_eq!(engine.state().player_score, 11);
        assert!(!engine.state().is_playing);
        assert_eq!(engine.phase(), EngineState::Ended);
        assert!(!engine.is_serve_pending(), "No serve after the final point");
        assert_eq!(
            log.borrow().last(),
            Some(&GameEvent::GameEnd {
                winner: Side::Player
            })
        );

        assert!(!engine.start(), "Start needs a reset after game end");
        assert!(engine.reset());
        assert_eq!(engine.phase(), EngineState::Idle);
        assert!(engine.start());
    }

    #[test]
    fn test_pause_cancels_pending_serve() {
        let (mut engine, log) = engine();
        engine.start();
        drop_past(&mut engine, Side::Player);
        engine.tick(0.016);
        assert!(engine.pause());
        assert!(!engine.is_serve_pending());

        let before = log.borrow().len();
        for _ in 0..100 {
            engine.tick(0.016);
        }
        assert_eq!(log.borrow().len(), before, "Paused engine is silent");

        assert!(engine.start());
        assert_eq!(
            log.borrow().last(),
            Some(&GameEvent::Served { side: Side::Ai }),
            "Resume serves from the current server"
        );
    }

    #[test]
    fn test_reset_clears_score() {
        let (mut engine, log) = engine();
        engine.start();
        drop_past(&mut engine, Side::Player);
        engine.tick(0.016);
        assert!(engine.reset());

        assert_eq!(engine.state().ai_score, 0);
        assert_eq!(engine.state().serving, Side::Player);
        assert!(!engine.is_serve_pending());
        assert!(engine.is_playing(), "Reset mid-game keeps playing");
        assert_eq!(scores(&log).last(), Some(&(0, 0)));
    }

    #[test]
    fn test_reset_while_playing_announces_serve() {
        let (mut engine, log) = engine();
        engine.start();
        drop_past(&mut engine, Side::Player);
        engine.tick(0.016);
        assert!(engine.reset());
        assert_eq!(
            log.borrow().last(),
            Some(&GameEvent::Served { side: Side::Player })
        );
    }

    #[test]
    fn test_reset_while_paused_defers_serve() {
        let (mut engine, log) = engine();
        engine.start();
        engine.pause();
        assert!(engine.reset());
        assert_eq!(log.borrow().last(), Some(&GameEvent::ScoreUpdate { player: 0, ai: 0 }));
    }

    /// Put the ball just above `side`'s paddle face, travelling along Z at `vz`.
    fn place_on_paddle(engine: &mut GameEngine<HeadlessSurface>, side: Side, vz: f32) {
        let paddle = match side {
            Side::Player => engine.player_paddle().state.position,
            Side::Ai => engine.ai_paddle().state.position,
        };
        let radius = engine.config().ball_radius;
        let ball = engine.ball_mut();
        ball.state.position = paddle + Vec3::new(0.0, radius + 0.005, 0.0);
        ball.state.velocity = Vec3::new(0.0, 0.0, vz);
    }

    fn hits(log: &Log) -> Vec<Side> {
        log.borrow()
            .iter()
            .filter_map(|e| match e {
                GameEvent::PaddleHit { side } => Some(*side),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_player_paddle_returns_incoming_ball() {
        let (mut engine, log) = engine();
        engine.start();
        place_on_paddle(&mut engine, Side::Player, 1.0);
        assert!(!engine.ball().in_grace_period());
        engine.tick(0.016);

        assert_eq!(hits(&log), vec![Side::Player]);
        let v = engine.ball().state.velocity;
        let damping = engine.config().hit_damping;
        assert!((v.z + damping).abs() < 1e-6, "Z reversed and damped, got {}", v.z);
        assert!(v.y > 0.0, "Return is lifted");
        assert!(engine.ball().in_grace_period(), "Hit re-arms the grace window");
    }

    #[test]
    fn test_player_paddle_ignores_outgoing_ball() {
        let (mut engine, log) = engine();
        engine.start();
        place_on_paddle(&mut engine, Side::Player, -1.0);
        engine.tick(0.016);

        assert!(hits(&log).is_empty(), "Ball leaving the player is not hit");
        assert_eq!(engine.ball().state.velocity.z, -1.0);
        assert!(!engine.ball().in_grace_period());
    }

    #[test]
    fn test_ai_paddle_returns_incoming_ball() {
        let (mut engine, log) = engine();
        engine.start();
        place_on_paddle(&mut engine, Side::Ai, -1.0);
        engine.tick(0.016);

        assert_eq!(hits(&log), vec![Side::Ai]);
        let v = engine.ball().state.velocity;
        let damping = engine.config().hit_damping;
        assert!((v.z - damping).abs() < 1e-6, "Z reversed and damped, got {}", v.z);
        assert!(engine.ball().in_grace_period());
    }

    #[test]
    fn test_ai_paddle_ignores_outgoing_ball() {
        let (mut engine, log) = engine();
        engine.start();
        place_on_paddle(&mut engine, Side::Ai, 1.0);
        engine.tick(0.016);

        assert!(hits(&log).is_empty(), "Ball leaving the AI is not hit");
        assert_eq!(engine.ball().state.velocity.z, 1.0);
    }

    #[test]
    fn test_dispose_releases_everything() {
        let (mut engine, log) = engine();
        engine.start();
        engine.dispose();

        assert_eq!(engine.phase(), EngineState::Disposed);
        assert!(engine.surface().released);
        assert_eq!(engine.scene().node_count(), 0);

        let before = log.borrow().len();
        engine.tick(0.016);
        assert!(!engine.start());
        assert!(!engine.reset());
        engine.dispose();
        assert_eq!(log.borrow().len(), before, "Listeners dropped on dispose");
    }

    #[test]
    fn test_render_failure_is_not_fatal() {
        let (mut engine, _) = engine();
        engine.start();
        engine.surface_mut().fail_next = Some(crate::RenderError::SurfaceLost);
        engine.tick(0.016);
        engine.tick(0.016);
        assert_eq!(engine.surface().frames, 1);
        assert!(engine.is_playing());
    }

    #[test]
    fn test_pointer_drag_moves_player_paddle() {
        let (mut engine, _) = engine();
        engine.start();
        engine.pointer_down(100.0);
        engine.pointer_move(200.0);
        engine.pointer_up();
        for _ in 0..60 {
            engine.tick(0.016);
        }
        assert!(engine.player_paddle().state.position.x > 0.2);
    }

    #[test]
    fn test_set_difficulty_rebuilds_ai() {
        let (mut engine, _) = engine();
        engine.set_difficulty(Difficulty::Hard);
        assert_eq!(engine.difficulty(), Difficulty::Hard);
        assert_eq!(engine.ai().config(), Difficulty::Hard.ai_config());
        assert_eq!(engine.ai().target_x(), 0.0);
    }

    #[test]
    fn test_resize_reaches_surface_and_camera() {
        let (mut engine, _) = engine();
        engine.resize(400, 800);
        assert_eq!(engine.surface().size, (400, 800));
        assert!((engine.scene().camera().aspect - 0.5).abs() < 1e-6);
    }
}
