pub mod ai;
pub mod ball;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod fsm;
pub mod input;
pub mod paddle;
pub mod params;
pub mod resources;
pub mod scene;

pub use ai::*;
pub use ball::*;
pub use components::*;
pub use config::*;
pub use engine::*;
pub use events::*;
pub use fsm::*;
pub use input::*;
pub use paddle::*;
pub use params::*;
pub use resources::*;
pub use scene::*;

/// Build an engine with default physics for the given preset and viewport.
pub fn create_engine<S: RenderSurface>(
    difficulty: Difficulty,
    surface: S,
    viewport: (u32, u32),
    seed: u64,
) -> Result<GameEngine<S>, ConfigError> {
    GameEngine::new(GameConfig::default(), difficulty, surface, viewport, seed)
}
