//! WebGPU client for the table tennis game
//!
//! Renders `game_core`'s scene with wgpu 24.0 ("webgpu" feature) and exposes
//! the match lifecycle to JavaScript.
//! Note: the canvas surface and DOM wiring only exist on wasm32; meshes,
//! uniforms and batching compile everywhere so they can be tested natively.

pub mod camera;
pub mod input;
pub mod mesh;
pub mod renderer;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod logging;

#[cfg(target_arch = "wasm32")]
pub use bindings::*;

#[cfg(target_arch = "wasm32")]
mod bindings {
    use crate::app::{self, to_js, with_app, App};
    use crate::logging;
    use crate::renderer::Renderer;
    use game_core::Difficulty;
    use tracing::info;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    /// Create the renderer on `canvas` and serve the first point.
    ///
    /// Any game already running is disposed first.
    #[wasm_bindgen]
    pub fn start_game(canvas: HtmlCanvasElement, difficulty: String) -> js_sys::Promise {
        wasm_bindgen_futures::future_to_promise(async move {
            logging::init();
            let difficulty: Difficulty = difficulty.parse().map_err(to_js)?;
            app::dispose();

            let renderer = Renderer::new(canvas.clone())
                .await
                .map_err(|e| JsValue::from_str(&e))?;
            let mut game = App::new(canvas, difficulty, renderer)?;
            game.engine.start();
            app::install(game);
            app::request_frame()?;

            info!(%difficulty, "Game started");
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen]
    pub fn pause_game() -> Result<bool, JsValue> {
        with_app(|game| {
            game.cancel_frame();
            game.engine.pause()
        })
    }

    #[wasm_bindgen]
    pub fn resume_game() -> Result<bool, JsValue> {
        let started = with_app(|game| game.engine.start())?;
        if started {
            app::request_frame()?;
        }
        Ok(started)
    }

    /// Zero the scores and serve again, whatever state the match is in.
    #[wasm_bindgen]
    pub fn restart_game() -> Result<bool, JsValue> {
        let playing = with_app(|game| {
            game.cancel_frame();
            game.engine.reset();
            // A reset while playing keeps playing; otherwise serve afresh
            if !game.engine.is_playing() {
                game.engine.start();
            }
            game.engine.is_playing()
        })?;
        if playing {
            app::request_frame()?;
        }
        Ok(playing)
    }

    #[wasm_bindgen]
    pub fn set_difficulty(difficulty: &str) -> Result<(), JsValue> {
        let difficulty: Difficulty = difficulty.parse().map_err(to_js)?;
        with_app(|game| game.engine.set_difficulty(difficulty))
    }

    #[wasm_bindgen]
    pub fn resize_game(width: u32, height: u32) -> Result<(), JsValue> {
        with_app(|game| game.resize(width, height))
    }

    /// Events since the last call, as a JSON array.
    #[wasm_bindgen]
    pub fn take_events() -> Result<String, JsValue> {
        let events = with_app(|game| game.take_events())?;
        serde_json::to_string(&events).map_err(to_js)
    }

    /// Scores, server and lifecycle phase as JSON, for the HUD.
    #[wasm_bindgen]
    pub fn game_state() -> Result<String, JsValue> {
        with_app(|game| {
            let engine = &game.engine;
            serde_json::json!({
                "state": engine.state(),
                "phase": engine.phase(),
                "difficulty": engine.difficulty().as_str(),
                "serve_pending": engine.is_serve_pending(),
            })
            .to_string()
        })
    }

    /// Release the GPU surface and detach every listener.
    #[wasm_bindgen]
    pub fn dispose_game() -> bool {
        app::dispose()
    }
}
