//! Browser host: owns the engine, wires canvas pointer events and drives
//! the requestAnimationFrame loop.

use std::cell::RefCell;
use std::rc::Rc;

use game_core::{Difficulty, GameConfig, GameEngine, GameEvent};
use tracing::{debug, trace};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, Window};

use crate::input::{self, PointerPhase, POINTER_EVENTS};
use crate::renderer::Renderer;

type FrameCallback = Closure<dyn FnMut(f64)>;
type PointerCallback = Closure<dyn FnMut(Event)>;

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    static FRAME: RefCell<Option<FrameCallback>> = const { RefCell::new(None) };
}

pub struct App {
    pub engine: GameEngine<Renderer>,
    canvas: HtmlCanvasElement,
    events: Rc<RefCell<Vec<GameEvent>>>,
    pointer_listeners: Vec<(&'static str, PointerCallback)>,
    frame_handle: Option<i32>,
    last_frame: Option<f64>,
}

pub fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window"))
}

impl App {
    pub fn new(
        canvas: HtmlCanvasElement,
        difficulty: Difficulty,
        renderer: Renderer,
    ) -> Result<Self, JsValue> {
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        let viewport = (canvas.width().max(1), canvas.height().max(1));
        let mut engine =
            GameEngine::new(GameConfig::default(), difficulty, renderer, viewport, seed)
                .map_err(to_js)?;

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.subscribe(Box::new(move |event: &GameEvent| {
            sink.borrow_mut().push(*event);
        }));

        let mut app = Self {
            engine,
            canvas,
            events,
            pointer_listeners: Vec::with_capacity(POINTER_EVENTS.len()),
            frame_handle: None,
            last_frame: None,
        };
        app.attach_pointer_listeners()?;
        Ok(app)
    }

    fn attach_pointer_listeners(&mut self) -> Result<(), JsValue> {
        for name in POINTER_EVENTS {
            let callback = PointerCallback::new(move |event: Event| on_pointer(name, &event));
            self.canvas
                .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())?;
            self.pointer_listeners.push((name, callback));
        }
        Ok(())
    }

    fn detach_pointer_listeners(&mut self) {
        for (name, callback) in self.pointer_listeners.drain(..) {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        }
    }

    /// Advance one animation frame. Returns whether another should follow.
    fn step(&mut self, now: f64) -> bool {
        self.frame_handle = None;
        let dt = self
            .last_frame
            .map(|last| ((now - last) / 1000.0) as f32)
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        self.engine.tick(dt);

        if self.engine.is_playing() {
            true
        } else {
            trace!("Frame loop stopped");
            self.last_frame = None;
            false
        }
    }

    pub fn cancel_frame(&mut self) {
        if let Some(handle) = self.frame_handle.take() {
            if let Ok(window) = window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
        self.last_frame = None;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width.max(1));
        self.canvas.set_height(height.max(1));
        self.engine.resize(width, height);
        if !self.engine.is_playing() {
            self.engine.render();
        }
    }

    /// Drain the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn dispose(&mut self) {
        self.cancel_frame();
        self.detach_pointer_listeners();
        self.engine.dispose();
        self.events.borrow_mut().clear();
    }
}

/// Run `f` against the live app.
pub fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Result<R, JsValue> {
    APP.with(|cell| {
        let mut slot = cell
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Game is busy"))?;
        slot.as_mut()
            .map(f)
            .ok_or_else(|| JsValue::from_str("Game not initialized"))
    })
}

/// Install `app` as the live game, disposing any previous one.
pub fn install(app: App) {
    dispose();
    APP.with(|cell| *cell.borrow_mut() = Some(app));
}

/// Tear down the live game, if any. Returns whether one existed.
pub fn dispose() -> bool {
    let previous = APP.with(|cell| cell.try_borrow_mut().ok().and_then(|mut slot| slot.take()));
    let Some(mut app) = previous else {
        return false;
    };
    app.dispose();
    FRAME.with(|cell| cell.borrow_mut().take());
    debug!("Game disposed");
    true
}

/// Schedule the next animation frame unless one is already pending.
pub fn request_frame() -> Result<(), JsValue> {
    if with_app(|app| app.frame_handle.is_some())? {
        return Ok(());
    }
    let window = window()?;
    let handle = FRAME.with(|cell| {
        let mut slot = cell.borrow_mut();
        let callback = slot.get_or_insert_with(|| FrameCallback::new(on_frame));
        window.request_animation_frame(callback.as_ref().unchecked_ref())
    })?;
    with_app(|app| app.frame_handle = Some(handle))
}

fn on_frame(now: f64) {
    if with_app(|app| app.step(now)).unwrap_or(false) {
        let _ = request_frame();
    }
}

fn on_pointer(name: &str, event: &Event) {
    let Some(phase) = input::phase_for(name) else {
        return;
    };
    if input::is_touch(name) {
        event.prevent_default();
    }
    let x = input::client_x(event);
    let _ = with_app(|app| match (phase, x) {
        (PointerPhase::Down, Some(x)) => app.engine.pointer_down(x),
        (PointerPhase::Move, Some(x)) => app.engine.pointer_move(x),
        (PointerPhase::Up, _) => app.engine.pointer_up(),
        _ => {}
    });
}
