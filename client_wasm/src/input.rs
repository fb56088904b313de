//! Pointer input handling
//!
//! Mouse and touch events on the canvas collapse into one drag gesture
//! measured along the horizontal axis.

/// Canvas events forwarded to the engine's input controller
pub const POINTER_EVENTS: [&str; 8] = [
    "mousedown",
    "mousemove",
    "mouseup",
    "mouseleave",
    "touchstart",
    "touchmove",
    "touchend",
    "touchcancel",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Map a DOM event type to its drag phase
pub fn phase_for(event_type: &str) -> Option<PointerPhase> {
    match event_type {
        "mousedown" | "touchstart" => Some(PointerPhase::Down),
        "mousemove" | "touchmove" => Some(PointerPhase::Move),
        "mouseup" | "mouseleave" | "touchend" | "touchcancel" => Some(PointerPhase::Up),
        _ => None,
    }
}

/// Whether the browser default (scrolling, zooming) must be suppressed
pub fn is_touch(event_type: &str) -> bool {
    event_type.starts_with("touch")
}

/// Extract the horizontal client coordinate from a mouse or touch event
#[cfg(target_arch = "wasm32")]
pub fn client_x(event: &web_sys::Event) -> Option<f32> {
    use wasm_bindgen::JsCast;

    if let Some(touch) = event.dyn_ref::<web_sys::TouchEvent>() {
        return touch
            .touches()
            .get(0)
            .or_else(|| touch.changed_touches().get(0))
            .map(|t| t.client_x() as f32);
    }
    event
        .dyn_ref::<web_sys::MouseEvent>()
        .map(|mouse| mouse.client_x() as f32)
}
