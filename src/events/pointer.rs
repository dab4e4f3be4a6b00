use gazeplay_core::{GazeHub, Scheduler};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Feed window pointer events into the hub's fallback source. The hub only
/// turns them into frames while the tracker stream is down.
pub fn wire_pointer_fallback(window: &web::Window, hub: &GazeHub, clock: Rc<dyn Scheduler>) {
    wire_pointermove(window, hub);
    wire_pointerdown(window, hub, clock);
    wire_pointerup(window, hub);
}

fn wire_pointermove(window: &web::Window, hub: &GazeHub) {
    let hub = hub.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        hub.pointer_move(ev.client_x() as f32, ev.client_y() as f32);
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerdown(window: &web::Window, hub: &GazeHub, clock: Rc<dyn Scheduler>) {
    let hub = hub.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        hub.pointer_move(ev.client_x() as f32, ev.client_y() as f32);
        hub.pointer_down(clock.now_ms());
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerup(window: &web::Window, hub: &GazeHub) {
    let hub = hub.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |_: web::PointerEvent| {
        hub.pointer_up();
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
    closure.forget();
}
