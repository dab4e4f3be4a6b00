use crate::input;
use wasm_bindgen::JsCast;
use web_sys as web;

// Escape leaves the running game
pub fn wire_exit_key(window: &web::Window, mut on_exit: impl FnMut() + 'static) {
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        if input::is_exit_key(&ev.key()) {
            on_exit();
            ev.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}
