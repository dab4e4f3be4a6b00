use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Run `on_change` whenever the page layout may have moved the canvas.
pub fn wire_layout_change(window: &web::Window, on_change: impl Fn() + 'static) {
    let on_change: Rc<dyn Fn()> = Rc::new(on_change);
    for event in ["resize", "scroll"] {
        let cb = on_change.clone();
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |_: web::Event| {
            cb();
        }) as Box<dyn FnMut(_)>);
        _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
