use serde::Serialize;
use wasm_bindgen::JsValue;

/// Hand a serialisable value to JS as a plain object.
pub fn to_js<T: Serialize>(value: &T) -> Option<JsValue> {
    let json = serde_json::to_string(value)
        .map_err(|e| log::error!("[bridge] serialize failed: {}", e))
        .ok()?;
    js_sys::JSON::parse(&json)
        .map_err(|e| log::error!("[bridge] JSON.parse failed: {:?}", e))
        .ok()
}

pub fn call<T: Serialize>(callback: &js_sys::Function, value: &T) {
    let Some(arg) = to_js(value) else {
        return;
    };
    if let Err(e) = callback.call1(&JsValue::NULL, &arg) {
        log::error!("[bridge] callback threw: {:?}", e);
    }
}
