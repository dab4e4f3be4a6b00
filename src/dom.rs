use crate::constants::{
    CANVAS_ID, FIXATING_CLASS, GAZE_CURSOR_ID, STATUS_BASE_CLASS, STATUS_INDICATOR_ID, STATUS_TEXT_ID,
};
use crate::input;
use gazeplay_core::{ConnectionState, GazeFrame};
use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn set_status(state: ConnectionState) {
    let Some(doc) = window_document() else {
        return;
    };
    if let Some(indicator) = doc.get_element_by_id(STATUS_INDICATOR_ID) {
        indicator.set_class_name(STATUS_BASE_CLASS);
        if let Some(class) = input::status_class(state) {
            _ = indicator.class_list().add_1(class);
        }
    }
    if let Some(text) = doc.get_element_by_id(STATUS_TEXT_ID) {
        text.set_text_content(Some(state.label()));
    }
}

/// Follow the broadcast gaze with the on-page cursor, if the page has one.
pub fn move_gaze_cursor(frame: &GazeFrame) {
    let Some(cursor) = window_document()
        .and_then(|d| d.get_element_by_id(GAZE_CURSOR_ID))
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
    else {
        return;
    };
    let style = cursor.style();
    _ = style.set_property("left", &format!("{}px", frame.x));
    _ = style.set_property("top", &format!("{}px", frame.y));
    _ = if frame.is_fixating() {
        cursor.class_list().add_1(FIXATING_CLASS)
    } else {
        cursor.class_list().remove_1(FIXATING_CLASS)
    };
}

/// Page-space top-left of the game canvas.
pub fn canvas_origin() -> Vec2 {
    window_document()
        .and_then(|d| d.get_element_by_id(CANVAS_ID))
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            Vec2::new(rect.left() as f32, rect.top() as f32)
        })
        .unwrap_or(Vec2::ZERO)
}
