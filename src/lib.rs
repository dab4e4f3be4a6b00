#![cfg(target_arch = "wasm32")]
use gazeplay_core::{
    Arcade, BroadcastTicker, CalibrationEvent, CalibrationMonitor, ConnectionSupervisor, GameEvent,
    GazeBroadcaster, GazeHub, Scene, Scheduler, TrackerConfig,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod bridge;
mod constants;
mod dom;
mod events;
mod input;
mod scheduler;
mod tracker;

use scheduler::BrowserScheduler;
use tracker::WebSocketTransport;

struct App {
    hub: GazeHub,
    supervisor: ConnectionSupervisor,
    arcade: RefCell<Arcade>,
    calibration_sink: Rc<RefCell<Option<js_sys::Function>>>,
    _ticker: BroadcastTicker,
}

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

fn app() -> Result<Rc<App>, JsValue> {
    APP.with(|a| a.borrow().clone())
        .ok_or_else(|| JsValue::from_str("gazeplay is not initialised"))
}

fn with_arcade<R>(f: impl FnOnce(&mut Arcade) -> R) -> Result<R, JsValue> {
    let app = app()?;
    let mut arcade = app
        .arcade
        .try_borrow_mut()
        .map_err(|_| JsValue::from_str("arcade is busy"))?;
    Ok(f(&mut arcade))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("gazeplay-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let search = window
        .location()
        .search()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let params = web::UrlSearchParams::new_with_str(&search).map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let mut config = TrackerConfig::default();
    if let Some(url) = params
        .get(input::TRACKER_QUERY_KEY)
        .and_then(|raw| input::tracker_url(&raw))
    {
        log::info!("[tracker] endpoint overridden to {}", url);
        config.url = url;
    }

    let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler::new(window.clone()));
    let hub = GazeHub::new();
    let broadcaster = GazeBroadcaster::new();
    let ticker = broadcaster.start_ticking(hub.clone(), scheduler.clone());

    let cursor_hub = hub.clone();
    let calibration_sink: Rc<RefCell<Option<js_sys::Function>>> = Rc::default();
    let sink = calibration_sink.clone();
    let mut monitor = CalibrationMonitor::default();
    broadcaster.subscribe(move |frame| {
        dom::move_gaze_cursor(frame);
        if let Some(event) = monitor.poll(&cursor_hub) {
            if event == CalibrationEvent::Complete {
                log::info!("[calibration] tracker ready");
            }
            // cloned out so the callback may replace itself
            let callback = sink.borrow().clone();
            if let Some(callback) = callback {
                bridge::call(&callback, &event);
            }
        }
        Ok(())
    });
    events::wire_pointer_fallback(&window, &hub, scheduler.clone());

    let supervisor = ConnectionSupervisor::new(
        config,
        Box::new(WebSocketTransport::new()),
        scheduler.clone(),
        hub.clone(),
    );
    supervisor.on_state_change(dom::set_status);
    dom::set_status(supervisor.state());

    let app = Rc::new(App {
        hub,
        supervisor: supervisor.clone(),
        arcade: RefCell::new(Arcade::new(scheduler, broadcaster)),
        calibration_sink,
        _ticker: ticker,
    });
    APP.with(|a| *a.borrow_mut() = Some(app));

    events::wire_exit_key(&window, || {
        _ = back_to_menu();
    });
    events::wire_layout_change(&window, || {
        _ = with_arcade(|arcade| arcade.set_origin(dom::canvas_origin()));
    });
    supervisor.start();
    Ok(())
}

#[wasm_bindgen]
pub fn launch_game(name: &str) -> Result<(), JsValue> {
    with_arcade(|arcade| {
        arcade.set_origin(dom::canvas_origin());
        arcade.launch(name).map(|_| ())
    })?
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn back_to_menu() -> Result<bool, JsValue> {
    with_arcade(Arcade::back_to_menu)
}

#[wasm_bindgen]
pub fn set_scene_callback(callback: js_sys::Function) -> Result<(), JsValue> {
    with_arcade(|arcade| arcade.on_scene(Rc::new(move |scene: &Scene| bridge::call(&callback, scene))))
}

#[wasm_bindgen]
pub fn set_event_callback(callback: js_sys::Function) -> Result<(), JsValue> {
    with_arcade(|arcade| arcade.on_event(Rc::new(move |event: &GameEvent| bridge::call(&callback, event))))
}

/// Receives `{type: "progress", percent}` while the tracker calibrates and
/// `{type: "complete"}` once it starts tracking.
#[wasm_bindgen]
pub fn set_calibration_callback(callback: js_sys::Function) -> Result<(), JsValue> {
    *app()?.calibration_sink.borrow_mut() = Some(callback);
    Ok(())
}

#[wasm_bindgen]
pub fn connection_state() -> Result<JsValue, JsValue> {
    let state = app()?.supervisor.state();
    Ok(bridge::to_js(&state).unwrap_or(JsValue::NULL))
}

#[wasm_bindgen]
pub fn calibration_percent() -> Result<f64, JsValue> {
    Ok(app()?.hub.calibration().percent())
}
