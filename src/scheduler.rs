use gazeplay_core::{Scheduler, TaskHandle};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

enum Slot {
    Timeout(i32, Closure<dyn FnMut()>),
    Interval(i32, Closure<dyn FnMut()>),
    Frame(i32, Closure<dyn FnMut()>),
}

type Slots = Rc<RefCell<HashMap<u64, Slot>>>;

/// `Scheduler` over `setTimeout`, `setInterval` and `requestAnimationFrame`.
///
/// A JS closure may not be dropped while it is running, so finished and
/// cancelled closures are released from a microtask instead.
pub struct BrowserScheduler {
    window: web::Window,
    slots: Slots,
    next_id: Cell<u64>,
}

impl BrowserScheduler {
    pub fn new(window: web::Window) -> Self {
        Self {
            window,
            slots: Rc::default(),
            next_id: Cell::new(0),
        }
    }

    fn next_handle(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn one_shot(slots: Weak<RefCell<HashMap<u64, Slot>>>, id: u64, task: Box<dyn FnOnce()>) -> Closure<dyn FnMut()> {
        let mut task = Some(task);
        Closure::wrap(Box::new(move || {
            if let Some(slots) = slots.upgrade() {
                let done = slots.borrow_mut().remove(&id);
                retire(done);
            }
            if let Some(task) = task.take() {
                task();
            }
        }) as Box<dyn FnMut()>)
    }
}

fn retire(slot: Option<Slot>) {
    if let Some(slot) = slot {
        spawn_local(async move {
            drop(slot);
        });
    }
}

impl Scheduler for BrowserScheduler {
    fn now_ms(&self) -> f64 {
        instant::now()
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        let id = self.next_handle();
        let closure = Self::one_shot(Rc::downgrade(&self.slots), id, task);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay_ms as i32,
            ) {
            Ok(js_id) => {
                self.slots.borrow_mut().insert(id, Slot::Timeout(js_id, closure));
            }
            Err(e) => log::error!("[scheduler] setTimeout failed: {:?}", e),
        }
        TaskHandle::from_raw(id)
    }

    fn set_interval(&self, period_ms: u32, mut task: Box<dyn FnMut()>) -> TaskHandle {
        let id = self.next_handle();
        let closure = Closure::wrap(Box::new(move || task()) as Box<dyn FnMut()>);
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms as i32,
            ) {
            Ok(js_id) => {
                self.slots.borrow_mut().insert(id, Slot::Interval(js_id, closure));
            }
            Err(e) => log::error!("[scheduler] setInterval failed: {:?}", e),
        }
        TaskHandle::from_raw(id)
    }

    fn request_frame(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
        let id = self.next_handle();
        let closure = Self::one_shot(Rc::downgrade(&self.slots), id, task);
        match self.window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(js_id) => {
                self.slots.borrow_mut().insert(id, Slot::Frame(js_id, closure));
            }
            Err(e) => log::error!("[scheduler] requestAnimationFrame failed: {:?}", e),
        }
        TaskHandle::from_raw(id)
    }

    fn cancel(&self, handle: TaskHandle) {
        let slot = self.slots.borrow_mut().remove(&handle.raw());
        match &slot {
            Some(Slot::Timeout(js_id, _)) => self.window.clear_timeout_with_handle(*js_id),
            Some(Slot::Interval(js_id, _)) => self.window.clear_interval_with_handle(*js_id),
            Some(Slot::Frame(js_id, _)) => {
                _ = self.window.cancel_animation_frame(*js_id);
            }
            None => {}
        }
        retire(slot);
    }
}
