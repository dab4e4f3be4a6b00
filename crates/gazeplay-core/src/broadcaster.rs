//! Fixed-cadence fan-out of gaze frames to subscribers.

use crate::constants::TICK_MS;
use crate::hub::GazeHub;
use crate::sample::GazeFrame;
use crate::scheduler::{Scheduler, TaskSet};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

type Handler = Rc<RefCell<dyn FnMut(&GazeFrame) -> anyhow::Result<()>>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(SubscriptionHandle, Handler)>,
}

impl Registry {
    fn contains(&self, handle: SubscriptionHandle) -> bool {
        self.handlers.iter().any(|(h, _)| *h == handle)
    }
}

/// Outcome of one delivery round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Clone, Default)]
pub struct GazeBroadcaster {
    registry: Rc<RefCell<Registry>>,
}

impl GazeBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionHandle
    where
        F: FnMut(&GazeFrame) -> anyhow::Result<()> + 'static,
    {
        let mut reg = self.registry.borrow_mut();
        reg.next_id += 1;
        let handle = SubscriptionHandle(reg.next_id);
        let handler: Handler = Rc::new(RefCell::new(handler));
        reg.handlers.push((handle, handler));
        handle
    }

    /// Returns false if the handle was not (or no longer) registered.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let removed = {
            let mut reg = self.registry.borrow_mut();
            reg.handlers
                .iter()
                .position(|(h, _)| *h == handle)
                .map(|i| reg.handlers.remove(i))
        };
        removed.is_some()
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.borrow().handlers.is_empty()
    }

    /// Deliver `frame` to every subscriber in subscription order.
    ///
    /// Handlers may subscribe or unsubscribe while being called; a handler
    /// removed earlier in the round is skipped, one added during the round
    /// first runs on the next. A failing handler is logged and stays
    /// registered.
    pub fn publish(&self, frame: &GazeFrame) -> DeliveryReport {
        let snapshot: Vec<(SubscriptionHandle, Handler)> = self.registry.borrow().handlers.clone();
        let mut report = DeliveryReport::default();

        for (handle, handler) in snapshot {
            if !self.registry.borrow().contains(handle) {
                continue;
            }
            let Ok(mut call) = handler.try_borrow_mut() else {
                log::warn!("[broadcast] subscriber {:?} re-entered, skipped", handle);
                continue;
            };
            match (&mut *call)(frame) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    log::error!("[broadcast] subscriber {:?} failed: {:#}", handle, e);
                }
            }
        }
        report
    }

    /// Publish the hub's frame every [`TICK_MS`] until the ticker is dropped.
    pub fn start_ticking(&self, hub: GazeHub, scheduler: Rc<dyn Scheduler>) -> BroadcastTicker {
        let broadcaster = self.clone();
        let clock: Weak<dyn Scheduler> = Rc::downgrade(&scheduler);
        let mut tasks = TaskSet::new(scheduler.clone());
        let handle = scheduler.set_interval(
            TICK_MS,
            Box::new(move || {
                let Some(clock) = clock.upgrade() else {
                    return;
                };
                let frame = hub.frame(clock.now_ms());
                broadcaster.publish(&frame);
            }),
        );
        tasks.track(handle);
        log::debug!("[broadcast] ticking every {} ms", TICK_MS);
        BroadcastTicker { tasks }
    }
}

/// Owns the broadcast interval; dropping it stops the ticks.
pub struct BroadcastTicker {
    tasks: TaskSet,
}

impl BroadcastTicker {
    pub fn stop(&mut self) {
        if self.tasks.cancel_all() > 0 {
            log::debug!("[broadcast] ticking stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }
}
