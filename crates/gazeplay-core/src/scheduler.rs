//! Single-threaded task scheduling seam.
//!
//! Every timer, interval and frame callback in the crate goes through a
//! [`Scheduler`]. The browser host maps it onto `setTimeout`, `setInterval`
//! and `requestAnimationFrame`; tests and replays use [`VirtualScheduler`].
//! Components keep their handles in a [`TaskSet`] so that teardown cancels
//! everything they started.

use crate::constants::FRAME_MS;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub trait Scheduler {
    /// Milliseconds on a monotonic clock.
    fn now_ms(&self) -> f64;

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle;

    fn set_interval(&self, period_ms: u32, task: Box<dyn FnMut()>) -> TaskHandle;

    /// Run `task` once before the next frame is presented.
    fn request_frame(&self, task: Box<dyn FnOnce()>) -> TaskHandle;

    /// Cancel a pending task. Unknown, fired or already-cancelled handles are
    /// ignored, and a task may cancel itself from inside its own callback.
    fn cancel(&self, handle: TaskHandle);
}

/// Scoped owner of scheduled tasks; dropping the set cancels what it holds.
pub struct TaskSet {
    scheduler: Rc<dyn Scheduler>,
    handles: Vec<TaskHandle>,
}

impl TaskSet {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            handles: Vec::new(),
        }
    }

    pub fn track(&mut self, handle: TaskHandle) -> TaskHandle {
        self.handles.push(handle);
        handle
    }

    /// Stop tracking a handle whose task already ran to completion.
    pub fn release(&mut self, handle: TaskHandle) {
        self.handles.retain(|h| *h != handle);
    }

    pub fn cancel(&mut self, handle: TaskHandle) {
        self.release(handle);
        self.scheduler.cancel(handle);
    }

    /// Cancel every tracked task. Returns how many were cancelled; a second
    /// call cancels nothing.
    pub fn cancel_all(&mut self) -> usize {
        let handles = std::mem::take(&mut self.handles);
        for h in &handles {
            self.scheduler.cancel(*h);
        }
        handles.len()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for TaskSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

enum Job {
    Once(Box<dyn FnOnce()>),
    Repeat {
        period_ms: u64,
        task: Box<dyn FnMut()>,
    },
}

struct Pending {
    id: u64,
    due_ms: u64,
    job: Job,
}

#[derive(Default)]
struct VirtualState {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Pending>,
    running: Option<u64>,
    running_cancelled: bool,
}

/// Deterministic scheduler with a manual clock.
///
/// Tasks fire in due-time order (ties by creation order) when the clock is
/// moved with [`advance`](Self::advance). Frames are due every [`FRAME_MS`].
#[derive(Default)]
pub struct VirtualScheduler {
    state: RefCell<VirtualState>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Move the clock forward by `ms`, running everything that falls due.
    pub fn advance(&self, ms: u64) {
        let target = self.state.borrow().now_ms + ms;
        loop {
            let next = {
                let mut st = self.state.borrow_mut();
                let idx = st
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due_ms <= target)
                    .min_by_key(|(_, p)| (p.due_ms, p.id))
                    .map(|(i, _)| i);
                match idx {
                    Some(i) => {
                        let p = st.pending.swap_remove(i);
                        st.now_ms = p.due_ms;
                        st.running = Some(p.id);
                        st.running_cancelled = false;
                        Some(p)
                    }
                    None => None,
                }
            };
            let Some(Pending { id, due_ms, job }) = next else {
                break;
            };

            // No borrow is held while the task runs; it may schedule or cancel.
            let requeue = match job {
                Job::Once(task) => {
                    task();
                    None
                }
                Job::Repeat {
                    period_ms,
                    mut task,
                } => {
                    task();
                    Some(Job::Repeat { period_ms, task })
                }
            };

            // A cancelled interval is dropped only after the borrow is released.
            let retired = {
                let mut st = self.state.borrow_mut();
                let cancelled = st.running_cancelled;
                st.running = None;
                st.running_cancelled = false;
                match requeue {
                    Some(Job::Repeat { period_ms, task }) if !cancelled => {
                        st.pending.push(Pending {
                            id,
                            due_ms: due_ms + period_ms,
                            job: Job::Repeat { period_ms, task },
                        });
                        None
                    }
                    other => other,
                }
            };
            drop(retired);
        }
        self.state.borrow_mut().now_ms = target;
    }

    /// Number of tasks still waiting to run.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    fn push(&self, delay_ms: u64, job: Job) -> TaskHandle {
        let mut st = self.state.borrow_mut();
        st.next_id += 1;
        let id = st.next_id;
        let due_ms = st.now_ms + delay_ms;
        st.pending.push(Pending { id, due_ms, job });
        TaskHandle(id)
    }
}

impl Scheduler for VirtualScheduler {
    fn now_ms(&self) -> f64 {
        self.state.borrow().now_ms as f64
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        self.push(delay_ms as u64, Job::Once(task))
    }

    fn set_interval(&self, period_ms: u32, task: Box<dyn FnMut()>) -> TaskHandle {
        let period_ms = (period_ms as u64).max(1);
        self.push(period_ms, Job::Repeat { period_ms, task })
    }

    fn request_frame(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
        self.push(FRAME_MS as u64, Job::Once(task))
    }

    fn cancel(&self, handle: TaskHandle) {
        let removed: Vec<Pending> = {
            let mut st = self.state.borrow_mut();
            if st.running == Some(handle.0) {
                st.running_cancelled = true;
            }
            let (removed, kept): (Vec<Pending>, Vec<Pending>) = std::mem::take(&mut st.pending)
                .into_iter()
                .partition(|p| p.id == handle.0);
            st.pending = kept;
            removed
        };
        drop(removed);
    }
}
