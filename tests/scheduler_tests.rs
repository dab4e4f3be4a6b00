use gazeplay_core::{Scheduler, TaskHandle, TaskSet, VirtualScheduler};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let l = log.clone();
    let make = move |name: &'static str| {
        let l = l.clone();
        Box::new(move || l.borrow_mut().push(name)) as Box<dyn FnOnce()>
    };
    (log, make)
}

#[test]
fn tasks_run_in_due_order_then_creation_order() {
    let clock = VirtualScheduler::new();
    let (log, task) = recorder();
    clock.set_timeout(30, task("c"));
    clock.set_timeout(10, task("a"));
    clock.set_timeout(10, task("b"));
    clock.request_frame(task("frame"));

    clock.advance(9);
    assert!(log.borrow().is_empty());
    clock.advance(21);
    assert_eq!(*log.borrow(), vec!["a", "b", "frame", "c"]);
    assert_eq!(clock.pending(), 0);
    assert_eq!(clock.now_ms(), 30.0);
}

#[test]
fn intervals_repeat_until_cancelled() {
    let clock = VirtualScheduler::new();
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let handle = clock.set_interval(100, Box::new(move || c.set(c.get() + 1)));

    clock.advance(350);
    assert_eq!(count.get(), 3);
    clock.cancel(handle);
    clock.cancel(handle);
    clock.advance(1000);
    assert_eq!(count.get(), 3);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn an_interval_may_cancel_itself() {
    let clock = VirtualScheduler::shared();
    let count = Rc::new(Cell::new(0));
    let own: Rc<Cell<Option<TaskHandle>>> = Rc::default();

    let (c, me, sched) = (count.clone(), own.clone(), Rc::downgrade(&clock));
    let handle = clock.set_interval(
        10,
        Box::new(move || {
            c.set(c.get() + 1);
            if c.get() == 2 {
                if let (Some(s), Some(h)) = (sched.upgrade(), me.get()) {
                    s.cancel(h);
                }
            }
        }),
    );
    own.set(Some(handle));

    clock.advance(100);
    assert_eq!(count.get(), 2);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn tasks_scheduled_from_tasks_run_in_the_same_advance() {
    let clock = VirtualScheduler::shared();
    let fired_at = Rc::new(Cell::new(0.0));
    let (weak, f) = (Rc::downgrade(&clock), fired_at.clone());
    clock.set_timeout(
        10,
        Box::new(move || {
            if let Some(s) = weak.upgrade() {
                let (inner, f) = (Rc::downgrade(&s), f.clone());
                s.set_timeout(
                    15,
                    Box::new(move || {
                        if let Some(s) = inner.upgrade() {
                            f.set(s.now_ms());
                        }
                    }),
                );
            }
        }),
    );
    clock.advance(30);
    assert_eq!(fired_at.get(), 25.0);
}

#[test]
fn task_set_cancels_everything_once() {
    let clock = VirtualScheduler::shared();
    let (log, task) = recorder();
    let mut tasks = TaskSet::new(clock.clone());
    tasks.track(clock.set_timeout(10, task("a")));
    tasks.track(clock.set_timeout(20, task("b")));
    assert_eq!(tasks.len(), 2);

    assert_eq!(tasks.cancel_all(), 2);
    assert_eq!(tasks.cancel_all(), 0);
    assert!(tasks.is_empty());
    clock.advance(100);
    assert!(log.borrow().is_empty());
}

#[test]
fn dropping_a_task_set_cancels_its_tasks() {
    let clock = VirtualScheduler::shared();
    let (log, task) = recorder();
    {
        let mut tasks = TaskSet::new(clock.clone());
        tasks.track(clock.set_timeout(10, task("dropped")));
    }
    clock.set_timeout(10, task("kept"));
    clock.advance(50);
    assert_eq!(*log.borrow(), vec!["kept"]);
}
