//! Run loop shared by every dwell-activated game.
//!
//! A [`Game`] is a pure state machine. It sees gaze frames, per-frame updates
//! and its own timers through a [`GameCtx`], which collects score changes,
//! terminal events and timer requests. [`InteractionEngine`] owns one game and
//! wires it to the broadcaster, the scheduler and the presentation callbacks.

pub mod dwell;

pub use dwell::{Circle, Dwell, HitRegion, Rect};

use crate::broadcaster::{GazeBroadcaster, SubscriptionHandle};
use crate::constants::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::games::GameKind;
use crate::sample::GazeFrame;
use crate::scheduler::{Scheduler, TaskHandle, TaskSet};
use anyhow::anyhow;
use glam::Vec2;
use rand::rngs::StdRng;
use serde::Serialize;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
        }
    }
}

/// Contracted outputs of a running game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    #[serde(rename_all = "camelCase")]
    ScoreChanged { score: u32 },
    #[serde(rename_all = "camelCase")]
    GameOver { final_score: u32 },
    Win,
}

impl GameEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameEvent::GameOver { .. } | GameEvent::Win)
    }
}

/// Timers a game may ask the engine to run on its behalf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameTimer {
    Countdown,
    ResolveFlip,
    AnnounceWin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerRequest {
    pub timer: GameTimer,
    pub delay_ms: u32,
    pub repeat: bool,
}

type Events = SmallVec<[GameEvent; 2]>;
type Timers = SmallVec<[TimerRequest; 2]>;

pub struct GameCtx<'a> {
    now_ms: f64,
    playfield: Playfield,
    score: &'a mut u32,
    rng: &'a mut StdRng,
    events: Events,
    timers: Timers,
}

impl<'a> GameCtx<'a> {
    pub fn new(now_ms: f64, playfield: Playfield, score: &'a mut u32, rng: &'a mut StdRng) -> Self {
        Self {
            now_ms,
            playfield,
            score,
            rng,
            events: SmallVec::new(),
            timers: SmallVec::new(),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn playfield(&self) -> Playfield {
        self.playfield
    }

    pub fn score(&self) -> u32 {
        *self.score
    }

    pub fn rng(&mut self) -> &mut StdRng {
        self.rng
    }

    pub fn add_score(&mut self, points: u32) {
        *self.score = self.score.saturating_add(points);
        self.events.push(GameEvent::ScoreChanged { score: *self.score });
    }

    pub fn game_over(&mut self) {
        self.events.push(GameEvent::GameOver {
            final_score: *self.score,
        });
    }

    pub fn win(&mut self) {
        self.events.push(GameEvent::Win);
    }

    pub fn after(&mut self, delay_ms: u32, timer: GameTimer) {
        self.timers.push(TimerRequest {
            timer,
            delay_ms,
            repeat: false,
        });
    }

    pub fn every(&mut self, period_ms: u32, timer: GameTimer) {
        self.timers.push(TimerRequest {
            timer,
            delay_ms: period_ms,
            repeat: true,
        });
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn timers(&self) -> &[TimerRequest] {
        &self.timers
    }

    fn into_parts(self) -> (Events, Timers) {
        (self.events, self.timers)
    }
}

/// Drawable snapshot handed to the presenter after each update.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub game: GameKind,
    pub score: u32,
    pub time_left_s: Option<u32>,
    pub items: Vec<SceneItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SceneItem {
    Target {
        x: f32,
        y: f32,
        radius: f32,
        progress: f32,
    },
    Card {
        x: f32,
        y: f32,
        size: f32,
        /// Face value, present only while flipped or matched.
        symbol: Option<u8>,
        matched: bool,
        progress: f32,
    },
    Bubble {
        x: f32,
        y: f32,
        radius: f32,
        progress: f32,
    },
}

pub trait Game {
    fn kind(&self) -> GameKind;

    /// Fresh round. Called on every start.
    fn reset(&mut self, ctx: &mut GameCtx);

    /// One broadcast gaze frame, already in playfield coordinates.
    fn on_gaze(&mut self, gaze: &GazeFrame, ctx: &mut GameCtx);

    /// One display frame: spawn, move and expire entities.
    fn update(&mut self, ctx: &mut GameCtx);

    fn on_timer(&mut self, _timer: GameTimer, _ctx: &mut GameCtx) {}

    /// Score is filled in by the engine.
    fn scene(&self) -> Scene;
}

pub type EventCallback = Rc<dyn Fn(&GameEvent)>;
pub type ScenePresenter = Rc<dyn Fn(&Scene)>;

struct EngineState {
    game: Box<dyn Game>,
    scheduler: Rc<dyn Scheduler>,
    broadcaster: GazeBroadcaster,
    subscription: Option<SubscriptionHandle>,
    tasks: TaskSet,
    frame_task: Option<TaskHandle>,
    rng: StdRng,
    playfield: Playfield,
    origin: Vec2,
    score: u32,
    running: bool,
    on_event: Option<EventCallback>,
    presenter: Option<ScenePresenter>,
}

impl EngineState {
    /// Run `f` against the game with a fresh context and collect its outputs.
    fn with_ctx(&mut self, f: impl FnOnce(&mut dyn Game, &mut GameCtx)) -> (Events, Timers) {
        let now = self.scheduler.now_ms();
        let EngineState {
            game,
            score,
            rng,
            playfield,
            ..
        } = self;
        let mut ctx = GameCtx::new(now, *playfield, score, rng);
        f(game.as_mut(), &mut ctx);
        ctx.into_parts()
    }

    fn scene(&self) -> Scene {
        Scene {
            score: self.score,
            ..self.game.scene()
        }
    }
}

/// Drives one [`Game`] from gaze frames, display frames and timers.
#[derive(Clone)]
pub struct InteractionEngine {
    inner: Rc<RefCell<EngineState>>,
}

impl InteractionEngine {
    pub fn new(
        game: Box<dyn Game>,
        scheduler: Rc<dyn Scheduler>,
        broadcaster: GazeBroadcaster,
        rng: StdRng,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EngineState {
                game,
                tasks: TaskSet::new(scheduler.clone()),
                scheduler,
                broadcaster,
                subscription: None,
                frame_task: None,
                rng,
                playfield: Playfield::default(),
                origin: Vec2::ZERO,
                score: 0,
                running: false,
                on_event: None,
                presenter: None,
            })),
        }
    }

    /// Page-space position of the playfield's top-left corner.
    pub fn set_origin(&self, origin: Vec2) {
        self.inner.borrow_mut().origin = origin;
    }

    pub fn on_event(&self, callback: EventCallback) {
        self.inner.borrow_mut().on_event = Some(callback);
    }

    pub fn set_presenter(&self, presenter: ScenePresenter) {
        self.inner.borrow_mut().presenter = Some(presenter);
    }

    pub fn start(&self) {
        let (events, timers, broadcaster) = {
            let mut st = self.inner.borrow_mut();
            if st.running {
                log::warn!("[engine] {} already running", st.game.kind().title());
                return;
            }
            st.running = true;
            st.score = 0;
            log::info!("[engine] {} started", st.game.kind().title());
            let (mut events, timers) = st.with_ctx(|game, ctx| game.reset(ctx));
            events.insert(0, GameEvent::ScoreChanged { score: 0 });
            (events, timers, st.broadcaster.clone())
        };

        let weak = Rc::downgrade(&self.inner);
        let subscription = broadcaster.subscribe(move |frame| match weak.upgrade() {
            Some(inner) => handle_gaze(&inner, frame),
            None => Ok(()),
        });
        self.inner.borrow_mut().subscription = Some(subscription);

        dispatch(&self.inner, events, timers);
        schedule_frame(&self.inner);
    }

    /// Detach from the broadcaster and cancel every task this engine owns.
    /// Safe to call any number of times.
    pub fn stop(&self) {
        stop_engine(&self.inner);
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    pub fn score(&self) -> u32 {
        self.inner.borrow().score
    }

    pub fn kind(&self) -> GameKind {
        self.inner.borrow().game.kind()
    }

    pub fn scene(&self) -> Scene {
        self.inner.borrow().scene()
    }

    /// Tasks still owned by the engine (frame loop and game timers).
    pub fn pending_tasks(&self) -> usize {
        self.inner.borrow().tasks.len()
    }
}

fn handle_gaze(inner: &Rc<RefCell<EngineState>>, frame: &GazeFrame) -> anyhow::Result<()> {
    let (events, timers) = {
        let mut st = inner
            .try_borrow_mut()
            .map_err(|_| anyhow!("engine busy, gaze frame dropped"))?;
        if !st.running {
            return Ok(());
        }
        let local = GazeFrame {
            x: frame.x - st.origin.x,
            y: frame.y - st.origin.y,
            ..*frame
        };
        st.with_ctx(|game, ctx| game.on_gaze(&local, ctx))
    };
    dispatch(inner, events, timers);
    Ok(())
}

fn schedule_frame(inner: &Rc<RefCell<EngineState>>) {
    let weak = Rc::downgrade(inner);
    let mut st = inner.borrow_mut();
    if !st.running {
        return;
    }
    let handle = st.scheduler.request_frame(Box::new(move || {
        if let Some(inner) = weak.upgrade() {
            run_frame(&inner);
        }
    }));
    st.frame_task = Some(st.tasks.track(handle));
}

fn run_frame(inner: &Rc<RefCell<EngineState>>) {
    let (events, timers, scene, presenter) = {
        let mut st = inner.borrow_mut();
        if let Some(h) = st.frame_task.take() {
            st.tasks.release(h);
        }
        if !st.running {
            return;
        }
        let (events, timers) = st.with_ctx(|game, ctx| game.update(ctx));
        let presenter = st.presenter.clone();
        let scene = presenter.as_ref().map(|_| st.scene());
        (events, timers, scene, presenter)
    };

    dispatch(inner, events, timers);
    if let (Some(present), Some(scene)) = (presenter, scene) {
        present(&scene);
    }
    schedule_frame(inner);
}

fn fire_timer(inner: &Rc<RefCell<EngineState>>, timer: GameTimer, once: Option<TaskHandle>) {
    let (events, timers) = {
        let mut st = inner.borrow_mut();
        if let Some(h) = once {
            st.tasks.release(h);
        }
        if !st.running {
            return;
        }
        st.with_ctx(|game, ctx| game.on_timer(timer, ctx))
    };
    dispatch(inner, events, timers);
}

fn schedule_timers(inner: &Rc<RefCell<EngineState>>, timers: Timers) {
    let mut st = inner.borrow_mut();
    if !st.running {
        return;
    }
    for req in timers {
        let weak = Rc::downgrade(inner);
        let handle = if req.repeat {
            st.scheduler.set_interval(
                req.delay_ms,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        fire_timer(&inner, req.timer, None);
                    }
                }),
            )
        } else {
            let slot: Rc<Cell<Option<TaskHandle>>> = Rc::default();
            let fired = slot.clone();
            let handle = st.scheduler.set_timeout(
                req.delay_ms,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        fire_timer(&inner, req.timer, fired.get());
                    }
                }),
            );
            slot.set(Some(handle));
            handle
        };
        st.tasks.track(handle);
    }
}

/// Schedule requested timers, then deliver events with no borrow held.
/// A terminal event stops the engine once every event has been delivered.
fn dispatch(inner: &Rc<RefCell<EngineState>>, events: Events, timers: Timers) {
    if !timers.is_empty() {
        schedule_timers(inner, timers);
    }
    if events.is_empty() {
        return;
    }

    let (callback, title) = {
        let st = inner.borrow();
        (st.on_event.clone(), st.game.kind().title())
    };
    let mut terminal = false;
    for event in &events {
        if event.is_terminal() {
            log::info!("[engine] {} finished: {:?}", title, event);
            terminal = true;
        }
        if let Some(cb) = &callback {
            cb(event);
        }
    }
    if terminal {
        stop_engine(inner);
    }
}

fn stop_engine(inner: &Rc<RefCell<EngineState>>) {
    let (subscription, broadcaster) = {
        let mut st = inner.borrow_mut();
        if !st.running {
            return;
        }
        st.running = false;
        st.frame_task = None;
        let cancelled = st.tasks.cancel_all();
        log::info!(
            "[engine] {} stopped (score {}, {} task(s) cancelled)",
            st.game.kind().title(),
            st.score,
            cancelled
        );
        (st.subscription.take(), st.broadcaster.clone())
    };
    if let Some(handle) = subscription {
        broadcaster.unsubscribe(handle);
    }
}
