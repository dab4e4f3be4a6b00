//! Game registry and single-active-game session control.

use crate::broadcaster::GazeBroadcaster;
use crate::engine::{EventCallback, InteractionEngine, ScenePresenter};
use crate::error::SessionError;
use crate::games::GameKind;
use crate::scheduler::Scheduler;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

/// Owns the currently running game, if any. Launching a game stops the
/// previous one first, so at most one engine is ever subscribed.
pub struct Arcade {
    scheduler: Rc<dyn Scheduler>,
    broadcaster: GazeBroadcaster,
    rng: StdRng,
    origin: Vec2,
    on_event: Option<EventCallback>,
    presenter: Option<ScenePresenter>,
    current: Option<InteractionEngine>,
}

impl Arcade {
    pub fn new(scheduler: Rc<dyn Scheduler>, broadcaster: GazeBroadcaster) -> Self {
        Self::with_rng(scheduler, broadcaster, StdRng::from_entropy())
    }

    pub fn with_seed(scheduler: Rc<dyn Scheduler>, broadcaster: GazeBroadcaster, seed: u64) -> Self {
        Self::with_rng(scheduler, broadcaster, StdRng::seed_from_u64(seed))
    }

    fn with_rng(scheduler: Rc<dyn Scheduler>, broadcaster: GazeBroadcaster, rng: StdRng) -> Self {
        Self {
            scheduler,
            broadcaster,
            rng,
            origin: Vec2::ZERO,
            on_event: None,
            presenter: None,
            current: None,
        }
    }

    pub fn on_event(&mut self, callback: EventCallback) {
        if let Some(engine) = &self.current {
            engine.on_event(callback.clone());
        }
        self.on_event = Some(callback);
    }

    pub fn on_scene(&mut self, presenter: ScenePresenter) {
        if let Some(engine) = &self.current {
            engine.set_presenter(presenter.clone());
        }
        self.presenter = Some(presenter);
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
        if let Some(engine) = &self.current {
            engine.set_origin(origin);
        }
    }

    /// Start the game registered under `name`.
    pub fn launch(&mut self, name: &str) -> Result<&InteractionEngine, SessionError> {
        let kind = name.parse::<GameKind>().map_err(|e| {
            log::warn!("[arcade] {}", e);
            e
        })?;
        Ok(self.launch_kind(kind))
    }

    pub fn launch_kind(&mut self, kind: GameKind) -> &InteractionEngine {
        self.back_to_menu();

        let rng = StdRng::seed_from_u64(self.rng.gen());
        let engine = InteractionEngine::new(
            kind.create(),
            self.scheduler.clone(),
            self.broadcaster.clone(),
            rng,
        );
        engine.set_origin(self.origin);
        if let Some(cb) = &self.on_event {
            engine.on_event(cb.clone());
        }
        if let Some(p) = &self.presenter {
            engine.set_presenter(p.clone());
        }
        log::info!("[arcade] launching {}", kind.title());
        engine.start();
        self.current.insert(engine)
    }

    /// Stop and drop the running game. Returns false if none was active.
    pub fn back_to_menu(&mut self) -> bool {
        match self.current.take() {
            Some(engine) => {
                engine.stop();
                log::info!("[arcade] back to menu from {}", engine.kind().title());
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&InteractionEngine> {
        self.current.as_ref()
    }
}
