//! Target acquisition: hold gaze on a target for half a second to hit it.

use super::GameKind;
use crate::constants::{
    AIM_COUNTDOWN_MS, AIM_DWELL_MS, AIM_MAX_TARGETS, AIM_POINTS, AIM_SESSION_SECS, AIM_SPAWN_MARGIN,
    AIM_TARGET_LIFETIME_MS, AIM_TARGET_RADIUS,
};
use crate::engine::{Circle, Dwell, Game, GameCtx, GameTimer, HitRegion, Scene, SceneItem};
use crate::sample::GazeFrame;
use glam::Vec2;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub center: Vec2,
    pub radius: f32,
    pub spawned_at_ms: f64,
    pub dwell: Dwell,
}

impl Target {
    fn region(&self) -> Circle {
        Circle {
            center: self.center,
            radius: self.radius,
        }
    }
}

#[derive(Debug)]
pub struct AimTrainer {
    targets: Vec<Target>,
    time_left_s: u32,
}

impl Default for AimTrainer {
    fn default() -> Self {
        Self::new()
    }
}

impl AimTrainer {
    pub fn new() -> Self {
        Self {
            targets: Vec::with_capacity(AIM_MAX_TARGETS + 1),
            time_left_s: AIM_SESSION_SECS,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn time_left_s(&self) -> u32 {
        self.time_left_s
    }

    /// Place a fresh target at `center`, born at `now_ms`.
    pub fn push_target(&mut self, center: Vec2, now_ms: f64) {
        self.targets.push(Target {
            center,
            radius: AIM_TARGET_RADIUS,
            spawned_at_ms: now_ms,
            dwell: Dwell::default(),
        });
    }

    fn spawn(&mut self, ctx: &mut GameCtx) {
        let field = ctx.playfield();
        let pad = AIM_TARGET_RADIUS + AIM_SPAWN_MARGIN;
        let now = ctx.now_ms();
        let rng = ctx.rng();
        let x = pad + rng.gen::<f32>() * (field.width - pad * 2.0);
        let y = pad + rng.gen::<f32>() * (field.height - pad * 2.0);
        self.push_target(Vec2::new(x, y), now);
    }
}

impl Game for AimTrainer {
    fn kind(&self) -> GameKind {
        GameKind::AimTrainer
    }

    fn reset(&mut self, ctx: &mut GameCtx) {
        self.targets.clear();
        self.time_left_s = AIM_SESSION_SECS;
        self.spawn(ctx);
        ctx.every(AIM_COUNTDOWN_MS, GameTimer::Countdown);
    }

    fn on_gaze(&mut self, gaze: &GazeFrame, ctx: &mut GameCtx) {
        let point = gaze.position();
        let before = self.targets.len();
        self.targets.retain_mut(|t| {
            let inside = t.region().contains(point);
            t.dwell.track(inside);
            !t.dwell.reached(AIM_DWELL_MS)
        });
        for _ in self.targets.len()..before {
            ctx.add_score(AIM_POINTS);
            self.spawn(ctx);
        }
    }

    fn update(&mut self, ctx: &mut GameCtx) {
        let now = ctx.now_ms();
        let before = self.targets.len();
        self.targets
            .retain(|t| now - t.spawned_at_ms < AIM_TARGET_LIFETIME_MS);
        if self.targets.len() < before {
            log::trace!("[aim] {} target(s) expired", before - self.targets.len());
        }
        while self.targets.len() < AIM_MAX_TARGETS {
            self.spawn(ctx);
        }
    }

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameCtx) {
        if timer != GameTimer::Countdown || self.time_left_s == 0 {
            return;
        }
        self.time_left_s -= 1;
        if self.time_left_s == 0 {
            ctx.game_over();
        }
    }

    fn scene(&self) -> Scene {
        Scene {
            game: GameKind::AimTrainer,
            score: 0,
            time_left_s: Some(self.time_left_s),
            items: self
                .targets
                .iter()
                .map(|t| SceneItem::Target {
                    x: t.center.x,
                    y: t.center.y,
                    radius: t.radius,
                    progress: t.dwell.progress(AIM_DWELL_MS),
                })
                .collect(),
        }
    }
}
