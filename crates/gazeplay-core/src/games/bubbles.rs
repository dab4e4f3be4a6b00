//! Rising bubbles that pop after a second of steady gaze. Runs until stopped.

use super::GameKind;
use crate::constants::{
    BUBBLE_DWELL_MS, BUBBLE_ESCAPE_MARGIN, BUBBLE_MAX_LIVE, BUBBLE_RADIUS_MIN, BUBBLE_RADIUS_SPAN,
    BUBBLE_SPAWN_INSET, BUBBLE_SPEED_MIN, BUBBLE_SPEED_SPAN,
};
use crate::engine::{Circle, Dwell, Game, GameCtx, HitRegion, Scene, SceneItem};
use crate::sample::GazeFrame;
use glam::Vec2;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bubble {
    pub center: Vec2,
    pub radius: f32,
    /// Upward travel per display frame, in pixels.
    pub speed: f32,
    pub dwell: Dwell,
}

impl Bubble {
    pub fn new(center: Vec2, radius: f32, speed: f32) -> Self {
        Self {
            center,
            radius,
            speed,
            dwell: Dwell::default(),
        }
    }

    pub fn points(&self) -> u32 {
        (self.radius / 10.0).floor() as u32
    }
}

#[derive(Debug, Default)]
pub struct BubblePop {
    bubbles: Vec<Bubble>,
}

impl BubblePop {
    pub fn new() -> Self {
        Self {
            bubbles: Vec::with_capacity(BUBBLE_MAX_LIVE),
        }
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn push_bubble(&mut self, bubble: Bubble) {
        self.bubbles.push(bubble);
    }

    fn spawn(&mut self, ctx: &mut GameCtx) {
        let field = ctx.playfield();
        let rng = ctx.rng();
        let x = BUBBLE_SPAWN_INSET + rng.gen::<f32>() * (field.width - BUBBLE_SPAWN_INSET * 2.0);
        let radius = BUBBLE_RADIUS_MIN + rng.gen::<f32>() * BUBBLE_RADIUS_SPAN;
        let speed = BUBBLE_SPEED_MIN + rng.gen::<f32>() * BUBBLE_SPEED_SPAN;
        self.push_bubble(Bubble::new(
            Vec2::new(x, field.height + BUBBLE_SPAWN_INSET),
            radius,
            speed,
        ));
    }
}

impl Game for BubblePop {
    fn kind(&self) -> GameKind {
        GameKind::BubblePop
    }

    fn reset(&mut self, _ctx: &mut GameCtx) {
        self.bubbles.clear();
    }

    fn on_gaze(&mut self, gaze: &GazeFrame, ctx: &mut GameCtx) {
        let point = gaze.position();
        let mut popped = 0;
        self.bubbles.retain_mut(|b| {
            let region = Circle {
                center: b.center,
                radius: b.radius,
            };
            b.dwell.track(region.contains(point));
            if b.dwell.reached(BUBBLE_DWELL_MS) {
                popped += b.points();
                return false;
            }
            true
        });
        if popped > 0 {
            ctx.add_score(popped);
        }
    }

    fn update(&mut self, ctx: &mut GameCtx) {
        while self.bubbles.len() < BUBBLE_MAX_LIVE {
            self.spawn(ctx);
        }
        for b in &mut self.bubbles {
            b.center.y -= b.speed;
        }
        self.bubbles.retain(|b| b.center.y > -BUBBLE_ESCAPE_MARGIN);
    }

    fn scene(&self) -> Scene {
        Scene {
            game: GameKind::BubblePop,
            score: 0,
            time_left_s: None,
            items: self
                .bubbles
                .iter()
                .map(|b| SceneItem::Bubble {
                    x: b.center.x,
                    y: b.center.y,
                    radius: b.radius,
                    progress: b.dwell.progress(BUBBLE_DWELL_MS),
                })
                .collect(),
        }
    }
}
