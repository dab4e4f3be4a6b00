//! Pair matching on a 4×4 grid. Dwell flips a card; two flipped cards are
//! compared after a short reveal.

use super::GameKind;
use crate::constants::{
    MEMORY_CARD_GAP, MEMORY_CARD_SIZE, MEMORY_DWELL_MS, MEMORY_GRID, MEMORY_POINTS,
    MEMORY_RESOLVE_MS, MEMORY_SYMBOLS, MEMORY_WIN_DELAY_MS,
};
use crate::engine::{Dwell, Game, GameCtx, GameTimer, HitRegion, Playfield, Rect, Scene, SceneItem};
use crate::sample::GazeFrame;
use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

pub const DECK_SIZE: usize = MEMORY_GRID * MEMORY_GRID;

/// Card face. The presentation layer maps values to artwork.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(pub u8);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Card {
    pub bounds: Rect,
    pub symbol: Symbol,
    pub flipped: bool,
    pub matched: bool,
    pub dwell: Dwell,
}

impl Card {
    fn is_candidate(&self) -> bool {
        !self.flipped && !self.matched
    }
}

/// Every symbol exactly twice, in a uniformly random order.
pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> [Symbol; DECK_SIZE] {
    let mut deck = [Symbol(0); DECK_SIZE];
    for (i, slot) in deck.iter_mut().enumerate() {
        *slot = Symbol((i % MEMORY_SYMBOLS as usize) as u8);
    }
    deck.shuffle(rng);
    deck
}

/// Top-left corners of the grid, row-major, centred on the playfield.
pub fn card_origins(field: Playfield) -> impl Iterator<Item = Vec2> {
    let pitch = MEMORY_CARD_SIZE + MEMORY_CARD_GAP;
    let span = MEMORY_GRID as f32 * pitch - MEMORY_CARD_GAP;
    let start = Vec2::new((field.width - span) / 2.0, (field.height - span) / 2.0);
    (0..DECK_SIZE).map(move |i| {
        let (row, col) = (i / MEMORY_GRID, i % MEMORY_GRID);
        start + Vec2::new(col as f32 * pitch, row as f32 * pitch)
    })
}

#[derive(Debug, Default)]
pub struct MemoryGame {
    cards: Vec<Card>,
    flipped: SmallVec<[usize; 2]>,
    matched_pairs: usize,
    fixed_deck: Option<[Symbol; DECK_SIZE]>,
}

impl MemoryGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// A game that always deals `deck` instead of shuffling.
    pub fn with_deck(deck: [Symbol; DECK_SIZE]) -> Self {
        Self {
            fixed_deck: Some(deck),
            ..Self::default()
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    fn deal(&mut self, deck: [Symbol; DECK_SIZE], field: Playfield) {
        self.cards = card_origins(field)
            .zip(deck)
            .map(|(origin, symbol)| Card {
                bounds: Rect {
                    origin,
                    size: Vec2::splat(MEMORY_CARD_SIZE),
                },
                symbol,
                flipped: false,
                matched: false,
                dwell: Dwell::default(),
            })
            .collect();
        self.flipped.clear();
        self.matched_pairs = 0;
    }

    fn resolve(&mut self, ctx: &mut GameCtx) {
        let (a, b) = match self.flipped.as_slice() {
            [a, b] => (*a, *b),
            other => {
                log::debug!("[memory] resolve with {} flipped card(s), skipped", other.len());
                return;
            }
        };
        self.flipped.clear();
        let (Some(first), Some(second)) = (self.cards.get(a).copied(), self.cards.get(b).copied())
        else {
            return;
        };
        if first.matched || second.matched {
            return;
        }

        if first.symbol == second.symbol {
            for i in [a, b] {
                self.cards[i].matched = true;
            }
            self.matched_pairs += 1;
            ctx.add_score(MEMORY_POINTS);
            if self.matched_pairs == DECK_SIZE / 2 {
                ctx.after(MEMORY_WIN_DELAY_MS, GameTimer::AnnounceWin);
            }
        } else {
            for i in [a, b] {
                self.cards[i].flipped = false;
            }
        }
    }
}

impl Game for MemoryGame {
    fn kind(&self) -> GameKind {
        GameKind::MemoryMatch
    }

    fn reset(&mut self, ctx: &mut GameCtx) {
        let deck = match self.fixed_deck {
            Some(deck) => deck,
            None => shuffled_deck(ctx.rng()),
        };
        self.deal(deck, ctx.playfield());
    }

    fn on_gaze(&mut self, gaze: &GazeFrame, ctx: &mut GameCtx) {
        if self.flipped.len() >= 2 {
            return;
        }
        let point = gaze.position();
        for (i, card) in self.cards.iter_mut().enumerate() {
            if !card.is_candidate() {
                continue;
            }
            card.dwell.track(card.bounds.contains(point));
            if !card.dwell.reached(MEMORY_DWELL_MS) {
                continue;
            }
            card.flipped = true;
            card.dwell.reset();
            self.flipped.push(i);
            if self.flipped.len() == 2 {
                ctx.after(MEMORY_RESOLVE_MS, GameTimer::ResolveFlip);
                break;
            }
        }
    }

    fn update(&mut self, _ctx: &mut GameCtx) {}

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameCtx) {
        match timer {
            GameTimer::ResolveFlip => self.resolve(ctx),
            GameTimer::AnnounceWin => ctx.win(),
            GameTimer::Countdown => {}
        }
    }

    fn scene(&self) -> Scene {
        Scene {
            game: GameKind::MemoryMatch,
            score: 0,
            time_left_s: None,
            items: self
                .cards
                .iter()
                .map(|c| SceneItem::Card {
                    x: c.bounds.origin.x,
                    y: c.bounds.origin.y,
                    size: c.bounds.size.x,
                    symbol: (c.flipped || c.matched).then_some(c.symbol.0),
                    matched: c.matched,
                    progress: c.dwell.progress(MEMORY_DWELL_MS),
                })
                .collect(),
        }
    }
}
