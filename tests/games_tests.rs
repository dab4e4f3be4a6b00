use gazeplay_core::engine::{Dwell, TimerRequest};
use gazeplay_core::games::bubbles::Bubble;
use gazeplay_core::games::memory::{card_origins, shuffled_deck, Symbol, DECK_SIZE};
use gazeplay_core::games::{AimTrainer, BubblePop, MemoryGame};
use gazeplay_core::{Game, GameCtx, GameEvent, GameTimer, GazeFrame, Playfield};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Score, RNG and clock that outlive the per-call contexts.
struct Table {
    score: u32,
    rng: StdRng,
    now_ms: f64,
}

impl Table {
    fn new() -> Self {
        Self {
            score: 0,
            rng: StdRng::seed_from_u64(7),
            now_ms: 0.0,
        }
    }

    fn run<G: Game>(
        &mut self,
        game: &mut G,
        step: impl FnOnce(&mut G, &mut GameCtx),
    ) -> (Vec<GameEvent>, Vec<TimerRequest>) {
        let mut ctx = GameCtx::new(self.now_ms, Playfield::default(), &mut self.score, &mut self.rng);
        step(game, &mut ctx);
        (ctx.events().to_vec(), ctx.timers().to_vec())
    }

    /// Feed `frames` gaze frames at `at`, one per 16 ms.
    fn gaze<G: Game>(&mut self, game: &mut G, at: Vec2, frames: usize) -> (Vec<GameEvent>, Vec<TimerRequest>) {
        let mut events = Vec::new();
        let mut timers = Vec::new();
        for _ in 0..frames {
            let frame = GazeFrame {
                x: at.x,
                y: at.y,
                fixation: 0.9,
                timestamp_ms: self.now_ms,
            };
            let (e, t) = self.run(game, |g, ctx| g.on_gaze(&frame, ctx));
            events.extend(e);
            timers.extend(t);
            self.now_ms += 16.0;
        }
        (events, timers)
    }
}

// --- aim trainer ---

#[test]
fn aim_hit_after_32_frames_scores_ten_and_respawns() {
    let mut t = Table::new();
    let mut game = AimTrainer::new();
    game.push_target(Vec2::new(100.0, 100.0), 0.0);

    let (events, _) = t.gaze(&mut game, Vec2::new(105.0, 105.0), 31);
    assert!(events.is_empty());
    assert_eq!(game.targets()[0].dwell.elapsed_ms(), 496);

    let (events, _) = t.gaze(&mut game, Vec2::new(105.0, 105.0), 1);
    assert_eq!(events, vec![GameEvent::ScoreChanged { score: 10 }]);
    assert_eq!(t.score, 10);
    assert_eq!(game.targets().len(), 1);
    assert_ne!(game.targets()[0].center, Vec2::new(100.0, 100.0));

    t.run(&mut game, |g, ctx| g.update(ctx));
    assert_eq!(game.targets().len(), 3);
}

#[test]
fn aim_dwell_resets_when_gaze_leaves() {
    let mut t = Table::new();
    let mut game = AimTrainer::new();
    game.push_target(Vec2::new(100.0, 100.0), 0.0);

    t.gaze(&mut game, Vec2::new(100.0, 100.0), 30);
    t.gaze(&mut game, Vec2::new(100.0, 140.0), 1);
    assert_eq!(game.targets()[0].dwell.elapsed_ms(), 0);
    let (events, _) = t.gaze(&mut game, Vec2::new(100.0, 100.0), 31);
    assert!(events.is_empty());
    assert_eq!(t.score, 0);
}

#[test]
fn aim_spawns_inside_the_padded_field_and_caps_at_three() {
    let mut t = Table::new();
    let mut game = AimTrainer::new();
    for _ in 0..50 {
        t.run(&mut game, |g, ctx| g.update(ctx));
        assert_eq!(game.targets().len(), 3);
    }
    let field = Playfield::default();
    for target in game.targets() {
        assert!(target.center.x >= 60.0 && target.center.x <= field.width - 60.0);
        assert!(target.center.y >= 60.0 && target.center.y <= field.height - 60.0);
    }
}

#[test]
fn aim_targets_expire_after_three_seconds() {
    let mut t = Table::new();
    let mut game = AimTrainer::new();
    game.push_target(Vec2::new(100.0, 100.0), 0.0);

    t.now_ms = 2999.0;
    t.run(&mut game, |g, ctx| g.update(ctx));
    assert!(game.targets().iter().any(|x| x.center == Vec2::new(100.0, 100.0)));

    t.now_ms = 3000.0;
    t.run(&mut game, |g, ctx| g.update(ctx));
    assert!(game.targets().iter().all(|x| x.center != Vec2::new(100.0, 100.0)));
    assert_eq!(game.targets().len(), 3);
}

#[test]
fn aim_countdown_ends_the_session_after_sixty_ticks() {
    let mut t = Table::new();
    let mut game = AimTrainer::new();
    let (events, timers) = t.run(&mut game, |g, ctx| g.reset(ctx));
    assert!(events.is_empty());
    assert_eq!(
        timers,
        vec![TimerRequest {
            timer: GameTimer::Countdown,
            delay_ms: 1000,
            repeat: true
        }]
    );
    assert_eq!(game.targets().len(), 1);
    t.score = 30;

    for _ in 0..59 {
        let (events, _) = t.run(&mut game, |g, ctx| g.on_timer(GameTimer::Countdown, ctx));
        assert!(events.is_empty());
    }
    assert_eq!(game.time_left_s(), 1);
    let (events, _) = t.run(&mut game, |g, ctx| g.on_timer(GameTimer::Countdown, ctx));
    assert_eq!(events, vec![GameEvent::GameOver { final_score: 30 }]);
}

// --- memory match ---

fn paired_deck() -> [Symbol; DECK_SIZE] {
    std::array::from_fn(|i| Symbol((i / 2) as u8))
}

fn card_centre(index: usize) -> Vec2 {
    card_origins(Playfield::default()).nth(index).unwrap() + Vec2::splat(50.0)
}

fn dealt(deck: [Symbol; DECK_SIZE], t: &mut Table) -> MemoryGame {
    let mut game = MemoryGame::with_deck(deck);
    t.run(&mut game, |g, ctx| g.reset(ctx));
    game
}

#[test]
fn every_shuffle_holds_each_symbol_twice() {
    for seed in 0..64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = shuffled_deck(&mut rng);
        let mut counts = [0usize; 8];
        for s in deck {
            counts[s.0 as usize] += 1;
        }
        assert_eq!(counts, [2; 8], "seed {seed}");
    }
}

#[test]
fn grid_is_centred_on_the_playfield() {
    let origins: Vec<Vec2> = card_origins(Playfield::default()).collect();
    assert_eq!(origins.len(), 16);
    assert_eq!(origins[0], Vec2::new(370.0, 120.0));
    assert_eq!(origins[5], Vec2::new(490.0, 240.0));
    assert_eq!(origins[15], Vec2::new(730.0, 480.0));
}

#[test]
fn matching_pair_scores_after_the_reveal() {
    let mut t = Table::new();
    let mut game = dealt(paired_deck(), &mut t);

    let (_, timers) = t.gaze(&mut game, card_centre(0), 49);
    assert!(timers.is_empty());
    assert!(!game.cards()[0].flipped);
    t.gaze(&mut game, card_centre(0), 1);
    assert!(game.cards()[0].flipped);
    assert_eq!(game.cards()[0].dwell, Dwell::default());

    let (_, timers) = t.gaze(&mut game, card_centre(1), 50);
    assert_eq!(
        timers,
        vec![TimerRequest {
            timer: GameTimer::ResolveFlip,
            delay_ms: 1000,
            repeat: false
        }]
    );
    assert_eq!(game.flipped(), &[0, 1]);

    let (events, timers) = t.run(&mut game, |g, ctx| g.on_timer(GameTimer::ResolveFlip, ctx));
    assert_eq!(events, vec![GameEvent::ScoreChanged { score: 20 }]);
    assert!(timers.is_empty());
    assert!(game.cards()[0].matched && game.cards()[1].matched);
    assert!(game.flipped().is_empty());
}

#[test]
fn mismatched_pair_turns_back_over() {
    let mut t = Table::new();
    let mut game = dealt(paired_deck(), &mut t);

    t.gaze(&mut game, card_centre(0), 50);
    t.gaze(&mut game, card_centre(2), 50);
    assert_eq!(game.flipped(), &[0, 2]);

    let (events, _) = t.run(&mut game, |g, ctx| g.on_timer(GameTimer::ResolveFlip, ctx));
    assert!(events.is_empty());
    assert_eq!(t.score, 0);
    assert!(!game.cards()[0].flipped && !game.cards()[2].flipped);
    assert!(!game.cards()[0].matched && !game.cards()[2].matched);
    assert!(game.flipped().is_empty());
}

#[test]
fn third_card_cannot_flip_while_two_are_up() {
    let mut t = Table::new();
    let mut game = dealt(paired_deck(), &mut t);

    t.gaze(&mut game, card_centre(0), 50);
    t.gaze(&mut game, card_centre(2), 50);
    t.gaze(&mut game, card_centre(4), 100);
    assert!(!game.cards()[4].flipped);
    assert_eq!(game.flipped().len(), 2);
}

#[test]
fn stray_resolve_is_ignored() {
    let mut t = Table::new();
    let mut game = dealt(paired_deck(), &mut t);
    t.gaze(&mut game, card_centre(0), 50);

    let (events, _) = t.run(&mut game, |g, ctx| g.on_timer(GameTimer::ResolveFlip, ctx));
    assert!(events.is_empty());
    assert_eq!(game.matched_pairs(), 0);
}

#[test]
fn clearing_the_board_announces_a_win() {
    let mut t = Table::new();
    let mut game = dealt(paired_deck(), &mut t);

    let mut last_timers = Vec::new();
    for pair in 0..8 {
        t.gaze(&mut game, card_centre(pair * 2), 50);
        t.gaze(&mut game, card_centre(pair * 2 + 1), 50);
        let (_, timers) = t.run(&mut game, |g, ctx| g.on_timer(GameTimer::ResolveFlip, ctx));
        last_timers = timers;
    }
    assert_eq!(t.score, 160);
    assert_eq!(game.matched_pairs(), 8);
    assert_eq!(
        last_timers,
        vec![TimerRequest {
            timer: GameTimer::AnnounceWin,
            delay_ms: 500,
            repeat: false
        }]
    );

    let (events, _) = t.run(&mut game, |g, ctx| g.on_timer(GameTimer::AnnounceWin, ctx));
    assert_eq!(events, vec![GameEvent::Win]);
}

// --- bubble pop ---

#[test]
fn bubble_pops_at_one_second_for_radius_tenths() {
    let mut t = Table::new();
    let mut game = BubblePop::new();
    game.push_bubble(Bubble {
        dwell: Dwell::from_ms(984),
        ..Bubble::new(Vec2::new(300.0, 300.0), 50.0, 1.0)
    });

    let (events, _) = t.gaze(&mut game, Vec2::new(310.0, 290.0), 1);
    assert_eq!(events, vec![GameEvent::ScoreChanged { score: 5 }]);
    assert!(game.bubbles().is_empty());
}

#[test]
fn bubble_needs_continuous_gaze() {
    let mut t = Table::new();
    let mut game = BubblePop::new();
    game.push_bubble(Bubble::new(Vec2::new(300.0, 300.0), 30.0, 1.0));

    t.gaze(&mut game, Vec2::new(300.0, 300.0), 62);
    assert_eq!(game.bubbles()[0].dwell.elapsed_ms(), 992);
    t.gaze(&mut game, Vec2::new(600.0, 300.0), 1);
    t.gaze(&mut game, Vec2::new(300.0, 300.0), 62);
    assert_eq!(t.score, 0);

    let (events, _) = t.gaze(&mut game, Vec2::new(300.0, 300.0), 1);
    assert_eq!(events, vec![GameEvent::ScoreChanged { score: 3 }]);
}

#[test]
fn bubbles_refill_rise_and_escape() {
    let mut t = Table::new();
    let mut game = BubblePop::new();
    game.push_bubble(Bubble::new(Vec2::new(300.0, -99.5), 40.0, 1.0));

    t.run(&mut game, |g, ctx| g.update(ctx));
    // the escaping bubble is gone, the field was topped up before moving
    assert_eq!(game.bubbles().len(), 7);
    let field = Playfield::default();
    for b in game.bubbles() {
        assert!(b.radius >= 30.0 && b.radius < 60.0);
        assert!(b.speed >= 0.5 && b.speed < 2.0);
        assert!(b.center.x >= 50.0 && b.center.x <= field.width - 50.0);
        assert_eq!(b.center.y, field.height + 50.0 - b.speed);
    }

    t.run(&mut game, |g, ctx| g.update(ctx));
    assert_eq!(game.bubbles().len(), 8);
}
