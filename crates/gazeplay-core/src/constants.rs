// Shared timing and tuning constants for the gaze pipeline and the games.

// Signal smoothing
pub const HISTORY_CAPACITY: usize = 8; // samples kept for the weighted moving average
pub const DEAD_ZONE_PX: f32 = 20.0; // per-axis movement below this is treated as jitter

// Broadcast cadence
pub const TICK_MS: u32 = 16; // ~60 Hz fan-out of gaze frames
pub const FRAME_MS: u32 = 16; // virtual frame period used when no display drives frames

// Tracker connection
pub const DEFAULT_TRACKER_URL: &str = "ws://localhost:8765";
pub const PING_INTERVAL_MS: u32 = 5000;
pub const RECONNECT_DELAY_MS: u32 = 5000;

// Calibration is reported by the tracker as a frame counter
pub const CALIBRATION_FRAMES: u32 = 60;
pub const CALIBRATION_LOG_EVERY: u32 = 10;

// Pointer fallback
pub const FALLBACK_HOLD_MS: f64 = 100.0; // press-and-hold before fixation is reported
pub const FALLBACK_FIXATION_IDLE: f32 = 0.5;
pub const FALLBACK_FIXATION_HELD: f32 = 1.0;

// Presentation hint: frames above this count as a fixation
pub const FIXATING_THRESHOLD: f32 = 0.7;

// Dwell accumulation per gaze frame
pub const DWELL_STEP_MS: u32 = 16;

// Playfield in logical pixels
pub const PLAYFIELD_WIDTH: f32 = 1200.0;
pub const PLAYFIELD_HEIGHT: f32 = 700.0;

// Aim trainer
pub const AIM_TARGET_RADIUS: f32 = 40.0;
pub const AIM_SPAWN_MARGIN: f32 = 20.0; // extra padding beyond the radius
pub const AIM_DWELL_MS: u32 = 500;
pub const AIM_TARGET_LIFETIME_MS: f64 = 3000.0;
pub const AIM_MAX_TARGETS: usize = 3;
pub const AIM_POINTS: u32 = 10;
pub const AIM_SESSION_SECS: u32 = 60;
pub const AIM_COUNTDOWN_MS: u32 = 1000;

// Memory match
pub const MEMORY_GRID: usize = 4;
pub const MEMORY_SYMBOLS: u8 = 8;
pub const MEMORY_CARD_SIZE: f32 = 100.0;
pub const MEMORY_CARD_GAP: f32 = 20.0;
pub const MEMORY_DWELL_MS: u32 = 800;
pub const MEMORY_RESOLVE_MS: u32 = 1000;
pub const MEMORY_WIN_DELAY_MS: u32 = 500;
pub const MEMORY_POINTS: u32 = 20;

// Bubble pop
pub const BUBBLE_MAX_LIVE: usize = 8;
pub const BUBBLE_RADIUS_MIN: f32 = 30.0;
pub const BUBBLE_RADIUS_SPAN: f32 = 30.0; // radius in [min, min + span)
pub const BUBBLE_SPEED_MIN: f32 = 0.5;
pub const BUBBLE_SPEED_SPAN: f32 = 1.5; // px per frame in [min, min + span)
pub const BUBBLE_SPAWN_INSET: f32 = 50.0; // horizontal inset and depth below the bottom edge
pub const BUBBLE_ESCAPE_MARGIN: f32 = 100.0;
pub const BUBBLE_DWELL_MS: u32 = 1000;
