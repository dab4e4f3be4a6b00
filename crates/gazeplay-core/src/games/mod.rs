pub mod aim;
pub mod bubbles;
pub mod memory;

pub use aim::AimTrainer;
pub use bubbles::BubblePop;
pub use memory::MemoryGame;

use crate::engine::Game;
use crate::error::SessionError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum GameKind {
    #[serde(rename = "aimTrainer")]
    AimTrainer,
    #[serde(rename = "memoryGame")]
    MemoryMatch,
    #[serde(rename = "bubblePop")]
    BubblePop,
}

/// Menu entries that are announced but have no implementation yet.
pub const UNAVAILABLE_GAMES: [&str; 3] = ["snakeGame", "reactionTest", "focusFlow"];

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::AimTrainer, GameKind::MemoryMatch, GameKind::BubblePop];

    pub fn id(self) -> &'static str {
        match self {
            GameKind::AimTrainer => "aimTrainer",
            GameKind::MemoryMatch => "memoryGame",
            GameKind::BubblePop => "bubblePop",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameKind::AimTrainer => "Aim Trainer",
            GameKind::MemoryMatch => "Memory Match",
            GameKind::BubblePop => "Bubble Pop",
        }
    }

    pub fn create(self) -> Box<dyn Game> {
        match self {
            GameKind::AimTrainer => Box::new(AimTrainer::new()),
            GameKind::MemoryMatch => Box::new(MemoryGame::new()),
            GameKind::BubblePop => Box::new(BubblePop::new()),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GameKind {
    type Err = SessionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = GameKind::ALL.into_iter().find(|k| k.id() == name) {
            return Ok(kind);
        }
        if UNAVAILABLE_GAMES.contains(&name) {
            Err(SessionError::Unavailable(name.to_string()))
        } else {
            Err(SessionError::Unknown(name.to_string()))
        }
    }
}
