//! Cross-module events.
//!
//! Everything that used to flow through ambient globals travels here instead:
//! producers write intent, consumers apply it later in the same tick.

use bevy::prelude::*;
use serde::Serialize;

/// Request to spawn a player bullet. `dir` is -1.0 or 1.0.
#[derive(Event, Clone, Copy, Debug)]
pub struct FireBullet {
    pub pos: Vec2,
    pub dir: f32,
}

/// Bulk coin drop, e.g. when boss health crosses a drop threshold.
#[derive(Event, Clone, Copy, Debug)]
pub struct CoinBurst {
    pub pos: Vec2,
    pub count: u32,
    pub from_boss: bool,
}

/// Shell-requested in-place session rebuild.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct ResetRequested;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    JumpBoost,
    SpeedBoost,
}

/// Edge notifications for the shell. Each is queued exactly once per
/// transition; the wasm bridge forwards them to a JS event queue.
#[derive(Event, Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShellEvent {
    GameOver { coins: u32 },
    GameWin { coins: u32, score: u32 },
    PowerUpShown { kind: PowerUpKind },
    PowerUpRemoved { kind: PowerUpKind },
    BossHealth { current: i32, max: i32 },
    Progress { total_coins: u32, max_level: i32 },
}
