//! Enemies and the boss encounter.
//!
//! Regular enemies patrol toward the player's column. The boss bounces
//! between the canvas edges with a sine bob and owns a drop-threshold state
//! machine: each remaining-health fraction pays out a bulk coin drop at most
//! once, the 0% entry doubling as the terminal drop.

use bevy::prelude::*;

use crate::game::config::{Tunables, HALF_W};
use crate::game::player::Player;
use crate::AppState;

pub const ENEMY_SIZE: Vec2 = Vec2::new(30.0, 30.0);
pub const BOSS_SIZE: Vec2 = Vec2::new(90.0, 90.0);

const DROP_FRACTIONS: [f32; 4] = [0.75, 0.5, 0.25, 0.0];

#[derive(Component)]
pub struct Enemy {
    pub speed: f32,
    pub size: Vec2,
}

#[derive(Component)]
pub struct Boss {
    pub health: i32,
    pub max_health: i32,
    pub dir: f32,
    pub origin_y: f32,
    pub t: f32,
    pub size: Vec2,
}

impl Boss {
    pub fn new(max_health: i32, origin_y: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            dir: 1.0,
            origin_y,
            t: 0.0,
            size: BOSS_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Threshold {
    pub fraction: f32,
    pub dropped: bool,
}

/// Bookkeeping for one boss fight. Rebuilt on level generation, so nothing
/// leaks across encounters.
#[derive(Resource, Debug)]
pub struct BossEncounter {
    /// Descending remaining-health fractions, each firing at most once.
    pub thresholds: Vec<Threshold>,
    /// Countdown of the post-defeat coin-collection window.
    pub coin_window: Option<f32>,
}

impl Default for BossEncounter {
    fn default() -> Self {
        Self {
            thresholds: DROP_FRACTIONS
                .iter()
                .map(|&fraction| Threshold {
                    fraction,
                    dropped: false,
                })
                .collect(),
            coin_window: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct BossHitOutcome {
    /// Fractions whose bulk drop fired on this hit.
    pub dropped: Vec<f32>,
    pub defeated: bool,
}

/// Applies one bullet hit to the boss and advances the drop state machine.
///
/// Per hit, the first crossed-and-unfired threshold (descending) pays out.
/// Defeat additionally pays the terminal 0% drop unless that entry already
/// fired; both share the same bookkeeping, so neither can fire twice.
pub fn register_boss_hit(boss: &mut Boss, enc: &mut BossEncounter, damage: i32) -> BossHitOutcome {
    boss.health -= damage;
    let fraction = boss.health.max(0) as f32 / boss.max_health.max(1) as f32;

    let mut outcome = BossHitOutcome::default();
    for th in enc.thresholds.iter_mut() {
        if !th.dropped && fraction <= th.fraction {
            th.dropped = true;
            outcome.dropped.push(th.fraction);
            break;
        }
    }

    if boss.health <= 0 {
        outcome.defeated = true;
        if let Some(th) = enc
            .thresholds
            .iter_mut()
            .find(|th| th.fraction == 0.0 && !th.dropped)
        {
            th.dropped = true;
            outcome.dropped.push(0.0);
        }
    }
    outcome
}

/// Chase-lite patrol: enemies drift toward the player's last known column,
/// clamped to the canvas. No vertical movement.
pub fn move_enemies(
    time: Res<Time>,
    players: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&mut Transform, &Enemy), Without<Player>>,
) {
    let dt = time.delta_secs();
    let Ok(ptf) = players.get_single() else {
        return;
    };
    for (mut tf, enemy) in &mut enemies {
        let dx = ptf.translation.x - tf.translation.x;
        if dx.abs() > 1.0 {
            let half = enemy.size.x * 0.5;
            tf.translation.x = (tf.translation.x + dx.signum() * enemy.speed * dt)
                .clamp(-HALF_W + half, HALF_W - half);
        }
    }
}

/// Boss motion: horizontal bounce between canvas edges plus a cosmetic
/// vertical sine bob driven by elapsed fight time.
pub fn move_boss(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut bosses: Query<(&mut Transform, &mut Boss)>,
) {
    let dt = time.delta_secs();
    for (mut tf, mut boss) in &mut bosses {
        boss.t += dt;
        let half = boss.size.x * 0.5;
        let mut x = tf.translation.x + boss.dir * tunables.boss_speed * dt;
        if x + half > HALF_W {
            x = HALF_W - half;
            boss.dir = -1.0;
        } else if x - half < -HALF_W {
            x = -HALF_W + half;
            boss.dir = 1.0;
        }
        tf.translation.x = x;
        tf.translation.y = boss.origin_y + (boss.t * 1.5).sin() * 30.0;
    }
}

/// Counts down the post-defeat coin-collection window; on expiry the session
/// ends in victory regardless of uncollected coins.
pub fn tick_coin_window(
    time: Res<Time>,
    enc: Option<ResMut<BossEncounter>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(mut enc) = enc else {
        return;
    };
    let Some(t) = enc.coin_window else {
        return;
    };
    let t = t - time.delta_secs();
    if t > 0.0 {
        enc.coin_window = Some(t);
    } else {
        enc.coin_window = None;
        next_state.set(AppState::Victory);
    }
}
