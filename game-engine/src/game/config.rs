//! Session configuration: gameplay tunables, the per-level generation table
//! and the profile payload supplied by the shell when a session starts.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// World constants
// ---------------------------------------------------------------------------

pub const WORLD_W: f32 = 960.0;
pub const WORLD_H: f32 = 640.0;
pub const HALF_W: f32 = WORLD_W / 2.0;
pub const HALF_H: f32 = WORLD_H / 2.0;

/// Top surface of the sand floor spanning the whole canvas.
pub const FLOOR_TOP: f32 = -HALF_H + 40.0;

/// Wine may only be placed on platforms at least this far above the floor.
pub const WINE_MIN_TOP: f32 = FLOOR_TOP + 60.0;

pub const MAX_LEVEL: i32 = 10;
pub const BOSS_LEVEL: i32 = 10;

/// Horizontal inset applied to a platform's span during landing resolution,
/// so grazing a platform corner does not count as standing on it.
pub const LANDING_INSET: f32 = 8.0;

// ---------------------------------------------------------------------------
// Tunables
// ---------------------------------------------------------------------------

/// Gameplay constants a shell build may want to retune without touching the
/// systems that consume them.
#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub gravity: f32,
    pub run_speed: f32,
    pub jump_velocity: f32,
    /// Base jump velocity factor applied when the profile sets `markJump`.
    pub mark_jump_factor: f32,
    pub bullet_speed: f32,

    /// Canonical wine power-up: jump ×2, speed ×1.5, for 10 s.
    pub wine_jump_multiplier: f32,
    pub wine_speed_multiplier: f32,
    pub wine_duration: f32,
    pub wine_respawn_delay: f32,

    pub heal_amount: i32,
    pub ammo_amount: i32,
    pub free_ammo_delay: f32,
    pub coin_cap: u32,

    pub hit_cooldown: f32,
    pub enemy_touch_damage: i32,
    pub boss_touch_damage: i32,
    pub bullet_damage: i32,
    pub kill_reward: u32,
    pub boss_hit_reward: u32,

    pub boss_health: i32,
    pub boss_speed: f32,
    pub boss_drop_coins: u32,
    pub coin_window: f32,
    pub magnet_speed: f32,

    pub vanish_delay: f32,
    pub platform_speed: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            gravity: -1400.0,
            run_speed: 260.0,
            jump_velocity: 620.0,
            mark_jump_factor: 1.3,
            bullet_speed: 540.0,

            wine_jump_multiplier: 2.0,
            wine_speed_multiplier: 1.5,
            wine_duration: 10.0,
            wine_respawn_delay: 30.0,

            heal_amount: 20,
            ammo_amount: 10,
            free_ammo_delay: 5.0,
            coin_cap: 1000,

            hit_cooldown: 0.4,
            enemy_touch_damage: 10,
            boss_touch_damage: 20,
            bullet_damage: 20,
            kill_reward: 2,
            boss_hit_reward: 2,

            boss_health: 1000,
            boss_speed: 140.0,
            boss_drop_coins: 12,
            coin_window: 10.0,
            magnet_speed: 420.0,

            vanish_delay: 1.2,
            platform_speed: 60.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Level table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfig {
    pub level: i32,
    pub enemies: u32,
    pub enemy_speed: f32,
    pub coins: u32,
    pub pizzas: u32,
    pub brasilenas: u32,
    pub platforms: u32,
    pub wine_cap: u32,
    pub boss: bool,
}

/// Generation parameters for `level`. Total over all inputs: anything below
/// the first level falls back to the level-1 row, anything past the boss
/// level clamps to the boss row.
pub fn level_config(level: i32) -> LevelConfig {
    let level = level.clamp(1, BOSS_LEVEL);
    if level == BOSS_LEVEL {
        return LevelConfig {
            level,
            enemies: 0,
            enemy_speed: 0.0,
            coins: 6,
            pizzas: 2,
            brasilenas: 2,
            platforms: 7,
            wine_cap: 15,
            boss: true,
        };
    }
    LevelConfig {
        level,
        enemies: 2 + level as u32,
        enemy_speed: 55.0 + level as f32 * 8.0,
        coins: 4 + 2 * level as u32,
        pizzas: 1 + level as u32 / 3,
        brasilenas: 1 + level as u32 / 4,
        platforms: 5 + level as u32 / 2,
        wine_cap: 10,
        boss: false,
    }
}

// ---------------------------------------------------------------------------
// Shell payload
// ---------------------------------------------------------------------------

/// Reserved nickname that switches godmode on regardless of the flag.
const GODMODE_NICKNAME: &str = "ercole";
/// Reserved nickname whose player is pinned to full health, always.
const IMMORTAL_NICKNAME: &str = "bacco";

pub fn is_godmode_name(nickname: &str) -> bool {
    nickname.trim().eq_ignore_ascii_case(GODMODE_NICKNAME)
}

pub fn is_immortal_name(nickname: &str) -> bool {
    nickname.trim().eq_ignore_ascii_case(IMMORTAL_NICKNAME)
}

/// Aggregate progress persisted by the shell between sessions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Progress {
    pub total_coins: u32,
    pub max_level: i32,
}

/// Payload passed to `start_game` by the shell.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartPayload {
    pub nickname: String,
    pub email: String,
    pub godmode: bool,
    pub mark_jump: bool,
    pub progress: Progress,
}

impl StartPayload {
    pub fn godmode_active(&self) -> bool {
        self.godmode || is_godmode_name(&self.nickname)
    }

    pub fn immortal(&self) -> bool {
        is_immortal_name(&self.nickname)
    }

    /// Starting level seeded from persisted progress.
    pub fn starting_level(&self) -> i32 {
        self.progress.max_level.clamp(1, BOSS_LEVEL)
    }

    /// Starting coins seeded from persisted progress, under the run cap.
    pub fn starting_coins(&self, cap: u32) -> u32 {
        self.progress.total_coins.min(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_levels_fall_back_to_level_one() {
        assert_eq!(level_config(0), level_config(1));
        assert_eq!(level_config(-3), level_config(1));
        assert_eq!(level_config(1).level, 1);
        assert!(!level_config(1).boss);
    }

    #[test]
    fn boss_row_is_terminal() {
        let cfg = level_config(BOSS_LEVEL);
        assert!(cfg.boss);
        assert_eq!(cfg.enemies, 0);
        assert_eq!(cfg.wine_cap, 15);
        assert_eq!(level_config(BOSS_LEVEL + 5), cfg);
    }

    #[test]
    fn counts_scale_with_level() {
        for lv in 1..BOSS_LEVEL - 1 {
            let lo = level_config(lv);
            let hi = level_config(lv + 1);
            assert!(hi.enemies >= lo.enemies);
            assert!(hi.coins >= lo.coins);
        }
    }

    #[test]
    fn reserved_names_are_trimmed_and_case_insensitive() {
        assert!(is_godmode_name("  ERCOLE "));
        assert!(is_immortal_name("Bacco"));
        assert!(!is_godmode_name("bacco"));
        assert!(!is_immortal_name("somebody"));
    }

    #[test]
    fn payload_defaults_tolerate_missing_fields() {
        let p: StartPayload = serde_json::from_str(r#"{"nickname":"anna"}"#).unwrap();
        assert_eq!(p.nickname, "anna");
        assert!(!p.godmode_active());
        assert_eq!(p.starting_level(), 1);
        assert_eq!(p.starting_coins(1000), 0);
    }
}
