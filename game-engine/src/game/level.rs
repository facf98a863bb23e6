//! Session orchestration: level generation from the config table, clear
//! detection and advancement, reset handling, and the per-tick snapshot
//! published for the shell.

use bevy::prelude::*;
use rand::Rng;

use crate::game::bonus::{random_spot, spawn_collectible, Collectible, CollectibleKind};
use crate::game::config::{
    level_config, StartPayload, Tunables, FLOOR_TOP, HALF_W, WINE_MIN_TOP,
};
use crate::game::enemies::{Boss, BossEncounter, Enemy, BOSS_SIZE, ENEMY_SIZE};
use crate::game::messages::{ResetRequested, ShellEvent};
use crate::game::platforms::{platform_specs, spawn_platforms};
use crate::game::player::{InputIntent, Player, PLAYER_SIZE, PLAYER_SPAWN};
use crate::game::{GameEntity, LevelEntity};
use crate::skin::{palette, Appearance};
use crate::{GameBridge, PowerUps, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelPhase {
    /// Entity sets are (re)built on the next tick.
    Generating,
    Running,
}

/// Per-session state owned by the orchestrator. Rebuilt wholesale on level
/// transitions and resets, which also cancels every pending countdown.
#[derive(Resource, Debug)]
pub struct Session {
    pub level: i32,
    pub phase: LevelPhase,
    pub wine_collected: u32,
    pub wine_cooldown: f32,
    pub free_ammo: Option<f32>,
}

/// Payload handed over by the shell for the next session.
#[derive(Resource, Clone)]
pub struct PendingStart(pub StartPayload);

/// Profile of the running session, kept for in-place resets.
#[derive(Resource, Clone)]
pub struct ActiveProfile(pub StartPayload);

/// Builds the session when entering `Playing`. A resume from pause finds the
/// session already present and leaves it untouched.
pub fn start_session(
    mut commands: Commands,
    tunables: Res<Tunables>,
    pending: Option<Res<PendingStart>>,
    existing: Option<Res<Session>>,
) {
    if existing.is_some() {
        return;
    }
    let payload = pending.map(|p| p.0.clone()).unwrap_or_default();
    commands.remove_resource::<PendingStart>();
    info!(
        "starting session at level {} for {:?}",
        payload.starting_level(),
        payload.nickname
    );
    spawn_session(&mut commands, &payload, &tunables);
    commands.insert_resource(ActiveProfile(payload));
}

fn spawn_session(commands: &mut Commands, payload: &StartPayload, tunables: &Tunables) {
    commands.insert_resource(Session {
        level: payload.starting_level(),
        phase: LevelPhase::Generating,
        wine_collected: 0,
        wine_cooldown: tunables.wine_respawn_delay,
        free_ammo: None,
    });
    commands.spawn((
        Sprite {
            color: palette::HERO_RED,
            custom_size: Some(PLAYER_SIZE),
            ..default()
        },
        Transform::from_xyz(PLAYER_SPAWN.x, PLAYER_SPAWN.y, 1.0),
        Player::from_profile(payload, tunables),
        Appearance::Hero,
        GameEntity,
    ));
}

/// In-place session rebuild requested by the shell. Identical to a fresh
/// start with the same profile: every entity, counter and countdown is
/// replaced, so calling it twice yields the same state twice.
pub fn handle_reset(
    mut commands: Commands,
    mut resets: EventReader<ResetRequested>,
    tunables: Res<Tunables>,
    profile: Option<Res<ActiveProfile>>,
    entities: Query<Entity, With<GameEntity>>,
) {
    if resets.is_empty() {
        return;
    }
    resets.clear();
    let payload = profile.map(|p| p.0.clone()).unwrap_or_default();
    for entity in &entities {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<BossEncounter>();
    commands.insert_resource(InputIntent::default());
    spawn_session(&mut commands, &payload, &tunables);
}

/// Rebuilds the level's entity sets from the config table. Runs on the first
/// tick after a session start, level advance or reset.
pub fn generate_level(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut session: ResMut<Session>,
    level_entities: Query<Entity, With<LevelEntity>>,
    mut players: Query<(&mut Transform, &mut Player)>,
    mut shell: EventWriter<ShellEvent>,
) {
    if session.phase != LevelPhase::Generating {
        return;
    }
    for entity in &level_entities {
        commands.entity(entity).despawn_recursive();
    }

    let cfg = level_config(session.level);
    let mut rng = rand::thread_rng();

    let specs = platform_specs(cfg.platforms, &mut rng);
    let ledges: Vec<(Vec2, Vec2)> = specs.iter().map(|s| (s.pos, s.size)).collect();
    spawn_platforms(&mut commands, specs);

    for _ in 0..cfg.enemies {
        let x = rng.gen_range(-60.0..HALF_W - 60.0);
        commands.spawn((
            Sprite {
                color: palette::VILLAIN_PURPLE,
                custom_size: Some(ENEMY_SIZE),
                ..default()
            },
            Transform::from_xyz(x, FLOOR_TOP + ENEMY_SIZE.y * 0.5, 0.8),
            Enemy {
                speed: cfg.enemy_speed,
                size: ENEMY_SIZE,
            },
            Appearance::Enemy,
            GameEntity,
            LevelEntity,
        ));
    }

    for _ in 0..cfg.coins {
        let spot = spot_clear_of_spawn(&ledges, FLOOR_TOP, 9.0, &mut rng);
        spawn_collectible(&mut commands, CollectibleKind::Coin, spot, false);
    }
    for _ in 0..cfg.pizzas {
        let spot = spot_clear_of_spawn(&ledges, FLOOR_TOP, 12.0, &mut rng);
        spawn_collectible(&mut commands, CollectibleKind::Pizza, spot, false);
    }
    for _ in 0..cfg.brasilenas {
        let spot = spot_clear_of_spawn(&ledges, FLOOR_TOP, 13.0, &mut rng);
        spawn_collectible(&mut commands, CollectibleKind::Brasilena, spot, false);
    }
    let wine_spot = spot_clear_of_spawn(&ledges, WINE_MIN_TOP, 15.0, &mut rng);
    spawn_collectible(&mut commands, CollectibleKind::Wine, wine_spot, false);

    if cfg.boss {
        commands.insert_resource(BossEncounter::default());
        commands.spawn((
            Sprite {
                color: palette::VILLAIN_DARK,
                custom_size: Some(BOSS_SIZE),
                ..default()
            },
            Transform::from_xyz(0.0, 120.0, 0.9),
            Boss::new(tunables.boss_health, 120.0),
            Appearance::Boss,
            GameEntity,
            LevelEntity,
        ));
        shell.send(ShellEvent::BossHealth {
            current: tunables.boss_health,
            max: tunables.boss_health,
        });
    } else {
        commands.remove_resource::<BossEncounter>();
    }

    session.wine_collected = 0;
    session.wine_cooldown = tunables.wine_respawn_delay;
    session.free_ammo = None;

    if let Ok((mut tf, mut player)) = players.get_single_mut() {
        tf.translation = PLAYER_SPAWN.extend(1.0);
        player.vel = Vec2::ZERO;
        player.grounded = false;
        player.standing_on = None;
    }

    info!("level {} generated (boss: {})", cfg.level, cfg.boss);
    session.phase = LevelPhase::Running;
}

/// Placement that keeps freshly generated pickups off the player's spawn
/// point, so a new level never starts with an accidental collection.
fn spot_clear_of_spawn(
    ledges: &[(Vec2, Vec2)],
    min_top: f32,
    item_half_h: f32,
    rng: &mut impl Rng,
) -> Vec2 {
    for _ in 0..8 {
        let spot = random_spot(ledges.iter().copied(), min_top, item_half_h, rng);
        if (spot.x - PLAYER_SPAWN.x).abs() > 80.0 || (spot.y - PLAYER_SPAWN.y).abs() > 80.0 {
            return spot;
        }
    }
    random_spot(ledges.iter().copied(), min_top, item_half_h, rng)
}

/// Non-boss levels clear once enemies and all level-born collectibles are
/// gone; the next level is then generated wholesale. Boss levels advance
/// through the encounter flow instead.
pub fn check_level_clear(
    mut session: ResMut<Session>,
    enemies: Query<(), With<Enemy>>,
    items: Query<&Collectible>,
) {
    if session.phase != LevelPhase::Running {
        return;
    }
    if level_config(session.level).boss {
        return;
    }
    if !enemies.is_empty() {
        return;
    }
    if items.iter().any(|c| !c.from_boss) {
        return;
    }
    session.level += 1;
    session.phase = LevelPhase::Generating;
}

/// Publishes the read-only snapshot for the shell and emits a progress event
/// whenever coins or level changed. The invulnerable identity is pinned to
/// full health here, after all damage arbitration for the tick.
pub fn publish_snapshot(
    mut bridge: ResMut<GameBridge>,
    session: Res<Session>,
    mut players: Query<&mut Player>,
    mut shell: EventWriter<ShellEvent>,
) {
    let Ok(mut player) = players.get_single_mut() else {
        return;
    };
    if player.immortal {
        player.health = 100;
    }
    let snapshot = Snapshot {
        health: player.health.clamp(0, 100),
        ammo: player.ammo.max(0),
        coins: player.coins,
        level: session.level,
        power_ups: PowerUps {
            jump_boost: player.boost.is_some(),
            speed_boost: player.boost.is_some(),
            remaining: player.boost.as_ref().map(|b| b.remaining).unwrap_or(0.0),
        },
    };
    if snapshot.coins != bridge.snapshot.coins || snapshot.level != bridge.snapshot.level {
        shell.send(ShellEvent::Progress {
            total_coins: snapshot.coins,
            max_level: snapshot.level,
        });
    }
    bridge.snapshot = snapshot;
}

/// Removes every session entity and resource. Registered on entry to each
/// non-gameplay state, so stopping or finishing a run always leaves a clean
/// world behind (the snapshot stays for the shell to read).
pub fn teardown_session(mut commands: Commands, entities: Query<Entity, With<GameEntity>>) {
    for entity in &entities {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<Session>();
    commands.remove_resource::<BossEncounter>();
    commands.remove_resource::<ActiveProfile>();
    commands.insert_resource(InputIntent::default());
}
