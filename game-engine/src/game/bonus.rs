//! Collectibles and their lifecycles: coins, pizza (health), brasilena
//! (ammo) and wine (timed jump/speed boost). This module is the single
//! authority for pickup effects, the wine spawn throttle, the free-ammo
//! scheduler and the post-boss coin magnet.

use bevy::prelude::*;
use rand::Rng;

use crate::game::collision::overlaps;
use crate::game::config::{level_config, Tunables, FLOOR_TOP, HALF_W, WINE_MIN_TOP};
use crate::game::enemies::BossEncounter;
use crate::game::level::Session;
use crate::game::messages::{CoinBurst, PowerUpKind, ShellEvent};
use crate::game::platforms::Platform;
use crate::game::player::{Player, WineBoost};
use crate::game::{GameEntity, LevelEntity};
use crate::skin::{palette, Appearance};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectibleKind {
    Coin,
    Pizza,
    Brasilena,
    Wine,
}

#[derive(Component)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub size: Vec2,
    /// Boss-dropped coins are pulled toward the player while the post-defeat
    /// collection window runs, and do not block level clearing.
    pub from_boss: bool,
}

pub fn spawn_collectible(
    commands: &mut Commands,
    kind: CollectibleKind,
    pos: Vec2,
    from_boss: bool,
) {
    let (size, color, appearance) = match kind {
        CollectibleKind::Coin => (Vec2::splat(18.0), palette::GOLD, Appearance::Coin),
        CollectibleKind::Pizza => (Vec2::splat(24.0), palette::HERO_ORANGE, Appearance::Pizza),
        CollectibleKind::Brasilena => {
            (Vec2::new(14.0, 26.0), palette::GROUND_BROWN, Appearance::Brasilena)
        }
        CollectibleKind::Wine => (Vec2::new(16.0, 30.0), palette::LEAF_GREEN, Appearance::Wine),
    };
    commands.spawn((
        Sprite {
            color,
            custom_size: Some(size),
            ..default()
        },
        Transform::from_xyz(pos.x, pos.y, 0.5),
        Collectible {
            kind,
            size,
            from_boss,
        },
        appearance,
        GameEntity,
        LevelEntity,
    ));
}

/// Picks a resting spot on a random platform whose top clears `min_top`.
/// With no suitable platform the spawn falls back to a broad-area random
/// position instead of failing.
pub fn random_spot(
    ledges: impl Iterator<Item = (Vec2, Vec2)>,
    min_top: f32,
    item_half_h: f32,
    rng: &mut impl Rng,
) -> Vec2 {
    let candidates: Vec<(Vec2, Vec2)> = ledges
        .filter(|(pos, size)| pos.y + size.y * 0.5 >= min_top)
        .collect();
    if candidates.is_empty() {
        return Vec2::new(
            rng.gen_range(-HALF_W + 40.0..HALF_W - 40.0),
            rng.gen_range(FLOOR_TOP + 40.0..200.0),
        );
    }
    let (pos, size) = candidates[rng.gen_range(0..candidates.len())];
    let margin = (size.x * 0.5 - 12.0).max(0.0);
    Vec2::new(
        pos.x + rng.gen_range(-margin..=margin),
        pos.y + size.y * 0.5 + item_half_h + 2.0,
    )
}

/// Resolves every collectible overlapping the player and applies its effect.
pub fn collect_pickups(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut session: ResMut<Session>,
    mut players: Query<(&Transform, &mut Player)>,
    items: Query<(Entity, &Transform, &Collectible), Without<Player>>,
    mut shell: EventWriter<ShellEvent>,
) {
    let Ok((ptf, mut player)) = players.get_single_mut() else {
        return;
    };
    let ppos = ptf.translation.truncate();

    for (entity, itf, item) in &items {
        if !overlaps(ppos, player.size, itf.translation.truncate(), item.size) {
            continue;
        }
        match item.kind {
            CollectibleKind::Coin => {
                player.coins = (player.coins + 1).min(tunables.coin_cap);
            }
            CollectibleKind::Pizza => {
                player.health = (player.health + tunables.heal_amount).min(100);
            }
            CollectibleKind::Brasilena => {
                player.ammo += tunables.ammo_amount;
                session.free_ammo = None;
            }
            CollectibleKind::Wine => {
                session.wine_collected += 1;
                match player.boost.take() {
                    // Re-collection resets the clock; the multiplier never
                    // compounds.
                    Some(mut boost) => {
                        boost.remaining = tunables.wine_duration;
                        player.boost = Some(boost);
                    }
                    None => {
                        let boost = WineBoost {
                            remaining: tunables.wine_duration,
                            prev_jump: player.jump_power,
                            prev_speed: player.speed,
                        };
                        player.jump_power *= tunables.wine_jump_multiplier;
                        player.speed *= tunables.wine_speed_multiplier;
                        player.boost = Some(boost);
                        shell.send(ShellEvent::PowerUpShown {
                            kind: PowerUpKind::JumpBoost,
                        });
                        shell.send(ShellEvent::PowerUpShown {
                            kind: PowerUpKind::SpeedBoost,
                        });
                    }
                }
            }
        }
        commands.entity(entity).despawn_recursive();
    }
}

/// Counts the wine boost down and restores the cached pre-boost stats
/// exactly on expiry.
pub fn tick_wine_boost(
    time: Res<Time>,
    mut players: Query<&mut Player>,
    mut shell: EventWriter<ShellEvent>,
) {
    let Ok(mut player) = players.get_single_mut() else {
        return;
    };
    let Some(mut boost) = player.boost.take() else {
        return;
    };
    boost.remaining -= time.delta_secs();
    if boost.remaining > 0.0 {
        player.boost = Some(boost);
        return;
    }
    player.jump_power = boost.prev_jump;
    player.speed = boost.prev_speed;
    shell.send(ShellEvent::PowerUpRemoved {
        kind: PowerUpKind::JumpBoost,
    });
    shell.send(ShellEvent::PowerUpRemoved {
        kind: PowerUpKind::SpeedBoost,
    });
}

/// Schedules one free brasilena a fixed delay after the player runs dry.
/// At most one spawn is pending; picking ammo back up cancels it.
pub fn tick_free_ammo(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut session: ResMut<Session>,
    players: Query<&Player>,
    items: Query<&Collectible>,
    platforms: Query<(&Transform, &Platform)>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    if player.ammo > 0 {
        session.free_ammo = None;
        return;
    }
    let live_brasilena = items
        .iter()
        .any(|c| c.kind == CollectibleKind::Brasilena);

    match session.free_ammo {
        None => {
            if !live_brasilena {
                session.free_ammo = Some(tunables.free_ammo_delay);
            }
        }
        Some(t) => {
            let t = t - time.delta_secs();
            if t > 0.0 {
                session.free_ammo = Some(t);
            } else {
                session.free_ammo = None;
                let mut rng = rand::thread_rng();
                let spot = random_spot(
                    platforms
                        .iter()
                        .map(|(tf, plat)| (tf.translation.truncate(), plat.size)),
                    FLOOR_TOP,
                    13.0,
                    &mut rng,
                );
                spawn_collectible(&mut commands, CollectibleKind::Brasilena, spot, false);
            }
        }
    }
}

/// Wine respawn throttle: once no wine is live, a new bottle appears at most
/// every 30 s on a sufficiently high platform, until the per-level cap on
/// collected wine is reached.
pub fn spawn_wine(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut session: ResMut<Session>,
    items: Query<&Collectible>,
    platforms: Query<(&Transform, &Platform)>,
) {
    if session.wine_collected >= level_config(session.level).wine_cap {
        return;
    }
    if items.iter().any(|c| c.kind == CollectibleKind::Wine) {
        session.wine_cooldown = tunables.wine_respawn_delay;
        return;
    }
    session.wine_cooldown -= time.delta_secs();
    if session.wine_cooldown > 0.0 {
        return;
    }
    session.wine_cooldown = tunables.wine_respawn_delay;
    let mut rng = rand::thread_rng();
    let spot = random_spot(
        platforms
            .iter()
            .map(|(tf, plat)| (tf.translation.truncate(), plat.size)),
        WINE_MIN_TOP,
        15.0,
        &mut rng,
    );
    spawn_collectible(&mut commands, CollectibleKind::Wine, spot, false);
}

/// Materializes bulk coin drops with a little jitter around the origin.
pub fn spawn_coin_bursts(mut commands: Commands, mut bursts: EventReader<CoinBurst>) {
    let mut rng = rand::thread_rng();
    for burst in bursts.read() {
        for _ in 0..burst.count {
            let jitter = Vec2::new(rng.gen_range(-60.0..60.0), rng.gen_range(-30.0..50.0));
            let mut pos = burst.pos + jitter;
            pos.x = pos.x.clamp(-HALF_W + 20.0, HALF_W - 20.0);
            spawn_collectible(&mut commands, CollectibleKind::Coin, pos, burst.from_boss);
        }
    }
}

/// While the post-defeat collection window runs, boss coins steer toward the
/// player.
pub fn magnet_boss_coins(
    time: Res<Time>,
    tunables: Res<Tunables>,
    encounter: Option<Res<BossEncounter>>,
    players: Query<&Transform, (With<Player>, Without<Collectible>)>,
    mut coins: Query<(&mut Transform, &Collectible), Without<Player>>,
) {
    let Some(encounter) = encounter else {
        return;
    };
    if encounter.coin_window.is_none() {
        return;
    }
    let Ok(ptf) = players.get_single() else {
        return;
    };
    let target = ptf.translation.truncate();
    let step = tunables.magnet_speed * time.delta_secs();
    for (mut tf, coin) in &mut coins {
        if !coin.from_boss || coin.kind != CollectibleKind::Coin {
            continue;
        }
        let to_player = target - tf.translation.truncate();
        if to_player.length() > 1.0 {
            let delta = to_player.normalize() * step.min(to_player.length());
            tf.translation.x += delta.x;
            tf.translation.y += delta.y;
        }
    }
}
