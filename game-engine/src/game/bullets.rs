//! Projectiles: spawn requests, constant-velocity advancement, off-screen
//! culling and hit resolution against enemies and the boss.

use bevy::prelude::*;

use crate::game::collision::overlaps;
use crate::game::config::{Tunables, HALF_W};
use crate::game::enemies::{register_boss_hit, Boss, BossEncounter, Enemy};
use crate::game::level::Session;
use crate::game::messages::{CoinBurst, FireBullet, ShellEvent};
use crate::game::player::Player;
use crate::game::{GameEntity, LevelEntity};
use crate::skin::{palette, Appearance};

pub const BULLET_SIZE: Vec2 = Vec2::new(10.0, 6.0);

#[derive(Component)]
pub struct Bullet {
    pub vel_x: f32,
    pub size: Vec2,
}

/// Turns queued fire requests into bullet entities.
pub fn spawn_bullets(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut requests: EventReader<FireBullet>,
) {
    for req in requests.read() {
        commands.spawn((
            Sprite {
                color: palette::ELECTRIC_CYAN,
                custom_size: Some(BULLET_SIZE),
                ..default()
            },
            Transform::from_xyz(req.pos.x, req.pos.y, 1.0),
            Bullet {
                vel_x: req.dir * tunables.bullet_speed,
                size: BULLET_SIZE,
            },
            Appearance::Bullet,
            GameEntity,
            LevelEntity,
        ));
    }
}

/// Advances bullets, culls the ones fully past either horizontal edge and
/// resolves hits. One bullet removes at most one enemy; a boss hit consumes
/// the bullet, feeds the drop state machine and, on the killing hit, ends
/// the session in victory.
pub fn advance_bullets(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut session: ResMut<Session>,
    mut bullets: Query<(Entity, &mut Transform, &Bullet)>,
    enemies: Query<(Entity, &Transform, &Enemy), (Without<Bullet>, Without<Player>)>,
    mut bosses: Query<(Entity, &Transform, &mut Boss), (Without<Bullet>, Without<Player>)>,
    mut encounter: Option<ResMut<BossEncounter>>,
    mut players: Query<&mut Player>,
    mut bursts: EventWriter<CoinBurst>,
    mut shell: EventWriter<ShellEvent>,
) {
    let dt = time.delta_secs();
    let Ok(mut player) = players.get_single_mut() else {
        return;
    };

    'bullets: for (bullet_entity, mut btf, bullet) in &mut bullets {
        btf.translation.x += bullet.vel_x * dt;
        let bpos = btf.translation.truncate();
        let half = bullet.size.x * 0.5;
        if bpos.x - half > HALF_W || bpos.x + half < -HALF_W {
            commands.entity(bullet_entity).despawn_recursive();
            continue;
        }

        for (enemy_entity, etf, enemy) in &enemies {
            if overlaps(bpos, bullet.size, etf.translation.truncate(), enemy.size) {
                commands.entity(enemy_entity).despawn_recursive();
                commands.entity(bullet_entity).despawn_recursive();
                player.coins = (player.coins + tunables.kill_reward).min(tunables.coin_cap);
                continue 'bullets;
            }
        }

        let Some(enc) = encounter.as_mut() else {
            continue;
        };
        let Ok((boss_entity, boss_tf, mut boss)) = bosses.get_single_mut() else {
            continue;
        };
        if boss.health <= 0 {
            continue;
        }
        if !overlaps(bpos, bullet.size, boss_tf.translation.truncate(), boss.size) {
            continue;
        }

        commands.entity(bullet_entity).despawn_recursive();
        player.coins = (player.coins + tunables.boss_hit_reward).min(tunables.coin_cap);

        let outcome = register_boss_hit(&mut boss, &mut **enc, tunables.bullet_damage);
        shell.send(ShellEvent::BossHealth {
            current: boss.health.max(0),
            max: boss.max_health,
        });
        for _ in &outcome.dropped {
            bursts.send(CoinBurst {
                pos: boss_tf.translation.truncate(),
                count: tunables.boss_drop_coins,
                from_boss: true,
            });
        }
        if outcome.defeated {
            commands.entity(boss_entity).despawn_recursive();
            session.level += 1;
            let score = player.coins * 10 + session.level.max(0) as u32 * 100;
            shell.send(ShellEvent::GameWin {
                coins: player.coins,
                score,
            });
            enc.coin_window = Some(tunables.coin_window);
        }
    }
}
