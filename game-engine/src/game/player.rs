//! Player controller: intent flags, movement/jump physics, platform landing
//! and fire-intent resolution.

use bevy::prelude::*;

use crate::game::config::{StartPayload, Tunables, FLOOR_TOP, HALF_W, LANDING_INSET};
use crate::game::messages::FireBullet;
use crate::game::platforms::{Platform, PlatformKind};

pub const PLAYER_SIZE: Vec2 = Vec2::new(28.0, 40.0);
pub const PLAYER_SPAWN: Vec2 = Vec2::new(-HALF_W + 80.0, FLOOR_TOP + 20.0);
const STARTING_AMMO: i32 = 10;

/// Tolerance for the landing sweep so a platform bobbing upward under the
/// player does not break the crossing test.
const LANDING_SLACK: f32 = 2.0;

/// Discrete input intents. Keyboard and on-screen controls both write here;
/// `fire` is a one-shot latch cleared when consumed.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct InputIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
}

pub struct WineBoost {
    pub remaining: f32,
    /// Values cached at first activation, restored exactly on expiry.
    pub prev_jump: f32,
    pub prev_speed: f32,
}

#[derive(Component)]
pub struct Player {
    pub vel: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub jump_power: f32,
    pub grounded: bool,
    pub standing_on: Option<Entity>,
    pub health: i32,
    pub ammo: i32,
    pub coins: u32,
    pub facing: f32,
    pub anim: f32,
    pub hit_cooldown: f32,
    pub boost: Option<WineBoost>,
    pub godmode: bool,
    pub immortal: bool,
}

impl Player {
    pub fn from_profile(payload: &StartPayload, tunables: &Tunables) -> Self {
        let jump = if payload.mark_jump {
            tunables.jump_velocity * tunables.mark_jump_factor
        } else {
            tunables.jump_velocity
        };
        Self {
            vel: Vec2::ZERO,
            size: PLAYER_SIZE,
            speed: tunables.run_speed,
            jump_power: jump,
            grounded: false,
            standing_on: None,
            health: 100,
            ammo: STARTING_AMMO,
            coins: payload.starting_coins(tunables.coin_cap),
            facing: 1.0,
            anim: 0.0,
            hit_cooldown: 0.0,
            boost: None,
            godmode: payload.godmode_active(),
            immortal: payload.immortal(),
        }
    }
}

/// Merges keyboard state and the shell's on-screen controls into the intent
/// flags. Registered by the full engine only; headless tests write
/// [`InputIntent`] directly.
pub fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut intent: ResMut<InputIntent>) {
    let shell = crate::shell_controls();
    intent.left = shell.left || keys.pressed(KeyCode::ArrowLeft) || keys.pressed(KeyCode::KeyA);
    intent.right = shell.right || keys.pressed(KeyCode::ArrowRight) || keys.pressed(KeyCode::KeyD);
    intent.jump = shell.jump
        || keys.pressed(KeyCode::ArrowUp)
        || keys.pressed(KeyCode::KeyW)
        || keys.pressed(KeyCode::Space);
    if keys.just_pressed(KeyCode::KeyF)
        || keys.just_pressed(KeyCode::Enter)
        || crate::take_shell_fire()
    {
        intent.fire = true;
    }
}

/// Movement, gravity, passive carry and landing resolution.
///
/// Opposite presses cancel horizontal velocity but keep the facing from the
/// last exclusively held direction. At most one landing resolves per tick.
pub fn apply_movement(
    time: Res<Time>,
    tunables: Res<Tunables>,
    intent: Res<InputIntent>,
    mut players: Query<(&mut Transform, &mut Player)>,
    mut platforms: Query<(Entity, &Transform, &mut Platform), Without<Player>>,
) {
    let dt = time.delta_secs();
    let Ok((mut tf, mut p)) = players.get_single_mut() else {
        return;
    };

    p.vel.y += tunables.gravity * dt;

    match (intent.left, intent.right) {
        (true, false) => {
            p.vel.x = -p.speed;
            p.facing = -1.0;
        }
        (false, true) => {
            p.vel.x = p.speed;
            p.facing = 1.0;
        }
        _ => p.vel.x = 0.0,
    }

    if intent.jump && p.grounded {
        p.vel.y = p.jump_power;
        p.grounded = false;
        p.standing_on = None;
    }

    // Passive carry: a moving platform drags a player who is not walking.
    if p.vel.x == 0.0 {
        if let Some(e) = p.standing_on {
            if let Ok((_, _, plat)) = platforms.get(e) {
                tf.translation.x += plat.delta_x;
            }
        }
    }

    let old_y = tf.translation.y;
    let new_x = tf.translation.x + p.vel.x * dt;
    let new_y = old_y + p.vel.y * dt;
    if !new_x.is_finite() || !new_y.is_finite() {
        // Corrupt step: keep the previous valid position.
        p.vel = Vec2::ZERO;
        return;
    }
    let half = p.size * 0.5;
    tf.translation.x = new_x.clamp(-HALF_W + half.x, HALF_W - half.x);
    tf.translation.y = new_y;

    p.grounded = false;
    if p.vel.y <= 0.0 {
        let prev_bottom = old_y - half.y;
        for (entity, ptf, mut plat) in &mut platforms {
            let top = plat.top(ptf);
            let new_bottom = tf.translation.y - half.y;
            let reach = (p.size.x + plat.size.x) * 0.5 - LANDING_INSET;
            if prev_bottom >= top - LANDING_SLACK
                && new_bottom <= top
                && (tf.translation.x - ptf.translation.x).abs() < reach
            {
                tf.translation.y = top + half.y;
                p.vel.y = 0.0;
                p.grounded = true;
                p.standing_on = Some(entity);
                if plat.kind == PlatformKind::Vanishing && plat.vanish_in.is_none() {
                    plat.vanish_in = Some(tunables.vanish_delay);
                }
                break;
            }
        }
    }
    if !p.grounded {
        p.standing_on = None;
    }

    if p.grounded && p.vel.x != 0.0 {
        p.anim += dt * 10.0;
    } else if p.grounded {
        p.anim = 0.0;
    }
}

/// Consumes a queued fire intent: spends one ammo and requests a bullet at
/// the muzzle in the facing direction.
pub fn resolve_firing(
    mut intent: ResMut<InputIntent>,
    mut players: Query<(&Transform, &mut Player)>,
    mut fire: EventWriter<FireBullet>,
) {
    if !intent.fire {
        return;
    }
    intent.fire = false;
    let Ok((tf, mut p)) = players.get_single_mut() else {
        return;
    };
    if p.ammo <= 0 {
        return;
    }
    p.ammo -= 1;
    let muzzle = tf.translation.truncate() + Vec2::new(p.facing * (p.size.x * 0.5 + 8.0), 4.0);
    fire.send(FireBullet {
        pos: muzzle,
        dir: p.facing,
    });
}
