//! Shared collision primitive and contact-damage arbitration.
//!
//! Every overlap test in the game goes through [`overlaps`] so boundary
//! semantics stay consistent: rectangles that merely touch edge-to-edge do
//! not collide.

use bevy::prelude::*;

use crate::game::config::Tunables;
use crate::game::enemies::{Boss, Enemy};
use crate::game::messages::ShellEvent;
use crate::game::player::Player;
use crate::AppState;

/// Axis-aligned overlap test on center positions and full sizes.
/// Strict on all four sides: a shared edge is not an overlap.
pub fn overlaps(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    (a_pos.x - b_pos.x).abs() < (a_size.x + b_size.x) * 0.5
        && (a_pos.y - b_pos.y).abs() < (a_size.y + b_size.y) * 0.5
}

/// Applies touch damage from enemies and the boss with a shared cooldown, so
/// a sustained overlap does not drain health every tick. Godmode negates the
/// hit and refills health instead.
pub fn contact_damage(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut players: Query<(&Transform, &mut Player)>,
    enemies: Query<(&Transform, &Enemy), Without<Player>>,
    bosses: Query<(&Transform, &Boss), Without<Player>>,
    mut shell: EventWriter<ShellEvent>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Ok((ptf, mut player)) = players.get_single_mut() else {
        return;
    };
    player.hit_cooldown = (player.hit_cooldown - time.delta_secs()).max(0.0);
    let ppos = ptf.translation.truncate();

    let mut damage = 0;
    for (etf, enemy) in &enemies {
        if overlaps(ppos, player.size, etf.translation.truncate(), enemy.size) {
            damage = damage.max(tunables.enemy_touch_damage);
        }
    }
    for (btf, boss) in &bosses {
        if overlaps(ppos, player.size, btf.translation.truncate(), boss.size) {
            damage = damage.max(tunables.boss_touch_damage);
        }
    }
    if damage == 0 {
        return;
    }

    if player.godmode || player.immortal {
        player.health = 100;
        return;
    }
    if player.hit_cooldown > 0.0 {
        return;
    }
    player.hit_cooldown = tunables.hit_cooldown;
    player.health = (player.health - damage).clamp(0, 100);

    if player.health == 0 {
        shell.send(ShellEvent::GameOver {
            coins: player.coins,
        });
        next_state.set(AppState::GameOver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> (Vec2, Vec2) {
        (Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (rect(0.0, 0.0, 10.0, 10.0), rect(4.0, 4.0, 10.0, 10.0)),
            (rect(0.0, 0.0, 10.0, 10.0), rect(40.0, 0.0, 10.0, 10.0)),
            (rect(-3.0, 7.0, 2.0, 8.0), rect(0.0, 0.0, 5.0, 5.0)),
        ];
        for ((ap, asz), (bp, bsz)) in cases {
            assert_eq!(overlaps(ap, asz, bp, bsz), overlaps(bp, bsz, ap, asz));
        }
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let (ap, asz) = rect(0.0, 0.0, 10.0, 10.0);
        // Exactly adjacent on the right edge and on the top edge.
        assert!(!overlaps(ap, asz, Vec2::new(10.0, 0.0), Vec2::splat(10.0)));
        assert!(!overlaps(ap, asz, Vec2::new(0.0, 10.0), Vec2::splat(10.0)));
        // One unit closer does overlap.
        assert!(overlaps(ap, asz, Vec2::new(9.0, 0.0), Vec2::splat(10.0)));
    }

    #[test]
    fn containment_counts_as_overlap() {
        let (ap, asz) = rect(0.0, 0.0, 20.0, 20.0);
        assert!(overlaps(ap, asz, Vec2::ZERO, Vec2::splat(4.0)));
    }
}
