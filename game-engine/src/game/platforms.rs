//! Platforms: the sand floor, randomized ledges, horizontally oscillating
//! carriers and platforms that crumble shortly after being stood on.

use bevy::prelude::*;
use rand::Rng;

use crate::game::config::{Tunables, FLOOR_TOP, HALF_W, WORLD_W};
use crate::game::{GameEntity, LevelEntity};
use crate::skin::palette;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformKind {
    Static,
    Moving,
    Vanishing,
}

#[derive(Component)]
pub struct Platform {
    pub kind: PlatformKind,
    pub size: Vec2,
    /// Horizontal displacement applied this tick; a player standing on the
    /// platform and not walking is carried by this amount.
    pub delta_x: f32,
    pub dir: f32,
    pub origin_y: f32,
    pub phase: f32,
    /// Countdown started the first time something lands on a vanishing
    /// platform. `None` until then.
    pub vanish_in: Option<f32>,
}

impl Platform {
    pub fn new(kind: PlatformKind, size: Vec2, origin_y: f32) -> Self {
        Self {
            kind,
            size,
            delta_x: 0.0,
            dir: 1.0,
            origin_y,
            phase: 0.0,
            vanish_in: None,
        }
    }

    pub fn top(&self, tf: &Transform) -> f32 {
        tf.translation.y + self.size.y * 0.5
    }
}

/// Oscillates moving platforms between the canvas edges with a small vertical
/// bob, recording the per-tick horizontal delta used for passive carry.
/// Platforms never leave the canvas: the direction flips at either bound.
pub fn move_platforms(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut platforms: Query<(&mut Transform, &mut Platform)>,
) {
    let dt = time.delta_secs();
    for (mut tf, mut plat) in &mut platforms {
        if plat.kind != PlatformKind::Moving {
            plat.delta_x = 0.0;
            continue;
        }
        let half = plat.size.x * 0.5;
        let old_x = tf.translation.x;
        let mut new_x = old_x + plat.dir * tunables.platform_speed * dt;
        if new_x + half > HALF_W {
            new_x = HALF_W - half;
            plat.dir = -1.0;
        } else if new_x - half < -HALF_W {
            new_x = -HALF_W + half;
            plat.dir = 1.0;
        }
        plat.phase += dt;
        tf.translation.x = new_x;
        tf.translation.y = plat.origin_y + (plat.phase * 2.0).sin() * 6.0;
        plat.delta_x = new_x - old_x;
    }
}

/// Counts down vanishing platforms once stood upon and removes them.
pub fn tick_vanishing(
    time: Res<Time>,
    mut commands: Commands,
    mut platforms: Query<(Entity, &mut Platform)>,
) {
    let dt = time.delta_secs();
    for (entity, mut plat) in &mut platforms {
        if let Some(t) = plat.vanish_in.as_mut() {
            *t -= dt;
            if *t <= 0.0 {
                commands.entity(entity).despawn_recursive();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Placement factory
// ---------------------------------------------------------------------------

pub struct PlatformSpec {
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: PlatformKind,
    pub color: Color,
}

/// Randomized ledge placements for one level plus the sand floor.
///
/// The sand floor is appended last so landing resolution prefers the ledge a
/// player is actually crossing before falling through to the floor.
pub fn platform_specs(count: u32, rng: &mut impl Rng) -> Vec<PlatformSpec> {
    let mut specs = Vec::with_capacity(count as usize + 1);
    for _ in 0..count {
        let width = rng.gen_range(90.0..150.0);
        let half = width / 2.0;
        let x = rng.gen_range((-HALF_W + half + 20.0)..(HALF_W - half - 20.0));
        let y = rng.gen_range((FLOOR_TOP + 70.0)..240.0);
        let (kind, color) = match rng.gen_range(0..10) {
            0..=5 => (PlatformKind::Static, palette::GROUND_GREEN),
            6..=7 => (PlatformKind::Moving, palette::ELECTRIC_CYAN),
            _ => (PlatformKind::Vanishing, palette::CANDY_PINK),
        };
        specs.push(PlatformSpec {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, 16.0),
            kind,
            color,
        });
    }
    specs.push(PlatformSpec {
        pos: Vec2::new(0.0, FLOOR_TOP - 20.0),
        size: Vec2::new(WORLD_W, 40.0),
        kind: PlatformKind::Static,
        color: palette::GROUND_BROWN,
    });
    specs
}

pub fn spawn_platforms(commands: &mut Commands, specs: Vec<PlatformSpec>) {
    for spec in specs {
        commands.spawn((
            Sprite {
                color: spec.color,
                custom_size: Some(spec.size),
                ..default()
            },
            Transform::from_xyz(spec.pos.x, spec.pos.y, 0.0),
            Platform::new(spec.kind, spec.size, spec.pos.y),
            GameEntity,
            LevelEntity,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn placements_stay_inside_the_canvas() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            for spec in platform_specs(8, &mut rng) {
                assert!(spec.pos.x - spec.size.x / 2.0 >= -HALF_W);
                assert!(spec.pos.x + spec.size.x / 2.0 <= HALF_W);
            }
        }
    }

    #[test]
    fn sand_floor_is_listed_last_and_spans_the_world() {
        let mut rng = StdRng::seed_from_u64(7);
        let specs = platform_specs(5, &mut rng);
        let sand = specs.last().unwrap();
        assert_eq!(sand.size.x, WORLD_W);
        assert_eq!(sand.kind, PlatformKind::Static);
    }
}
