//! Procedural character skinning.
//!
//! The simulation spawns plain colored rectangles; this module dresses them
//! after the fact. Each gameplay entity carries an [`Appearance`] tag and a
//! dresser system attaches the round body texture, layered expressive eyes,
//! highlight/shadow and blush children, plus subtle idle animations.
//! Uploaded custom sprites override the procedural body per role, and when
//! nothing is available the solid-color rectangle keeps rendering.

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::asset_loader::CustomAssets;
use crate::game::config::{WORLD_H, WORLD_W};
use crate::game::player::Player;
use crate::game::GameEntity;
use crate::AppState;

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SkinPlugin;

impl Plugin for SkinPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, init_skin_assets);
        app.add_systems(OnEnter(AppState::Playing), spawn_background);
        app.add_systems(
            Update,
            (
                dress_characters,
                face_travel_direction,
                animate_breathing,
                animate_scale_pulse,
                animate_eye_blink,
            )
                .run_if(in_state(AppState::Playing)),
        );
    }
}

/// Procedurally generated shape textures shared by every skin.
#[derive(Resource, Clone)]
pub struct SkinAssets {
    /// 64x64 anti-aliased white circle — tint via `Sprite::color`.
    pub circle: Handle<Image>,
}

fn init_skin_assets(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let circle = create_circle_texture(&mut images);
    commands.insert_resource(SkinAssets { circle });
}

// ---------------------------------------------------------------------------
// Color palette
// ---------------------------------------------------------------------------

pub mod palette {
    use bevy::prelude::Color;

    pub const HERO_RED: Color = Color::srgb(0.95, 0.3, 0.25);
    pub const HERO_ORANGE: Color = Color::srgb(1.0, 0.6, 0.15);

    pub const VILLAIN_PURPLE: Color = Color::srgb(0.55, 0.1, 0.7);
    pub const VILLAIN_DARK: Color = Color::srgb(0.3, 0.15, 0.35);

    pub const GOLD: Color = Color::srgb(1.0, 0.84, 0.0);
    pub const CANDY_PINK: Color = Color::srgb(1.0, 0.5, 0.7);
    pub const ELECTRIC_CYAN: Color = Color::srgb(0.0, 0.9, 1.0);
    pub const LEAF_GREEN: Color = Color::srgb(0.3, 0.7, 0.15);

    pub const SKY_BLUE: Color = Color::srgb(0.53, 0.81, 0.98);
    pub const GROUND_GREEN: Color = Color::srgb(0.2, 0.55, 0.25);
    pub const GROUND_BROWN: Color = Color::srgb(0.55, 0.35, 0.2);

    pub const HIGHLIGHT: Color = Color::srgba(1.0, 1.0, 1.0, 0.3);
    pub const SHADOW: Color = Color::srgba(0.0, 0.0, 0.0, 0.2);
    pub const BLUSH: Color = Color::srgba(1.0, 0.4, 0.5, 0.3);
}

// ---------------------------------------------------------------------------
// Appearance tags
// ---------------------------------------------------------------------------

/// Visual role of a gameplay entity. Purely cosmetic; the simulation never
/// reads it back.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Appearance {
    Hero,
    Enemy,
    Boss,
    Coin,
    Pizza,
    Brasilena,
    Wine,
    Bullet,
}

struct Style {
    round: bool,
    eye_scale: f32,
    eye_color: Color,
    has_blush: bool,
    has_highlight: bool,
    breathing: bool,
    scale_pulse: bool,
    /// Custom-upload role that may override the body sprite.
    role: Option<&'static str>,
}

fn style_for(appearance: Appearance) -> Style {
    match appearance {
        Appearance::Hero => Style {
            round: true,
            eye_scale: 1.0,
            eye_color: Color::srgb(0.3, 0.55, 1.0),
            has_blush: true,
            has_highlight: true,
            breathing: true,
            scale_pulse: false,
            role: Some("hero"),
        },
        Appearance::Enemy => Style {
            round: true,
            eye_scale: 0.8,
            eye_color: Color::srgb(1.0, 0.2, 0.1),
            has_blush: false,
            has_highlight: true,
            breathing: true,
            scale_pulse: false,
            role: Some("enemy"),
        },
        Appearance::Boss => Style {
            round: true,
            eye_scale: 0.9,
            eye_color: Color::srgb(1.0, 0.1, 0.1),
            has_blush: false,
            has_highlight: true,
            breathing: true,
            scale_pulse: false,
            role: Some("boss"),
        },
        Appearance::Coin => Style {
            round: true,
            eye_scale: 0.0,
            eye_color: Color::BLACK,
            has_blush: false,
            has_highlight: true,
            breathing: false,
            scale_pulse: true,
            role: None,
        },
        Appearance::Pizza | Appearance::Brasilena | Appearance::Wine => Style {
            round: true,
            eye_scale: 0.5,
            eye_color: Color::BLACK,
            has_blush: false,
            has_highlight: true,
            breathing: false,
            scale_pulse: true,
            role: None,
        },
        Appearance::Bullet => Style {
            round: true,
            eye_scale: 0.0,
            eye_color: Color::BLACK,
            has_blush: false,
            has_highlight: true,
            breathing: false,
            scale_pulse: false,
            role: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Animation components
// ---------------------------------------------------------------------------

/// Subtle scale oscillation for living characters.
#[derive(Component)]
pub struct Breathing {
    pub timer: f32,
}

/// More pronounced pulsing for collectibles.
#[derive(Component)]
pub struct ScalePulse {
    pub min_scale: f32,
    pub max_scale: f32,
    pub speed: f32,
    pub timer: f32,
}

/// Periodic eye blink (hides/shows eye child sprites).
#[derive(Component)]
pub struct EyeBlink {
    pub timer: f32,
    pub interval: f32,
    pub blink_dur: f32,
    pub blinking: bool,
}

/// Tag for eye child sprites.
#[derive(Component)]
pub struct EyeLayer;

// ---------------------------------------------------------------------------
// Dressing
// ---------------------------------------------------------------------------

/// Dresses freshly spawned gameplay entities. A custom uploaded sprite wins
/// over the procedural body; with neither, the plain rectangle stays.
fn dress_characters(
    mut commands: Commands,
    assets: Res<SkinAssets>,
    custom: Res<CustomAssets>,
    mut fresh: Query<(Entity, &Appearance, &mut Sprite), Added<Appearance>>,
) {
    for (entity, appearance, mut sprite) in &mut fresh {
        let style = style_for(*appearance);
        let size = sprite.custom_size.unwrap_or(Vec2::splat(24.0));

        let custom_body = style
            .role
            .and_then(|role| custom.sprites.get(role))
            .cloned();
        if let Some(image) = custom_body.clone() {
            sprite.image = image;
            sprite.color = Color::WHITE;
        } else if style.round {
            sprite.image = assets.circle.clone();
        }

        if custom_body.is_none() {
            attach_layers(&mut commands, entity, &assets, &style, size);
            if style.eye_scale > 0.0 {
                commands.entity(entity).insert(EyeBlink {
                    timer: 0.0,
                    interval: 3.5,
                    blink_dur: 0.12,
                    blinking: false,
                });
            }
        }
        if style.breathing {
            commands.entity(entity).insert(Breathing { timer: 0.0 });
        }
        if style.scale_pulse {
            commands.entity(entity).insert(ScalePulse {
                min_scale: 0.92,
                max_scale: 1.08,
                speed: 3.5,
                timer: 0.0,
            });
        }
    }
}

fn attach_layers(
    commands: &mut Commands,
    entity: Entity,
    assets: &SkinAssets,
    style: &Style,
    size: Vec2,
) {
    let bw = size.x;
    let bh = size.y;
    let circle = assets.circle.clone();
    let eye_scale = style.eye_scale;
    let eye_color = style.eye_color;
    let has_highlight = style.has_highlight;
    let has_blush = style.has_blush;

    commands.entity(entity).with_children(|parent| {
        if has_highlight {
            parent.spawn((
                Sprite {
                    image: circle.clone(),
                    color: palette::HIGHLIGHT,
                    custom_size: Some(Vec2::new(bw * 0.3, bh * 0.25)),
                    ..default()
                },
                Transform::from_xyz(-bw * 0.15, bh * 0.18, 0.05),
            ));
            parent.spawn((
                Sprite {
                    image: circle.clone(),
                    color: palette::SHADOW,
                    custom_size: Some(Vec2::new(bw * 0.8, bh * 0.12)),
                    ..default()
                },
                Transform::from_xyz(0.0, -bh * 0.55, -0.05),
            ));
        }

        if eye_scale > 0.0 {
            let eye_r = bw.min(bh) * 0.28 * eye_scale;
            let iris_r = eye_r * 0.6;
            let pupil_r = eye_r * 0.3;
            let ey = bh * 0.1;
            let spread = bw * 0.22;

            for side in [-1.0_f32, 1.0] {
                let ex = side * spread;
                parent.spawn((
                    Sprite {
                        image: circle.clone(),
                        color: Color::WHITE,
                        custom_size: Some(Vec2::splat(eye_r)),
                        ..default()
                    },
                    Transform::from_xyz(ex, ey, 0.1),
                    EyeLayer,
                ));
                parent.spawn((
                    Sprite {
                        image: circle.clone(),
                        color: eye_color,
                        custom_size: Some(Vec2::splat(iris_r)),
                        ..default()
                    },
                    Transform::from_xyz(ex, ey - eye_r * 0.05, 0.15),
                    EyeLayer,
                ));
                parent.spawn((
                    Sprite {
                        image: circle.clone(),
                        color: Color::BLACK,
                        custom_size: Some(Vec2::splat(pupil_r)),
                        ..default()
                    },
                    Transform::from_xyz(ex, ey - eye_r * 0.08, 0.2),
                    EyeLayer,
                ));
            }
        }

        if has_blush {
            let blush_r = bw * 0.18;
            for side in [-1.0_f32, 1.0] {
                parent.spawn((
                    Sprite {
                        image: circle.clone(),
                        color: palette::BLUSH,
                        custom_size: Some(Vec2::splat(blush_r)),
                        ..default()
                    },
                    Transform::from_xyz(side * bw * 0.3, -bh * 0.05, 0.08),
                ));
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Background
// ---------------------------------------------------------------------------

#[derive(Component)]
struct Background;

fn spawn_background(
    mut commands: Commands,
    custom: Res<CustomAssets>,
    existing: Query<(), With<Background>>,
) {
    if !existing.is_empty() {
        return;
    }
    let sprite = if let Some(ref bg) = custom.background {
        Sprite {
            image: bg.clone(),
            custom_size: Some(Vec2::new(WORLD_W, WORLD_H)),
            ..default()
        }
    } else {
        Sprite {
            color: palette::SKY_BLUE,
            custom_size: Some(Vec2::new(WORLD_W, WORLD_H)),
            ..default()
        }
    };
    commands.spawn((
        sprite,
        Transform::from_xyz(0.0, 0.0, -1.0),
        Background,
        GameEntity,
    ));
}

// ---------------------------------------------------------------------------
// Animation systems
// ---------------------------------------------------------------------------

/// Mirrors the hero sprite to face the travel direction.
fn face_travel_direction(mut players: Query<(&Player, &mut Transform)>) {
    for (player, mut tf) in &mut players {
        tf.scale.x = player.facing * tf.scale.x.abs();
    }
}

fn animate_breathing(time: Res<Time>, mut q: Query<(&mut Transform, &mut Breathing)>) {
    let dt = time.delta_secs();
    for (mut tf, mut b) in &mut q {
        b.timer += dt * 2.5;
        let s = b.timer.sin() * 0.02;
        tf.scale.x = tf.scale.x.signum() * (1.0 + s);
        tf.scale.y = 1.0 - s;
    }
}

fn animate_scale_pulse(time: Res<Time>, mut q: Query<(&mut Transform, &mut ScalePulse)>) {
    let dt = time.delta_secs();
    for (mut tf, mut p) in &mut q {
        p.timer += dt;
        let t = (p.timer * p.speed).sin() * 0.5 + 0.5;
        let scale = p.min_scale + t * (p.max_scale - p.min_scale);
        tf.scale = Vec3::splat(scale);
    }
}

fn animate_eye_blink(
    time: Res<Time>,
    mut blinkers: Query<(&mut EyeBlink, &Children)>,
    mut vis_q: Query<&mut Visibility, With<EyeLayer>>,
) {
    let dt = time.delta_secs();
    for (mut blink, children) in &mut blinkers {
        blink.timer += dt;

        let show = if blink.blinking {
            if blink.timer > blink.blink_dur {
                blink.blinking = false;
                blink.timer = 0.0;
                true
            } else {
                false
            }
        } else if blink.timer > blink.interval {
            blink.blinking = true;
            blink.timer = 0.0;
            false
        } else {
            true
        };

        let vis = if show {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        for &child in children.iter() {
            if let Ok(mut v) = vis_q.get_mut(child) {
                *v = vis;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Procedural texture generation
// ---------------------------------------------------------------------------

/// Create a 64x64 anti-aliased white circle texture, tinted at draw time by
/// `Sprite::color` so one texture serves every body color.
fn create_circle_texture(images: &mut Assets<Image>) -> Handle<Image> {
    let size: u32 = 64;
    let mut data = vec![0u8; (size * size * 4) as usize];
    let center = size as f32 / 2.0;
    let radius = center - 1.0;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center + 0.5;
            let dy = y as f32 - center + 0.5;
            let dist = (dx * dx + dy * dy).sqrt();
            let idx = ((y * size + x) * 4) as usize;

            if dist <= radius {
                let alpha = if dist > radius - 1.5 {
                    ((radius - dist) / 1.5 * 255.0) as u8
                } else {
                    255
                };
                data[idx] = 255;
                data[idx + 1] = 255;
                data[idx + 2] = 255;
                data[idx + 3] = alpha;
            }
        }
    }

    images.add(Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    ))
}
