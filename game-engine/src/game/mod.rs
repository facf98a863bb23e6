pub mod bonus;
pub mod bullets;
pub mod collision;
pub mod config;
pub mod enemies;
pub mod level;
pub mod messages;
pub mod platforms;
pub mod player;

use bevy::prelude::*;

use crate::AppState;
use config::Tunables;
use enemies::Boss;
use messages::{CoinBurst, FireBullet, ResetRequested, ShellEvent};
use player::InputIntent;

/// Everything belonging to the running session (player included).
#[derive(Component)]
pub struct GameEntity;

/// Entities replaced wholesale on every level transition.
#[derive(Component)]
pub struct LevelEntity;

/// Installs the complete simulation without any presentation: states,
/// events, resources and the ordered tick systems. Integration tests build
/// on exactly this configuration.
pub fn configure_headless(app: &mut App) {
    app.init_state::<AppState>();
    app.init_resource::<Tunables>();
    app.init_resource::<InputIntent>();
    app.init_resource::<crate::GameBridge>();
    app.add_event::<FireBullet>();
    app.add_event::<CoinBurst>();
    app.add_event::<ShellEvent>();
    app.add_event::<ResetRequested>();

    app.add_systems(OnEnter(AppState::Playing), level::start_session);
    app.add_systems(OnEnter(AppState::Menu), level::teardown_session);
    app.add_systems(OnEnter(AppState::GameOver), level::teardown_session);
    app.add_systems(OnEnter(AppState::Victory), level::teardown_session);

    // The per-tick update order is normative: world bookkeeping, then the
    // player, then adversaries and damage, then pickups, then projectiles
    // and their fallout, then progression and the published snapshot.
    app.add_systems(
        Update,
        (
            (
                level::handle_reset,
                level::generate_level,
                platforms::move_platforms,
                platforms::tick_vanishing,
            )
                .chain(),
            (
                player::apply_movement,
                player::resolve_firing,
                enemies::move_enemies,
                enemies::move_boss,
                collision::contact_damage,
            )
                .chain(),
            (
                bonus::collect_pickups,
                bonus::tick_wine_boost,
                bonus::tick_free_ammo,
                bonus::spawn_wine,
            )
                .chain(),
            (
                bullets::spawn_bullets,
                bullets::advance_bullets,
                bonus::spawn_coin_bursts,
                bonus::magnet_boss_coins,
                enemies::tick_coin_window,
            )
                .chain(),
            (level::check_level_clear, level::publish_snapshot).chain(),
        )
            .chain()
            .run_if(in_state(AppState::Playing)),
    );
}

/// Full game plugin: the headless simulation plus input gathering, HUD and
/// terminal overlays.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        configure_headless(app);

        app.add_systems(
            Update,
            player::gather_input
                .run_if(in_state(AppState::Playing))
                .before(player::apply_movement),
        );
        app.add_systems(OnEnter(AppState::Playing), spawn_hud);
        app.add_systems(Update, update_hud.run_if(in_state(AppState::Playing)));
        app.add_systems(OnEnter(AppState::GameOver), show_game_over);
        app.add_systems(OnExit(AppState::GameOver), cleanup_overlay);
        app.add_systems(OnEnter(AppState::Victory), show_victory);
        app.add_systems(OnExit(AppState::Victory), cleanup_overlay);
    }
}

#[derive(Component)]
struct HudText;

#[derive(Component)]
struct OverlayUI;

fn spawn_hud(mut commands: Commands, existing: Query<(), With<HudText>>) {
    if !existing.is_empty() {
        return;
    }
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::srgb(0.95, 0.9, 0.4)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        HudText,
        GameEntity,
    ));
}

fn update_hud(
    bridge: Res<crate::GameBridge>,
    bosses: Query<&Boss>,
    mut texts: Query<&mut Text, With<HudText>>,
) {
    let snap = &bridge.snapshot;
    let mut line = format!(
        "HP {}  AMMO {}  COINS {}  LV {}",
        snap.health, snap.ammo, snap.coins, snap.level
    );
    if let Ok(boss) = bosses.get_single() {
        line.push_str(&format!("   BOSS {}/{}", boss.health.max(0), boss.max_health));
    }
    for mut text in &mut texts {
        **text = line.clone();
    }
}

fn show_game_over(mut commands: Commands, bridge: Res<crate::GameBridge>) {
    commands.spawn((
        Text::new(format!("GAME OVER\nCoins: {}", bridge.snapshot.coins)),
        TextFont {
            font_size: 48.0,
            ..default()
        },
        TextColor(Color::srgb(0.9, 0.2, 0.2)),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(35.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        OverlayUI,
    ));
}

fn show_victory(mut commands: Commands, bridge: Res<crate::GameBridge>) {
    let snap = &bridge.snapshot;
    let score = snap.coins * 10 + snap.level.max(0) as u32 * 100;
    commands.spawn((
        Text::new(format!("VICTORY!\nScore: {}", score)),
        TextFont {
            font_size: 48.0,
            ..default()
        },
        TextColor(Color::srgb(0.95, 0.85, 0.2)),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(35.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        OverlayUI,
    ));
}

fn cleanup_overlay(mut commands: Commands, overlays: Query<Entity, With<OverlayUI>>) {
    for entity in &overlays {
        commands.entity(entity).despawn_recursive();
    }
}
