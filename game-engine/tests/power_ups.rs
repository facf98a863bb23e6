mod common;

use bevy::prelude::*;

use common::*;
use vigna_game_engine::game::bonus::{Collectible, CollectibleKind};
use vigna_game_engine::game::config::StartPayload;
use vigna_game_engine::game::level::Session;
use vigna_game_engine::game::messages::ShellEvent;
use vigna_game_engine::game::player::Player;

fn spawn_item(app: &mut App, kind: CollectibleKind, pos: Vec2) {
    let size = match kind {
        CollectibleKind::Coin => Vec2::splat(18.0),
        CollectibleKind::Pizza => Vec2::splat(24.0),
        CollectibleKind::Brasilena => Vec2::new(14.0, 26.0),
        CollectibleKind::Wine => Vec2::new(16.0, 30.0),
    };
    app.world_mut().spawn((
        Transform::from_xyz(pos.x, pos.y, 0.5),
        Collectible {
            kind,
            size,
            from_boss: false,
        },
    ));
}

fn player_pos(app: &mut App) -> Vec2 {
    let mut query = app
        .world_mut()
        .query_filtered::<&Transform, With<Player>>();
    query.single(app.world()).translation.truncate()
}

#[test]
fn wine_boost_multiplies_once_and_resets_instead_of_stacking() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::ZERO);
    drain_shell_events(&mut app);

    let base_jump = player(&mut app, |p| p.jump_power);
    let base_speed = player(&mut app, |p| p.speed);

    let pos = player_pos(&mut app);
    spawn_item(&mut app, CollectibleKind::Wine, pos);
    tick(&mut app, 1.0 / 60.0);

    assert_eq!(player(&mut app, |p| p.jump_power), base_jump * 2.0);
    assert_eq!(player(&mut app, |p| p.speed), base_speed * 1.5);
    let shown = drain_shell_events(&mut app)
        .into_iter()
        .filter(|e| matches!(e, ShellEvent::PowerUpShown { .. }))
        .count();
    assert_eq!(shown, 2);

    // Second bottle before expiry: the clock resets, the stats do not move.
    tick(&mut app, 4.0);
    edit_player(&mut app, |mut p| p.vel = Vec2::ZERO);
    let pos = player_pos(&mut app);
    spawn_item(&mut app, CollectibleKind::Wine, pos);
    tick(&mut app, 1.0 / 60.0);

    assert_eq!(player(&mut app, |p| p.jump_power), base_jump * 2.0);
    assert!(player(&mut app, |p| p.boost.as_ref().unwrap().remaining) > 9.9);
    assert!(!drain_shell_events(&mut app)
        .iter()
        .any(|e| matches!(e, ShellEvent::PowerUpShown { .. })));

    // Expiry restores the cached pre-boost values exactly.
    tick(&mut app, 10.1);
    assert_eq!(player(&mut app, |p| p.jump_power), base_jump);
    assert_eq!(player(&mut app, |p| p.speed), base_speed);
    assert!(player(&mut app, |p| p.boost.is_none()));
    let removed = drain_shell_events(&mut app)
        .into_iter()
        .filter(|e| matches!(e, ShellEvent::PowerUpRemoved { .. }))
        .count();
    assert_eq!(removed, 2);
}

#[test]
fn pizza_heals_clamped_to_full_health() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::ZERO);
    edit_player(&mut app, |mut p| p.health = 50);

    let pos = player_pos(&mut app);
    for _ in 0..3 {
        spawn_item(&mut app, CollectibleKind::Pizza, pos);
    }
    tick(&mut app, 1.0 / 60.0);

    assert_eq!(player(&mut app, |p| p.health), 100);
}

#[test]
fn coin_pickups_clamp_at_the_run_cap() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::ZERO);
    edit_player(&mut app, |mut p| p.coins = 998);

    let pos = player_pos(&mut app);
    for _ in 0..5 {
        spawn_item(&mut app, CollectibleKind::Coin, pos);
    }
    tick(&mut app, 1.0 / 60.0);

    assert_eq!(player(&mut app, |p| p.coins), 1000);
}

#[test]
fn brasilena_grants_ammo_and_cancels_the_free_spawn() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::ZERO);
    edit_player(&mut app, |mut p| p.ammo = 0);

    tick(&mut app, 1.0 / 60.0);
    assert!(app.world().resource::<Session>().free_ammo.is_some());

    let pos = player_pos(&mut app);
    spawn_item(&mut app, CollectibleKind::Brasilena, pos);
    tick(&mut app, 1.0 / 60.0);

    assert_eq!(player(&mut app, |p| p.ammo), 10);
    assert!(app.world().resource::<Session>().free_ammo.is_none());
}

#[test]
fn free_brasilena_appears_after_the_delay() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::new(-300.0, 0.0));
    edit_player(&mut app, |mut p| p.ammo = 0);

    tick(&mut app, 1.0 / 60.0);
    assert!(app.world().resource::<Session>().free_ammo.is_some());

    tick(&mut app, 5.1);
    let bottles = app
        .world_mut()
        .query::<&Collectible>()
        .iter(app.world())
        .filter(|c| c.kind == CollectibleKind::Brasilena)
        .count();
    assert_eq!(bottles, 1);
    assert!(app.world().resource::<Session>().free_ammo.is_none());
}

#[test]
fn wine_respawns_only_after_the_throttle_elapses() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::new(-300.0, 0.0));

    let count_wine = |app: &mut App| {
        app.world_mut()
            .query::<&Collectible>()
            .iter(app.world())
            .filter(|c| c.kind == CollectibleKind::Wine)
            .count()
    };

    tick(&mut app, 29.0);
    assert_eq!(count_wine(&mut app), 0);
    tick(&mut app, 1.1);
    assert_eq!(count_wine(&mut app), 1);
}
