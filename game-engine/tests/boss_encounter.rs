mod common;

use bevy::prelude::*;

use common::*;
use vigna_game_engine::game::bonus::{Collectible, CollectibleKind};
use vigna_game_engine::game::bullets::Bullet;
use vigna_game_engine::game::config::{StartPayload, Tunables};
use vigna_game_engine::game::enemies::{Boss, BossEncounter};
use vigna_game_engine::game::level::Session;
use vigna_game_engine::game::platforms::{Platform, PlatformKind};
use vigna_game_engine::AppState;

fn defeat_small_boss(app: &mut App) {
    app.world_mut().insert_resource(BossEncounter::default());
    app.world_mut()
        .spawn((Transform::from_xyz(0.0, 0.0, 0.9), Boss::new(20, 0.0)));
    app.world_mut().spawn((
        Transform::from_xyz(0.0, 0.0, 1.0),
        Bullet {
            vel_x: 0.0,
            size: Vec2::new(5.0, 5.0),
        },
    ));
    tick(app, 1.0 / 60.0);
}

fn boss_coin_positions(app: &mut App) -> Vec<Vec2> {
    let mut query = app.world_mut().query::<(&Transform, &Collectible)>();
    query
        .iter(app.world())
        .filter(|(_, c)| c.from_boss && c.kind == CollectibleKind::Coin)
        .map(|(tf, _)| tf.translation.truncate())
        .collect()
}

#[test]
fn defeat_drops_coins_that_magnetize_toward_the_player() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 9, Vec2::new(-400.0, 0.0));
    defeat_small_boss(&mut app);

    let before = boss_coin_positions(&mut app);
    assert!(!before.is_empty());

    let player_x = -400.0;
    tick(&mut app, 0.5);
    let after = boss_coin_positions(&mut app);
    assert_eq!(before.len(), after.len());

    let dist = |points: &[Vec2]| -> f32 {
        points.iter().map(|p| (p.x - player_x).abs()).sum::<f32>() / points.len() as f32
    };
    assert!(dist(&after) < dist(&before));
}

#[test]
fn collection_window_expiry_ends_the_session_in_victory() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 9, Vec2::new(-400.0, 0.0));
    defeat_small_boss(&mut app);

    assert_eq!(
        app.world().resource::<BossEncounter>().coin_window,
        Some(10.0)
    );

    // Window still open partway through.
    tick(&mut app, 5.0);
    assert_eq!(current_state(&app), AppState::Playing);

    // Expiry triggers the terminal transition regardless of uncollected
    // coins; the next tick applies it and tears the session down.
    tick(&mut app, 5.1);
    tick(&mut app, 1.0 / 60.0);
    assert_eq!(current_state(&app), AppState::Victory);
    assert!(app.world().get_resource::<Session>().is_none());
}

#[test]
fn boss_contact_hits_harder_but_respects_the_cooldown() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 10, Vec2::new(0.0, 0.0));
    app.world_mut().insert_resource(BossEncounter::default());
    // Keep the boss parked on the player for the whole scenario.
    app.world_mut().resource_mut::<Tunables>().boss_speed = 0.0;

    // Park the boss on the player.
    let player_y = {
        let mut query = app.world_mut().query_filtered::<&Transform, With<
            vigna_game_engine::game::player::Player,
        >>();
        query.single(app.world()).translation.y
    };
    app.world_mut().spawn((
        Transform::from_xyz(0.0, player_y, 0.9),
        Boss::new(1000, player_y),
    ));
    // A floor under the player keeps the pair in contact across long ticks.
    let floor_y = player_y - 40.0;
    app.world_mut().spawn((
        Transform::from_xyz(0.0, floor_y, 0.0),
        Platform::new(PlatformKind::Static, Vec2::new(960.0, 40.0), floor_y),
    ));

    tick(&mut app, 1.0 / 60.0);
    assert_eq!(player(&mut app, |p| p.health), 80);

    // Within the cooldown window no further damage lands.
    tick(&mut app, 1.0 / 60.0);
    assert_eq!(player(&mut app, |p| p.health), 80);

    // After the cooldown the next contact tick hits again.
    tick(&mut app, 0.5);
    tick(&mut app, 1.0 / 60.0);
    assert_eq!(player(&mut app, |p| p.health), 60);
}
