mod common;

use bevy::prelude::*;

use common::*;
use vigna_game_engine::game::bullets::Bullet;
use vigna_game_engine::game::config::StartPayload;
use vigna_game_engine::game::enemies::{Boss, BossEncounter, Enemy};
use vigna_game_engine::game::level::Session;
use vigna_game_engine::game::messages::ShellEvent;
use vigna_game_engine::game::player::InputIntent;
use vigna_game_engine::AppState;
use vigna_game_engine::GameBridge;

#[test]
fn zero_speed_bullet_removes_overlapping_enemy_and_pays_coins() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::new(-300.0, 0.0));
    drain_shell_events(&mut app);

    let enemy = app
        .world_mut()
        .spawn((
            Transform::from_xyz(0.0, 0.0, 0.8),
            Enemy {
                speed: 0.0,
                size: Vec2::new(10.0, 10.0),
            },
        ))
        .id();
    let bullet = app
        .world_mut()
        .spawn((
            Transform::from_xyz(0.0, 0.0, 1.0),
            Bullet {
                vel_x: 0.0,
                size: Vec2::new(5.0, 5.0),
            },
        ))
        .id();

    tick(&mut app, 1.0 / 60.0);

    assert!(app.world().get::<Transform>(enemy).is_none());
    assert!(app.world().get::<Transform>(bullet).is_none());
    assert_eq!(player(&mut app, |p| p.coins), 2);
    // The published snapshot carries the updated coin count.
    assert_eq!(app.world().resource::<GameBridge>().snapshot.coins, 2);

    let events = drain_shell_events(&mut app);
    assert!(!events
        .iter()
        .any(|e| matches!(e, ShellEvent::GameOver { .. } | ShellEvent::GameWin { .. })));
}

#[test]
fn one_bullet_kills_at_most_one_enemy() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::new(-300.0, 0.0));

    for _ in 0..2 {
        app.world_mut().spawn((
            Transform::from_xyz(0.0, 0.0, 0.8),
            Enemy {
                speed: 0.0,
                size: Vec2::new(10.0, 10.0),
            },
        ));
    }
    app.world_mut().spawn((
        Transform::from_xyz(0.0, 0.0, 1.0),
        Bullet {
            vel_x: 0.0,
            size: Vec2::new(5.0, 5.0),
        },
    ));

    tick(&mut app, 1.0 / 60.0);

    let survivors = app
        .world_mut()
        .query::<&Enemy>()
        .iter(app.world())
        .count();
    assert_eq!(survivors, 1);
    assert_eq!(player(&mut app, |p| p.coins), 2);
}

#[test]
fn boss_killing_hit_wins_exactly_once_with_score_formula() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 9, Vec2::new(-400.0, 0.0));
    edit_player(&mut app, |mut p| p.coins = 30);
    drain_shell_events(&mut app);

    app.world_mut().insert_resource(BossEncounter::default());
    let boss = app
        .world_mut()
        .spawn((Transform::from_xyz(0.0, 0.0, 0.9), Boss::new(20, 0.0)))
        .id();
    app.world_mut().spawn((
        Transform::from_xyz(0.0, 0.0, 1.0),
        Bullet {
            vel_x: 0.0,
            size: Vec2::new(5.0, 5.0),
        },
    ));

    tick(&mut app, 1.0 / 60.0);

    assert!(app.world().get::<Transform>(boss).is_none());
    // Defeat on the killing hit: level advances and the win is scored as
    // coins*10 + level*100 with the boss-hit reward already applied.
    let session = app.world().resource::<Session>();
    assert_eq!(session.level, 10);
    let coins = player(&mut app, |p| p.coins);
    assert_eq!(coins, 32);

    let events = drain_shell_events(&mut app);
    let wins: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, ShellEvent::GameWin { .. }))
        .collect();
    assert_eq!(wins.len(), 1);
    assert_eq!(
        wins[0],
        &ShellEvent::GameWin {
            coins: 32,
            score: 32 * 10 + 10 * 100,
        }
    );
    // Boss health reached the shell as zero.
    assert!(events
        .iter()
        .any(|e| matches!(e, ShellEvent::BossHealth { current: 0, .. })));

    // The collection window is open and no further win fires.
    assert!(app
        .world()
        .resource::<BossEncounter>()
        .coin_window
        .is_some());
    tick(&mut app, 1.0 / 60.0);
    tick(&mut app, 1.0 / 60.0);
    assert!(!drain_shell_events(&mut app)
        .iter()
        .any(|e| matches!(e, ShellEvent::GameWin { .. })));
    assert_eq!(current_state(&app), AppState::Playing);
}

#[test]
fn firing_spends_ammo_and_spawns_one_bullet() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::new(0.0, 0.0));

    app.world_mut().resource_mut::<InputIntent>().fire = true;
    tick(&mut app, 1.0 / 60.0);

    let bullets = app
        .world_mut()
        .query::<&Bullet>()
        .iter(app.world())
        .count();
    assert_eq!(bullets, 1);
    assert_eq!(player(&mut app, |p| p.ammo), 9);
    // The latch is consumed: no second bullet without a new intent.
    assert!(!app.world().resource::<InputIntent>().fire);
    tick(&mut app, 1.0 / 60.0);
    let bullets = app
        .world_mut()
        .query::<&Bullet>()
        .iter(app.world())
        .count();
    assert_eq!(bullets, 1);
}

#[test]
fn bullets_are_culled_past_the_canvas_edge() {
    let mut app = app_headless();
    enter_playing_bare(&mut app, StartPayload::default(), 1, Vec2::new(-300.0, 0.0));

    let bullet = app
        .world_mut()
        .spawn((
            Transform::from_xyz(470.0, 0.0, 1.0),
            Bullet {
                vel_x: 540.0,
                size: Vec2::new(10.0, 6.0),
            },
        ))
        .id();

    // ~0.1 s at 540 u/s pushes the bullet fully past the right edge.
    tick(&mut app, 0.1);
    assert!(app.world().get::<Transform>(bullet).is_none());
}
