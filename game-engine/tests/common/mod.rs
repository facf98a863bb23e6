//! Integration test harness.
//!
//! Keep the tests headless and deterministic:
//! - `MinimalPlugins` minus the time plugin provides the ECS runtime;
//! - a manually advanced `Time` resource makes every countdown exact;
//! - `configure_headless` installs the full simulation without presentation.

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimePlugin;

use vigna_game_engine::game::config::{StartPayload, Tunables};
use vigna_game_engine::game::level::{ActiveProfile, LevelPhase, PendingStart, Session};
use vigna_game_engine::game::messages::ShellEvent;
use vigna_game_engine::game::player::Player;
use vigna_game_engine::game::{self, GameEntity};
use vigna_game_engine::AppState;

pub fn app_headless() -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.build().disable::<TimePlugin>(),
        StatesPlugin,
    ));
    app.init_resource::<Time>();
    game::configure_headless(&mut app);
    app
}

/// Advances the clock by `seconds` and runs one tick.
pub fn tick(app: &mut App, seconds: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(seconds));
    app.update();
}

/// Full session start through the shell path: pending payload, state
/// transition, and the first generated level.
pub fn start_with(app: &mut App, payload: StartPayload) {
    // Settle the initial Menu state before queueing the session.
    app.update();
    app.world_mut().insert_resource(PendingStart(payload));
    app.world_mut()
        .resource_mut::<NextState<AppState>>()
        .set(AppState::Playing);
    tick(app, 1.0 / 60.0);
    tick(app, 1.0 / 60.0);
}

/// Minimal session for precise scenarios: a player at `pos`, a running
/// session at `level`, and no generated entities at all.
pub fn enter_playing_bare(app: &mut App, payload: StartPayload, level: i32, pos: Vec2) -> Entity {
    // Settle the initial Menu state before inserting session state by hand.
    app.update();
    let tunables = app.world().resource::<Tunables>().clone();
    let player = Player::from_profile(&payload, &tunables);
    let entity = app
        .world_mut()
        .spawn((Transform::from_xyz(pos.x, pos.y, 1.0), player, GameEntity))
        .id();
    app.world_mut().insert_resource(Session {
        level,
        phase: LevelPhase::Running,
        wine_collected: 0,
        wine_cooldown: tunables.wine_respawn_delay,
        free_ammo: None,
    });
    app.world_mut().insert_resource(ActiveProfile(payload));
    app.world_mut()
        .resource_mut::<NextState<AppState>>()
        .set(AppState::Playing);
    app.update();
    entity
}

pub fn drain_shell_events(app: &mut App) -> Vec<ShellEvent> {
    app.world_mut()
        .resource_mut::<Events<ShellEvent>>()
        .drain()
        .collect()
}

pub fn player<R>(app: &mut App, read: impl FnOnce(&Player) -> R) -> R {
    let mut query = app.world_mut().query::<&Player>();
    read(query.single(app.world()))
}

pub fn edit_player(app: &mut App, edit: impl FnOnce(Mut<Player>)) {
    let mut query = app.world_mut().query::<&mut Player>();
    edit(query.single_mut(app.world_mut()));
}

pub fn current_state(app: &App) -> AppState {
    app.world().resource::<State<AppState>>().get().clone()
}
