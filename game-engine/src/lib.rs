use bevy::prelude::*;
use bevy::window::{PresentMode, WindowPlugin};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod asset_loader;
pub mod game;
pub mod skin;

use game::config::StartPayload;
use game::level::PendingStart;
use game::messages::{ResetRequested, ShellEvent};
use game::GamePlugin;

// ---------------------------------------------------------------------------
// App-wide state machine
// ---------------------------------------------------------------------------

/// Top-level application state.
///
/// * `Menu`     – idle; waiting for the shell to call `start_game`.
/// * `Playing`  – the simulation is ticking.
/// * `Paused`   – tick loop suspended, entity state untouched.
/// * `GameOver` – the player was defeated; snapshot still readable.
/// * `Victory`  – the boss encounter finished; snapshot still readable.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
    Victory,
}

// ---------------------------------------------------------------------------
// Shell bridge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerUps {
    pub jump_boost: bool,
    pub speed_boost: bool,
    pub remaining: f32,
}

/// Read-only per-tick projection of the session for the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub health: i32,
    pub ammo: i32,
    pub coins: u32,
    pub level: i32,
    pub power_ups: PowerUps,
}

/// Bridge resource carrying data between the Bevy world and the
/// wasm-bindgen exported functions.
#[derive(Resource, Debug, Clone, Default)]
pub struct GameBridge {
    pub snapshot: Snapshot,
}

// ---------------------------------------------------------------------------
// On-screen control intents  (written from wasm-bindgen exports)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct ShellControls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
}

static CONTROLS: Mutex<ShellControls> = Mutex::new(ShellControls {
    left: false,
    right: false,
    jump: false,
    fire: false,
});

/// Current on-screen control flags (fire latch left untouched).
pub(crate) fn shell_controls() -> ShellControls {
    CONTROLS.lock().map(|c| *c).unwrap_or_default()
}

/// Consumes the one-shot fire latch set by the shell.
pub(crate) fn take_shell_fire() -> bool {
    match CONTROLS.lock() {
        Ok(mut c) => std::mem::take(&mut c.fire),
        Err(_) => false,
    }
}

use std::sync::Mutex;

// ---------------------------------------------------------------------------
// wasm-bindgen exports
// ---------------------------------------------------------------------------

/// Initialize the engine, targeting the `<canvas>` element whose DOM id
/// matches `canvas_id`. Builds the `App` and starts the render loop; the
/// engine idles in the menu state until `start_game` is called.
#[wasm_bindgen]
pub fn init_engine(canvas_id: &str) {
    let selector = format!("#{}", canvas_id);

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Vigna Run".into(),
                    canvas: Some(selector),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            })
            // Keep the browser console usable.
            .disable::<bevy::log::LogPlugin>(),
    );

    app.add_plugins(GamePlugin);
    app.add_plugins(skin::SkinPlugin);
    app.add_plugins(asset_loader::AssetLoaderPlugin);

    app.add_systems(Startup, setup_camera);
    app.add_systems(Update, (handle_shell_signals, publish_to_shell));

    // `app.run()` on WASM is non-blocking; it schedules
    // requestAnimationFrame callbacks internally.
    app.run();
}

/// Begin a session. `payload` is a JSON object carrying the player profile
/// and persisted progress:
/// `{"nickname":"...","email":"...","godmode":false,"markJump":false,
///   "progress":{"totalCoins":0,"maxLevel":1}}`
#[wasm_bindgen]
pub fn start_game(payload: &str) {
    set_js_global("__vg_start", payload);
}

/// Stop the current session and return the final standing as JSON, e.g.
/// `{"coins":42,"level":3,"score":720}`.
#[wasm_bindgen]
pub fn stop_game() -> String {
    set_js_global("__vg_stop", "true");
    let snapshot = get_js_global("__vg_state")
        .and_then(|s| serde_json::from_str::<Snapshot>(&s).ok())
        .unwrap_or_default();
    let score = snapshot.coins * 10 + snapshot.level.max(0) as u32 * 100;
    format!(
        "{{\"coins\":{},\"level\":{},\"score\":{}}}",
        snapshot.coins, snapshot.level, score
    )
}

/// Suspend the tick loop without touching entity state.
#[wasm_bindgen]
pub fn pause_game() {
    set_js_global("__vg_pause", "true");
}

/// Resume a paused session.
#[wasm_bindgen]
pub fn resume_game() {
    set_js_global("__vg_resume", "true");
}

/// Rebuild the running session in place with the same profile. Idempotent.
#[wasm_bindgen]
pub fn reset_game() {
    set_js_global("__vg_reset", "true");
}

/// On-screen control intent. `control` is one of `"left"`, `"right"`,
/// `"jump"`, `"fire"`; `fire` is a one-shot latch (the `pressed` value is
/// ignored for it).
#[wasm_bindgen]
pub fn set_control(control: &str, pressed: bool) {
    if let Ok(mut c) = CONTROLS.lock() {
        match control {
            "left" => c.left = pressed,
            "right" => c.right = pressed,
            "jump" => c.jump = pressed,
            "fire" => c.fire = true,
            _ => {}
        }
    }
}

/// Latest per-tick snapshot as JSON:
/// `{"health":100,"ammo":10,"coins":0,"level":1,"powerUps":{...}}`.
#[wasm_bindgen]
pub fn get_state() -> String {
    get_js_global("__vg_state").unwrap_or_else(|| "{}".to_string())
}

// ---------------------------------------------------------------------------
// JS global helpers  (communicate between free-fn exports and Bevy systems)
// ---------------------------------------------------------------------------

fn set_js_global(key: &str, value: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    js_sys::Reflect::set(&window, &JsValue::from_str(key), &JsValue::from_str(value)).ok();
}

fn get_js_global(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let val = js_sys::Reflect::get(&window, &JsValue::from_str(key)).ok()?;
    val.as_string()
}

fn delete_js_global(key: &str) {
    if let Some(window) = web_sys::window() {
        js_sys::Reflect::set(&window, &JsValue::from_str(key), &JsValue::UNDEFINED).ok();
    }
}

fn push_shell_event(event: &ShellEvent) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let key = JsValue::from_str("__vg_events");
    let array = js_sys::Reflect::get(&window, &key)
        .ok()
        .and_then(|v| v.dyn_into::<js_sys::Array>().ok())
        .unwrap_or_else(js_sys::Array::new);
    if let Ok(value) = serde_wasm_bindgen::to_value(event) {
        array.push(&value);
    }
    js_sys::Reflect::set(&window, &key, &array).ok();
}

// ---------------------------------------------------------------------------
// Bevy systems (run inside the Bevy schedule, have full World access)
// ---------------------------------------------------------------------------

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Every frame, translate pending shell commands (posted as JS globals by
/// the exports above) into state transitions and events.
fn handle_shell_signals(
    mut commands: Commands,
    current_state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut resets: EventWriter<ResetRequested>,
) {
    if let Some(payload) = get_js_global("__vg_start") {
        if !payload.is_empty() {
            delete_js_global("__vg_start");
            match current_state.get() {
                AppState::Playing | AppState::Paused => {
                    warn!("start_game ignored: session already running")
                }
                _ => match serde_json::from_str::<StartPayload>(&payload) {
                    Ok(profile) => {
                        commands.insert_resource(PendingStart(profile));
                        next_state.set(AppState::Playing);
                    }
                    Err(err) => warn!("rejected start payload: {err}"),
                },
            }
        }
    }

    if get_js_global("__vg_stop").as_deref() == Some("true") {
        delete_js_global("__vg_stop");
        next_state.set(AppState::Menu);
    }

    if get_js_global("__vg_pause").as_deref() == Some("true") {
        delete_js_global("__vg_pause");
        if *current_state.get() == AppState::Playing {
            next_state.set(AppState::Paused);
        }
    }

    if get_js_global("__vg_resume").as_deref() == Some("true") {
        delete_js_global("__vg_resume");
        if *current_state.get() == AppState::Paused {
            next_state.set(AppState::Playing);
        }
    }

    if get_js_global("__vg_reset").as_deref() == Some("true") {
        delete_js_global("__vg_reset");
        if *current_state.get() == AppState::Playing {
            resets.send(ResetRequested);
        }
    }
}

/// Publishes the snapshot and drains edge events to the shell's JS queue.
fn publish_to_shell(bridge: Res<GameBridge>, mut events: EventReader<ShellEvent>) {
    if bridge.is_changed() {
        if let Ok(json) = serde_json::to_string(&bridge.snapshot) {
            set_js_global("__vg_state", &json);
        }
    }
    for event in events.read() {
        push_shell_event(event);
    }
}
