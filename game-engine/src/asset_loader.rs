//! Custom asset upload bridge — allows the shell to upload RGBA sprite
//! images at runtime.
//!
//! Uploads are stored as `Handle<Image>` in [`CustomAssets`]. The skin
//! module checks this resource and uses the custom sprite in place of the
//! default procedural circle texture; a malformed upload is ignored and
//! rendering degrades to the procedural body.

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use std::collections::HashMap;
use std::sync::Mutex;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct AssetLoaderPlugin;

impl Plugin for AssetLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CustomAssets>();
        app.add_systems(Update, process_uploads);
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Holds custom assets uploaded by the player at runtime.
#[derive(Resource, Default)]
pub struct CustomAssets {
    /// Character sprite overrides keyed by role
    /// (`"hero"`, `"enemy"`, `"boss"`).
    pub sprites: HashMap<String, Handle<Image>>,
    /// Optional custom background image.
    pub background: Option<Handle<Image>>,
}

// ---------------------------------------------------------------------------
// Pending upload queue  (written from wasm-bindgen exports, read by Bevy)
// ---------------------------------------------------------------------------

struct PendingUpload {
    role: String,
    kind: UploadKind,
    data: Vec<u8>,
    width: u32,
    height: u32,
}

enum UploadKind {
    Sprite,
    Background,
}

static PENDING_UPLOADS: Mutex<Vec<PendingUpload>> = Mutex::new(Vec::new());

// ---------------------------------------------------------------------------
// wasm-bindgen exports  (called from JavaScript)
// ---------------------------------------------------------------------------

/// Upload an RGBA sprite image for a given character role.
///
/// `role` — `"hero"`, `"enemy"` or `"boss"`.
/// `width`, `height` — image dimensions.
/// `rgba` — raw pixel data, 4 bytes per pixel (RGBA order).
#[wasm_bindgen]
pub fn upload_sprite(role: &str, width: u32, height: u32, rgba: &[u8]) {
    if let Ok(mut q) = PENDING_UPLOADS.lock() {
        q.push(PendingUpload {
            role: role.to_string(),
            kind: UploadKind::Sprite,
            data: rgba.to_vec(),
            width,
            height,
        });
    }
}

/// Upload an RGBA image to use as the game background.
#[wasm_bindgen]
pub fn upload_background(width: u32, height: u32, rgba: &[u8]) {
    if let Ok(mut q) = PENDING_UPLOADS.lock() {
        q.push(PendingUpload {
            role: "background".to_string(),
            kind: UploadKind::Background,
            data: rgba.to_vec(),
            width,
            height,
        });
    }
}

// ---------------------------------------------------------------------------
// Bevy system — drains the queue and creates Bevy assets
// ---------------------------------------------------------------------------

fn process_uploads(mut custom: ResMut<CustomAssets>, mut images: ResMut<Assets<Image>>) {
    let uploads: Vec<PendingUpload> = match PENDING_UPLOADS.lock() {
        Ok(mut q) => q.drain(..).collect(),
        Err(_) => return,
    };

    for up in uploads {
        if up.data.len() != (up.width * up.height * 4) as usize {
            warn!("ignoring malformed {}x{} upload for '{}'", up.width, up.height, up.role);
            continue;
        }
        let image = Image::new(
            Extent3d {
                width: up.width,
                height: up.height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            up.data,
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::RENDER_WORLD,
        );
        let handle = images.add(image);
        match up.kind {
            UploadKind::Sprite => {
                custom.sprites.insert(up.role, handle);
            }
            UploadKind::Background => {
                custom.background = Some(handle);
            }
        }
    }
}
