//! Asset loading.
//!
//! Loads run on worker threads and report back through a channel, so the
//! frame loop only ever sees a finished asset between frames.  A load that
//! fails is replaced by a placeholder with the same position contract; the
//! failure is logged and otherwise forgotten.

use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use anyhow::{bail, ensure, Context};
use tracing::{info, warn};

use crate::entities::ModelSource;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_HEADER_LEN: usize = 12;
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Completion of an asynchronous load.
#[derive(Clone, Debug, PartialEq)]
pub enum AssetEvent {
    Player(ModelSource),
    Skybox { textured: bool },
}

/// Check that `path` holds a binary glTF 2.0 container.
pub fn load_model(path: impl AsRef<Path>) -> anyhow::Result<ModelSource> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("reading model {}", path.display()))?;
    ensure!(
        bytes.len() >= GLB_HEADER_LEN,
        "model {} is too short for a glb header",
        path.display()
    );
    if &bytes[0..4] != GLB_MAGIC {
        bail!("model {} is not a binary glTF file", path.display());
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    ensure!(version == 2, "model {} has unsupported glTF version {}", path.display(), version);
    let declared = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    ensure!(
        declared <= bytes.len(),
        "model {} is truncated ({} of {} bytes)",
        path.display(),
        bytes.len(),
        declared
    );
    Ok(ModelSource::Gltf {
        path: path.display().to_string(),
    })
}

/// Check that `path` holds a PNG or JPEG image.
pub fn load_texture(path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("reading texture {}", path.display()))?;
    if bytes.starts_with(PNG_MAGIC) || bytes.starts_with(JPEG_MAGIC) {
        Ok(())
    } else {
        bail!("texture {} is neither PNG nor JPEG", path.display())
    }
}

/// Load the player model, substituting the placeholder box on failure.
pub fn model_or_placeholder(path: &str) -> ModelSource {
    match load_model(path) {
        Ok(model) => {
            info!(path, "player model loaded");
            model
        }
        Err(err) => {
            warn!(path, error = ?err, "player model failed, using placeholder");
            ModelSource::Placeholder
        }
    }
}

/// Load the skybox texture.  Returns whether the real texture is usable.
pub fn texture_or_plain(path: &str) -> bool {
    match load_texture(path) {
        Ok(()) => {
            info!(path, "skybox texture loaded");
            true
        }
        Err(err) => {
            warn!(path, error = ?err, "skybox texture failed, using plain sphere");
            false
        }
    }
}

/// Start loading the player model in the background.
pub fn request_player_model(path: String, tx: Sender<AssetEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let model = model_or_placeholder(&path);
        // The session may already be gone.
        let _ = tx.send(AssetEvent::Player(model));
    })
}

/// Start loading the skybox texture in the background.
pub fn request_skybox(path: String, tx: Sender<AssetEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let textured = texture_or_plain(&path);
        let _ = tx.send(AssetEvent::Skybox { textured });
    })
}
