//! All game entity types.  Pure data, no game logic.

use std::time::Duration;

use glam::{Mat4, Quat, Vec3};

use crate::config::VariantConfig;
use crate::spawner::Spawner;
use crate::timer::Cooldown;

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

// ── Scene objects ─────────────────────────────────────────────────────────────

/// Anything the update loop moves around: position, orientation and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Movable {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

impl Movable {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Where the player's mesh came from.  Gameplay never branches on this.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelSource {
    Gltf { path: String },
    /// Unit box used when the model failed to load.
    Placeholder,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: Movable,
    pub model: ModelSource,
    /// Set once the hover variant climbs past its tint altitude.
    pub tinted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub body: Movable,
    /// Unit travel direction, fixed at spawn.
    pub direction: Vec3,
    pub speed: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub body: Movable,
    /// Distance covered toward the player (−z) per frame.
    pub speed: f32,
}

/// A 2×2×2 box riding on a ground tile.  `local` is relative to the tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub local: Vec3,
}

pub const OBSTACLE_HALF_EXTENT: f32 = 1.0;
pub const ENEMY_HALF_EXTENT: f32 = 0.5;
pub const BULLET_RADIUS: f32 = 0.2;

#[derive(Clone, Debug, PartialEq)]
pub struct GroundTile {
    /// Position along the travel axis, relative to the group.
    pub z: f32,
    pub obstacles: Vec<Obstacle>,
}

/// The ring of ground tiles plus the offset the whole ring has scrolled by.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundGroup {
    pub offset: f32,
    pub tiles: Vec<GroundTile>,
}

impl GroundGroup {
    /// World-space z of a tile centre.
    pub fn world_z(&self, tile: &GroundTile) -> f32 {
        tile.z + self.offset
    }

    /// World-space centre of an obstacle on `tile`.
    pub fn obstacle_world(&self, tile: &GroundTile, obstacle: &Obstacle) -> Vec3 {
        Vec3::new(obstacle.local.x, obstacle.local.y, self.world_z(tile) + obstacle.local.z)
    }
}

/// Background sphere.  `textured` is false when the texture fell back.
#[derive(Clone, Debug, PartialEq)]
pub struct Skybox {
    pub yaw: f32,
    pub textured: bool,
}

// ── Camera ────────────────────────────────────────────────────────────────────

pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Follow camera.  Recomputed from the player every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
}

impl Camera {
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let projection = Mat4::perspective_rh(
            CAMERA_FOV_DEGREES.to_radians(),
            aspect,
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        projection * Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────────

/// Text the host shows on top of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub timer: String,
    pub score: String,
    /// Health bar width, 0..=100.
    pub health_percent: f32,
    /// Terminal notification, set once on game over.
    pub banner: Option<String>,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire state of one session.  Cloneable so the update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct World {
    pub config: VariantConfig,
    /// `None` until the player model (or its placeholder) arrives.
    pub player: Option<Player>,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub ground: GroundGroup,
    pub skybox: Option<Skybox>,
    pub camera: Camera,
    pub hud: Hud,
    pub spawner: Spawner,
    pub fire_cooldown: Cooldown,
    pub score: u32,
    pub health: i32,
    pub status: GameStatus,
    pub frame: u64,
    pub started_at: Duration,
}
