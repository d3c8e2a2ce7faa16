//! Variant configuration.
//!
//! Every prototype of the lane game is the same update loop with different
//! knobs turned.  `VariantConfig` enumerates those knobs; the presets below
//! reproduce the three playable variants and a JSON file can override any
//! field.

use std::path::Path;

use anyhow::{bail, Context};
use glam::Vec3;
use serde::Deserialize;

/// How directional input drives the player.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlScheme {
    /// Forward/backward scroll the ground, left/right strafe.
    Lane,
    /// Forward/backward change altitude; the ground never moves.
    Hover,
}

/// Shape used for bullet-versus-hazard hit tests.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionShape {
    /// Centre distance below `hit_radius`.
    Sphere,
    /// Axis-aligned bounding boxes overlap.
    Aabb,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    pub name: String,

    // ── Assets ────────────────────────────────────────────────────────────────
    pub player_asset: String,
    pub skybox_texture: Option<String>,
    pub soundtrack: Option<String>,

    // ── Movement ──────────────────────────────────────────────────────────────
    pub control: ControlScheme,
    pub move_speed: f32,
    pub ground_scroll_speed: f32,
    pub auto_scroll: bool,
    pub player_height: f32,
    pub player_scale: f32,
    /// Hover variant only: altitude above which the player gets tinted.
    pub tint_altitude: f32,

    // ── Feature switches ──────────────────────────────────────────────────────
    pub has_enemies: bool,
    pub has_obstacles: bool,
    pub has_health: bool,

    // ── Lane geometry ─────────────────────────────────────────────────────────
    pub lane_width: f32,
    pub tile_count: usize,
    pub tile_length: f32,
    pub obstacles_per_tile: usize,

    // ── Projectiles & collisions ──────────────────────────────────────────────
    pub bullet_speed: f32,
    pub bullet_bounds: f32,
    pub collision: CollisionShape,
    pub hit_radius: f32,
    pub damage_radius: f32,
    pub fire_cooldown_ms: u64,

    // ── Enemies ───────────────────────────────────────────────────────────────
    pub spawn_period_ms: u64,
    pub spawn_lookahead: f32,
    pub spawn_range: f32,
    pub enemy_speed: f32,

    // ── Scoring ───────────────────────────────────────────────────────────────
    pub max_health: i32,
    pub damage: i32,
    pub score_per_kill: u32,

    // ── Cosmetics ─────────────────────────────────────────────────────────────
    pub camera_offset: Vec3,
    /// Radians of skybox yaw added every frame.
    pub skybox_spin: f32,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self::shooter()
    }
}

impl VariantConfig {
    /// Helicopter hovering over a static floor.  No lane, no enemies.
    pub fn hover() -> Self {
        Self {
            name: String::from("Hover"),
            player_asset: String::from("assets/models/low_poly_helicopter.glb"),
            soundtrack: None,
            control: ControlScheme::Hover,
            move_speed: 0.02,
            ground_scroll_speed: 0.0,
            auto_scroll: false,
            player_height: 1.0,
            player_scale: 0.3,
            has_enemies: false,
            has_obstacles: false,
            has_health: false,
            tile_count: 1,
            tile_length: 30.0,
            lane_width: 30.0,
            obstacles_per_tile: 0,
            fire_cooldown_ms: 0,
            camera_offset: Vec3::new(0.0, 0.0, -5.0),
            skybox_spin: 0.0,
            ..Self::shooter()
        }
    }

    /// Pod driving down the obstacle lane on demand.  Boxes can be shot
    /// but never hurt.
    pub fn runner() -> Self {
        Self {
            name: String::from("Runner"),
            player_asset: String::from("assets/models/pod.glb"),
            soundtrack: None,
            auto_scroll: false,
            player_scale: 0.05,
            has_enemies: false,
            has_obstacles: true,
            has_health: false,
            fire_cooldown_ms: 0,
            ..Self::shooter()
        }
    }

    /// Full game: auto-scrolling lane, enemies, obstacles and health.
    pub fn shooter() -> Self {
        Self {
            name: String::from("Shooter"),
            player_asset: String::from("assets/models/pod.glb"),
            skybox_texture: Some(String::from("assets/images/Nebula.jpg")),
            soundtrack: Some(String::from("assets/audio/background.mp3")),
            control: ControlScheme::Lane,
            move_speed: 0.6,
            ground_scroll_speed: 0.6,
            auto_scroll: true,
            player_height: 2.0,
            player_scale: 0.05,
            tint_altitude: 1.0,
            has_enemies: true,
            has_obstacles: true,
            has_health: true,
            lane_width: 50.0,
            tile_count: 10,
            tile_length: 50.0,
            obstacles_per_tile: 5,
            bullet_speed: 1.0,
            bullet_bounds: 100.0,
            collision: CollisionShape::Sphere,
            hit_radius: 1.5,
            damage_radius: 1.5,
            fire_cooldown_ms: 300,
            spawn_period_ms: 2000,
            spawn_lookahead: 60.0,
            spawn_range: 40.0,
            enemy_speed: 0.3,
            max_health: 5,
            damage: 1,
            score_per_kill: 10,
            camera_offset: Vec3::new(0.0, 8.0, -18.0),
            skybox_spin: 0.001,
        }
    }

    /// Look a preset up by its menu name (case-insensitive).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hover" => Some(Self::hover()),
            "runner" => Some(Self::runner()),
            "shooter" => Some(Self::shooter()),
            _ => None,
        }
    }

    /// Load a variant from a JSON file.  Missing fields fall back to the
    /// shooter preset.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the update loop cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_health <= 0 {
            bail!("max_health must be positive, got {}", self.max_health);
        }
        if self.tile_count == 0 {
            bail!("tile_count must be at least 1");
        }
        if self.tile_length <= 0.0 {
            bail!("tile_length must be positive, got {}", self.tile_length);
        }
        if self.lane_width <= 0.0 {
            bail!("lane_width must be positive, got {}", self.lane_width);
        }
        if self.damage < 0 {
            bail!("damage must not be negative, got {}", self.damage);
        }
        Ok(())
    }

    pub fn half_width(&self) -> f32 {
        self.lane_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for config in [VariantConfig::hover(), VariantConfig::runner(), VariantConfig::shooter()] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn json_overrides_only_named_fields() {
        let config =
            VariantConfig::from_json_str(r#"{ "name": "Custom", "max_health": 3 }"#).unwrap();
        assert_eq!(config.name, "Custom");
        assert_eq!(config.max_health, 3);
        assert_eq!(config.tile_count, VariantConfig::shooter().tile_count);
    }

    #[test]
    fn json_reads_enums_and_vectors() {
        let config = VariantConfig::from_json_str(
            r#"{ "control": "hover", "collision": "aabb", "camera_offset": [1.0, 2.0, 3.0] }"#,
        )
        .unwrap();
        assert_eq!(config.control, ControlScheme::Hover);
        assert_eq!(config.collision, CollisionShape::Aabb);
        assert_eq!(config.camera_offset, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn zero_health_is_rejected() {
        assert!(VariantConfig::from_json_str(r#"{ "max_health": 0 }"#).is_err());
    }

    #[test]
    fn empty_ring_is_rejected() {
        assert!(VariantConfig::from_json_str(r#"{ "tile_count": 0 }"#).is_err());
    }

    #[test]
    fn non_positive_tile_length_is_rejected() {
        assert!(VariantConfig::from_json_str(r#"{ "tile_length": 0.0 }"#).is_err());
        assert!(VariantConfig::from_json_str(r#"{ "tile_length": -5.0 }"#).is_err());
    }

    #[test]
    fn non_positive_lane_width_is_rejected() {
        assert!(VariantConfig::from_json_str(r#"{ "lane_width": 0.0 }"#).is_err());
        assert!(VariantConfig::from_json_str(r#"{ "lane_width": -1.0 }"#).is_err());
    }

    #[test]
    fn negative_damage_is_rejected() {
        assert!(VariantConfig::from_json_str(r#"{ "damage": -1 }"#).is_err());
        assert!(VariantConfig::from_json_str(r#"{ "damage": 0 }"#).is_ok());
    }

    #[test]
    fn hover_skybox_stands_still() {
        assert_eq!(VariantConfig::hover().skybox_spin, 0.0);
        assert!(VariantConfig::shooter().skybox_spin > 0.0);
    }

    #[test]
    fn preset_lookup_ignores_case() {
        assert_eq!(VariantConfig::preset("RUNNER").unwrap().name, "Runner");
        assert!(VariantConfig::preset("racing").is_none());
    }
}
