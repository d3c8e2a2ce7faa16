use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use lane_shooter::assets::{
    load_model, load_texture, model_or_placeholder, request_player_model, texture_or_plain,
    AssetEvent,
};
use lane_shooter::audio::{LoopedTrack, Soundtrack};
use lane_shooter::config::VariantConfig;
use lane_shooter::entities::{GameStatus, ModelSource};
use lane_shooter::input::{InputEvent, KeyState};
use lane_shooter::session::Session;
use lane_shooter::spawner::SpawnerState;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn scratch_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("lane_shooter_{}_{}", std::process::id(), name));
    std::fs::write(&path, bytes).unwrap();
    path
}

fn glb_bytes(version: u32) -> Vec<u8> {
    let mut bytes = b"glTF".to_vec();
    bytes.extend_from_slice(&version.to_le_bytes());
    bytes.extend_from_slice(&20u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 8]);
    bytes
}

fn quiet_config() -> VariantConfig {
    VariantConfig {
        auto_scroll: false,
        has_obstacles: false,
        ..VariantConfig::shooter()
    }
}

// ── assets ────────────────────────────────────────────────────────────────────

#[test]
fn valid_glb_loads_as_model() {
    let path = scratch_file("ok.glb", &glb_bytes(2));
    let model = load_model(&path).unwrap();
    assert!(matches!(model, ModelSource::Gltf { .. }));
}

#[test]
fn wrong_version_or_magic_is_rejected() {
    let v1 = scratch_file("v1.glb", &glb_bytes(1));
    assert!(load_model(&v1).is_err());
    let junk = scratch_file("junk.glb", b"definitely not a model");
    assert!(load_model(&junk).is_err());
}

#[test]
fn truncated_glb_is_rejected() {
    let mut bytes = glb_bytes(2);
    bytes.truncate(14);
    let path = scratch_file("short.glb", &bytes);
    assert!(load_model(&path).is_err());
}

#[test]
fn missing_model_falls_back_to_placeholder() {
    assert_eq!(
        model_or_placeholder("no/such/model.glb"),
        ModelSource::Placeholder
    );
}

#[test]
fn texture_checks_image_signature() {
    let png = scratch_file("sky.png", &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]);
    assert!(load_texture(&png).is_ok());
    let jpg = scratch_file("sky.jpg", &[0xFF, 0xD8, 0xFF, 0xE0]);
    assert!(texture_or_plain(jpg.to_str().unwrap()));
    assert!(!texture_or_plain("no/such/sky.jpg"));
}

#[test]
fn background_load_reports_through_channel() {
    let (tx, rx) = mpsc::channel();
    request_player_model("no/such/model.glb".into(), tx)
        .join()
        .unwrap();
    assert_eq!(
        rx.recv().unwrap(),
        AssetEvent::Player(ModelSource::Placeholder)
    );
}

// ── session ───────────────────────────────────────────────────────────────────

#[test]
fn frames_before_the_model_arrives_only_tick_cosmetics() {
    let (tx, rx) = mpsc::channel();
    let mut rng = seeded_rng();
    let mut session =
        Session::with_collaborators(quiet_config(), ms(0), &mut rng, rx, None).unwrap();
    let mut keys = KeyState::new();
    keys.process_event(&InputEvent::KeyDown("a".into()));

    session.frame(&mut keys, ms(16), &mut rng);
    assert!(session.world().player.is_none());

    tx.send(AssetEvent::Player(ModelSource::Placeholder)).unwrap();
    tx.send(AssetEvent::Skybox { textured: false }).unwrap();
    session.frame(&mut keys, ms(32), &mut rng);

    let world = session.world();
    let player = world.player.as_ref().unwrap();
    assert!((player.body.position.x - 0.6).abs() < 1e-6);
    assert!(!world.skybox.as_ref().unwrap().textured);
}

#[test]
fn pointer_pulse_is_consumed_by_one_frame() {
    let (tx, rx) = mpsc::channel();
    let mut rng = seeded_rng();
    let config = VariantConfig {
        fire_cooldown_ms: 0,
        ..quiet_config()
    };
    let mut session =
        Session::with_collaborators(config, ms(0), &mut rng, rx, None).unwrap();
    tx.send(AssetEvent::Player(ModelSource::Placeholder)).unwrap();

    let mut keys = KeyState::new();
    keys.process_event(&InputEvent::PointerDown);
    assert!(session.frame(&mut keys, ms(16), &mut rng).fired);
    assert!(!keys.fire_pulse);
    assert!(!session.frame(&mut keys, ms(32), &mut rng).fired);
}

#[test]
fn game_over_pauses_soundtrack_and_stops_spawner() {
    let (tx, rx) = mpsc::channel();
    let mut rng = seeded_rng();
    // Enemies appear right on top of the player every 100 ms.
    let config = VariantConfig {
        max_health: 2,
        lane_width: 0.1,
        spawn_period_ms: 100,
        spawn_lookahead: 0.0,
        spawn_range: 0.0,
        enemy_speed: 0.0,
        ..quiet_config()
    };
    let track: Box<dyn Soundtrack> = Box::new(LoopedTrack::new("theme.mp3"));
    let mut session =
        Session::with_collaborators(config, ms(0), &mut rng, rx, Some(track)).unwrap();
    assert!(session.soundtrack().unwrap().is_playing());
    tx.send(AssetEvent::Player(ModelSource::Placeholder)).unwrap();

    let mut keys = KeyState::new();
    let mut game_overs = 0;
    let mut health = Vec::new();
    for frame in 1..=20u64 {
        let report = session.frame(&mut keys, ms(frame * 50), &mut rng);
        if report.game_over {
            game_overs += 1;
        }
        health.push(session.world().health);
    }

    assert_eq!(game_overs, 1);
    assert!(session.is_over());
    assert_eq!(session.world().status, GameStatus::GameOver);
    assert_eq!(session.world().spawner.state(), SpawnerState::Stopped);
    assert!(!session.soundtrack().unwrap().is_playing());
    assert!(health.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(*health.last().unwrap(), 0);
    assert!(session.world().enemies.is_empty());
}

#[test]
fn invalid_config_is_rejected_before_the_world_exists() {
    let (_tx, rx) = mpsc::channel();
    let mut rng = seeded_rng();
    let config = VariantConfig {
        lane_width: 0.0,
        ..VariantConfig::shooter()
    };
    let track: Box<dyn Soundtrack> = Box::new(LoopedTrack::new("theme.mp3"));
    let result = Session::with_collaborators(config, ms(0), &mut rng, rx, Some(track));
    assert!(result.is_err());
}

#[test]
fn start_rejects_invalid_config() {
    let mut rng = seeded_rng();
    let config = VariantConfig {
        tile_count: 0,
        ..VariantConfig::shooter()
    };
    assert!(Session::start(config, ms(0), &mut rng).is_err());
}
