use std::time::Duration;

use glam::{Quat, Vec3};
use lane_shooter::compute::{follow_camera, init_world};
use lane_shooter::config::VariantConfig;
use lane_shooter::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn entity_clone_and_eq() {
    assert_eq!(GameStatus::Playing, GameStatus::Playing);
    assert_ne!(GameStatus::Playing, GameStatus::GameOver);
    assert_ne!(
        ModelSource::Placeholder,
        ModelSource::Gltf {
            path: "pod.glb".into()
        }
    );

    let m = Movable::at(Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(m.orientation, Quat::IDENTITY);
    assert_eq!(m.scale, Vec3::ONE);
    assert_eq!(m.clone(), m);
}

#[test]
fn world_clone_is_independent() {
    let original = init_world(
        VariantConfig::shooter(),
        Duration::ZERO,
        &mut StdRng::seed_from_u64(42),
    );
    let mut cloned = original.clone();

    // Mutating the clone must not affect the original
    cloned.score = 999;
    cloned.ground.offset = -12.0;
    cloned.enemies.push(Enemy {
        body: Movable::at(Vec3::ZERO),
        speed: 0.3,
    });

    assert_eq!(original.score, 0);
    assert_eq!(original.ground.offset, 0.0);
    assert!(original.enemies.is_empty());
}

#[test]
fn obstacle_world_position_follows_tile_and_group() {
    let ground = GroundGroup {
        offset: -20.0,
        tiles: vec![GroundTile {
            z: 100.0,
            obstacles: vec![Obstacle {
                local: Vec3::new(3.0, 1.0, -4.0),
            }],
        }],
    };
    let tile = &ground.tiles[0];
    assert_eq!(ground.world_z(tile), 80.0);
    assert_eq!(
        ground.obstacle_world(tile, &tile.obstacles[0]),
        Vec3::new(3.0, 1.0, 76.0)
    );
}

#[test]
fn camera_projects_its_target_to_screen_centre() {
    let camera = follow_camera(Vec3::new(4.0, 2.0, 10.0), Vec3::new(0.0, 8.0, -18.0));
    let clip = camera.view_projection(16.0 / 9.0) * camera.target.extend(1.0);
    assert!(clip.w > 0.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < 1e-4);
    assert!(ndc.y.abs() < 1e-4);
}

#[test]
fn camera_sees_positive_x_on_the_left() {
    let camera = follow_camera(Vec3::ZERO, Vec3::new(0.0, 8.0, -18.0));
    let vp = camera.view_projection(1.0);
    let clip = vp * Vec3::new(5.0, 0.0, 0.0).extend(1.0);
    assert!(clip.x / clip.w < 0.0);
}
