//! Game-logic functions.
//!
//! Every public transition takes an immutable reference to the current
//! `World` (and, where needed, the clock and an RNG handle) and returns a
//! brand-new `World`.  Side effects are limited to the injected RNG.
//!
//! Displacements are per call, not per second: the host decides the frame
//! rate and the game speed follows it.

use std::time::Duration;

use glam::{Quat, Vec3};
use rand::Rng;
use tracing::{debug, info};

use crate::config::{CollisionShape, ControlScheme, VariantConfig};
use crate::entities::{
    Bullet, Camera, GameStatus, GroundGroup, GroundTile, Hud, ModelSource, Movable,
    Obstacle, Player, Skybox, World, BULLET_RADIUS, ENEMY_HALF_EXTENT, OBSTACLE_HALF_EXTENT,
};
use crate::input::KeyState;
use crate::spawner::Spawner;
use crate::timer::Cooldown;

/// What happened during one `tick`, for the session and the log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub fired: bool,
    pub kills: u32,
    pub hits_taken: u32,
    pub tiles_recycled: usize,
    /// True only on the frame the game ends.
    pub game_over: bool,
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial world.  The player is absent until its model arrives.
pub fn init_world(config: VariantConfig, now: Duration, rng: &mut impl Rng) -> World {
    let tiles = (0..config.tile_count)
        .map(|i| GroundTile {
            z: i as f32 * config.tile_length,
            // The tile under the spawn point starts clear.
            obstacles: if i == 0 {
                Vec::new()
            } else {
                scatter_obstacles(&config, rng)
            },
        })
        .collect();

    let period = Duration::from_millis(config.spawn_period_ms);
    let spawner = if config.has_enemies {
        Spawner::start(period, now)
    } else {
        Spawner::stopped(period)
    };

    let health = config.max_health;
    let hud = Hud {
        timer: format_timer(Duration::ZERO),
        score: format_score(0),
        health_percent: health_percent(health, config.max_health),
        banner: None,
    };
    let player_start = Vec3::new(0.0, config.player_height, 0.0);

    World {
        camera: follow_camera(player_start, config.camera_offset),
        fire_cooldown: Cooldown::from_millis(config.fire_cooldown_ms),
        player: None,
        bullets: Vec::new(),
        enemies: Vec::new(),
        ground: GroundGroup { offset: 0.0, tiles },
        skybox: None,
        hud,
        spawner,
        score: 0,
        health,
        status: GameStatus::Playing,
        frame: 0,
        started_at: now,
        config,
    }
}

/// Drop the player into the world once its model (or placeholder) exists.
/// Both sources share the same position contract.
pub fn attach_player(state: &World, model: ModelSource) -> World {
    let mut body = Movable::at(Vec3::new(0.0, state.config.player_height, 0.0));
    body.scale = Vec3::splat(match model {
        ModelSource::Gltf { .. } => state.config.player_scale,
        ModelSource::Placeholder => 1.0,
    });
    World {
        camera: follow_camera(body.position, state.config.camera_offset),
        player: Some(Player {
            body,
            model,
            tinted: false,
        }),
        ..state.clone()
    }
}

pub fn attach_skybox(state: &World, textured: bool) -> World {
    World {
        skybox: Some(Skybox { yaw: 0.0, textured }),
        ..state.clone()
    }
}

/// Random 2×2×2 boxes resting on a tile, in tile-local coordinates.
pub fn scatter_obstacles(config: &VariantConfig, rng: &mut impl Rng) -> Vec<Obstacle> {
    let half_w = config.half_width();
    let half_l = config.tile_length / 2.0;
    // An empty sampling range would panic inside `gen_range`.
    if !config.has_obstacles || half_w <= 0.0 || half_l <= 0.0 {
        return Vec::new();
    }
    (0..config.obstacles_per_tile)
        .map(|_| Obstacle {
            local: Vec3::new(
                rng.gen_range(-half_w..half_w),
                OBSTACLE_HALF_EXTENT,
                rng.gen_range(-half_l..half_l),
            ),
        })
        .collect()
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Strafe toward +x (screen left from the chase camera).
pub fn move_player_left(state: &World) -> World {
    shift_player(state, Vec3::X * state.config.move_speed)
}

pub fn move_player_right(state: &World) -> World {
    shift_player(state, Vec3::NEG_X * state.config.move_speed)
}

pub fn climb(state: &World) -> World {
    shift_player(state, Vec3::Y * state.config.move_speed)
}

pub fn descend(state: &World) -> World {
    shift_player(state, Vec3::NEG_Y * state.config.move_speed)
}

fn shift_player(state: &World, delta: Vec3) -> World {
    let Some(player) = &state.player else {
        return state.clone();
    };
    let mut player = player.clone();
    player.body.position += delta;
    player.body.position.x = clamp_lateral(player.body.position.x, state.config.half_width());
    World {
        player: Some(player),
        ..state.clone()
    }
}

/// Fire a bullet from the player, unless the cooldown is still running.
pub fn player_shoot(state: &World, now: Duration) -> World {
    let Some(player) = &state.player else {
        return state.clone();
    };
    let mut fire_cooldown = state.fire_cooldown.clone();
    if !fire_cooldown.try_trigger(now) {
        return state.clone();
    }
    let mut bullets = state.bullets.clone();
    bullets.push(spawn_bullet(&player.body, state.config.bullet_speed));
    World {
        bullets,
        fire_cooldown,
        ..state.clone()
    }
}

/// A bullet leaves the owner's position facing backwards relative to the
/// model, which is the way the model's nose points.
pub fn spawn_bullet(owner: &Movable, speed: f32) -> Bullet {
    let orientation = owner.orientation * Quat::from_xyzw(0.0, 1.0, 0.0, 0.0);
    let direction = (orientation * Vec3::NEG_Z).normalize();
    Bullet {
        body: Movable {
            position: owner.position,
            orientation,
            scale: Vec3::splat(BULLET_RADIUS),
        },
        direction,
        speed,
    }
}

// ── Step helpers ─────────────────────────────────────────────────────────────

pub fn clamp_lateral(x: f32, half_width: f32) -> f32 {
    x.clamp(-half_width, half_width)
}

pub fn follow_camera(player: Vec3, offset: Vec3) -> Camera {
    Camera {
        eye: player + offset,
        target: player,
    }
}

pub fn health_percent(health: i32, max_health: i32) -> f32 {
    (100.0 * health as f32 / max_health as f32).clamp(0.0, 100.0)
}

pub fn format_score(score: u32) -> String {
    format!("Score: {}", score)
}

pub fn format_timer(elapsed: Duration) -> String {
    format!("Time: {}s", elapsed.as_secs())
}

/// Move the ground ring by `delta` along z and recycle every tile that
/// scrolled out of the window `[-tile_length, tile_length * (count - 1)]`
/// to the opposite end.  Returns the number of recycles.
pub fn scroll_ground(
    ground: &mut GroundGroup,
    delta: f32,
    config: &VariantConfig,
    rng: &mut impl Rng,
) -> usize {
    if delta == 0.0 {
        return 0;
    }
    ground.offset += delta;
    let offset = ground.offset;
    let span = config.tile_count as f32 * config.tile_length;
    let trailing = -config.tile_length;
    let leading = config.tile_length * (config.tile_count as f32 - 1.0);

    let mut recycled = 0;
    for tile in ground.tiles.iter_mut() {
        let before = tile.z;
        if delta < 0.0 {
            while tile.z + offset < trailing {
                tile.z += span;
            }
        } else {
            while tile.z + offset > leading {
                tile.z -= span;
            }
        }
        if tile.z != before {
            tile.obstacles = scatter_obstacles(config, rng);
            recycled += 1;
        }
    }
    if recycled > 0 {
        debug!(recycled, offset, "ground tiles recycled");
    }
    recycled
}

/// Move every bullet along its direction and drop the ones past `bounds`
/// on either travel axis.  A bullet sitting exactly on the bound stays.
pub fn advance_bullets(bullets: &[Bullet], bounds: f32) -> Vec<Bullet> {
    bullets
        .iter()
        .filter_map(|b| {
            let mut moved = b.clone();
            moved.body.position += b.direction * b.speed;
            let p = moved.body.position;
            if p.x.abs() > bounds || p.z.abs() > bounds {
                None
            } else {
                Some(moved)
            }
        })
        .collect()
}

fn bullet_hits(bullet: &Bullet, centre: Vec3, half_extent: f32, config: &VariantConfig) -> bool {
    match config.collision {
        CollisionShape::Sphere => bullet.body.position.distance(centre) < config.hit_radius,
        CollisionShape::Aabb => {
            let reach = Vec3::splat(BULLET_RADIUS + half_extent);
            (bullet.body.position - centre).abs().cmplt(reach).all()
        }
    }
}

// ── Per-frame tick (RNG injected) ────────────────────────────────────────

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
pub fn tick(
    state: &World,
    keys: &KeyState,
    now: Duration,
    rng: &mut impl Rng,
) -> (World, FrameReport) {
    let mut report = FrameReport::default();
    let mut world = state.clone();
    world.frame += 1;

    if world.status == GameStatus::Playing && world.player.is_some() {
        play_frame(&mut world, keys, now, rng, &mut report);
    }

    // ── 8. Cosmetics ─────────────────────────────────────────────────────────
    if let Some(skybox) = world.skybox.as_mut() {
        skybox.yaw += world.config.skybox_spin;
    }
    world.hud.timer = format_timer(now.saturating_sub(world.started_at));

    (world, report)
}

fn play_frame(
    world: &mut World,
    keys: &KeyState,
    now: Duration,
    rng: &mut impl Rng,
    report: &mut FrameReport,
) {
    let config = world.config.clone();

    // ── 1. Input ─────────────────────────────────────────────────────────────
    let mut scroll = 0.0;
    match config.control {
        ControlScheme::Lane => {
            if keys.forward {
                scroll -= config.ground_scroll_speed;
            }
            if keys.backward {
                scroll += config.ground_scroll_speed;
            }
        }
        ControlScheme::Hover => {
            if keys.forward {
                *world = climb(world);
            } else if keys.backward {
                *world = descend(world);
            }
        }
    }
    if keys.left {
        *world = move_player_left(world);
    }
    if keys.right {
        *world = move_player_right(world);
    }
    if keys.fire || keys.fire_pulse {
        let before = world.bullets.len();
        *world = player_shoot(world, now);
        report.fired = world.bullets.len() > before;
    }

    // ── 2. World scroll ──────────────────────────────────────────────────────
    if config.auto_scroll {
        scroll -= config.ground_scroll_speed;
    }
    report.tiles_recycled = scroll_ground(&mut world.ground, scroll, &config, rng);

    let Some(player) = world.player.as_mut() else {
        return;
    };

    // ── 3. Lateral clamp & altitude tint ─────────────────────────────────────
    player.body.position.x = clamp_lateral(player.body.position.x, config.half_width());
    if config.control == ControlScheme::Hover
        && !player.tinted
        && player.body.position.y > config.tint_altitude
    {
        player.tinted = true;
        info!(altitude = player.body.position.y, "player tinted");
    }
    let player_pos = player.body.position;

    // ── 4. Camera follow ─────────────────────────────────────────────────────
    world.camera = follow_camera(player_pos, config.camera_offset);

    // ── 5. Projectiles ───────────────────────────────────────────────────────
    world.bullets = advance_bullets(&world.bullets, config.bullet_bounds);

    if config.has_enemies {
        if let Some(enemy) = world.spawner.poll(now, player_pos.z, &config, rng) {
            world.enemies.push(enemy);
        }
    }
    world.enemies = world
        .enemies
        .iter()
        .map(|e| {
            let mut e = e.clone();
            e.body.position.z -= e.speed;
            e
        })
        .filter(|e| e.body.position.z >= player_pos.z - config.bullet_bounds)
        .collect();

    // ── 6. Collision: bullets ↔ enemies and obstacles ────────────────────────
    resolve_bullet_hits(world, report);

    // ── 7. Hazards ↔ player ──────────────────────────────────────────────────
    if config.has_health {
        resolve_hazards(world, player_pos, report);
    }
}

fn resolve_bullet_hits(world: &mut World, report: &mut FrameReport) {
    let config = &world.config;
    let mut used_bullets: Vec<usize> = Vec::new();
    let mut killed_enemies: Vec<usize> = Vec::new();
    let mut smashed: Vec<(usize, usize)> = Vec::new();

    for (bi, bullet) in world.bullets.iter().enumerate() {
        let enemy_hit = world.enemies.iter().enumerate().position(|(ei, e)| {
            !killed_enemies.contains(&ei)
                && bullet_hits(bullet, e.body.position, ENEMY_HALF_EXTENT, config)
        });
        if let Some(ei) = enemy_hit {
            killed_enemies.push(ei);
            used_bullets.push(bi);
            continue;
        }
        if !config.has_obstacles {
            continue;
        }
        'tiles: for (ti, tile) in world.ground.tiles.iter().enumerate() {
            for (oi, obstacle) in tile.obstacles.iter().enumerate() {
                let centre = world.ground.obstacle_world(tile, obstacle);
                if !smashed.contains(&(ti, oi))
                    && bullet_hits(bullet, centre, OBSTACLE_HALF_EXTENT, config)
                {
                    smashed.push((ti, oi));
                    used_bullets.push(bi);
                    break 'tiles;
                }
            }
        }
    }

    let kills = (killed_enemies.len() + smashed.len()) as u32;
    if kills == 0 {
        return;
    }
    let score_gain = kills * config.score_per_kill;

    world.bullets = compact(&world.bullets, &used_bullets);
    world.enemies = compact(&world.enemies, &killed_enemies);
    remove_obstacles(&mut world.ground, &smashed);

    world.score += score_gain;
    world.hud.score = format_score(world.score);
    report.kills += kills;
    debug!(kills, score = world.score, "hazards destroyed");
}

fn resolve_hazards(world: &mut World, player_pos: Vec3, report: &mut FrameReport) {
    let radius = world.config.damage_radius;
    let mut rammed_enemies: Vec<usize> = Vec::new();
    let mut rammed_obstacles: Vec<(usize, usize)> = Vec::new();

    for (ei, enemy) in world.enemies.iter().enumerate() {
        if enemy.body.position.distance(player_pos) < radius {
            rammed_enemies.push(ei);
        }
    }
    for (ti, tile) in world.ground.tiles.iter().enumerate() {
        for (oi, obstacle) in tile.obstacles.iter().enumerate() {
            if world.ground.obstacle_world(tile, obstacle).distance(player_pos) < radius {
                rammed_obstacles.push((ti, oi));
            }
        }
    }

    let hits = (rammed_enemies.len() + rammed_obstacles.len()) as i32;
    if hits == 0 {
        return;
    }
    world.enemies = compact(&world.enemies, &rammed_enemies);
    remove_obstacles(&mut world.ground, &rammed_obstacles);

    world.health -= hits * world.config.damage;
    world.hud.health_percent = health_percent(world.health, world.config.max_health);
    report.hits_taken += hits as u32;
    debug!(hits, health = world.health, "player hit");

    if world.health <= 0 {
        end_game(world);
        report.game_over = true;
    }
}

/// Enter the terminal state: timers cancelled, banner raised.
fn end_game(world: &mut World) {
    world.status = GameStatus::GameOver;
    world.spawner.stop();
    world.fire_cooldown.cancel();
    world.hud.banner = Some(format!("Game Over! Final score: {}", world.score));
    info!(score = world.score, frame = world.frame, "game over");
}

/// Keep every element whose index is not listed.
fn compact<T: Clone>(items: &[T], removed: &[usize]) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, item)| item.clone())
        .collect()
}

fn remove_obstacles(ground: &mut GroundGroup, removed: &[(usize, usize)]) {
    for (ti, tile) in ground.tiles.iter_mut().enumerate() {
        let doomed: Vec<usize> = removed
            .iter()
            .filter(|(t, _)| *t == ti)
            .map(|(_, o)| *o)
            .collect();
        if !doomed.is_empty() {
            tile.obstacles = compact(&tile.obstacles, &doomed);
        }
    }
}
