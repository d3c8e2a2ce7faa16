//! Rendering layer.  All terminal I/O lives here.
//!
//! The scene is projected through the follow camera onto the character
//! grid.  No game logic is performed; this module only translates the
//! world into terminal commands.

use std::f32::consts::TAU;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use glam::{Mat4, Vec3};
use lane_shooter::entities::{GameStatus, ModelSource, World};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_GROUND: Color = Color::DarkGreen;
const C_LANE_EDGE: Color = Color::Green;
const C_OBSTACLE: Color = Color::DarkYellow;
const C_ENEMY: Color = Color::Red;
const C_BULLET: Color = Color::Yellow;
const C_PLAYER: Color = Color::Cyan;
const C_PLAYER_TINTED: Color = Color::Rgb { r: 255, g: 165, b: 0 };
const C_STAR: Color = Color::White;
const C_STAR_PLAIN: Color = Color::DarkGrey;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_TIMER: Color = Color::White;
const C_HUD_HEALTH: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;
const STAR_COUNT: u16 = 48;
const HEALTH_BAR_CELLS: usize = 20;
const LANE_SAMPLES: usize = 24;

/// Character grid the scene is projected onto (rows 1 .. height-2).
struct Viewport {
    width: u16,
    height: u16,
    view_projection: Mat4,
}

impl Viewport {
    fn new(state: &World, width: u16, height: u16) -> Self {
        let rows = height.saturating_sub(2).max(1) as f32;
        let aspect = width.max(1) as f32 / (rows * CELL_ASPECT);
        Self {
            width,
            height,
            view_projection: state.camera.view_projection(aspect),
        }
    }

    fn project(&self, point: Vec3) -> Option<(u16, u16)> {
        let clip = self.view_projection * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z > 1.0 {
            return None;
        }
        let cols = self.width.saturating_sub(1) as f32;
        let rows = self.height.saturating_sub(3) as f32;
        let col = ((ndc.x + 1.0) * 0.5 * cols).round() as u16;
        let row = 1 + ((1.0 - ndc.y) * 0.5 * rows).round() as u16;
        Some((col, row))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &World) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let viewport = Viewport::new(state, width, height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_skybox(out, state, &viewport)?;
    draw_ground(out, state, &viewport)?;
    draw_hazards(out, state, &viewport)?;
    draw_bullets(out, state, &viewport)?;
    draw_player(out, state, &viewport)?;
    draw_hud(out, state, width)?;
    draw_controls_hint(out, height)?;

    if state.status == GameStatus::GameOver {
        draw_game_over(out, state, width, height)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn put<W: Write>(out: &mut W, at: (u16, u16), color: Color, glyph: &str) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(at.0, at.1))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

// ── Background ────────────────────────────────────────────────────────────────

fn draw_skybox<W: Write>(out: &mut W, state: &World, viewport: &Viewport) -> std::io::Result<()> {
    let Some(skybox) = &state.skybox else {
        return Ok(());
    };
    let (color, glyph) = if skybox.textured {
        (C_STAR, "*")
    } else {
        (C_STAR_PLAIN, ".")
    };
    let band = (viewport.height / 3).max(1);
    for i in 0..STAR_COUNT {
        // Stars sit at fixed longitudes; the skybox yaw slides them sideways.
        let longitude = (i as f32 * 2.399_963 + skybox.yaw).rem_euclid(TAU);
        let col = (longitude / TAU * viewport.width as f32) as u16;
        let row = 1 + (i.wrapping_mul(37) % band);
        put(out, (col.min(viewport.width.saturating_sub(1)), row), color, glyph)?;
    }
    Ok(())
}

fn draw_ground<W: Write>(out: &mut W, state: &World, viewport: &Viewport) -> std::io::Result<()> {
    let half_w = state.config.half_width();
    let half_l = state.config.tile_length / 2.0;

    for tile in &state.ground.tiles {
        let front = state.ground.world_z(tile) - half_l;
        for s in 0..=LANE_SAMPLES {
            let x = -half_w + 2.0 * half_w * s as f32 / LANE_SAMPLES as f32;
            if let Some(at) = viewport.project(Vec3::new(x, 0.0, front)) {
                put(out, at, C_GROUND, "·")?;
            }
        }
        for s in 0..LANE_SAMPLES {
            let z = front + state.config.tile_length * s as f32 / LANE_SAMPLES as f32;
            for x in [-half_w, half_w] {
                if let Some(at) = viewport.project(Vec3::new(x, 0.0, z)) {
                    put(out, at, C_LANE_EDGE, "│")?;
                }
            }
        }
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_hazards<W: Write>(out: &mut W, state: &World, viewport: &Viewport) -> std::io::Result<()> {
    for tile in &state.ground.tiles {
        for obstacle in &tile.obstacles {
            if let Some(at) = viewport.project(state.ground.obstacle_world(tile, obstacle)) {
                put(out, at, C_OBSTACLE, "▣")?;
            }
        }
    }
    for enemy in &state.enemies {
        if let Some(at) = viewport.project(enemy.body.position) {
            put(out, at, C_ENEMY, "◆")?;
        }
    }
    Ok(())
}

fn draw_bullets<W: Write>(out: &mut W, state: &World, viewport: &Viewport) -> std::io::Result<()> {
    for bullet in &state.bullets {
        if let Some(at) = viewport.project(bullet.body.position) {
            put(out, at, C_BULLET, "•")?;
        }
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, state: &World, viewport: &Viewport) -> std::io::Result<()> {
    let Some(player) = &state.player else {
        let msg = "Loading model…";
        let col = (viewport.width / 2).saturating_sub(msg.chars().count() as u16 / 2);
        return put(out, (col, viewport.height / 2), C_HINT, msg);
    };
    let glyph = match player.model {
        ModelSource::Gltf { .. } => "▲",
        ModelSource::Placeholder => "■",
    };
    let color = if player.tinted { C_PLAYER_TINTED } else { C_PLAYER };
    if let Some(at) = viewport.project(player.body.position) {
        put(out, at, color, glyph)?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &World, width: u16) -> std::io::Result<()> {
    put(out, (1, 0), C_HUD_SCORE, &state.hud.score)?;

    if state.config.has_health {
        let filled = (state.hud.health_percent / 100.0 * HEALTH_BAR_CELLS as f32).round() as usize;
        let bar = format!(
            "HP [{}{}]",
            "█".repeat(filled.min(HEALTH_BAR_CELLS)),
            "░".repeat(HEALTH_BAR_CELLS.saturating_sub(filled))
        );
        let col = (width / 2).saturating_sub(bar.chars().count() as u16 / 2);
        put(out, (col, 0), C_HUD_HEALTH, &bar)?;
    }

    let timer_col = width.saturating_sub(state.hud.timer.chars().count() as u16 + 1);
    put(out, (timer_col, 0), C_HUD_TIMER, &state.hud.timer)?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    put(
        out,
        (1, height.saturating_sub(1)),
        C_HINT,
        "W S : Drive/Climb   A D : Strafe   SPACE / Click : Shoot   Q : Quit",
    )
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, state: &World, width: u16, height: u16) -> std::io::Result<()> {
    let banner = state.hud.banner.as_deref().unwrap_or("Game Over!");
    let lines: [(&str, Color); 5] = [
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
        (banner, Color::Yellow),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        put(out, (col, start_row + i as u16), *color, msg)?;
    }
    Ok(())
}
