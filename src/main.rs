//! Wolfenstein-style demo level in a window.
//!
//! ```bash
//! cargo run --release -- --scale 3 -v
//! ```
//!
//! Arrows / WASD move and turn, Space drops a guard, Esc quits.

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use yawolf_rs::{
    renderer::{RenderConfig, Rgba, Software, TRANSPARENT_KEY},
    sim::{Decoration, Enemy, InputCmd, Item, Player, TicRunner},
    world::{Camera, Level, SheetLayout, Texture, TextureBank, TextureId},
};

#[derive(Parser)]
#[command(name = "yawolf", about = "Grid raycaster demo")]
struct Cli {
    /// Viewport width in pixels
    #[arg(long, default_value_t = 320)]
    width: usize,
    /// Viewport height in pixels
    #[arg(long, default_value_t = 200)]
    height: usize,
    /// Integer window scale
    #[arg(short, long, default_value_t = 3)]
    scale: usize,
    /// Half-width of the view plane (0.66 ≈ 66°)
    #[arg(long, default_value_t = yawolf_rs::world::DEFAULT_FOV)]
    fov: f32,
    /// Window refresh cap
    #[arg(long, default_value_t = 60)]
    fps: usize,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[rustfmt::skip]
const MAP: [[u8; 13]; 13] = [
    [1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    [0, 0, 3, 0, 2, 3, 3, 0, 3, 0, 0, 0, 9],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 8, 8],
    [1, 1, 2, 9, 1, 0, 0, 0, 1, 0, 2, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 9],
    [1, 0, 0, 0, 4, 0, 0, 0, 1, 0, 0, 0, 9],
    [5, 0, 3, 3, 3, 0, 0, 0, 1, 0, 3, 3, 1],
    [5, 0, 3, 4, 1, 5, 6, 7, 1, 0, 1, 1, 1],
    [5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 9],
    [5, 0, 0, 0, 4, 0, 5, 0, 1, 0, 0, 0, 9],
    [5, 0, 3, 3, 3, 0, 0, 0, 1, 0, 3, 3, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Player start, facing +X down the top corridor.
const PLAYER_START: Vec2 = Vec2::new(1.5, 1.5);
/// Two tiles ahead of the player so the guard is in view from the first frame.
const ENEMY_START: Vec2 = Vec2::new(3.5, 1.5);

/// Sprite cells are 64×64 with a one-texel gutter.
const CELL: usize = 64;
const STEP: usize = 65;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let rows: Vec<&[u8]> = MAP.iter().map(|r| r.as_slice()).collect();
    let level = Level::from_rows(&rows)?;

    let mut bank = TextureBank::default_with_checker();
    let walls = wall_textures(&mut bank)?;
    let guard = bank.insert_all(guard_sheet().slice_sheet(
        SheetLayout {
            columns: 8,
            rows: 1,
            step_w: STEP,
            step_h: STEP,
        },
        CELL,
        CELL,
    )?)?;
    let objects = bank.insert_all(object_sheet().slice_sheet(
        SheetLayout {
            columns: 2,
            rows: 1,
            step_w: STEP,
            step_h: STEP,
        },
        CELL,
        CELL,
    )?)?;
    let (barrel, food) = (objects[0], objects[1]);

    let camera = Camera::new(cli.width, cli.height, cli.fov)?;
    let renderer = Software::new(RenderConfig::default(), walls);
    let mut sim = TicRunner::new(level, bank, renderer);

    // faces back towards the player
    sim.add_task(Enemy::new(ENEMY_START, std::f32::consts::PI, guard.clone()));
    sim.add_task(Player::new(PLAYER_START, 0.0, camera, guard));
    sim.add_task(Decoration::new(Vec2::new(6.5, 4.5), barrel));
    sim.add_task(Item::new(Vec2::new(5.5, 4.5), food));

    let (win_w, win_h) = (cli.width * cli.scale.max(1), cli.height * cli.scale.max(1));
    let mut win = Window::new("yawolf", win_w, win_h, WindowOptions::default())
        .context("opening window")?;
    win.set_target_fps(cli.fps);
    let mut buffer: Vec<Rgba> = vec![0; win_w * win_h];

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        sim.set_input(read_input(&win));
        sim.pump();

        {
            let world = sim.world();
            let mut cameras = world.query::<&Camera>();
            if let Some((_, cam)) = cameras.iter().next() {
                blit_scaled(cam.pixels(), cam.width(), cam.height(), &mut buffer, cli.scale.max(1));
            }
        }
        acc_time += t0.elapsed();
        acc_frames += 1;
        win.update_with_buffer(&buffer, win_w, win_h)?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            tracing::info!(avg_ms, fps = 1000.0 / avg_ms, tics = sim.tics(), "frame time");
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

/// One command per frame from the keyboard state.
fn read_input(win: &Window) -> InputCmd {
    let mut cmd = InputCmd::default();
    let down = |keys: &[Key]| keys.iter().any(|&k| win.is_key_down(k));

    if down(&[Key::Up, Key::W]) {
        cmd.forward += 1.0;
    }
    if down(&[Key::Down, Key::S]) {
        cmd.forward -= 1.0;
    }
    if down(&[Key::Left]) {
        cmd.turn -= 1.0;
    }
    if down(&[Key::Right]) {
        cmd.turn += 1.0;
    }
    if down(&[Key::A]) {
        cmd.strafe -= 1.0;
    }
    if down(&[Key::D]) {
        cmd.strafe += 1.0;
    }
    cmd.fire = win.is_key_pressed(Key::Space, KeyRepeat::No); // edge-trigger
    cmd
}

/// Nearest-neighbour upscale of a `w × h` frame by `scale`.
fn blit_scaled(src: &[Rgba], w: usize, h: usize, dst: &mut [Rgba], scale: usize) {
    let dst_w = w * scale;
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        let first = y * scale * dst_w;
        for (x, &p) in row.iter().enumerate() {
            dst[first + x * scale..first + (x + 1) * scale].fill(p);
        }
        for k in 1..scale {
            dst.copy_within(first..first + dst_w, first + k * dst_w);
        }
    }
}

/* ──────────────────────── procedural assets ───────────────────────── */

/// Lit and shaded texture for each of the nine wall materials.
fn wall_textures(bank: &mut TextureBank) -> anyhow::Result<Vec<TextureId>> {
    const BRICKS: [(Rgba, Rgba); 9] = [
        (0xFF_7A7A7A, 0xFF_4A4A4A), // grey stone
        (0xFF_2050A0, 0xFF_103060), // blue stone
        (0xFF_8A5A2A, 0xFF_5A3A1A), // wood
        (0xFF_A03020, 0xFF_602018), // red brick
        (0xFF_5A7A3A, 0xFF_3A4A2A), // mossy
        (0xFF_9A9A6A, 0xFF_6A6A4A), // sandstone
        (0xFF_6A3A8A, 0xFF_3A2A5A), // purple
        (0xFF_30A0A0, 0xFF_206060), // teal
        (0xFF_B0B0B0, 0xFF_808080), // steel
    ];

    let mut ids = Vec::with_capacity(BRICKS.len() * 2);
    for (i, (brick, mortar)) in BRICKS.into_iter().enumerate() {
        let lit = if i % 3 == 2 {
            Texture::checker(format!("WALL{}", i + 1), CELL, CELL, 8, brick, mortar)
        } else {
            Texture::bricks(format!("WALL{}", i + 1), CELL, CELL, brick, mortar)
        };
        let dark = lit.shaded();
        ids.push(bank.insert(lit)?);
        ids.push(bank.insert(dark)?);
    }
    Ok(ids)
}

/// Eight views of a guard, front first then counter-clockwise.
fn guard_sheet() -> Texture {
    let mut sheet = Texture::solid("GUARD", 8 * STEP, STEP, TRANSPARENT_KEY);
    for facet in 0..8 {
        let x0 = facet * STEP;
        fill_rect(&mut sheet, x0 + 22, 20, 20, 44, 0xFF_8A7A50); // body
        fill_rect(&mut sheet, x0 + 26, 6, 12, 14, 0xFF_E0B090); // head
        // the face marker slides around the head as the view turns
        let angle = facet as f32 / 8.0 * std::f32::consts::TAU;
        let visible = angle.cos() > -0.2;
        if visible {
            let offset = (angle.sin() * 5.0).round() as i32;
            let fx = (x0 as i32 + 31 + offset) as usize;
            fill_rect(&mut sheet, fx, 11, 3, 3, 0xFF_202020);
        }
    }
    sheet
}

/// Barrel and dog-food bowl.
fn object_sheet() -> Texture {
    let mut sheet = Texture::solid("OBJECTS", 2 * STEP, STEP, TRANSPARENT_KEY);
    fill_rect(&mut sheet, 18, 24, 28, 40, 0xFF_6A4A20);
    fill_rect(&mut sheet, 18, 34, 28, 3, 0xFF_3A3A3A);
    fill_rect(&mut sheet, 18, 52, 28, 3, 0xFF_3A3A3A);
    fill_rect(&mut sheet, STEP + 20, 54, 24, 10, 0xFF_C04040);
    sheet
}

fn fill_rect(tex: &mut Texture, x: usize, y: usize, w: usize, h: usize, c: Rgba) {
    for row in y..(y + h).min(tex.h) {
        let start = row * tex.w;
        tex.pixels[start + x.min(tex.w)..start + (x + w).min(tex.w)].fill(c);
    }
}
