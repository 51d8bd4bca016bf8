use hecs::World;
use std::time::{Duration, Instant};

use super::{InputCmd, Resolver, Scheduler, tasks::Task};
use crate::renderer::{Renderer, Software};
use crate::world::{Level, TextureBank};

pub const SIM_FPS: u32 = 60;
pub const DT: f32 = 1.0 / SIM_FPS as f32;
const TIC: Duration = Duration::from_micros(1_000_000 / SIM_FPS as u64);

/// Owns the ECS world and drives tasks, collision and rendering in order.
pub struct TicRunner<R: Renderer = Software> {
    world: World,
    level: Level,
    bank: TextureBank,
    scheduler: Scheduler,
    resolver: Resolver,
    renderer: R,
    input: InputCmd,
    tics: u64,
    last: Instant,
}

impl<R: Renderer> TicRunner<R> {
    pub fn new(level: Level, bank: TextureBank, renderer: R) -> Self {
        tracing::info!(
            width = level.width(),
            height = level.height(),
            textures = bank.len(),
            "simulation ready"
        );
        Self {
            world: World::new(),
            level,
            bank,
            scheduler: Scheduler::new(),
            resolver: Resolver::new(),
            renderer,
            input: InputCmd::default(),
            tics: 0,
            last: Instant::now(),
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn tics(&self) -> u64 {
        self.tics
    }

    pub fn add_task<T: Task + 'static>(&mut self, task: T) {
        self.scheduler.add(task);
    }

    /// Command used by every tic until the next call. A pressed `fire` is
    /// seen by one tic only.
    pub fn set_input(&mut self, cmd: InputCmd) {
        self.input = cmd;
    }

    /// Advance enough tics to synchronise simulation with real time, then
    /// draw once. Returns the number of tics run.
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        while self.last.elapsed() >= TIC {
            self.tick();
            self.last += TIC;
            n += 1;
        }
        self.render();
        n
    }

    /// One tic plus a frame, independent of wall-clock time.
    pub fn step(&mut self) {
        self.tick();
        self.render();
    }

    pub fn render(&mut self) {
        self.renderer.update(&self.world, &self.level, &self.bank);
    }

    /* ---------------------------------------------------------------- */
    /* internal: run one fixed‑rate game tic                             */
    /* ---------------------------------------------------------------- */
    fn tick(&mut self) {
        self.scheduler.step(&mut self.world, &self.level, self.input);
        self.input.fire = false;
        // positions must be settled before the next frame samples them
        self.resolver.update(&mut self.world, &self.level);
        self.tics += 1;
    }
}
