//! Cooperative per-entity behaviours.
//!
//! A [`Task`] is a small resumable state machine: the [`Scheduler`] calls
//! `step` once per tic and drops the task as soon as it reports
//! [`TaskStatus::Done`].

use hecs::World;

use super::InputCmd;
use crate::world::Level;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Done,
}

/// Everything a task may touch during one step.
pub struct TaskCtx<'a> {
    pub world: &'a mut World,
    pub level: &'a Level,
    pub input: InputCmd,
    spawned: Vec<Box<dyn Task>>,
}

impl<'a> TaskCtx<'a> {
    pub fn new(world: &'a mut World, level: &'a Level, input: InputCmd) -> Self {
        Self {
            world,
            level,
            input,
            spawned: Vec::new(),
        }
    }

    /// Queue a new task; it runs for the first time on the next tic.
    pub fn spawn<T: Task + 'static>(&mut self, task: T) {
        self.spawned.push(Box::new(task));
    }
}

pub trait Task {
    fn step(&mut self, ctx: &mut TaskCtx) -> TaskStatus;
}

/// Ordered set of live tasks.
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<Box<dyn Task>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<T: Task + 'static>(&mut self, task: T) {
        self.tasks.push(Box::new(task));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Step every task once, in insertion order.
    pub fn step(&mut self, world: &mut World, level: &Level, input: InputCmd) {
        let mut ctx = TaskCtx::new(world, level, input);
        let before = self.tasks.len();

        self.tasks
            .retain_mut(|task| task.step(&mut ctx) == TaskStatus::Running);

        let finished = before - self.tasks.len();
        let spawned = ctx.spawned.len();
        self.tasks.append(&mut ctx.spawned);

        if finished > 0 || spawned > 0 {
            tracing::debug!(finished, spawned, live = self.tasks.len(), "scheduler");
        }
    }
}
