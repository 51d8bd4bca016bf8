pub mod actors;
mod collision;
mod components;
mod systems;
mod tasks;
mod tic;

pub use actors::{Decoration, Enemy, Item, Player, PlayerTag, find_player};
pub use collision::{Accumulated, PenetrationSolver, Resolver, Sequential};
pub use components::{Angle, Collider, InputCmd, Position, Sprite, SpriteImage};
pub use systems::{MOVE_SPEED, TURN_RATE, chase, player_input};
pub use tasks::{Scheduler, Task, TaskCtx, TaskStatus};
pub use tic::{DT, SIM_FPS, TicRunner};
