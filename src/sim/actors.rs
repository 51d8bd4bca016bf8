//! Demo actors, each a [`Task`] that builds its entity on the first step.

use glam::Vec2;
use hecs::{Entity, World};

use super::{
    Angle, Collider, Position, Sprite, SpriteImage,
    systems::{chase, player_input},
    tasks::{Task, TaskCtx, TaskStatus},
};
use crate::world::{Camera, TextureId};

pub const ACTOR_RADIUS: f32 = 0.25;
pub const ENEMY_SPEED: f32 = 0.6; // tiles / second
/// Enemies stop chasing this close to the player.
pub const ENEMY_KEEP: f32 = 1.0;

/// Marks the entity driven by the input command.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerTag;

/// First entity tagged as player, with its position.
pub fn find_player(world: &mut World) -> Option<(Entity, Vec2)> {
    world
        .query_mut::<(&PlayerTag, &Position)>()
        .into_iter()
        .next()
        .map(|(e, (_, p))| (e, p.0))
}

/* ── Player ───────────────────────────────────────────────────────── */

pub struct Player {
    at: Vec2,
    rotation: f32,
    camera: Option<Camera>,
    entity: Option<Entity>,
    was_firing: bool,
    enemy_facets: Vec<TextureId>,
}

impl Player {
    /// `enemy_facets` is what the fire button spawns at the player.
    pub fn new(at: Vec2, rotation: f32, camera: Camera, enemy_facets: Vec<TextureId>) -> Self {
        Self {
            at,
            rotation,
            camera: Some(camera),
            entity: None,
            was_firing: false,
            enemy_facets,
        }
    }
}

impl Task for Player {
    fn step(&mut self, ctx: &mut TaskCtx) -> TaskStatus {
        let entity = match (self.entity, self.camera.take()) {
            (Some(e), _) => e,
            (None, Some(camera)) => {
                let e = ctx.world.spawn((
                    PlayerTag,
                    Position(self.at),
                    Angle(self.rotation),
                    Collider::new(ACTOR_RADIUS),
                    camera,
                ));
                tracing::info!(?e, at = ?self.at, "player spawned");
                self.entity = Some(e);
                e
            }
            (None, None) => return TaskStatus::Done,
        };

        if !ctx.world.contains(entity) {
            return TaskStatus::Done;
        }

        let cmd = ctx.input;
        player_input(ctx.world, entity, &cmd);

        if cmd.fire && !self.was_firing {
            let pose = ctx
                .world
                .query_one_mut::<(&Position, &Angle)>(entity)
                .ok()
                .map(|(p, a)| (p.0, a.0));
            if let Some((at, rotation)) = pose {
                ctx.spawn(Enemy::new(at, rotation, self.enemy_facets.clone()));
            }
        }
        self.was_firing = cmd.fire;
        TaskStatus::Running
    }
}

/* ── Enemy ────────────────────────────────────────────────────────── */

/// Eight-facet sprite that walks towards the player.
pub struct Enemy {
    at: Vec2,
    rotation: f32,
    facets: Vec<TextureId>,
    entity: Option<Entity>,
}

impl Enemy {
    pub fn new(at: Vec2, rotation: f32, facets: Vec<TextureId>) -> Self {
        Self {
            at,
            rotation,
            facets,
            entity: None,
        }
    }
}

impl Task for Enemy {
    fn step(&mut self, ctx: &mut TaskCtx) -> TaskStatus {
        let Some(entity) = self.entity else {
            let e = ctx.world.spawn((
                Position(self.at),
                Angle(self.rotation),
                Collider::new(ACTOR_RADIUS),
                Sprite::new(SpriteImage::Facets(std::mem::take(&mut self.facets))),
            ));
            tracing::debug!(?e, at = ?self.at, "enemy spawned");
            self.entity = Some(e);
            return TaskStatus::Running;
        };

        let target = find_player(ctx.world).map(|(_, p)| p);
        let Ok((pos, ang, collider)) =
            ctx.world
                .query_one_mut::<(&Position, &mut Angle, &mut Collider)>(entity)
        else {
            return TaskStatus::Done;
        };
        if let Some(target) = target {
            let (heading, movement) = chase(pos.0, target, ENEMY_KEEP, ENEMY_SPEED);
            if movement != Vec2::ZERO {
                ang.0 = heading;
                collider.movement = movement;
            }
        }
        TaskStatus::Running
    }
}

/* ── Decoration ───────────────────────────────────────────────────── */

/// Static solid prop; the task ends once the entity exists.
pub struct Decoration {
    at: Vec2,
    texture: TextureId,
}

impl Decoration {
    pub fn new(at: Vec2, texture: TextureId) -> Self {
        Self { at, texture }
    }
}

impl Task for Decoration {
    fn step(&mut self, ctx: &mut TaskCtx) -> TaskStatus {
        ctx.world.spawn((
            Position(self.at),
            Collider::new(ACTOR_RADIUS),
            Sprite::new(SpriteImage::Single(self.texture)),
        ));
        TaskStatus::Done
    }
}

/* ── Item ─────────────────────────────────────────────────────────── */

/// Pickup removed as soon as the player touches it.
pub struct Item {
    at: Vec2,
    texture: TextureId,
    entity: Option<Entity>,
}

impl Item {
    pub fn new(at: Vec2, texture: TextureId) -> Self {
        Self {
            at,
            texture,
            entity: None,
        }
    }
}

impl Task for Item {
    fn step(&mut self, ctx: &mut TaskCtx) -> TaskStatus {
        let Some(entity) = self.entity else {
            self.entity = Some(ctx.world.spawn((
                Position(self.at),
                Collider::new(ACTOR_RADIUS),
                Sprite::new(SpriteImage::Single(self.texture)),
            )));
            return TaskStatus::Running;
        };

        let Some((player, _)) = find_player(ctx.world) else {
            return TaskStatus::Running;
        };
        let picked = ctx
            .world
            .get::<&Collider>(entity)
            .map_or(true, |c| c.collides_with(player));
        if !picked {
            return TaskStatus::Running;
        }

        if ctx.world.despawn(entity).is_ok() {
            tracing::info!(?entity, "item picked up");
        }
        TaskStatus::Done
    }
}
