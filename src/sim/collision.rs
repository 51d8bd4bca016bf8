//! Circle-vs-tile and circle-vs-circle collision for grid levels.
//!
//! Every collider is a circle of `radius` around its `Position`. Once per
//! tic the [`Resolver`]:
//! 1. records which colliders overlap each other (no push, just sets);
//! 2. moves each collider by its `movement`, then pushes it out of every
//!    solid tile in the 3×3 block around the destination;
//! 3. zeroes `movement`.

use glam::{IVec2, Vec2};
use hecs::{Entity, World};

use crate::sim::{Collider, Position};
use crate::world::{Aabb, EMPTY, Level};

/// How the penetrations of one collider against its 3×3 neighbourhood are
/// turned into a final position.
///
/// `collider.next_position` holds the intended destination on entry and
/// the corrected one on exit. `previous` is where the collider stood
/// before moving. Returns `true` when any solid tile was touched.
pub trait PenetrationSolver {
    fn resolve(&self, level: &Level, previous: Vec2, collider: &mut Collider) -> bool;
}

/// Correct tile by tile in scan order; each push sees the previous ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

/// Measure every tile from the same destination and apply the sum.
#[derive(Clone, Copy, Debug, Default)]
pub struct Accumulated;

/// Solid tiles of the 3×3 block around `p`, y outer, x inner.
/// Cells outside the level count as solid.
fn solid_neighbours(level: &Level, p: Vec2) -> impl Iterator<Item = IVec2> + '_ {
    let centre = Level::tile_coord(p);
    (-1..=1)
        .flat_map(move |dy| (-1..=1).map(move |dx| centre + IVec2::new(dx, dy)))
        .filter(|t| level.tile_or_outside(t.x, t.y) != EMPTY)
}

/// Vector to subtract from `collider.next_position` so it ends exactly
/// `radius` away from `bounds`, or `None` when they do not touch.
fn penetration(bounds: &Aabb, previous: Vec2, collider: &mut Collider) -> Option<Vec2> {
    let next = collider.next_position;
    let r = collider.radius;

    collider.nearest_point = bounds.clamp(next);
    let towards = collider.nearest_point - next;
    collider.distance = towards.length();
    if collider.distance > r {
        return None;
    }

    collider.penetration = if collider.distance > 0.0 {
        towards * ((r - collider.distance) / collider.distance)
    } else {
        next - exit_point(bounds, previous, next, r)
    };
    Some(collider.penetration)
}

/// Where a centre that ended up on or inside `bounds` leaves it: `r` past
/// the face it came through, or past the closest face if it never was
/// outside.
fn exit_point(bounds: &Aabb, previous: Vec2, next: Vec2, r: f32) -> Vec2 {
    // (entered through this face, resulting centre)
    let faces = [
        (previous.x <= bounds.min.x, Vec2::new(bounds.min.x - r, next.y)),
        (previous.x >= bounds.max.x, Vec2::new(bounds.max.x + r, next.y)),
        (previous.y <= bounds.min.y, Vec2::new(next.x, bounds.min.y - r)),
        (previous.y >= bounds.max.y, Vec2::new(next.x, bounds.max.y + r)),
    ];
    let entered = faces.iter().any(|(through, _)| *through);

    faces
        .iter()
        .filter(|(through, _)| *through || !entered)
        .map(|(_, exit)| *exit)
        .min_by(|a, b| a.distance_squared(next).total_cmp(&b.distance_squared(next)))
        .unwrap_or(next)
}

impl PenetrationSolver for Sequential {
    fn resolve(&self, level: &Level, previous: Vec2, collider: &mut Collider) -> bool {
        let mut hit = false;
        for tile in solid_neighbours(level, collider.next_position) {
            if let Some(pen) = penetration(&Level::tile_bounds(tile), previous, collider) {
                collider.next_position -= pen;
                hit = true;
            }
        }
        hit
    }
}

impl PenetrationSolver for Accumulated {
    fn resolve(&self, level: &Level, previous: Vec2, collider: &mut Collider) -> bool {
        let start = collider.next_position;
        let mut total = Vec2::ZERO;
        let mut hit = false;
        for tile in solid_neighbours(level, start) {
            collider.next_position = start;
            if let Some(pen) = penetration(&Level::tile_bounds(tile), previous, collider) {
                total += pen;
                hit = true;
            }
        }
        collider.next_position = start - total;
        hit
    }
}

/// Per-tic collision pass over every `Collider` in the world.
#[derive(Clone, Debug, Default)]
pub struct Resolver<S: PenetrationSolver = Sequential> {
    solver: S,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: PenetrationSolver> Resolver<S> {
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    pub fn update(&self, world: &mut World, level: &Level) {
        for (_, c) in world.query_mut::<&mut Collider>() {
            c.collisions.clear();
            c.hit_wall = false;
        }

        /* ---------- circle vs circle (current positions) ---------- */
        let bodies: Vec<(Entity, Vec2, f32)> = world
            .query_mut::<(&Collider, &Position)>()
            .into_iter()
            .map(|(e, (c, p))| (e, p.0, c.radius))
            .collect();

        let mut pairs = 0;
        for (i, &(a, pa, ra)) in bodies.iter().enumerate() {
            for &(b, pb, rb) in &bodies[i + 1..] {
                if pa.distance(pb) > ra + rb {
                    continue;
                }
                if let Ok(c) = world.query_one_mut::<&mut Collider>(a) {
                    c.collisions.push(b);
                }
                if let Ok(c) = world.query_one_mut::<&mut Collider>(b) {
                    c.collisions.push(a);
                }
                pairs += 1;
            }
        }

        /* ---------- circle vs tiles ---------- */
        let mut walls = 0;
        for (_, (c, pos)) in world.query_mut::<(&mut Collider, &mut Position)>() {
            if c.radius > 0.0 {
                c.next_position = pos.0 + c.movement;
                c.hit_wall = self.solver.resolve(level, pos.0, c);
                pos.0 = c.next_position;
                walls += usize::from(c.hit_wall);
            }
            c.movement = Vec2::ZERO;
        }

        tracing::trace!(colliders = bodies.len(), pairs, walls, "collision pass");
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    /// 4×3 grid whose first column is solid.
    fn west_wall() -> Level {
        Level::from_rows(&[&[1, 0, 0, 0], &[1, 0, 0, 0], &[1, 0, 0, 0]]).unwrap()
    }

    fn corridor() -> Level {
        Level::from_rows(&[&[1, 1, 1, 1, 1, 1], &[1, 0, 0, 0, 0, 1], &[1, 1, 1, 1, 1, 1]]).unwrap()
    }

    fn body(world: &mut World, pos: Vec2, radius: f32, movement: Vec2) -> Entity {
        let mut c = Collider::new(radius);
        c.movement = movement;
        world.spawn((c, Position(pos)))
    }

    fn pos(world: &World, e: Entity) -> Vec2 {
        world.get::<&Position>(e).unwrap().0
    }

    /// Every solid tile near `p` is at least `r` away.
    fn assert_clear(level: &Level, p: Vec2, r: f32) {
        for tile in solid_neighbours(level, p) {
            let nearest = Level::tile_bounds(tile).clamp(p);
            assert!(
                p.distance(nearest) >= r - EPS,
                "{p:?} within {r} of tile {tile:?}"
            );
        }
    }

    #[test]
    fn pushed_back_out_of_the_wall() {
        let level = west_wall();
        let mut world = World::new();
        let e = body(&mut world, Vec2::new(1.1, 1.5), 0.25, Vec2::new(-0.5, 0.0));

        Resolver::new().update(&mut world, &level);

        let p = pos(&world, e);
        assert!(p.x >= 1.25 - EPS, "{p:?}");
        assert!((p.y - 1.5).abs() < EPS);
        let c = world.get::<&Collider>(e).unwrap();
        assert!(c.hit_wall());
        assert_eq!(c.movement, Vec2::ZERO);
    }

    #[test]
    fn grazing_the_wall_stops_at_radius() {
        let level = west_wall();
        let mut world = World::new();
        let e = body(&mut world, Vec2::new(1.5, 1.5), 0.25, Vec2::new(-0.35, 0.0));

        Resolver::new().update(&mut world, &level);

        assert!((pos(&world, e).x - 1.25).abs() < EPS);
    }

    #[test]
    fn free_movement_is_applied_unchanged() {
        let level = west_wall();
        let mut world = World::new();
        let e = body(&mut world, Vec2::new(2.0, 1.5), 0.25, Vec2::new(0.5, 0.1));

        Resolver::new().update(&mut world, &level);

        assert!((pos(&world, e) - Vec2::new(2.5, 1.6)).length() < EPS);
        assert!(!world.get::<&Collider>(e).unwrap().collides());
    }

    #[test]
    fn overlapping_pair_reports_each_other() {
        let level = Level::new(4, 4, vec![0; 16]).unwrap();
        let mut world = World::new();
        let a = body(&mut world, Vec2::new(2.0, 2.0), 0.25, Vec2::ZERO);
        let b = body(&mut world, Vec2::new(2.3, 2.0), 0.25, Vec2::ZERO);

        Resolver::new().update(&mut world, &level);

        assert_eq!(world.get::<&Collider>(a).unwrap().collisions(), &[b]);
        assert_eq!(world.get::<&Collider>(b).unwrap().collisions(), &[a]);
    }

    #[test]
    fn separated_pair_reports_nothing() {
        let level = Level::new(4, 4, vec![0; 16]).unwrap();
        let mut world = World::new();
        let a = body(&mut world, Vec2::new(2.0, 2.0), 0.25, Vec2::ZERO);
        let b = body(&mut world, Vec2::new(2.6, 2.0), 0.25, Vec2::ZERO);

        Resolver::new().update(&mut world, &level);

        assert!(world.get::<&Collider>(a).unwrap().collisions().is_empty());
        assert!(world.get::<&Collider>(b).unwrap().collisions().is_empty());
    }

    #[test]
    fn pair_sets_are_symmetric_and_rebuilt() {
        let level = Level::new(6, 6, vec![0; 36]).unwrap();
        let mut world = World::new();
        let ents: Vec<Entity> = [(1.0, 1.0), (1.2, 1.1), (1.4, 1.0), (4.0, 4.0)]
            .into_iter()
            .map(|(x, y)| body(&mut world, Vec2::new(x, y), 0.2, Vec2::ZERO))
            .collect();

        let resolver = Resolver::new();
        resolver.update(&mut world, &level);
        for &a in &ents {
            for &b in world.get::<&Collider>(a).unwrap().collisions() {
                assert!(world.get::<&Collider>(b).unwrap().collides_with(a));
            }
        }
        assert!(world.get::<&Collider>(ents[3]).unwrap().collisions().is_empty());

        // pull the middle body out of the cluster
        world.get::<&mut Position>(ents[1]).unwrap().0 = Vec2::new(3.0, 1.0);
        resolver.update(&mut world, &level);
        assert!(world.get::<&Collider>(ents[1]).unwrap().collisions().is_empty());
        assert!(!world.get::<&Collider>(ents[0]).unwrap().collides_with(ents[1]));
    }

    #[test]
    fn corridor_walk_never_penetrates() {
        let level = corridor();
        let mut world = World::new();
        let e = body(&mut world, Vec2::new(1.5, 1.5), 0.25, Vec2::ZERO);
        let resolver = Resolver::new();

        for step in [
            Vec2::new(0.3, 0.4),
            Vec2::new(0.4, -0.6),
            Vec2::new(0.5, 0.5),
            Vec2::new(0.9, 0.0),
            Vec2::new(0.6, -0.3),
            Vec2::new(0.5, 0.5),
            Vec2::new(0.3, 0.0),
        ] {
            world.get::<&mut Collider>(e).unwrap().movement = step;
            resolver.update(&mut world, &level);
            assert_clear(&level, pos(&world, e), 0.25);
        }
        // ends in the last cell, pressed against the east wall
        assert!((pos(&world, e) - Vec2::new(4.75, 1.75)).length() < EPS);
    }

    #[test]
    fn corner_sequential_and_accumulated_differ() {
        let level = Level::from_rows(&[&[1, 1, 1], &[1, 0, 0], &[1, 0, 0]]).unwrap();
        let start = Vec2::new(1.3, 1.3);
        let step = Vec2::new(-0.2, -0.2);

        let mut world = World::new();
        let e = body(&mut world, start, 0.25, step);
        Resolver::new().update(&mut world, &level);
        assert!((pos(&world, e) - Vec2::new(1.25, 1.25)).length() < EPS);

        let mut world = World::new();
        let e = body(&mut world, start, 0.25, step);
        Resolver::with_solver(Accumulated).update(&mut world, &level);
        let p = pos(&world, e);
        // diagonal push from the corner plus both face pushes
        let expected = 1.1 + 0.1 * (0.25 - 0.02f32.sqrt()) / 0.02f32.sqrt() + 0.15;
        assert!((p.x - expected).abs() < EPS, "{p:?}");
        assert!((p.y - expected).abs() < EPS, "{p:?}");
    }

    #[test]
    fn zero_radius_skips_tiles_but_still_pairs() {
        let level = west_wall();
        let mut world = World::new();
        let ghost = body(&mut world, Vec2::new(1.1, 1.5), 0.0, Vec2::new(-0.5, 0.0));
        let other = body(&mut world, Vec2::new(1.3, 1.5), 0.25, Vec2::ZERO);

        Resolver::new().update(&mut world, &level);

        let c = world.get::<&Collider>(ghost).unwrap();
        assert!(!c.hit_wall());
        assert!(c.collides_with(other));
        assert_eq!(c.movement, Vec2::ZERO);
        assert_eq!(pos(&world, ghost), Vec2::new(1.1, 1.5));
    }

    #[test]
    fn outside_the_level_is_solid() {
        let level = Level::new(3, 3, vec![0; 9]).unwrap();
        let mut world = World::new();
        let e = body(&mut world, Vec2::new(1.5, 0.5), 0.25, Vec2::new(0.0, -0.4));

        Resolver::new().update(&mut world, &level);

        assert!((pos(&world, e).y - 0.25).abs() < EPS);
    }

    #[test]
    fn exit_prefers_entry_face() {
        let bounds = Level::tile_bounds(IVec2::new(0, 0));
        // came from the east, deep inside: leave east even though west is nearer
        let out = exit_point(&bounds, Vec2::new(1.2, 0.5), Vec2::new(0.3, 0.5), 0.25);
        assert!((out - Vec2::new(1.25, 0.5)).length() < EPS);
        // started inside: nearest face wins
        let out = exit_point(&bounds, Vec2::new(0.5, 0.5), Vec2::new(0.3, 0.9), 0.25);
        assert!((out - Vec2::new(0.3, 1.25)).length() < EPS);
    }
}
