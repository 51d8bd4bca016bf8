use glam::Vec2;
use hecs::{Entity, World};

use super::{Angle, Collider, InputCmd, tic::DT};

pub const MOVE_SPEED: f32 = 3.0; // tiles / second
pub const TURN_RATE: f32 = 3.0; // rad / second

/* ── Player input ─────────────────────────────────────────────────── */

/// Turn the entity and set its collider's movement for this tic.
///
/// `turn > 0` turns right (clockwise), `strafe > 0` steps right. The
/// resolver applies and clears the movement afterwards.
pub fn player_input(world: &mut World, player: Entity, cmd: &InputCmd) {
    let Ok((ang, collider)) = world.query_one_mut::<(&mut Angle, &mut Collider)>(player) else {
        return;
    };

    ang.0 = (ang.0 - cmd.turn * TURN_RATE * DT).rem_euclid(std::f32::consts::TAU);

    let forward = ang.dir();
    // same right-hand side the camera strafes along
    let right = Vec2::new(forward.y, -forward.x);
    let wish = forward * cmd.forward + right * cmd.strafe;
    collider.movement = wish.clamp_length_max(1.0) * MOVE_SPEED * DT;
}

/// Step `from` towards `to` by at most `speed * DT`, stopping `keep` short.
///
/// Returns the heading towards `to` and the movement to apply.
pub fn chase(from: Vec2, to: Vec2, keep: f32, speed: f32) -> (f32, Vec2) {
    let delta = to - from;
    let heading = delta.y.atan2(delta.x);
    let room = delta.length() - keep;
    if room <= 0.0 {
        return (heading, Vec2::ZERO);
    }
    let step = (speed * DT).min(room);
    (heading, Vec2::from_angle(heading) * step)
}
