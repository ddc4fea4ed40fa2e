//! # STRATA Physics System
//!
//! Kinematic character controller against the height-field terrain.
//!
//! Features:
//! - Gravity with terminal velocity
//! - Axis-separated collision (Y, then X, then Z) with full per-axis rollback
//! - Ground detection and jumping
//! - Voxel raycasting for block selection
//!
//! A blocked Y move scans the cells between the start and the target and
//! stops flush against the first solid one, so fast falls cannot sink into
//! the ground. X and Z either commit their whole displacement or none of it;
//! steps are clamped to [`MAX_STEP_SECONDS`] to keep those moves short.

use serde::Deserialize;
use strata_procedural::SolidQuery;

/// Gravity acceleration (blocks per second squared).
pub const GRAVITY: f32 = 32.0;

/// Terminal velocity (blocks per second).
pub const TERMINAL_VELOCITY: f32 = 50.0;

/// Jump velocity (blocks per second).
pub const JUMP_VELOCITY: f32 = 10.0;

/// Player hitbox half-width (blocks).
pub const PLAYER_RADIUS: f32 = 0.3;
/// Player hitbox height (blocks).
pub const PLAYER_HEIGHT: f32 = 1.8;
/// Player eye height offset from feet (blocks).
pub const PLAYER_EYE_HEIGHT: f32 = 1.6;

/// Longest physics step (seconds).
pub const MAX_STEP_SECONDS: f32 = 0.1;

/// Gap left between the feet and the block a body lands on.
pub const LANDING_OFFSET: f32 = 0.001;

/// How far below the feet the ground check samples.
pub const GROUND_PROBE_DEPTH: f32 = 0.05;

/// Tunable physics constants.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Downward acceleration.
    pub gravity: f32,
    /// Maximum falling speed.
    pub terminal_velocity: f32,
    /// Upward speed applied by a jump.
    pub jump_speed: f32,
    /// Hitbox height.
    pub player_height: f32,
    /// Hitbox half-width.
    pub player_radius: f32,
    /// Camera height above the feet.
    pub eye_height: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            terminal_velocity: TERMINAL_VELOCITY,
            jump_speed: JUMP_VELOCITY,
            player_height: PLAYER_HEIGHT,
            player_radius: PLAYER_RADIUS,
            eye_height: PLAYER_EYE_HEIGHT,
        }
    }
}

/// Horizontal sample offsets: four corners of the footprint plus its center.
fn footprint(radius: f32) -> [(f32, f32); 5] {
    [
        (-radius, -radius),
        (radius, -radius),
        (-radius, radius),
        (radius, radius),
        (0.0, 0.0),
    ]
}

// ============================================================================
// CHARACTER BODY
// ============================================================================

/// Kinematic player body. `position` is the center of the feet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerBody {
    /// Position (feet, blocks).
    pub position: [f32; 3],
    /// Velocity (blocks per second).
    pub velocity: [f32; 3],
    /// Standing on solid ground after the last step.
    pub on_ground: bool,
}

impl PlayerBody {
    /// Creates a body at rest.
    #[must_use]
    pub const fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            velocity: [0.0; 3],
            on_ground: false,
        }
    }

    /// Gets the eye position (for camera).
    #[must_use]
    pub fn eye_position(&self, params: &PhysicsParams) -> [f32; 3] {
        [
            self.position[0],
            self.position[1] + params.eye_height,
            self.position[2],
        ]
    }

    /// Attempts to jump. Only works while on the ground.
    pub fn jump(&mut self, params: &PhysicsParams) -> bool {
        if !self.on_ground {
            return false;
        }
        self.velocity[1] = params.jump_speed;
        self.on_ground = false;
        true
    }

    /// Advances one physics step.
    ///
    /// Gravity first, then Y, X and Z are resolved one at a time. A colliding
    /// axis keeps its old position and loses its velocity; a colliding Y move
    /// also snaps the body flush against the block it hit.
    pub fn step<W: SolidQuery + ?Sized>(&mut self, dt: f32, world: &W, params: &PhysicsParams) {
        let dt = dt.clamp(0.0, MAX_STEP_SECONDS);

        self.velocity[1] = (self.velocity[1] - params.gravity * dt).max(-params.terminal_velocity);

        self.resolve_vertical(self.velocity[1] * dt, world, params);
        for axis in [0, 2] {
            self.resolve_horizontal(axis, self.velocity[axis] * dt, world, params);
        }

        self.on_ground = self.check_ground(world, params);
    }

    fn resolve_vertical<W: SolidQuery + ?Sized>(&mut self, dy: f32, world: &W, params: &PhysicsParams) {
        if dy == 0.0 {
            return;
        }
        let target = self.position[1] + dy;

        // The target alone is not enough: a fast step can cross several
        // cells and clear a thin slab entirely.
        match first_contact(self.position, target, world, params) {
            Some(rest) => {
                self.position[1] = rest;
                self.velocity[1] = 0.0;
            }
            None => self.position[1] = target,
        }
    }

    fn resolve_horizontal<W: SolidQuery + ?Sized>(
        &mut self,
        axis: usize,
        delta: f32,
        world: &W,
        params: &PhysicsParams,
    ) {
        if delta == 0.0 {
            return;
        }
        let mut target = self.position;
        target[axis] += delta;

        if collides_at(target, world, params) {
            self.velocity[axis] = 0.0;
        } else {
            self.position = target;
        }
    }

    /// True if any footprint sample just below the feet is solid.
    #[must_use]
    pub fn check_ground<W: SolidQuery + ?Sized>(&self, world: &W, params: &PhysicsParams) -> bool {
        let y = self.position[1] - GROUND_PROBE_DEPTH;
        footprint(params.player_radius).iter().any(|&(dx, dz)| {
            world.is_solid(self.position[0] + dx, y, self.position[2] + dz)
        })
    }
}

/// Samples feet, mid-height and head at each footprint point.
#[must_use]
pub fn collides_at<W: SolidQuery + ?Sized>(
    position: [f32; 3],
    world: &W,
    params: &PhysicsParams,
) -> bool {
    let heights = [0.0, params.player_height * 0.5, params.player_height];
    footprint(params.player_radius).iter().any(|&(dx, dz)| {
        heights.iter().any(|&dy| {
            world.is_solid(position[0] + dx, position[1] + dy, position[2] + dz)
        })
    })
}

/// Feet height that rests against the first solid cell met while moving the
/// feet from `from[1]` to `to_y`, checking one cell at a time. `None` when
/// the whole move is clear.
///
/// Falling rests on top of the cell (`cell + 1 + LANDING_OFFSET`); rising
/// stops with the head just under it.
fn first_contact<W: SolidQuery + ?Sized>(
    from: [f32; 3],
    to_y: f32,
    world: &W,
    params: &PhysicsParams,
) -> Option<f32> {
    let height = params.player_height;
    let mut sample = from;

    if to_y < from[1] {
        let start = from[1].floor() as i32;
        let end = to_y.floor() as i32;
        for cell in (end..=start).rev() {
            // Feet inside `cell`, never below the target
            sample[1] = to_y.max(cell as f32);
            if collides_at(sample, world, params) {
                return Some(cell as f32 + 1.0 + LANDING_OFFSET);
            }
        }
    } else {
        let start = (from[1] + height).floor() as i32;
        let end = (to_y + height).floor() as i32;
        for cell in start..=end {
            // Head inside `cell`, never below the start; the last cell is
            // the target itself
            sample[1] = if cell == end {
                to_y
            } else {
                (cell as f32 + 0.5 - height).max(from[1])
            };
            if collides_at(sample, world, params) {
                return Some(cell as f32 - height - LANDING_OFFSET);
            }
        }
    }
    None
}

// ============================================================================
// RAYCAST SYSTEM
// ============================================================================

/// Result of a raycast against the terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// The block that was hit.
    pub voxel: [i32; 3],
    /// Face normal of the hit (-1, 0, or 1 on one axis).
    pub normal: [i32; 3],
    /// Distance from ray origin to the hit face.
    pub distance: f32,
}

/// Walks the block grid along a ray (DDA) and returns the first solid block.
#[must_use]
pub fn raycast<W: SolidQuery + ?Sized>(
    origin: [f32; 3],
    direction: [f32; 3],
    max_distance: f32,
    world: &W,
) -> Option<RaycastHit> {
    let len = direction.iter().map(|d| d * d).sum::<f32>().sqrt();
    if len < 1e-4 {
        return None;
    }
    let dir = direction.map(|d| d / len);

    let mut voxel = origin.map(|o| o.floor() as i32);
    let mut step = [0i32; 3];
    let mut t_delta = [f32::INFINITY; 3];
    let mut t_max = [f32::INFINITY; 3];

    for axis in 0..3 {
        if dir[axis] > 0.0 {
            step[axis] = 1;
            t_delta[axis] = 1.0 / dir[axis];
            t_max[axis] = ((voxel[axis] + 1) as f32 - origin[axis]) / dir[axis];
        } else if dir[axis] < 0.0 {
            step[axis] = -1;
            t_delta[axis] = -1.0 / dir[axis];
            t_max[axis] = (voxel[axis] as f32 - origin[axis]) / dir[axis];
        }
    }

    let mut distance = 0.0;
    let mut normal = [0i32; 3];

    while distance <= max_distance {
        let center = voxel.map(|v| v as f32 + 0.5);
        if world.is_solid(center[0], center[1], center[2]) {
            return Some(RaycastHit {
                voxel,
                normal,
                distance,
            });
        }

        let axis = if t_max[0] < t_max[1] && t_max[0] < t_max[2] {
            0
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };
        distance = t_max[axis];
        t_max[axis] += t_delta[axis];
        voxel[axis] += step[axis];
        normal = [0; 3];
        normal[axis] = -step[axis];
    }

    None
}

/// Gets the look direction from camera yaw and pitch (degrees).
#[must_use]
pub fn look_direction(yaw: f32, pitch: f32) -> [f32; 3] {
    let yaw_rad = yaw.to_radians();
    let pitch_rad = pitch.to_radians();
    [
        yaw_rad.sin() * pitch_rad.cos(),
        pitch_rad.sin(),
        -yaw_rad.cos() * pitch_rad.cos(),
    ]
}
