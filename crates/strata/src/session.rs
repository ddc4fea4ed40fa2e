//! # STRATA Frame Loop
//!
//! One call to [`WorldSession::tick`] per rendered frame:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. CLAMP dt to max_step_seconds                                     │
//! │ 2. INPUT   horizontal velocity, jump if grounded                    │
//! │ 3. PHYSICS gravity, then Y / X / Z against the collision probe      │
//! │ 4. RESCUE  below fall_out_y: back to spawn, world reset             │
//! │ 5. STREAM  check_boundary on the new feet position                  │
//! │ 6. OUTPUT  release / rebuild / camera commands for the renderer     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller owns the loop itself (timing, vsync, window events).

use std::sync::Arc;

use strata_procedural::{ChunkCoord, StreamDelta, TerrainGenerator, WorldStreamer};
use tracing::{debug, warn};

use crate::config::WorldConfig;
use crate::error::SessionResult;
use crate::physics::{PlayerBody, PhysicsParams};

/// Spawn height above the top of the spawn column (blocks).
pub const SPAWN_CLEARANCE: f32 = 1.0;

/// Player intent for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Desired X velocity (blocks per second).
    pub move_x: f32,
    /// Desired Z velocity (blocks per second).
    pub move_z: f32,
    /// Jump if standing on the ground.
    pub jump: bool,
}

/// Work for the renderer, in the order it should be applied.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    /// Free resources held for these chunks.
    ReleaseChunks(Vec<ChunkCoord>),
    /// Re-upload [`WorldSession::block_positions`] as the instance buffer.
    RebuildBlocks {
        /// Number of blocks in the new buffer.
        total_blocks: usize,
    },
    /// Move the camera to the player's eye.
    PlaceCamera {
        /// Eye position in world space.
        eye: [f32; 3],
    },
}

/// Result of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    /// Renderer commands for this frame.
    pub commands: Vec<RenderCommand>,
    /// Camera position.
    pub eye_position: [f32; 3],
    /// Player stands on solid ground.
    pub on_ground: bool,
    /// Player fell out of the world and was returned to spawn.
    pub respawned: bool,
}

/// Running world: terrain streaming plus the player body.
pub struct WorldSession {
    config: WorldConfig,
    streamer: WorldStreamer,
    body: PlayerBody,
    spawn: [f32; 3],
    frame: u64,
}

impl WorldSession {
    /// Builds the world, places the player above the spawn column and loads
    /// the initial chunk window.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or initial generation fails.
    pub fn new(config: WorldConfig) -> SessionResult<Self> {
        config.validate()?;

        let generator = Arc::new(TerrainGenerator::new(
            config.seed.to_seed(),
            config.strategy,
            config.terrain,
        )?);
        let spawn = spawn_point(&generator, config.spawn_x, config.spawn_z);
        let mut streamer = WorldStreamer::new(generator, config.streamer_config())?;
        streamer.check_boundary(spawn)?;

        debug!(x = spawn[0], y = spawn[1], z = spawn[2], "Player spawned");

        Ok(Self {
            config,
            streamer,
            body: PlayerBody::new(spawn),
            spawn,
            frame: 0,
        })
    }

    /// Advances one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if chunk generation fails. The loaded set is then
    /// unchanged and the next tick retries the boundary crossing.
    pub fn tick(&mut self, delta_seconds: f32, input: &FrameInput) -> SessionResult<FrameOutput> {
        self.frame += 1;
        let params = self.config.physics;

        let dt = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        let dt = if dt > self.config.max_step_seconds {
            warn!(
                frame = self.frame,
                delta_seconds = dt,
                clamped_to = self.config.max_step_seconds,
                "Frame time clamped"
            );
            self.config.max_step_seconds
        } else {
            dt
        };

        self.body.velocity[0] = input.move_x;
        self.body.velocity[2] = input.move_z;
        if input.jump {
            self.body.jump(&params);
        }
        self.body.step(dt, &self.streamer.probe(), &params);

        let mut commands = Vec::new();
        let mut respawned = false;

        if self.body.position[1] < self.config.fall_out_y {
            warn!(
                frame = self.frame,
                x = self.body.position[0],
                y = self.body.position[1],
                z = self.body.position[2],
                "Player fell out of the world, respawning"
            );
            let dropped = self.streamer.loaded_coords();
            self.streamer.reset();
            self.body = PlayerBody::new(self.spawn);
            respawned = true;
            if !dropped.is_empty() {
                commands.push(RenderCommand::ReleaseChunks(dropped));
            }
        }

        if let Some(delta) = self.streamer.check_boundary(self.body.position)? {
            push_delta(&mut commands, &delta, self.streamer.total_block_count());
        }

        let eye_position = self.body.eye_position(&params);
        commands.push(RenderCommand::PlaceCamera { eye: eye_position });

        Ok(FrameOutput {
            commands,
            eye_position,
            on_ground: self.body.on_ground,
            respawned,
        })
    }

    /// Player body.
    #[must_use]
    pub const fn body(&self) -> &PlayerBody {
        &self.body
    }

    /// Moves the player. Streaming follows on the next tick.
    pub fn teleport(&mut self, position: [f32; 3]) {
        self.body = PlayerBody::new(position);
    }

    /// Spawn position (feet).
    #[must_use]
    pub const fn spawn(&self) -> [f32; 3] {
        self.spawn
    }

    /// Terrain streamer.
    #[must_use]
    pub const fn streamer(&self) -> &WorldStreamer {
        &self.streamer
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Frames ticked so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Render instance buffer: flattened `[x, y, z, reserved]` per block.
    #[must_use]
    pub fn block_positions(&self) -> &[f32] {
        self.streamer.aggregated_block_positions()
    }

    /// Physics constants in use.
    #[must_use]
    pub const fn physics(&self) -> &PhysicsParams {
        &self.config.physics
    }
}

fn push_delta(commands: &mut Vec<RenderCommand>, delta: &StreamDelta, total_blocks: usize) {
    if !delta.unloaded.is_empty() {
        commands.push(RenderCommand::ReleaseChunks(delta.unloaded.clone()));
    }
    if delta.changed() {
        commands.push(RenderCommand::RebuildBlocks { total_blocks });
    }
}

/// Feet position [`SPAWN_CLEARANCE`] above the top of the column holding
/// `(x, z)`.
#[must_use]
pub fn spawn_point(generator: &TerrainGenerator, x: f32, z: f32) -> [f32; 3] {
    let height = generator.column_height(x.floor() as i32, z.floor() as i32);
    [x, height as f32 + 1.0 + SPAWN_CLEARANCE, z]
}
