//! # STRATA
//!
//! Frame glue for an endless voxel terrain: player physics against the
//! streamed height field, and the per-frame `tick` that keeps the chunk
//! window centred on the player and tells the renderer what changed.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   tick(dt, input)   ┌──────────────────────────┐
//! │ Host loop /  │ ──────────────────▶ │ WorldSession             │
//! │ renderer     │ ◀────────────────── │  ├─ PlayerBody (physics) │
//! └──────────────┘    FrameOutput      │  └─ WorldStreamer        │
//!                                      │      (strata_procedural) │
//!                                      └──────────────────────────┘
//! ```
//!
//! Terrain generation lives in `strata_procedural`; this crate never touches
//! noise directly.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod physics;
pub mod session;

pub use config::{SeedSpec, WorldConfig};
pub use error::{ConfigError, SessionError, SessionResult};
pub use physics::{raycast, PhysicsParams, PlayerBody, RaycastHit};
pub use session::{FrameInput, FrameOutput, RenderCommand, WorldSession};
