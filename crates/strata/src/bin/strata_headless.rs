//! # STRATA Headless Driver
//!
//! Walks a player across the world without a window and reports streaming
//! statistics.
//!
//! ```text
//! strata_headless [--config <file.toml>] [--frames N] [--seed S] [--speed B/s]
//! ```

use std::process::ExitCode;

use strata::{FrameInput, RenderCommand, SeedSpec, WorldConfig, WorldSession};

const FRAME_SECONDS: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: u64 = 3_600;
const DEFAULT_SPEED: f32 = 8.0;

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn main() -> ExitCode {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         STRATA HEADLESS                                          ║");
    println!("║         Terrain streaming soak run                               ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: strata_headless [options]");
        println!();
        println!("Options:");
        println!("  --config <file>  Load world config from TOML");
        println!("  --frames <n>     Frames to simulate (default {DEFAULT_FRAMES})");
        println!("  --seed <s>       Override the seed (number or phrase)");
        println!("  --speed <b/s>    Walking speed along +X (default {DEFAULT_SPEED})");
        return ExitCode::SUCCESS;
    }

    let mut config = match arg_value(&args, "--config") {
        Some(path) => match WorldConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                println!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => WorldConfig::default(),
    };

    if let Some(seed) = arg_value(&args, "--seed") {
        config.seed = seed
            .parse::<i64>()
            .map_or_else(|_| SeedSpec::Phrase(seed.to_owned()), SeedSpec::Number);
    }
    let frames: u64 = arg_value(&args, "--frames")
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);
    let speed: f32 = arg_value(&args, "--speed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SPEED);

    let mut session = match WorldSession::new(config) {
        Ok(session) => session,
        Err(e) => {
            println!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("┌─ WORLD ──────────────────────────────────────────────────────────┐");
    println!("│ Seed:               {:?}", session.config().seed);
    println!("│ Strategy:           {:?}", session.config().strategy);
    println!("│ Chunk size:         {}", session.config().chunk_size);
    println!("│ Render distance:    {}", session.config().render_distance);
    println!("│ Spawn:              {:?}", session.spawn());
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let input = FrameInput {
        move_x: speed,
        move_z: 0.0,
        jump: false,
    };
    let mut rebuilds = 0u64;
    let mut released = 0usize;
    let mut respawns = 0u64;
    let mut grounded_frames = 0u64;
    let mut peak_blocks = 0usize;

    for frame in 0..frames {
        // Hop whenever a wall stops us
        let blocked = session.body().on_ground && session.body().velocity[0] == 0.0;
        let frame_input = FrameInput {
            jump: blocked && frame > 0,
            ..input
        };

        let output = match session.tick(FRAME_SECONDS, &frame_input) {
            Ok(output) => output,
            Err(e) => {
                println!("Error at frame {frame}: {e}");
                return ExitCode::FAILURE;
            }
        };

        for command in &output.commands {
            match command {
                RenderCommand::ReleaseChunks(coords) => released += coords.len(),
                RenderCommand::RebuildBlocks { total_blocks } => {
                    rebuilds += 1;
                    peak_blocks = peak_blocks.max(*total_blocks);
                }
                RenderCommand::PlaceCamera { .. } => {}
            }
        }
        respawns += u64::from(output.respawned);
        grounded_frames += u64::from(output.on_ground);
    }

    let stats = session.streamer().stats();
    let position = session.body().position;

    println!("┌─ RESULTS ────────────────────────────────────────────────────────┐");
    println!("│ Frames:             {frames}");
    println!("│ Final position:     ({:.1}, {:.1}, {:.1})", position[0], position[1], position[2]);
    println!("│ Chunks generated:   {}", stats.generated_total);
    println!("│ Chunks released:    {released}");
    println!("│ Buffer rebuilds:    {rebuilds}");
    println!("│ Loaded now:         {}", session.streamer().loaded_chunk_count());
    println!("│ Blocks now / peak:  {} / {peak_blocks}", session.streamer().total_block_count());
    println!("│ Grounded frames:    {grounded_frames}");
    println!("│ Respawns:           {respawns}");
    println!("└──────────────────────────────────────────────────────────────────┘");

    ExitCode::SUCCESS
}
