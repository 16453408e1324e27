//! orefield-sim binary
//!
//! Headless tick-loop runner: builds a world, opens a view, spawns a small
//! demo scene, and runs a fixed number of ticks, reporting world stats at
//! the end.
//!
//! ## Configuration (flags / env)
//!
//! | Key                  | Default | Description                      |
//! |----------------------|---------|----------------------------------|
//! | `WORLD_SEED`         | `42`    | Terrain seed                     |
//! | `WORLD_WIDTH_TILES`  | `256`   | World width (multiple of 8)      |
//! | `WORLD_HEIGHT_TILES` | `256`   | World height (multiple of 8)     |
//! | `WORLD_TICKS`        | `600`   | Ticks to simulate                |

use anyhow::Result;
use clap::Parser;
use orefield::{
    BlockKind, Direction, Hitbox, ItemKind, MovingKind, Rect, ResourceCategory, SimplexGenerator,
    TilePos, World, WorldConfig,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "orefield-sim", about = "Orefield headless world simulation", version)]
struct Args {
    /// Terrain seed
    #[arg(long, env = "WORLD_SEED", default_value_t = 42)]
    seed: u64,

    /// World width in tiles (multiple of 8)
    #[arg(long, env = "WORLD_WIDTH_TILES", default_value_t = 256)]
    width_tiles: i32,

    /// World height in tiles (multiple of 8)
    #[arg(long, env = "WORLD_HEIGHT_TILES", default_value_t = 256)]
    height_tiles: i32,

    /// Ticks to simulate
    #[arg(long, env = "WORLD_TICKS", default_value_t = 600)]
    ticks: u64,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("orefield=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    log::info!(
        "Starting orefield-sim (seed={}, {}x{} tiles, {} ticks)",
        args.seed,
        args.width_tiles,
        args.height_tiles,
        args.ticks,
    );

    let config = WorldConfig {
        width_tiles: args.width_tiles,
        height_tiles: args.height_tiles,
        seed: args.seed,
        ..WorldConfig::default()
    };
    let generator = SimplexGenerator::new(config.seed);
    let mut world = World::new(config, Box::new(generator))?;

    // A camera parked over the middle of the world keeps a region resident.
    let view = world.add_view(Rect::new(
        args.width_tiles * 8 - 256,
        args.height_tiles * 8 - 256,
        512,
        512,
    ));

    spawn_demo_scene(&mut world)?;

    for _ in 0..args.ticks {
        world.update()?;
    }

    world.remove_view(view);
    let stats = world.stats();
    log::info!(
        "Done: {} ticks, {} loaded chunks, {} blocks, {} movers ({} dropped items), {} nodes",
        stats.total_ticks,
        stats.loaded_chunks,
        stats.blocks,
        stats.moving_objects,
        stats.dropped_items,
        stats.resource_nodes,
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// A miner feeding a chest over an attached node pair, one pushed unit, and
/// a few dropped ore stacks.
fn spawn_demo_scene(world: &mut World) -> Result<()> {
    let mid_tile = world.config().width_tiles / 2;
    let origin = TilePos::new(mid_tile, mid_tile);

    world.add_block(BlockKind::Miner, origin, 0)?;
    world.add_block(BlockKind::Chest, origin.offset(3, 0), 0)?;
    let out = world.add_resource_node(
        origin.offset(2, 0),
        Direction::Right,
        ResourceCategory::Item,
        orefield::ContainerId(1),
    )?;
    let inp = world.add_resource_node(
        origin.offset(3, 0),
        Direction::Left,
        ResourceCategory::Item,
        orefield::ContainerId(2),
    )?;
    log::debug!(
        "demo nodes {out} and {inp} attached: {:?}",
        world.attached_nodes(out)?
    );

    let (px, py) = origin.offset(0, 4).pixel();
    if let Some(unit) = world.add_moving(px, py, Hitbox::STANDARD_UNIT, MovingKind::Unit)? {
        world.set_velocity(unit, 12, 0)?;
    }
    let (ix, iy) = origin.offset(5, 5).pixel();
    world.spawn_dropped_item(ItemKind::IronOre, 30, ix, iy)?;
    world.spawn_dropped_item(ItemKind::IronOre, 45, ix + 4, iy + 4)?;
    Ok(())
}
