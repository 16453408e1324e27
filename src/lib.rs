//! Orefield world core: the chunked tile/entity simulation for a 2D factory
//! game.
//!
//! ```text
//!    renderer views          lifecycle ops            generator hook
//!         |                       |                        |
//!         v                       v                        v
//!   +----------------------------------------------------------------+
//!   |                            World                               |
//!   |  chunk grid (8x8 tiles)  object stores  collision  attachments |
//!   +----------------------------------------------------------------+
//!         |
//!         v
//!      update(): stream (load / idle-unload) + tick dispatch
//! ```
//!
//! The world is a fixed grid of 8x8-tile chunks that load lazily and unload
//! when idle: no queued updates, no boundary movers, not rendered, no
//! resource nodes. Objects live in id-keyed stores on the world; chunks hold
//! ids only. Everything runs single-threaded inside `update()`.

pub mod chunk;
pub mod collision;
pub mod error;
pub mod gen;
pub mod geometry;
pub mod lifecycle;
pub mod network;
pub mod object;
pub mod snapshot;
pub mod types;
pub mod world;

pub use collision::Collider;
pub use error::{Result, WorldError};
pub use gen::{ChunkGenerator, FlatGenerator, SimplexGenerator};
pub use geometry::{Direction, Hitbox, Rect};
pub use lifecycle::DropOutcome;
pub use object::{
    Block, BlockKind, ItemKind, MovingKind, MovingObject, ResourceCategory, ResourceNode, Tile,
    TileKind,
};
pub use snapshot::ChunkSnapshot;
pub use types::{
    BlockId, ChunkPos, ContainerId, MovingId, NodeId, TilePos, ViewId, WorldConfig, WorldStats,
    CHUNK_SIZE_PIXELS, CHUNK_SIZE_TILES, TILE_SIZE_PIXELS,
};
pub use world::{ViewSlice, World};
