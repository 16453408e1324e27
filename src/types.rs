//! Core coordinate types, unit conversions, and world configuration.
//!
//! Three nested coordinate spaces, all converted by exact bit shifts:
//!
//! ```text
//! pixel >> 4  = tile          (a tile is 16x16 pixels)
//! tile  >> 3  = chunk         (a chunk is 8x8 tiles)
//! pixel >> 7  = chunk
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Unit constants
// ---------------------------------------------------------------------------

/// log2 of the tile side length in pixels.
pub const TILE_PIXEL_EXP: u32 = 4;
/// log2 of the chunk side length in tiles.
pub const CHUNK_TILE_EXP: u32 = 3;
/// log2 of the chunk side length in pixels.
pub const CHUNK_PIXEL_EXP: u32 = TILE_PIXEL_EXP + CHUNK_TILE_EXP;

pub const TILE_SIZE_PIXELS: i32 = 1 << TILE_PIXEL_EXP;
pub const CHUNK_SIZE_TILES: i32 = 1 << CHUNK_TILE_EXP;
pub const CHUNK_SIZE_PIXELS: i32 = CHUNK_SIZE_TILES << TILE_PIXEL_EXP;
/// Cells in one chunk's tile / block array.
pub const CHUNK_AREA_TILES: usize = (CHUNK_SIZE_TILES * CHUNK_SIZE_TILES) as usize;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A tile coordinate in world space.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn from_pixel(x_pixel: i32, y_pixel: i32) -> Self {
        Self::new(x_pixel >> TILE_PIXEL_EXP, y_pixel >> TILE_PIXEL_EXP)
    }

    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::new(self.x >> CHUNK_TILE_EXP, self.y >> CHUNK_TILE_EXP)
    }

    /// Pixel coordinate of this tile's lower corner.
    pub fn pixel(&self) -> (i32, i32) {
        (self.x << TILE_PIXEL_EXP, self.y << TILE_PIXEL_EXP)
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for TilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A chunk coordinate.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
}

impl ChunkPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn from_pixel(x_pixel: i32, y_pixel: i32) -> Self {
        Self::new(x_pixel >> CHUNK_PIXEL_EXP, y_pixel >> CHUNK_PIXEL_EXP)
    }

    /// Tile coordinate of this chunk's origin cell.
    pub fn origin_tile(&self) -> TilePos {
        TilePos::new(self.x << CHUNK_TILE_EXP, self.y << CHUNK_TILE_EXP)
    }
}

impl std::fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Object ids
// ---------------------------------------------------------------------------

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

id_type!(
    /// Identifies a placed block.
    BlockId
);
id_type!(
    /// Identifies a moving object (including dropped items).
    MovingId
);
id_type!(
    /// Identifies a resource node.
    NodeId
);
id_type!(
    /// Opaque attachment target of a resource node (a container owned by the
    /// out-of-scope routing layer).
    ContainerId
);
id_type!(
    /// Identifies a registered renderer viewport.
    ViewId
);

// ---------------------------------------------------------------------------
// Config & stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World width in tiles. Must be a positive multiple of [`CHUNK_SIZE_TILES`].
    pub width_tiles: i32,
    /// World height in tiles. Must be a positive multiple of [`CHUNK_SIZE_TILES`].
    pub height_tiles: i32,
    /// Deterministic generation seed.
    pub seed: u64,
    /// Radius in pixels within which dropped items merge into existing stacks.
    pub pickup_radius: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width_tiles: 256,
            height_tiles: 256,
            seed: 42,
            pickup_radius: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldStats {
    pub loaded_chunks: usize,
    pub blocks: usize,
    pub moving_objects: usize,
    pub dropped_items: usize,
    pub resource_nodes: usize,
    pub total_ticks: u64,
}
