//! The closed object model: tiles, blocks, moving objects (including dropped
//! items), and resource nodes.
//!
//! Objects are plain data owned by the [`World`](crate::world::World) stores;
//! chunks refer to them by id only. Every object is constructed detached
//! (`in_world = false`) and only becomes live through the world's `add_*`
//! operations.

use crate::geometry::{Direction, Hitbox, Rect};
use crate::types::{BlockId, ChunkPos, ContainerId, MovingId, NodeId, TilePos};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Grass,
    Sand,
    Stone,
    IronOre,
    CopperOre,
}

impl TileKind {
    pub fn is_ore(self) -> bool {
        matches!(self, TileKind::IronOre | TileKind::CopperOre)
    }
}

/// One terrain cell. Tiles carry no behavior in the core; they exist for
/// generation, rendering, and the mining hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        Self { kind }
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Every placeable structure kind. Footprint and update policy are properties
/// of the kind, not the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Natural rock generated with the terrain.
    Rock,
    StoneWall,
    Chest,
    Conveyor,
    Miner,
    Furnace,
}

impl BlockKind {
    pub fn width_tiles(self) -> i32 {
        match self {
            BlockKind::Miner | BlockKind::Furnace => 2,
            _ => 1,
        }
    }

    pub fn height_tiles(self) -> i32 {
        match self {
            BlockKind::Miner | BlockKind::Furnace => 2,
            _ => 1,
        }
    }

    /// Whether instances of this kind tick every update.
    pub fn requires_update(self) -> bool {
        matches!(self, BlockKind::Miner | BlockKind::Furnace)
    }

    /// Unrotated visual hitbox. Distinct from the placement footprint.
    pub fn hitbox(self) -> Hitbox {
        match self {
            BlockKind::Miner | BlockKind::Furnace => Hitbox::TILE2X2,
            _ => Hitbox::TILE,
        }
    }
}

/// A placed structure occupying a rectangular footprint of tile cells.
///
/// Exactly one cell, the origin at `tile`, is the main cell; it alone
/// carries the update-queue registration. All footprint cells store this
/// block's id for O(1) lookup by any covered tile.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub tile: TilePos,
    pub kind: BlockKind,
    /// Rotation step, 0-3.
    pub rotation: u8,
    pub in_world: bool,
    /// Ticks this block has been live. Machine behavior beyond the counter is
    /// owned by the crafting layer.
    pub ticks: u64,
}

impl Block {
    pub fn new(id: BlockId, tile: TilePos, kind: BlockKind, rotation: u8) -> Self {
        Self {
            id,
            tile,
            kind,
            rotation: rotation % 4,
            in_world: false,
            ticks: 0,
        }
    }

    pub fn pixel(&self) -> (i32, i32) {
        self.tile.pixel()
    }

    pub fn hitbox(&self) -> Hitbox {
        self.kind.hitbox().rotated(self.rotation)
    }

    pub fn rect(&self) -> Rect {
        let (x, y) = self.pixel();
        self.hitbox().at(x, y)
    }

    /// Every tile cell of this block's placement footprint.
    pub fn footprint(&self) -> impl Iterator<Item = TilePos> + '_ {
        let (w, h) = (self.kind.width_tiles(), self.kind.height_tiles());
        (0..w).flat_map(move |x| (0..h).map(move |y| self.tile.offset(x, y)))
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    IronOre,
    CopperOre,
    IronIngot,
    StonePlate,
}

impl ItemKind {
    pub fn max_stack(self) -> u32 {
        100
    }
}

// ---------------------------------------------------------------------------
// Moving objects
// ---------------------------------------------------------------------------

pub const DEFAULT_MAX_SPEED: i32 = 20;
pub const DEFAULT_DRAG: i32 = 4;

/// What a moving object is, beyond its motion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovingKind {
    /// A generic mobile entity (robot, creature, ...).
    Unit,
    /// An item stack lying in the world.
    DroppedItem { item: ItemKind, quantity: u32 },
}

impl MovingKind {
    pub fn is_dropped_item(&self) -> bool {
        matches!(self, MovingKind::DroppedItem { .. })
    }
}

/// A mobile entity anchored at a pixel position.
///
/// Tracked in exactly one owning chunk (by anchor tile) and listed in the
/// boundary set of every *other* chunk its hitbox overlaps.
#[derive(Debug, Clone)]
pub struct MovingObject {
    pub id: MovingId,
    pub x_pixel: i32,
    pub y_pixel: i32,
    pub hitbox: Hitbox,
    pub kind: MovingKind,
    pub in_world: bool,
    pub requires_update: bool,
    pub x_vel: i32,
    pub y_vel: i32,
    pub facing: Direction,
    /// Chunks other than the owning one that the hitbox currently overlaps.
    pub boundary_chunks: Vec<ChunkPos>,
}

impl MovingObject {
    pub fn new(id: MovingId, x_pixel: i32, y_pixel: i32, hitbox: Hitbox, kind: MovingKind) -> Self {
        Self {
            id,
            x_pixel,
            y_pixel,
            hitbox,
            kind,
            in_world: false,
            requires_update: true,
            x_vel: 0,
            y_vel: 0,
            facing: Direction::Up,
            boundary_chunks: Vec::new(),
        }
    }

    pub fn tile(&self) -> TilePos {
        TilePos::from_pixel(self.x_pixel, self.y_pixel)
    }

    pub fn chunk(&self) -> ChunkPos {
        self.tile().chunk()
    }

    pub fn rect(&self) -> Rect {
        self.hitbox.at(self.x_pixel, self.y_pixel)
    }

    /// Clamp a velocity component to the speed cap.
    pub fn clamp_speed(v: i32) -> i32 {
        v.clamp(-DEFAULT_MAX_SPEED, DEFAULT_MAX_SPEED)
    }
}

// ---------------------------------------------------------------------------
// Resource nodes
// ---------------------------------------------------------------------------

/// Resource categories get separate per-chunk lists so routing queries never
/// scan unrelated nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceCategory {
    Item,
    Fluid,
}

impl ResourceCategory {
    pub const COUNT: usize = 2;

    pub fn index(self) -> usize {
        match self {
            ResourceCategory::Item => 0,
            ResourceCategory::Fluid => 1,
        }
    }
}

/// A directional attachment point used by the resource-transport layer.
///
/// `attached_nodes` is derived state: the nodes at the adjacent tile in this
/// node's facing direction whose own direction points back and whose category
/// matches. It is recomputed on add/remove events in the 4-neighborhood,
/// never patched incrementally.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    pub id: NodeId,
    pub tile: TilePos,
    pub dir: Direction,
    pub category: ResourceCategory,
    pub container: ContainerId,
    pub in_world: bool,
    pub attached_nodes: Vec<NodeId>,
}

impl ResourceNode {
    pub fn new(
        id: NodeId,
        tile: TilePos,
        dir: Direction,
        category: ResourceCategory,
        container: ContainerId,
    ) -> Self {
        Self {
            id,
            tile,
            dir,
            category,
            container,
            in_world: false,
            attached_nodes: Vec::new(),
        }
    }

    /// The tile this node faces into.
    pub fn facing_tile(&self) -> TilePos {
        self.tile.offset(self.dir.x_sign(), self.dir.y_sign())
    }
}

// ---------------------------------------------------------------------------
// Update-queue entries
// ---------------------------------------------------------------------------

/// What a chunk's update-required set holds. A closed variant set so lifecycle
/// dispatch is exhaustively checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRef {
    Block(BlockId),
    Moving(MovingId),
}
