//! Chunk storage: the traversal-safe id lists, the live per-chunk data, and
//! the loaded/unloaded state machine.
//!
//! A chunk is always present in the world's chunk array but holds live data
//! only while loaded:
//!
//! ```text
//! Unloaded { saved: None }        -- never generated
//!      | load (generator output)
//! Loaded(ChunkData)
//!      | unload
//! Unloaded { saved: Some(..) }    -- tiles + block cells retained
//!      | load (saved data)
//! Loaded(ChunkData)
//! ```
//!
//! Generation therefore runs exactly once per chunk for the lifetime of a
//! world.

use crate::error::{Result, WorldError};
use crate::object::{ResourceCategory, Tile, UpdateRef};
use crate::types::{BlockId, ChunkPos, MovingId, NodeId, TilePos, CHUNK_SIZE_TILES};

// ---------------------------------------------------------------------------
// TraversalList
// ---------------------------------------------------------------------------

/// A list that tolerates membership changes while it is being walked.
///
/// Between [`begin_traversing`](TraversalList::begin_traversing) and
/// [`end_traversing`](TraversalList::end_traversing), adds and removes are
/// buffered instead of applied; `begin_traversing` hands the caller a snapshot
/// that stays valid no matter what the tick does to the live list. Outside a
/// traversal, mutations apply immediately.
#[derive(Debug, Clone, Default)]
pub struct TraversalList<T: Copy + PartialEq> {
    elements: Vec<T>,
    to_add: Vec<T>,
    to_remove: Vec<T>,
    traversing: bool,
}

impl<T: Copy + PartialEq> TraversalList<T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            to_add: Vec::new(),
            to_remove: Vec::new(),
            traversing: false,
        }
    }

    /// Membership count including pending adds and removes.
    pub fn len(&self) -> usize {
        self.elements.len() + self.to_add.len() - self.to_remove.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, value: &T) -> bool {
        if self.to_remove.contains(value) {
            return false;
        }
        self.elements.contains(value) || self.to_add.contains(value)
    }

    pub fn add(&mut self, value: T) {
        if self.traversing {
            // An add after a buffered remove of the same value cancels it.
            if let Some(i) = self.to_remove.iter().position(|v| *v == value) {
                self.to_remove.swap_remove(i);
            } else {
                self.to_add.push(value);
            }
        } else {
            self.elements.push(value);
        }
    }

    /// Removes one occurrence. Returns whether the value was a member.
    pub fn remove(&mut self, value: &T) -> bool {
        if self.traversing {
            if let Some(i) = self.to_add.iter().position(|v| v == value) {
                self.to_add.swap_remove(i);
                return true;
            }
            if self.elements.contains(value) && !self.to_remove.contains(value) {
                self.to_remove.push(*value);
                return true;
            }
            false
        } else if let Some(i) = self.elements.iter().position(|v| v == value) {
            self.elements.swap_remove(i);
            true
        } else {
            false
        }
    }

    /// Enters buffered mode and returns a stable snapshot to walk.
    pub fn begin_traversing(&mut self) -> Vec<T> {
        self.traversing = true;
        self.elements.clone()
    }

    /// Leaves buffered mode, flushing pending adds and removes.
    pub fn end_traversing(&mut self) {
        self.traversing = false;
        for value in self.to_remove.drain(..) {
            if let Some(i) = self.elements.iter().position(|v| *v == value) {
                self.elements.swap_remove(i);
            }
        }
        self.elements.append(&mut self.to_add);
    }

    /// The settled elements. Only meaningful outside a traversal.
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elements.iter()
    }
}

// ---------------------------------------------------------------------------
// Live and saved chunk data
// ---------------------------------------------------------------------------

/// Everything a loaded chunk stores. Objects are referenced by id; the owning
/// stores live on the world.
#[derive(Debug, Clone)]
pub struct ChunkData {
    /// Row-major tile array, one entry per cell.
    pub tiles: Vec<Tile>,
    /// Row-major block back-reference array: every cell a block's footprint
    /// covers holds that block's id.
    pub blocks: Vec<Option<BlockId>>,
    /// Movers whose anchor tile lies in this chunk.
    pub moving: TraversalList<MovingId>,
    /// Movers owned by *another* chunk whose hitbox overlaps this one.
    pub moving_on_boundary: TraversalList<MovingId>,
    /// Objects ticked each update while this chunk is loaded.
    pub updates_required: TraversalList<UpdateRef>,
    /// Subset of `moving` that are dropped-item stacks, for merge queries.
    pub dropped_items: TraversalList<MovingId>,
    /// Resource nodes anchored in this chunk, split by category.
    pub resource_nodes: [Vec<NodeId>; ResourceCategory::COUNT],
}

impl ChunkData {
    pub fn new(tiles: Vec<Tile>, blocks: Vec<Option<BlockId>>) -> Self {
        Self {
            tiles,
            blocks,
            moving: TraversalList::new(),
            moving_on_boundary: TraversalList::new(),
            updates_required: TraversalList::new(),
            dropped_items: TraversalList::new(),
            resource_nodes: Default::default(),
        }
    }

    pub fn resource_node_count(&self) -> usize {
        self.resource_nodes.iter().map(Vec::len).sum()
    }
}

/// What survives an unload: terrain and block placement. Everything dynamic
/// is evicted through the lifecycle layer before the chunk lets go of its
/// live data.
#[derive(Debug, Clone)]
pub struct SavedChunk {
    pub tiles: Vec<Tile>,
    pub blocks: Vec<Option<BlockId>>,
}

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ChunkState {
    Unloaded { saved: Option<SavedChunk> },
    Loaded(ChunkData),
}

/// One 8x8-tile cell of the world grid. Always allocated; cheap while
/// unloaded.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub pos: ChunkPos,
    /// Derived each tick from the open views.
    pub being_rendered: bool,
    pub state: ChunkState,
}

impl Chunk {
    pub fn new(pos: ChunkPos) -> Self {
        Self {
            pos,
            being_rendered: false,
            state: ChunkState::Unloaded { saved: None },
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ChunkState::Loaded(_))
    }

    /// Whether this chunk has ever been generated.
    pub fn is_initialized(&self) -> bool {
        !matches!(self.state, ChunkState::Unloaded { saved: None })
    }

    pub fn data(&self) -> Result<&ChunkData> {
        match &self.state {
            ChunkState::Loaded(data) => Ok(data),
            ChunkState::Unloaded { .. } => Err(WorldError::ChunkNotLoaded(self.pos)),
        }
    }

    pub fn data_mut(&mut self) -> Result<&mut ChunkData> {
        match &mut self.state {
            ChunkState::Loaded(data) => Ok(data),
            ChunkState::Unloaded { .. } => Err(WorldError::ChunkNotLoaded(self.pos)),
        }
    }

    /// Takes the retained save, if any, leaving the chunk uninitialized.
    /// Callers must follow with [`load`](Chunk::load).
    pub fn take_saved(&mut self) -> Option<SavedChunk> {
        match &mut self.state {
            ChunkState::Unloaded { saved } => saved.take(),
            ChunkState::Loaded(_) => None,
        }
    }

    /// Brings the chunk live with the given terrain and block cells (either
    /// fresh generator output or a retained save).
    pub fn load(&mut self, tiles: Vec<Tile>, blocks: Vec<Option<BlockId>>) -> Result<()> {
        if self.is_loaded() {
            return Err(WorldError::ChunkAlreadyLoaded(self.pos));
        }
        self.state = ChunkState::Loaded(ChunkData::new(tiles, blocks));
        Ok(())
    }

    /// Drops live data, retaining tiles and block cells. Returns the live
    /// data so the world can release the dynamic state it indexed.
    pub fn unload(&mut self) -> Result<ChunkData> {
        let data = match std::mem::replace(&mut self.state, ChunkState::Unloaded { saved: None }) {
            ChunkState::Loaded(data) => data,
            state @ ChunkState::Unloaded { .. } => {
                self.state = state;
                return Err(WorldError::ChunkNotLoaded(self.pos));
            }
        };
        self.state = ChunkState::Unloaded {
            saved: Some(SavedChunk {
                tiles: data.tiles.clone(),
                blocks: data.blocks.clone(),
            }),
        };
        Ok(data)
    }

    /// Index of a world-space tile into this chunk's cell arrays. The tile
    /// must lie inside the chunk.
    pub fn cell_index(&self, tile: TilePos) -> usize {
        let origin = self.pos.origin_tile();
        let lx = tile.x - origin.x;
        let ly = tile.y - origin.y;
        debug_assert!(lx >= 0 && lx < CHUNK_SIZE_TILES && ly >= 0 && ly < CHUNK_SIZE_TILES);
        (ly * CHUNK_SIZE_TILES + lx) as usize
    }
}
