//! The world: chunk grid, object stores, streaming, and the tick loop.
//!
//! ```text
//!                +--------------------- World ---------------------+
//!                |                                                 |
//!   views ------>|  being_rendered      chunks: Vec<Chunk>         |
//!                |       |                 |                       |
//!                |       v                 v                       |
//!   update() --->|  streaming pass   ChunkData (ids only)          |
//!                |       |                 |                       |
//!                |       v                 v                       |
//!                |  tick dispatch <-- object stores (HashMap<Id,T>)|
//!                +-------------------------------------------------+
//! ```
//!
//! Chunks load lazily: any accessor that resolves a coordinate into a chunk
//! loads it first (generating it if it was never loaded before). `update()`
//! is the only place chunks unload.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::chunk::{Chunk, ChunkState};
use crate::error::{Result, WorldError};
use crate::gen::ChunkGenerator;
use crate::geometry::{Direction, Rect};
use crate::object::{
    Block, MovingObject, ResourceNode, Tile, UpdateRef, DEFAULT_DRAG,
};
use crate::types::{
    BlockId, ChunkPos, MovingId, NodeId, TilePos, ViewId, WorldConfig, WorldStats,
    CHUNK_PIXEL_EXP, CHUNK_SIZE_TILES,
};

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

pub struct World {
    pub(crate) config: WorldConfig,
    pub(crate) width_chunks: i32,
    pub(crate) height_chunks: i32,
    chunks: Vec<Chunk>,
    generator: Box<dyn ChunkGenerator>,

    pub(crate) blocks: HashMap<BlockId, Block>,
    pub(crate) movers: HashMap<MovingId, MovingObject>,
    pub(crate) nodes: HashMap<NodeId, ResourceNode>,

    pub(crate) loaded: Vec<ChunkPos>,
    views: HashMap<ViewId, Rect>,
    pub(crate) next_id: u64,
    tick: u64,
    detached: bool,
}

impl World {
    pub fn new(config: WorldConfig, generator: Box<dyn ChunkGenerator>) -> Result<Self> {
        if config.width_tiles <= 0 || config.height_tiles <= 0 {
            return Err(WorldError::InvalidConfig("dimensions must be positive"));
        }
        if config.width_tiles % CHUNK_SIZE_TILES != 0 || config.height_tiles % CHUNK_SIZE_TILES != 0
        {
            return Err(WorldError::InvalidConfig(
                "dimensions must be multiples of the chunk size",
            ));
        }
        let width_chunks = config.width_tiles / CHUNK_SIZE_TILES;
        let height_chunks = config.height_tiles / CHUNK_SIZE_TILES;
        let mut chunks = Vec::with_capacity((width_chunks * height_chunks) as usize);
        for y in 0..height_chunks {
            for x in 0..width_chunks {
                chunks.push(Chunk::new(ChunkPos::new(x, y)));
            }
        }
        Ok(Self {
            config,
            width_chunks,
            height_chunks,
            chunks,
            generator,
            blocks: HashMap::new(),
            movers: HashMap::new(),
            nodes: HashMap::new(),
            loaded: Vec::new(),
            views: HashMap::new(),
            next_id: 1,
            tick: 0,
            detached: false,
        })
    }

    /// A zero-size placeholder for objects constructed before their real
    /// world exists. Any operation needing chunks fails with
    /// [`WorldError::DetachedWorld`].
    pub fn detached() -> Self {
        Self {
            config: WorldConfig {
                width_tiles: 0,
                height_tiles: 0,
                ..WorldConfig::default()
            },
            width_chunks: 0,
            height_chunks: 0,
            chunks: Vec::new(),
            generator: Box::new(crate::gen::FlatGenerator),
            blocks: HashMap::new(),
            movers: HashMap::new(),
            nodes: HashMap::new(),
            loaded: Vec::new(),
            views: HashMap::new(),
            next_id: 1,
            tick: 0,
            detached: true,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub(crate) fn mint_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // -----------------------------------------------------------------------
    // Chunk access
    // -----------------------------------------------------------------------

    pub fn in_bounds(&self, pos: ChunkPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width_chunks && pos.y < self.height_chunks
    }

    fn chunk_index(&self, pos: ChunkPos) -> Result<usize> {
        if self.detached {
            return Err(WorldError::DetachedWorld);
        }
        if !self.in_bounds(pos) {
            return Err(WorldError::OutOfBounds(pos));
        }
        Ok((pos.y * self.width_chunks + pos.x) as usize)
    }

    pub fn chunk(&self, pos: ChunkPos) -> Result<&Chunk> {
        let i = self.chunk_index(pos)?;
        Ok(&self.chunks[i])
    }

    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Result<&mut Chunk> {
        let i = self.chunk_index(pos)?;
        Ok(&mut self.chunks[i])
    }

    pub fn loaded_chunks(&self) -> &[ChunkPos] {
        &self.loaded
    }

    /// Loads the chunk if it is not live: restores the retained save if one
    /// exists, otherwise runs the generator. Idempotent for loaded chunks.
    pub fn ensure_loaded(&mut self, pos: ChunkPos) -> Result<()> {
        let i = self.chunk_index(pos)?;
        if self.chunks[i].is_loaded() {
            return Ok(());
        }
        if let Some(saved) = self.chunks[i].take_saved() {
            self.chunks[i].load(saved.tiles, saved.blocks)?;
            self.loaded.push(pos);
            self.reregister_updates(i);
            debug!("restored chunk {pos}");
            return Ok(());
        }
        let tiles = self.generator.gen_tiles(pos);
        let kinds = self.generator.gen_blocks(pos, &tiles);
        self.chunks[i].load(tiles, vec![None; kinds.len()])?;
        self.loaded.push(pos);
        let origin = pos.origin_tile();
        for (cell, kind) in kinds.into_iter().enumerate() {
            let Some(kind) = kind else { continue };
            let tile = origin.offset(cell as i32 % CHUNK_SIZE_TILES, cell as i32 / CHUNK_SIZE_TILES);
            let id = BlockId(self.mint_id());
            let mut block = Block::new(id, tile, kind, 0);
            block.in_world = true;
            self.blocks.insert(id, block);
            let data = self.chunks[i].data_mut()?;
            data.blocks[cell] = Some(id);
            if kind.requires_update() {
                data.updates_required.add(UpdateRef::Block(id));
            }
        }
        debug!("generated chunk {pos}");
        Ok(())
    }

    /// Restores update-queue membership for the main cells of saved blocks.
    fn reregister_updates(&mut self, index: usize) {
        let pos = self.chunks[index].pos;
        let refs: Vec<UpdateRef> = match self.chunks[index].data() {
            Ok(data) => {
                let origin = pos.origin_tile();
                data.blocks
                    .iter()
                    .enumerate()
                    .filter_map(|(cell, slot)| {
                        let id = (*slot)?;
                        let block = self.blocks.get(&id)?;
                        let tile = origin
                            .offset(cell as i32 % CHUNK_SIZE_TILES, cell as i32 / CHUNK_SIZE_TILES);
                        (block.tile == tile && block.kind.requires_update())
                            .then_some(UpdateRef::Block(id))
                    })
                    .collect()
            }
            Err(_) => Vec::new(),
        };
        if let Ok(data) = self.chunks[index].data_mut() {
            for r in refs {
                data.updates_required.add(r);
            }
        }
    }

    /// Chunk coordinates overlapping a pixel rectangle, clamped to world
    /// bounds. A zero-size rectangle covers the chunk containing its point.
    pub fn chunks_in_rect(&self, rect: &Rect) -> Vec<ChunkPos> {
        let x0 = (rect.x >> CHUNK_PIXEL_EXP).max(0);
        let y0 = (rect.y >> CHUNK_PIXEL_EXP).max(0);
        let x1 = ((rect.x + rect.width.max(0)) >> CHUNK_PIXEL_EXP).min(self.width_chunks - 1);
        let y1 = ((rect.y + rect.height.max(0)) >> CHUNK_PIXEL_EXP).min(self.height_chunks - 1);
        let mut out = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                out.push(ChunkPos::new(x, y));
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Tile and object access
    // -----------------------------------------------------------------------

    pub fn tile_at(&mut self, tile: TilePos) -> Result<Tile> {
        let pos = tile.chunk();
        self.ensure_loaded(pos)?;
        let chunk = self.chunk(pos)?;
        let cell = chunk.cell_index(tile);
        Ok(chunk.data()?.tiles[cell])
    }

    pub fn set_tile(&mut self, tile: Tile, at: TilePos) -> Result<()> {
        let pos = at.chunk();
        self.ensure_loaded(pos)?;
        let chunk = self.chunk_mut(pos)?;
        let cell = chunk.cell_index(at);
        chunk.data_mut()?.tiles[cell] = tile;
        Ok(())
    }

    /// The block covering a tile, if any. Any footprint cell resolves to the
    /// block.
    pub fn block_at(&mut self, tile: TilePos) -> Result<Option<&Block>> {
        let pos = tile.chunk();
        self.ensure_loaded(pos)?;
        let chunk = self.chunk(pos)?;
        let cell = chunk.cell_index(tile);
        match chunk.data()?.blocks[cell] {
            Some(id) => Ok(self.blocks.get(&id)),
            None => Ok(None),
        }
    }

    pub fn block(&self, id: BlockId) -> Result<&Block> {
        self.blocks.get(&id).ok_or(WorldError::StaleId {
            kind: "block",
            id: id.0,
        })
    }

    pub fn moving(&self, id: MovingId) -> Result<&MovingObject> {
        self.movers.get(&id).ok_or(WorldError::StaleId {
            kind: "moving",
            id: id.0,
        })
    }

    pub fn node(&self, id: NodeId) -> Result<&ResourceNode> {
        self.nodes.get(&id).ok_or(WorldError::StaleId {
            kind: "node",
            id: id.0,
        })
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Registers a renderer viewport. Chunks overlapping any view stay
    /// loaded and render-flagged until the view moves away or is removed.
    pub fn add_view(&mut self, rect: Rect) -> ViewId {
        let id = ViewId(self.mint_id());
        self.views.insert(id, rect);
        id
    }

    pub fn move_view(&mut self, id: ViewId, rect: Rect) -> bool {
        match self.views.get_mut(&id) {
            Some(slot) => {
                *slot = rect;
                true
            }
            None => false,
        }
    }

    pub fn remove_view(&mut self, id: ViewId) -> bool {
        self.views.remove(&id).is_some()
    }

    /// Everything a renderer needs for a pixel rectangle. Loads the covered
    /// chunks first.
    pub fn view(&mut self, rect: Rect) -> Result<ViewSlice<'_>> {
        if self.detached {
            return Err(WorldError::DetachedWorld);
        }
        let chunks = self.chunks_in_rect(&rect);
        for &pos in &chunks {
            self.ensure_loaded(pos)?;
        }
        let mut slice = ViewSlice {
            chunks: chunks.clone(),
            tiles: Vec::new(),
            blocks: Vec::new(),
            moving: Vec::new(),
            nodes: Vec::new(),
        };
        let mut block_ids: Vec<BlockId> = Vec::new();
        for &pos in &chunks {
            let chunk = self.chunk(pos)?;
            let data = chunk.data()?;
            let origin = pos.origin_tile();
            for cell in 0..data.tiles.len() {
                let tile = origin
                    .offset(cell as i32 % CHUNK_SIZE_TILES, cell as i32 / CHUNK_SIZE_TILES);
                slice.tiles.push((tile, data.tiles[cell]));
                if let Some(id) = data.blocks[cell] {
                    if !block_ids.contains(&id) {
                        block_ids.push(id);
                    }
                }
            }
            for id in data.moving.iter() {
                if let Some(m) = self.movers.get(id) {
                    slice.moving.push(m);
                }
            }
            for list in &data.resource_nodes {
                for id in list {
                    if let Some(n) = self.nodes.get(id) {
                        slice.nodes.push(n);
                    }
                }
            }
        }
        for id in block_ids {
            if let Some(b) = self.blocks.get(&id) {
                slice.blocks.push(b);
            }
        }
        Ok(slice)
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advances the world one tick: re-derives render flags from the open
    /// views, unloads idle chunks, and ticks every update-queued object in
    /// the chunks that remain.
    pub fn update(&mut self) -> Result<()> {
        if self.detached {
            return Err(WorldError::DetachedWorld);
        }
        self.tick += 1;

        let mut rendered: HashSet<ChunkPos> = HashSet::new();
        let view_rects: Vec<Rect> = self.views.values().copied().collect();
        for rect in view_rects {
            for pos in self.chunks_in_rect(&rect) {
                self.ensure_loaded(pos)?;
                rendered.insert(pos);
            }
        }
        for chunk in &mut self.chunks {
            chunk.being_rendered = rendered.contains(&chunk.pos);
        }

        // Snapshot: ticks and unloads may mutate the loaded list.
        let loaded = self.loaded.clone();
        for pos in loaded {
            let chunk = self.chunk(pos)?;
            if !chunk.is_loaded() {
                continue;
            }
            let data = chunk.data()?;
            let idle = data.updates_required.is_empty()
                && data.moving_on_boundary.is_empty()
                && !chunk.being_rendered
                && data.resource_node_count() == 0;
            if idle {
                self.unload_chunk(pos)?;
            } else {
                self.tick_chunk(pos)?;
            }
        }
        Ok(())
    }

    fn unload_chunk(&mut self, pos: ChunkPos) -> Result<()> {
        let data = self.chunk_mut(pos)?.unload()?;
        self.loaded.retain(|p| *p != pos);
        // Movers owned here without an update registration are stranded by an
        // unload; evict them rather than leave dangling ids. Eviction must
        // also clear their registrations in *other* chunks' boundary lists.
        for id in data.moving.as_slice() {
            if let Some(mover) = self.movers.remove(id) {
                for b in &mover.boundary_chunks {
                    if self.in_bounds(*b) && self.chunk(*b)?.is_loaded() {
                        self.chunk_mut(*b)?
                            .data_mut()?
                            .moving_on_boundary
                            .remove(id);
                    }
                }
                warn!("unloading chunk {pos} despawned stranded {}", mover.id);
            }
        }
        debug!("unloaded idle chunk {pos}");
        Ok(())
    }

    fn tick_chunk(&mut self, pos: ChunkPos) -> Result<()> {
        let snapshot = self.chunk_mut(pos)?.data_mut()?.updates_required.begin_traversing();
        for entry in snapshot {
            match entry {
                UpdateRef::Block(id) => self.tick_block(id),
                UpdateRef::Moving(id) => self.tick_moving(id)?,
            }
        }
        if let Ok(chunk) = self.chunk_mut(pos) {
            if let Ok(data) = chunk.data_mut() {
                data.updates_required.end_traversing();
            }
        }
        Ok(())
    }

    fn anchor_in_bounds(&self, x_pixel: i32, y_pixel: i32) -> bool {
        self.in_bounds(ChunkPos::from_pixel(x_pixel, y_pixel))
    }

    fn tick_block(&mut self, id: BlockId) {
        if let Some(block) = self.blocks.get_mut(&id) {
            block.ticks += 1;
        }
    }

    /// Axis-separated movement: each velocity component is applied only if
    /// the destination is collision-free, otherwise that component zeroes.
    fn tick_moving(&mut self, id: MovingId) -> Result<()> {
        let Some(mover) = self.movers.get(&id) else {
            return Ok(());
        };
        let (mut x, y) = (mover.x_pixel, mover.y_pixel);
        let mut vx = MovingObject::clamp_speed(mover.x_vel);
        let mut vy = MovingObject::clamp_speed(mover.y_vel);
        let hitbox = mover.hitbox;

        // The anchor itself must stay inside the world; a hitbox does not
        // necessarily cover it.
        if vx != 0 {
            if self.anchor_in_bounds(x + vx, y)
                && self.collision(hitbox, x + vx, y, Some(id))?.is_none()
            {
                x += vx;
            } else {
                vx = 0;
            }
        }
        let mut new_y = y;
        if vy != 0 {
            if self.anchor_in_bounds(x, y + vy)
                && self.collision(hitbox, x, y + vy, Some(id))?.is_none()
            {
                new_y = y + vy;
            } else {
                vy = 0;
            }
        }

        let facing = if vx.abs() > vy.abs() {
            if vx > 0 {
                Some(Direction::Right)
            } else {
                Some(Direction::Left)
            }
        } else if vy != 0 {
            if vy > 0 {
                Some(Direction::Up)
            } else {
                Some(Direction::Down)
            }
        } else {
            None
        };

        vx = vx * (DEFAULT_DRAG - 1) / DEFAULT_DRAG;
        vy = vy * (DEFAULT_DRAG - 1) / DEFAULT_DRAG;

        if let Some(mover) = self.movers.get_mut(&id) {
            mover.x_vel = vx;
            mover.y_vel = vy;
            if let Some(facing) = facing {
                mover.facing = facing;
            }
        }
        self.set_position(id, x, new_y)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            loaded_chunks: self.loaded.len(),
            blocks: self.blocks.len(),
            moving_objects: self.movers.len(),
            dropped_items: self
                .movers
                .values()
                .filter(|m| m.kind.is_dropped_item())
                .count(),
            resource_nodes: self.nodes.len(),
            total_ticks: self.tick,
        }
    }

    /// Total retained (saved but unloaded) chunks. Diagnostic only.
    pub fn saved_chunk_count(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| matches!(c.state, ChunkState::Unloaded { saved: Some(_) }))
            .count()
    }
}

// ---------------------------------------------------------------------------
// ViewSlice
// ---------------------------------------------------------------------------

/// A renderer's snapshot of the chunks overlapping a view rectangle.
pub struct ViewSlice<'a> {
    pub chunks: Vec<ChunkPos>,
    pub tiles: Vec<(TilePos, Tile)>,
    pub blocks: Vec<&'a Block>,
    pub moving: Vec<&'a MovingObject>,
    pub nodes: Vec<&'a ResourceNode>,
}
