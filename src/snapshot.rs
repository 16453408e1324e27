//! Chunk snapshots: a serde view of one chunk's state for persistence.
//!
//! A snapshot stores each block once, at its anchor, instead of per footprint
//! cell; restoring goes through the lifecycle layer so footprint
//! back-references, update-queue membership, and boundary lists are
//! re-derived rather than trusted from the file.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};
use crate::geometry::Hitbox;
use crate::object::{BlockKind, MovingKind, Tile};
use crate::types::{ChunkPos, TilePos};
use crate::world::World;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub kind: BlockKind,
    pub tile: TilePos,
    pub rotation: u8,
    pub ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingSnapshot {
    pub x_pixel: i32,
    pub y_pixel: i32,
    pub hitbox: Hitbox,
    pub kind: MovingKind,
    pub x_vel: i32,
    pub y_vel: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub pos: ChunkPos,
    pub tiles: Vec<Tile>,
    /// Blocks anchored in this chunk. Blocks anchored elsewhere but spilling
    /// in are owned by their anchor chunk's snapshot.
    pub blocks: Vec<BlockSnapshot>,
    pub moving: Vec<MovingSnapshot>,
}

impl ChunkSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

impl World {
    /// Captures a chunk's current state, loading it first if needed.
    pub fn snapshot_chunk(&mut self, pos: ChunkPos) -> Result<ChunkSnapshot> {
        self.ensure_loaded(pos)?;
        let chunk = self.chunk(pos)?;
        let data = chunk.data()?;

        let mut blocks = Vec::new();
        let mut seen = Vec::new();
        for slot in &data.blocks {
            let Some(id) = slot else { continue };
            if seen.contains(id) {
                continue;
            }
            seen.push(*id);
            let block = self.block(*id)?;
            if block.tile.chunk() != pos {
                continue;
            }
            blocks.push(BlockSnapshot {
                kind: block.kind,
                tile: block.tile,
                rotation: block.rotation,
                ticks: block.ticks,
            });
        }

        let mut moving = Vec::new();
        for id in data.moving.iter() {
            let m = self.moving(*id)?;
            moving.push(MovingSnapshot {
                x_pixel: m.x_pixel,
                y_pixel: m.y_pixel,
                hitbox: m.hitbox,
                kind: m.kind,
                x_vel: m.x_vel,
                y_vel: m.y_vel,
            });
        }

        Ok(ChunkSnapshot {
            pos,
            tiles: data.tiles.clone(),
            blocks,
            moving,
        })
    }

    /// Rebuilds a chunk from a snapshot. The chunk must be unloaded and
    /// never generated; restored objects go through the normal lifecycle so
    /// every derived structure is consistent.
    pub fn restore_chunk(&mut self, snapshot: &ChunkSnapshot) -> Result<()> {
        let pos = snapshot.pos;
        {
            let chunk = self.chunk(pos)?;
            if chunk.is_loaded() {
                return Err(WorldError::ChunkAlreadyLoaded(pos));
            }
        }
        let blocks = vec![None; snapshot.tiles.len()];
        self.chunk_mut(pos)?.load(snapshot.tiles.clone(), blocks)?;
        self.loaded.push(pos);
        for b in &snapshot.blocks {
            if let Some(id) = self.add_block(b.kind, b.tile, b.rotation)? {
                if let Some(block) = self.blocks.get_mut(&id) {
                    block.ticks = b.ticks;
                }
            }
        }
        for m in &snapshot.moving {
            if let Some(id) = self.add_moving(m.x_pixel, m.y_pixel, m.hitbox, m.kind)? {
                self.set_velocity(id, m.x_vel, m.y_vel)?;
            }
        }
        Ok(())
    }
}
