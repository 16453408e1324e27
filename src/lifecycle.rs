//! Object lifecycle: the add/remove state machines and moving-object chunk
//! migration.
//!
//! Placement failures are outcomes, not errors: `add_block` answers
//! `Ok(None)` and `spawn_dropped_item` answers `Ok(DropOutcome::Blocked)`
//! with no partial state either way. Removal is idempotent and answers
//! whether anything was removed.

use log::debug;

use crate::error::{Result, WorldError};
use crate::geometry::{Direction, Hitbox};
use crate::object::{
    Block, BlockKind, ItemKind, MovingKind, MovingObject, ResourceCategory, ResourceNode,
    UpdateRef,
};
use crate::types::{BlockId, ChunkPos, ContainerId, MovingId, NodeId, TilePos};
use crate::world::World;

/// How a dropped-item spawn resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The whole quantity merged into an existing stack.
    Merged(MovingId),
    /// A new stack was placed (possibly after topping up an existing one).
    Spawned(MovingId),
    /// No room: a collider occupies the drop point and no stack could absorb
    /// everything. Nothing changed.
    Blocked,
}

impl World {
    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    /// Places a block if its whole footprint is free. All-or-nothing: on
    /// `Ok(None)` no cell has been touched.
    pub fn add_block(
        &mut self,
        kind: BlockKind,
        tile: TilePos,
        rotation: u8,
    ) -> Result<Option<BlockId>> {
        let (w, h) = (kind.width_tiles(), kind.height_tiles());
        if self.footprint_collision(tile, w, h, None)?.is_some() {
            return Ok(None);
        }
        let id = BlockId(self.mint_id());
        let mut block = Block::new(id, tile, kind, rotation);
        block.in_world = true;
        let cells: Vec<TilePos> = block.footprint().collect();
        self.blocks.insert(id, block);
        for cell in cells {
            let pos = cell.chunk();
            self.ensure_loaded(pos)?;
            let chunk = self.chunk_mut(pos)?;
            let i = chunk.cell_index(cell);
            chunk.data_mut()?.blocks[i] = Some(id);
        }
        if kind.requires_update() {
            let pos = tile.chunk();
            self.chunk_mut(pos)?
                .data_mut()?
                .updates_required
                .add(UpdateRef::Block(id));
        }
        debug!("placed {kind:?} {id} at {tile}");
        Ok(Some(id))
    }

    /// Removes a block and clears its footprint. `Ok(false)` if the id is
    /// already gone.
    pub fn remove_block(&mut self, id: BlockId) -> Result<bool> {
        let Some(block) = self.blocks.remove(&id) else {
            return Ok(false);
        };
        let cells: Vec<TilePos> = block.footprint().collect();
        for cell in cells {
            let pos = cell.chunk();
            self.ensure_loaded(pos)?;
            let chunk = self.chunk_mut(pos)?;
            let i = chunk.cell_index(cell);
            chunk.data_mut()?.blocks[i] = None;
        }
        if block.kind.requires_update() {
            let pos = block.tile.chunk();
            self.chunk_mut(pos)?
                .data_mut()?
                .updates_required
                .remove(&UpdateRef::Block(id));
        }
        debug!("removed {} at {}", id, block.tile);
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Moving objects
    // -----------------------------------------------------------------------

    /// Spawns a moving object if nothing collides at the spawn point.
    pub fn add_moving(
        &mut self,
        x_pixel: i32,
        y_pixel: i32,
        hitbox: Hitbox,
        kind: MovingKind,
    ) -> Result<Option<MovingId>> {
        if self.collision(hitbox, x_pixel, y_pixel, None)?.is_some() {
            return Ok(None);
        }
        let id = MovingId(self.mint_id());
        let mut mover = MovingObject::new(id, x_pixel, y_pixel, hitbox, kind);
        mover.in_world = true;
        let owner = mover.chunk();
        self.movers.insert(id, mover);
        self.ensure_loaded(owner)?;
        let data = self.chunk_mut(owner)?.data_mut()?;
        data.moving.add(id);
        if kind.is_dropped_item() {
            data.dropped_items.add(id);
        }
        data.updates_required.add(UpdateRef::Moving(id));
        self.refresh_boundary(id)?;
        debug!("spawned {id} at ({x_pixel},{y_pixel})");
        Ok(Some(id))
    }

    /// Convenience spawn for a standard unit.
    pub fn spawn_unit(&mut self, x_pixel: i32, y_pixel: i32) -> Result<Option<MovingId>> {
        self.add_moving(x_pixel, y_pixel, Hitbox::STANDARD_UNIT, MovingKind::Unit)
    }

    /// Drops an item stack, merging into nearby same-kind stacks first.
    ///
    /// Merge picks the largest non-full stack of the same kind within the
    /// pickup radius. If it absorbs everything no new object is created; if a
    /// remainder would need a new stack, the drop point is collision-checked
    /// *before* any stack is touched, so a blocked drop changes nothing.
    pub fn spawn_dropped_item(
        &mut self,
        item: ItemKind,
        quantity: u32,
        x_pixel: i32,
        y_pixel: i32,
    ) -> Result<DropOutcome> {
        let radius = self.config.pickup_radius;
        let nearby = self.dropped_items_in_radius(x_pixel, y_pixel, radius)?;
        let target = nearby
            .into_iter()
            .filter_map(|id| {
                let m = self.movers.get(&id)?;
                match m.kind {
                    MovingKind::DroppedItem { item: i, quantity: q }
                        if i == item && q < item.max_stack() =>
                    {
                        Some((id, q))
                    }
                    _ => None,
                }
            })
            .max_by_key(|(_, q)| *q);

        if let Some((target_id, have)) = target {
            let room = item.max_stack() - have;
            if quantity <= room {
                self.set_item_quantity(target_id, have + quantity)?;
                return Ok(DropOutcome::Merged(target_id));
            }
            // Remainder needs a fresh stack; verify the drop point first.
            if self
                .collision(Hitbox::DROPPED_ITEM, x_pixel, y_pixel, None)?
                .is_some()
            {
                return Ok(DropOutcome::Blocked);
            }
            self.set_item_quantity(target_id, item.max_stack())?;
            let spawned = self.add_moving(
                x_pixel,
                y_pixel,
                Hitbox::DROPPED_ITEM,
                MovingKind::DroppedItem {
                    item,
                    quantity: quantity - room,
                },
            )?;
            // The point was just checked free.
            return Ok(match spawned {
                Some(id) => DropOutcome::Spawned(id),
                None => DropOutcome::Blocked,
            });
        }

        match self.add_moving(
            x_pixel,
            y_pixel,
            Hitbox::DROPPED_ITEM,
            MovingKind::DroppedItem { item, quantity },
        )? {
            Some(id) => Ok(DropOutcome::Spawned(id)),
            None => Ok(DropOutcome::Blocked),
        }
    }

    fn set_item_quantity(&mut self, id: MovingId, quantity: u32) -> Result<()> {
        let mover = self.movers.get_mut(&id).ok_or(WorldError::StaleId {
            kind: "moving",
            id: id.0,
        })?;
        match &mut mover.kind {
            MovingKind::DroppedItem { quantity: q, .. } => {
                *q = quantity;
                Ok(())
            }
            MovingKind::Unit => Err(WorldError::StaleId {
                kind: "dropped item",
                id: id.0,
            }),
        }
    }

    /// Removes a moving object from its chunks and the store. `Ok(false)` if
    /// the id is already gone.
    pub fn remove_moving(&mut self, id: MovingId) -> Result<bool> {
        let Some(mover) = self.movers.remove(&id) else {
            return Ok(false);
        };
        let owner = mover.chunk();
        if self.in_bounds(owner) && self.chunk(owner)?.is_loaded() {
            let data = self.chunk_mut(owner)?.data_mut()?;
            data.moving.remove(&id);
            data.dropped_items.remove(&id);
            data.updates_required.remove(&UpdateRef::Moving(id));
        }
        for pos in mover.boundary_chunks {
            if self.in_bounds(pos) && self.chunk(pos)?.is_loaded() {
                self.chunk_mut(pos)?
                    .data_mut()?
                    .moving_on_boundary
                    .remove(&id);
            }
        }
        debug!("removed {id}");
        Ok(true)
    }

    /// Sets velocity (clamped) and re-queues the object for updates if it
    /// was resting.
    pub fn set_velocity(&mut self, id: MovingId, x_vel: i32, y_vel: i32) -> Result<()> {
        let mover = self.movers.get_mut(&id).ok_or(WorldError::StaleId {
            kind: "moving",
            id: id.0,
        })?;
        mover.x_vel = MovingObject::clamp_speed(x_vel);
        mover.y_vel = MovingObject::clamp_speed(y_vel);
        if x_vel != 0 || y_vel != 0 {
            self.set_requires_update(id, true)?;
        }
        Ok(())
    }

    /// Adds or removes the object's update-queue registration in its owning
    /// chunk.
    pub fn set_requires_update(&mut self, id: MovingId, on: bool) -> Result<()> {
        let mover = self.movers.get_mut(&id).ok_or(WorldError::StaleId {
            kind: "moving",
            id: id.0,
        })?;
        if mover.requires_update == on {
            return Ok(());
        }
        mover.requires_update = on;
        let owner = mover.chunk();
        let data = self.chunk_mut(owner)?.data_mut()?;
        if on {
            data.updates_required.add(UpdateRef::Moving(id));
        } else {
            data.updates_required.remove(&UpdateRef::Moving(id));
        }
        Ok(())
    }

    /// Moves a moving object to a new pixel position, migrating chunk
    /// ownership and boundary registrations as needed.
    pub fn set_position(&mut self, id: MovingId, x_pixel: i32, y_pixel: i32) -> Result<()> {
        let (old_owner, requires_update, is_item) = {
            let mover = self.movers.get_mut(&id).ok_or(WorldError::StaleId {
                kind: "moving",
                id: id.0,
            })?;
            let old = mover.chunk();
            mover.x_pixel = x_pixel;
            mover.y_pixel = y_pixel;
            (old, mover.requires_update, mover.kind.is_dropped_item())
        };
        let new_owner = TilePos::from_pixel(x_pixel, y_pixel).chunk();
        if new_owner != old_owner {
            self.migrate_owner(id, old_owner, new_owner, requires_update, is_item)?;
        }
        self.refresh_boundary(id)
    }

    fn migrate_owner(
        &mut self,
        id: MovingId,
        old: ChunkPos,
        new: ChunkPos,
        requires_update: bool,
        is_item: bool,
    ) -> Result<()> {
        if self.in_bounds(old) && self.chunk(old)?.is_loaded() {
            let data = self.chunk_mut(old)?.data_mut()?;
            data.moving.remove(&id);
            data.dropped_items.remove(&id);
            data.updates_required.remove(&UpdateRef::Moving(id));
        }
        self.ensure_loaded(new)?;
        let data = self.chunk_mut(new)?.data_mut()?;
        data.moving.add(id);
        if is_item {
            data.dropped_items.add(id);
        }
        if requires_update {
            data.updates_required.add(UpdateRef::Moving(id));
        }
        debug!("{id} migrated {old} -> {new}");
        Ok(())
    }

    /// Re-derives the boundary-chunk set: every chunk other than the owner
    /// that the hitbox overlaps. Registrations are diffed, not rebuilt.
    pub(crate) fn refresh_boundary(&mut self, id: MovingId) -> Result<()> {
        let (owner, rect, old, has_hitbox) = {
            let mover = self.movers.get(&id).ok_or(WorldError::StaleId {
                kind: "moving",
                id: id.0,
            })?;
            (
                mover.chunk(),
                mover.rect(),
                mover.boundary_chunks.clone(),
                !mover.hitbox.is_none(),
            )
        };
        let new: Vec<ChunkPos> = if has_hitbox {
            self.chunks_in_rect(&rect)
                .into_iter()
                .filter(|p| *p != owner)
                .collect()
        } else {
            Vec::new()
        };
        for pos in &old {
            if !new.contains(pos) && self.in_bounds(*pos) && self.chunk(*pos)?.is_loaded() {
                self.chunk_mut(*pos)?
                    .data_mut()?
                    .moving_on_boundary
                    .remove(&id);
            }
        }
        for pos in &new {
            if !old.contains(pos) {
                self.ensure_loaded(*pos)?;
                self.chunk_mut(*pos)?
                    .data_mut()?
                    .moving_on_boundary
                    .add(id);
            }
        }
        if let Some(mover) = self.movers.get_mut(&id) {
            mover.boundary_chunks = new;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Resource nodes
    // -----------------------------------------------------------------------

    /// Adds a resource node at a tile edge. An identical node (same
    /// direction, category, and container) is returned unchanged instead of
    /// duplicated; nodes differing in category or container share the edge
    /// untouched. Attachments in the 4-neighborhood are recomputed on every
    /// real add.
    pub fn add_resource_node(
        &mut self,
        tile: TilePos,
        dir: Direction,
        category: ResourceCategory,
        container: ContainerId,
    ) -> Result<NodeId> {
        let existing = self.nodes_at(tile)?.into_iter().find(|id| {
            self.nodes
                .get(id)
                .map(|n| n.dir == dir && n.category == category && n.container == container)
                .unwrap_or(false)
        });
        if let Some(existing) = existing {
            return Ok(existing);
        }
        let id = NodeId(self.mint_id());
        let mut node = ResourceNode::new(id, tile, dir, category, container);
        node.in_world = true;
        self.nodes.insert(id, node);
        let pos = tile.chunk();
        self.ensure_loaded(pos)?;
        self.chunk_mut(pos)?.data_mut()?.resource_nodes[category.index()].push(id);
        self.recompute_attachments_around(tile)?;
        debug!("added node {id} at {tile} facing {dir}");
        Ok(id)
    }

    /// Removes a node and recomputes attachments around it. `Ok(false)` if
    /// the id is already gone.
    pub fn remove_resource_node(&mut self, id: NodeId) -> Result<bool> {
        let Some(node) = self.nodes.remove(&id) else {
            return Ok(false);
        };
        let pos = node.tile.chunk();
        if self.in_bounds(pos) && self.chunk(pos)?.is_loaded() {
            self.chunk_mut(pos)?.data_mut()?.resource_nodes[node.category.index()]
                .retain(|n| *n != id);
        }
        self.recompute_attachments_around(node.tile)?;
        debug!("removed node {id} at {}", node.tile);
        Ok(true)
    }
}
