//! Collision queries over blocks and moving objects.
//!
//! All queries work in pixel space and load the chunks they touch. Zero-size
//! rectangles degrade to point containment (see [`Rect::intersects`]), which
//! is what the point queries build on. Objects with [`Hitbox::NONE`] never
//! participate.

use crate::error::Result;
use crate::geometry::{Hitbox, Rect};
use crate::object::Block;
use crate::types::{BlockId, MovingId, TilePos, TILE_PIXEL_EXP, TILE_SIZE_PIXELS};
use crate::world::World;

/// What a combined collision query hit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collider {
    Block(BlockId),
    Moving(MovingId),
    /// The query rectangle reaches outside the world.
    WorldEdge,
}

impl World {
    fn pixel_bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.config.width_tiles * TILE_SIZE_PIXELS,
            self.config.height_tiles * TILE_SIZE_PIXELS,
        )
    }

    // -----------------------------------------------------------------------
    // Block queries
    // -----------------------------------------------------------------------

    /// First block whose hitbox intersects the anchored query hitbox and
    /// satisfies the predicate. Scans the tile cells the query rectangle
    /// covers; footprint back-references make this a few array lookups.
    pub fn block_collision<F>(
        &mut self,
        hitbox: Hitbox,
        x_pixel: i32,
        y_pixel: i32,
        pred: F,
    ) -> Result<Option<BlockId>>
    where
        F: Fn(&Block) -> bool,
    {
        if hitbox.is_none() {
            return Ok(None);
        }
        let rect = hitbox.at(x_pixel, y_pixel);
        let tx0 = (rect.x >> TILE_PIXEL_EXP).max(0);
        let ty0 = (rect.y >> TILE_PIXEL_EXP).max(0);
        let tx1 = ((rect.x + (rect.width - 1).max(0)) >> TILE_PIXEL_EXP)
            .min(self.config.width_tiles - 1);
        let ty1 = ((rect.y + (rect.height - 1).max(0)) >> TILE_PIXEL_EXP)
            .min(self.config.height_tiles - 1);
        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                let tile = TilePos::new(tx, ty);
                let Some(block) = self.block_at(tile)? else {
                    continue;
                };
                if block.rect().intersects(&rect) && pred(block) {
                    return Ok(Some(block.id));
                }
            }
        }
        Ok(None)
    }

    /// First block whose placement footprint overlaps the given base
    /// rectangle of tile cells. This is the placement query: it tests cell
    /// occupancy, not hitboxes, so hitbox-less blocks still exclude others.
    pub fn footprint_collision(
        &mut self,
        tile: TilePos,
        width_tiles: i32,
        height_tiles: i32,
        exclude: Option<BlockId>,
    ) -> Result<Option<BlockId>> {
        for dy in 0..height_tiles {
            for dx in 0..width_tiles {
                let cell = tile.offset(dx, dy);
                if let Some(block) = self.block_at(cell)? {
                    if Some(block.id) != exclude {
                        return Ok(Some(block.id));
                    }
                }
            }
        }
        Ok(None)
    }

    // -----------------------------------------------------------------------
    // Moving-object queries
    // -----------------------------------------------------------------------

    /// First moving object whose hitbox intersects the rectangle. Consults
    /// both the owned and the boundary list of every covered chunk, so
    /// straddling movers are found from either side.
    pub fn moving_collision(
        &mut self,
        rect: &Rect,
        exclude: Option<MovingId>,
    ) -> Result<Option<MovingId>> {
        let chunks = self.chunks_in_rect(rect);
        let mut candidates: Vec<MovingId> = Vec::new();
        for &pos in &chunks {
            self.ensure_loaded(pos)?;
            let data = self.chunk(pos)?.data()?;
            for id in data.moving.iter().chain(data.moving_on_boundary.iter()) {
                if Some(*id) != exclude && !candidates.contains(id) {
                    candidates.push(*id);
                }
            }
        }
        for id in candidates {
            let Some(mover) = self.movers.get(&id) else {
                continue;
            };
            if mover.hitbox.is_none() {
                continue;
            }
            if mover.rect().intersects(rect) {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// The moving object exactly at a pixel, if any.
    pub fn moving_at_point(&mut self, x_pixel: i32, y_pixel: i32) -> Result<Option<MovingId>> {
        self.moving_collision(&Rect::new(x_pixel, y_pixel, 0, 0), None)
    }

    /// Combined query: movers first, then blocks, then the world edge.
    /// `exclude` keeps an object from colliding with itself during movement.
    pub fn collision(
        &mut self,
        hitbox: Hitbox,
        x_pixel: i32,
        y_pixel: i32,
        exclude: Option<MovingId>,
    ) -> Result<Option<Collider>> {
        if hitbox.is_none() {
            return Ok(None);
        }
        let rect = hitbox.at(x_pixel, y_pixel);
        if !self.pixel_bounds().contains(&rect) {
            return Ok(Some(Collider::WorldEdge));
        }
        if let Some(id) = self.moving_collision(&rect, exclude)? {
            return Ok(Some(Collider::Moving(id)));
        }
        if let Some(id) = self.block_collision(hitbox, x_pixel, y_pixel, |_| true)? {
            return Ok(Some(Collider::Block(id)));
        }
        Ok(None)
    }

    /// Dropped-item stacks whose hitbox touches the square of the given
    /// radius around a pixel. Used for merge-on-drop.
    pub fn dropped_items_in_radius(
        &mut self,
        x_pixel: i32,
        y_pixel: i32,
        radius: i32,
    ) -> Result<Vec<MovingId>> {
        let rect = Rect::new(x_pixel - radius, y_pixel - radius, 2 * radius, 2 * radius);
        let chunks = self.chunks_in_rect(&rect);
        let mut out = Vec::new();
        for &pos in &chunks {
            self.ensure_loaded(pos)?;
            let data = self.chunk(pos)?.data()?;
            for id in data.dropped_items.iter() {
                let Some(item) = self.movers.get(id) else {
                    continue;
                };
                if item.rect().intersects(&rect) && !out.contains(id) {
                    out.push(*id);
                }
            }
        }
        Ok(out)
    }
}
