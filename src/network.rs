//! Resource-node attachment maintenance.
//!
//! Attachments are derived state, re-derived from scratch on every add or
//! remove in a node's 4-neighborhood. Two nodes attach when they sit on
//! adjacent tiles, face each other (opposite directions across the shared
//! edge), and carry the same category. The relation is symmetric by
//! construction.

use crate::error::{Result, WorldError};
use crate::geometry::Direction;
use crate::types::{NodeId, TilePos};
use crate::world::World;

impl World {
    /// All resource nodes anchored at a tile, across categories. Out-of-bounds
    /// tiles have none.
    pub fn nodes_at(&mut self, tile: TilePos) -> Result<Vec<NodeId>> {
        let pos = tile.chunk();
        match self.ensure_loaded(pos) {
            Err(WorldError::OutOfBounds(_)) => return Ok(Vec::new()),
            other => other?,
        }
        let data = self.chunk(pos)?.data()?;
        let mut out = Vec::new();
        for list in &data.resource_nodes {
            for id in list {
                if self.nodes.get(id).map(|n| n.tile) == Some(tile) {
                    out.push(*id);
                }
            }
        }
        Ok(out)
    }

    /// A node at a tile facing a given direction, if any. Edges can host
    /// nodes of several categories; callers needing a specific one filter
    /// further.
    pub fn node_at(&mut self, tile: TilePos, dir: Direction) -> Result<Option<NodeId>> {
        Ok(self
            .nodes_at(tile)?
            .into_iter()
            .find(|id| self.nodes.get(id).map(|n| n.dir) == Some(dir)))
    }

    /// Re-derives one node's attachment list: same-category nodes on the
    /// faced tile whose direction points back.
    pub fn update_attachments(&mut self, id: NodeId) -> Result<()> {
        let (facing, dir, category) = {
            let node = self.nodes.get(&id).ok_or(WorldError::StaleId {
                kind: "node",
                id: id.0,
            })?;
            (node.facing_tile(), node.dir, node.category)
        };
        let wanted = dir.opposite();
        let attached: Vec<NodeId> = self
            .nodes_at(facing)?
            .into_iter()
            .filter(|other| {
                self.nodes
                    .get(other)
                    .map(|n| n.dir == wanted && n.category == category)
                    .unwrap_or(false)
            })
            .collect();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.attached_nodes = attached;
        }
        Ok(())
    }

    /// Recomputes attachments for every node at a tile and its four axis
    /// neighbors. Called after any node add or remove at `tile`.
    pub fn recompute_attachments_around(&mut self, tile: TilePos) -> Result<()> {
        let neighborhood = [
            tile,
            tile.offset(0, 1),
            tile.offset(1, 0),
            tile.offset(0, -1),
            tile.offset(-1, 0),
        ];
        for t in neighborhood {
            for id in self.nodes_at(t)? {
                self.update_attachments(id)?;
            }
        }
        Ok(())
    }

    /// A node's current attachments. Derived state; valid until the next
    /// add/remove in the neighborhood.
    pub fn attached_nodes(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.attached_nodes)
    }
}
