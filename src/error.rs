//! Error taxonomy for the world core.
//!
//! Placement failures are *not* errors: `add_*` operations report them in
//! their return value and leave no partial state. Everything here signals a
//! caller-side invariant violation or an out-of-bounds lookup.

use crate::types::ChunkPos;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// A chunk coordinate (or the tile/pixel that resolved to it) lies outside
    /// the world. Out-of-bounds lookups are rejected, never wrapped.
    #[error("chunk {0} is outside the world bounds")]
    OutOfBounds(ChunkPos),

    /// `load` was called on a chunk that is already loaded.
    #[error("chunk {0} is already loaded")]
    ChunkAlreadyLoaded(ChunkPos),

    /// Live chunk data was requested from an unloaded chunk.
    #[error("chunk {0} is not loaded")]
    ChunkNotLoaded(ChunkPos),

    /// The operation requires a real world, but this is the zero-size
    /// placeholder created by [`World::detached`](crate::world::World::detached).
    #[error("operation attempted on a detached placeholder world")]
    DetachedWorld,

    /// World dimensions were not positive multiples of the chunk size.
    #[error("invalid world config: {0}")]
    InvalidConfig(&'static str),

    /// An id referred to an object that no longer exists in the world's stores.
    #[error("stale {kind} id {id}")]
    StaleId { kind: &'static str, id: u64 },
}

pub type Result<T> = std::result::Result<T, WorldError>;
