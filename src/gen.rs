//! Terrain generation hook.
//!
//! The world never generates terrain itself; it calls a [`ChunkGenerator`]
//! exactly once per chunk, on the chunk's first load. Implementations must be
//! pure functions of the seed and the chunk coordinate so a world is fully
//! determined by its config.

use crate::object::{BlockKind, Tile, TileKind};
use crate::types::{ChunkPos, CHUNK_AREA_TILES, CHUNK_SIZE_TILES};
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ---------------------------------------------------------------------------
// Generator trait
// ---------------------------------------------------------------------------

pub trait ChunkGenerator {
    /// Row-major tile array for one chunk, `CHUNK_AREA_TILES` entries.
    fn gen_tiles(&self, chunk: ChunkPos) -> Vec<Tile>;

    /// Natural block kinds per cell, aligned with `gen_tiles` output.
    /// Generated blocks must fit a single cell; multi-cell structures are
    /// placed through the lifecycle layer only.
    fn gen_blocks(&self, chunk: ChunkPos, tiles: &[Tile]) -> Vec<Option<BlockKind>>;
}

/// Derives a stream-specific sub-seed. Same multiplier-offset scheme the rest
/// of the codebase uses for per-purpose seeding.
fn derive_seed(seed: u64, stream: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005).wrapping_add(stream)
}

// ---------------------------------------------------------------------------
// SimplexGenerator
// ---------------------------------------------------------------------------

/// Noise-backed terrain: a base layer picks grass/sand/stone, and one
/// independent noise field per ore kind carves patches above a threshold.
pub struct SimplexGenerator {
    seed: u64,
    base: Perlin,
    iron: Perlin,
    copper: Perlin,
}

const BASE_FREQ: f64 = 0.02;
const ORE_FREQ: f64 = 0.06;
const ORE_THRESHOLD: f64 = 0.58;
const ROCK_CHANCE: f64 = 0.03;

impl SimplexGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            base: Perlin::new(derive_seed(seed, 1) as u32),
            iron: Perlin::new(derive_seed(seed, 2) as u32),
            copper: Perlin::new(derive_seed(seed, 3) as u32),
        }
    }

    fn base_tile(&self, x: i32, y: i32) -> TileKind {
        let v = self
            .base
            .get([x as f64 * BASE_FREQ, y as f64 * BASE_FREQ]);
        if v < -0.35 {
            TileKind::Sand
        } else if v > 0.45 {
            TileKind::Stone
        } else {
            TileKind::Grass
        }
    }

    fn ore_tile(&self, x: i32, y: i32) -> Option<TileKind> {
        let p = [x as f64 * ORE_FREQ, y as f64 * ORE_FREQ];
        if self.iron.get(p) > ORE_THRESHOLD {
            Some(TileKind::IronOre)
        } else if self.copper.get(p) > ORE_THRESHOLD {
            Some(TileKind::CopperOre)
        } else {
            None
        }
    }
}

impl ChunkGenerator for SimplexGenerator {
    fn gen_tiles(&self, chunk: ChunkPos) -> Vec<Tile> {
        let origin = chunk.origin_tile();
        let mut tiles = Vec::with_capacity(CHUNK_AREA_TILES);
        for y in 0..CHUNK_SIZE_TILES {
            for x in 0..CHUNK_SIZE_TILES {
                let (tx, ty) = (origin.x + x, origin.y + y);
                let kind = self.ore_tile(tx, ty).unwrap_or_else(|| self.base_tile(tx, ty));
                tiles.push(Tile::new(kind));
            }
        }
        tiles
    }

    fn gen_blocks(&self, chunk: ChunkPos, tiles: &[Tile]) -> Vec<Option<BlockKind>> {
        // Chunk-local rng stream keyed by coordinate, so chunks generate the
        // same rocks regardless of load order.
        let stream = ((chunk.x as u64) << 32) ^ (chunk.y as u64 & 0xffff_ffff);
        let mut rng = StdRng::seed_from_u64(derive_seed(self.seed, stream ^ 0x524f_434b));
        tiles
            .iter()
            .map(|tile| {
                if tile.kind == TileKind::Stone && rng.gen_bool(ROCK_CHANCE) {
                    Some(BlockKind::Rock)
                } else {
                    None
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FlatGenerator
// ---------------------------------------------------------------------------

/// All grass, no blocks. The test generator.
pub struct FlatGenerator;

impl ChunkGenerator for FlatGenerator {
    fn gen_tiles(&self, _chunk: ChunkPos) -> Vec<Tile> {
        vec![Tile::new(TileKind::Grass); CHUNK_AREA_TILES]
    }

    fn gen_blocks(&self, _chunk: ChunkPos, _tiles: &[Tile]) -> Vec<Option<BlockKind>> {
        vec![None; CHUNK_AREA_TILES]
    }
}
