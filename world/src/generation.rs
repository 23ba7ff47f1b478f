//! Deterministic initial layout: one portal, difficulty-scaled spawners and walls.

use std::collections::HashSet;

use bulwark_core::{CellCoord, Difficulty};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::{
    block::Block,
    config::WorldConfig,
    spawner::{Spawner, SpawnerError},
};

pub(crate) const RNG_STREAM_SIMULATION: &str = "simulation";
const RNG_STREAM_WALLS: &str = "walls";

/// Derives an independent seed for the stream named `label`.
pub(crate) fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Blocks of a freshly generated world, portal first, then spawners, then walls.
pub(crate) fn generate(
    config: &WorldConfig,
    difficulty: Difficulty,
    seed: u64,
) -> Result<Vec<Block>, SpawnerError> {
    let columns = config.columns as i32;
    let rows = config.rows as i32;
    let mut blocks = Vec::new();
    let mut reserved = HashSet::new();

    let portal = CellCoord::new(columns - 1, rows / 2);
    reserve_around(&mut reserved, portal);
    blocks.push(Block::portal(portal, config.portal_lives));

    let spawners = difficulty.spawner_count();
    for index in 0..spawners {
        let row = ((index + 1) as i32 * rows) / (spawners as i32 + 1);
        let cell = CellCoord::new(0, row.clamp(0, rows - 1));
        if !reserved.contains(&cell) {
            reserve_around(&mut reserved, cell);
            blocks.push(Block::spawner(cell, Spawner::new(difficulty, config)?));
        }
    }

    let mut free: Vec<CellCoord> = (0..rows)
        .flat_map(|row| (0..columns).map(move |column| CellCoord::new(column, row)))
        .filter(|cell| !reserved.contains(cell))
        .collect();
    let mut rng = ChaCha8Rng::seed_from_u64(derive_labeled_seed(seed, RNG_STREAM_WALLS));
    let walls = difficulty.wall_count().min(free.len());
    let (chosen, _) = free.partial_shuffle(&mut rng, walls);
    chosen.sort();
    for cell in chosen.iter() {
        blocks.push(Block::wall(
            *cell,
            None,
            config.wall_health,
            config.wall_height,
        ));
    }

    tracing::info!(
        ?difficulty,
        seed,
        spawners,
        walls,
        "generated world layout"
    );
    Ok(blocks)
}

fn reserve_around(reserved: &mut HashSet<CellCoord>, cell: CellCoord) {
    for rows in -1..=1 {
        for columns in -1..=1 {
            let _ = reserved.insert(cell.offset(columns, rows));
        }
    }
}
