use crate::constants::{GENESIS_HASH, GENESIS_PREVIOUS_HASH};
use crate::error::{ChainError, Result};
use crate::pow::MiningStats;
use crate::{Block, BlockData};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use tracing::{debug, info, warn};

/// Append-only sequence of mined blocks anchored by a genesis block.
///
/// Appended blocks are only handed out by shared reference. A chain rebuilt
/// from serialized form is untrusted until [`Blockchain::validate`] passes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Blockchain {
    difficulty: usize,
    blocks: Vec<Block>,
}

impl Blockchain {
    /// Start a chain holding only the genesis block. `difficulty` applies to
    /// every block mined afterwards.
    pub fn new(difficulty: usize) -> Self {
        let genesis = Block::genesis();
        debug!(difficulty, timestamp = %genesis.timestamp, "created genesis block");
        Self {
            difficulty,
            blocks: vec![genesis],
        }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn genesis(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Mine a block carrying `data` on top of the current tip and append it.
    /// Blocks the caller until a qualifying nonce is found.
    pub fn mine_block(&mut self, data: impl Into<BlockData>) -> Result<MiningStats> {
        self.append(data.into(), None)
    }

    pub fn mine_block_with_cancel(
        &mut self,
        data: impl Into<BlockData>,
        cancel: &AtomicBool,
    ) -> Result<MiningStats> {
        self.append(data.into(), Some(cancel))
    }

    fn append(&mut self, data: BlockData, cancel: Option<&AtomicBool>) -> Result<MiningStats> {
        let last = self.blocks.last().ok_or(ChainError::EmptyChain)?;
        let mut block = Block::new(last.hash.clone(), data);
        let stats = crate::pow::mine_block(&mut block, self.difficulty, cancel)?;

        info!(
            index = self.blocks.len(),
            nonce = block.proof_of_work,
            attempts = stats.attempts,
            hash = %block.hash,
            "mined block"
        );
        self.blocks.push(block);
        Ok(stats)
    }

    /// Check the genesis sentinel, then walk adjacent pairs and report the
    /// first broken link or hash mismatch. Empty and genesis-only chains pass.
    /// The genesis block itself is never hash-checked, and leading zeros are
    /// not re-verified.
    pub fn validate(&self) -> Result<()> {
        if let Some(genesis) = self.blocks.first() {
            if genesis.hash != GENESIS_HASH || genesis.previous_hash != GENESIS_PREVIOUS_HASH {
                warn!(hash = %genesis.hash, "first block is not the genesis sentinel");
                return Err(ChainError::InvalidGenesis);
            }
        }

        for (offset, pair) in self.blocks.windows(2).enumerate() {
            let index = offset + 1;
            let (prev, block) = (&pair[0], &pair[1]);

            if block.previous_hash != prev.hash {
                warn!(index, "previous hash does not match predecessor");
                return Err(ChainError::BrokenLink { index });
            }

            let recomputed = block.calculate_hash().map_err(|e| {
                warn!(index, error = %e, "block data cannot be hashed");
                e
            })?;
            if recomputed != block.hash {
                warn!(index, stored = %block.hash, %recomputed, "block hash mismatch");
                return Err(ChainError::HashMismatch { index });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
