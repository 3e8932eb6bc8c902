//! Error types for hashing, mining and chain verification.

use thiserror::Error;

/// Errors surfaced by block and chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The payload has no canonical byte form, so the block cannot be hashed.
    #[error("block data corrupted: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Append attempted on a chain that holds no blocks.
    #[error("chain has no blocks to extend")]
    EmptyChain,

    /// The requested prefix is longer than the hex digest itself.
    #[error("difficulty {difficulty} exceeds the {max} hex characters of a block hash")]
    UnreachableDifficulty { difficulty: usize, max: usize },

    /// Mining was stopped through its cancellation flag.
    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    /// The first block does not carry the genesis sentinel hashes.
    #[error("first block is not a genesis block")]
    InvalidGenesis,

    /// `blocks[index].previous_hash` does not match the hash of its predecessor.
    #[error("block {index} does not link to the hash of its predecessor")]
    BrokenLink { index: usize },

    /// The stored hash of `blocks[index]` differs from its recomputed hash.
    #[error("block {index} hash does not match its contents")]
    HashMismatch { index: usize },
}

pub type Result<T> = std::result::Result<T, ChainError>;
