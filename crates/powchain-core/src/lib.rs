pub mod chain;
pub mod constants;
pub mod error;

pub use chain::Blockchain;
pub use error::{ChainError, Result};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};
use std::sync::atomic::AtomicBool;

use crate::constants::{GENESIS_HASH, GENESIS_PREVIOUS_HASH};

/// Opaque block payload.
///
/// The bytes are never interpreted. Both the digest input and the JSON
/// export encode them as a lowercase hex string, so any byte sequence works.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockData(pub Vec<u8>);

impl BlockData {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical byte form fed into the block digest.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Serialize for BlockData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for BlockData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(&text).map(BlockData).map_err(de::Error::custom)
    }
}

impl From<Vec<u8>> for BlockData {
    fn from(bytes: Vec<u8>) -> Self {
        BlockData(bytes)
    }
}

impl From<&[u8]> for BlockData {
    fn from(bytes: &[u8]) -> Self {
        BlockData(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for BlockData {
    fn from(bytes: &[u8; N]) -> Self {
        BlockData(bytes.to_vec())
    }
}

impl From<String> for BlockData {
    fn from(text: String) -> Self {
        BlockData(text.into_bytes())
    }
}

impl From<&str> for BlockData {
    fn from(text: &str) -> Self {
        BlockData(text.as_bytes().to_vec())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub previous_hash: String,
    pub timestamp: DateTime<Utc>,
    pub proof_of_work: u64,
    pub data: BlockData,
}

impl Block {
    /// An unmined block stamped with the current time.
    pub fn new(previous_hash: impl Into<String>, data: impl Into<BlockData>) -> Self {
        Self::with_timestamp(previous_hash, data, Utc::now())
    }

    pub fn with_timestamp(
        previous_hash: impl Into<String>,
        data: impl Into<BlockData>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: String::new(),
            previous_hash: previous_hash.into(),
            timestamp,
            proof_of_work: 0,
            data: data.into(),
        }
    }

    /// The sentinel first block. It carries a fixed hash and is never mined.
    pub fn genesis() -> Self {
        Self {
            hash: GENESIS_HASH.to_string(),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            timestamp: Utc::now(),
            proof_of_work: 0,
            data: BlockData::default(),
        }
    }

    /// Stable textual form of the timestamp used as digest input.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Digest input for the given nonce: previous hash, payload, timestamp, nonce.
    pub fn hash_bytes(&self, nonce: u64) -> Result<Vec<u8>> {
        let data = self.data.canonical_bytes()?;
        let timestamp = self.timestamp_text();
        let nonce = nonce.to_string();

        let mut bytes =
            Vec::with_capacity(self.previous_hash.len() + data.len() + timestamp.len() + nonce.len());
        bytes.extend_from_slice(self.previous_hash.as_bytes());
        bytes.extend_from_slice(&data);
        bytes.extend_from_slice(timestamp.as_bytes());
        bytes.extend_from_slice(nonce.as_bytes());
        Ok(bytes)
    }

    pub(crate) fn hash_with_nonce(&self, nonce: u64) -> Result<String> {
        let mut hasher = Sha512::new();
        hasher.update(self.hash_bytes(nonce)?);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Recompute the hash from the committed fields, ignoring the stored `hash`.
    pub fn calculate_hash(&self) -> Result<String> {
        self.hash_with_nonce(self.proof_of_work)
    }

    /// Search nonces until the hash starts with `difficulty` zeros.
    pub fn mine(&mut self, difficulty: usize) -> Result<pow::MiningStats> {
        pow::mine_block(self, difficulty, None)
    }

    /// Like [`Block::mine`], giving up once `cancel` is set.
    pub fn mine_with_cancel(
        &mut self,
        difficulty: usize,
        cancel: &AtomicBool,
    ) -> Result<pow::MiningStats> {
        pow::mine_block(self, difficulty, Some(cancel))
    }

    /// True when the stored hash matches the block contents.
    pub fn is_valid(&self) -> bool {
        matches!(self.calculate_hash(), Ok(hash) if hash == self.hash)
    }
}

pub mod pow {
    use super::Block;
    use crate::constants::HASH_HEX_SIZE;
    use crate::error::{ChainError, Result};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};
    use tracing::debug;

    /// Outcome of a successful nonce search.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct MiningStats {
        /// Number of full hash evaluations performed.
        pub attempts: u64,
        pub elapsed: Duration,
    }

    impl MiningStats {
        pub fn hash_rate(&self) -> f64 {
            let secs = self.elapsed.as_secs_f64();
            if secs > 0.0 {
                self.attempts as f64 / secs
            } else {
                self.attempts as f64
            }
        }
    }

    /// The prefix a hash must carry at the given difficulty.
    pub fn difficulty_prefix(difficulty: usize) -> String {
        "0".repeat(difficulty)
    }

    pub fn count_leading_zeros(hash: &str) -> usize {
        hash.bytes().take_while(|b| *b == b'0').count()
    }

    pub fn hash_meets_difficulty(hash: &str, difficulty: usize) -> bool {
        count_leading_zeros(hash) >= difficulty
    }

    /// Increment the nonce from its current value until the block hash has at
    /// least `difficulty` leading zeros. Each attempt rehashes the whole block.
    ///
    /// The block is only written once a qualifying hash is found, so an error
    /// or cancellation leaves it untouched.
    pub fn mine_block(
        block: &mut Block,
        difficulty: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<MiningStats> {
        if difficulty > HASH_HEX_SIZE {
            return Err(ChainError::UnreachableDifficulty {
                difficulty,
                max: HASH_HEX_SIZE,
            });
        }

        let started = Instant::now();
        let mut nonce = block.proof_of_work;
        let mut attempts = 0u64;
        loop {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(ChainError::Cancelled { attempts });
            }

            let hash = block.hash_with_nonce(nonce)?;
            attempts += 1;

            if hash_meets_difficulty(&hash, difficulty) {
                debug!(nonce, attempts, difficulty, "found qualifying hash");
                block.proof_of_work = nonce;
                block.hash = hash;
                return Ok(MiningStats {
                    attempts,
                    elapsed: started.elapsed(),
                });
            }
            nonce = nonce.wrapping_add(1);
        }
    }
}
