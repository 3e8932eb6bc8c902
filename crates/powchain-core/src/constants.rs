pub const HASH_SIZE: usize = 64;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const GENESIS_HASH: &str = "0";
pub const GENESIS_PREVIOUS_HASH: &str = "";
pub const DEFAULT_DIFFICULTY: usize = 4;
