pub mod block;
pub mod consensus;
pub mod ledger;
pub mod pow;

pub use block::{Block, Chain};
pub use ledger::Ledger;

/// Proof stored in the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// `previous_hash` of the genesis block, which has no real predecessor.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// A proof is accepted when its hex hash starts with this prefix.
pub const POW_PREFIX: &str = "0000";

/// Sender recorded on the reward transaction of a mined block.
pub const REWARD_SENDER: &str = "0";

/// Amount paid to the miner of each block.
pub const MINING_REWARD: u64 = 1;
