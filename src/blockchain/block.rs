use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

use super::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::transaction::Transaction;

/// Ordered blocks, genesis first.
pub type Chain = Vec<Block>;

/// A single block in the chain holding the transactions drained from the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,     // 1-based position in the chain
    pub timestamp: f64, // seconds since the Unix epoch
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        Self {
            index: 1,
            timestamp: now_timestamp(),
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        }
    }

    /// SHA-256 of the block's canonical JSON form, hex-encoded.
    ///
    /// Object keys are emitted in lexicographic order at every level, so the
    /// digest only depends on field values and transaction order.
    pub fn digest(&self) -> String {
        let preimage = self.canonical_json().to_string();
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn canonical_json(&self) -> Value {
        let transactions = self
            .transactions
            .iter()
            .map(|tx| {
                sorted_object(vec![
                    ("amount", Value::Number(tx.amount.clone())),
                    ("recipient", Value::String(tx.recipient.clone())),
                    ("sender", Value::String(tx.sender.clone())),
                ])
            })
            .collect();

        let timestamp = Number::from_f64(self.timestamp)
            .map(Value::Number)
            .unwrap_or(Value::Null);

        sorted_object(vec![
            ("index", Value::from(self.index)),
            ("previous_hash", Value::String(self.previous_hash.clone())),
            ("proof", Value::from(self.proof)),
            ("timestamp", timestamp),
            ("transactions", Value::Array(transactions)),
        ])
    }
}

/// Build a JSON object whose insertion order is also its key order, so the
/// rendering is identical whichever map backend serde_json was built with.
fn sorted_object(mut fields: Vec<(&str, Value)>) -> Value {
    fields.sort_by(|a, b| a.0.cmp(b.0));
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key.to_string(), value);
    }
    Value::Object(map)
}

/// Current wall-clock time as fractional seconds since the epoch.
pub fn now_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
