use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A transfer queued for inclusion in the next block.
///
/// Amounts are kept as JSON numbers so integer and fractional values hash
/// exactly as they were submitted. No balance checks are made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Number,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: Number) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}
