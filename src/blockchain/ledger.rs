use log::debug;
use serde_json::Number;

use super::pow::{self, CancelToken};
use super::{Block, Chain};
use crate::error::NodeError;
use crate::transaction::Transaction;

/// In-memory chain plus the pool of transactions waiting for the next block.
#[derive(Debug)]
pub struct Ledger {
    chain: Chain,
    pending: Vec<Transaction>,
    tip_token: CancelToken,
}

impl Ledger {
    /// Initialize a new ledger with a genesis block.
    pub fn new() -> Self {
        Self {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
            tip_token: CancelToken::new(),
        }
    }

    /// Append a block sealing every pending transaction.
    ///
    /// When `previous_hash` is `None` or empty the digest of the current tip
    /// is used.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = match previous_hash.filter(|hash| !hash.is_empty()) {
            Some(hash) => hash,
            None => self.chain.last().map(Block::digest).unwrap_or_default(),
        };
        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: super::block::now_timestamp(),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        debug!(
            "LEDGER - appended block #{} with {} txs",
            block.index,
            block.transactions.len()
        );
        self.chain.push(block);
        self.rotate_tip_token();
        &self.chain[self.chain.len() - 1]
    }

    /// Queue a transaction and return the index of the block that will hold it.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Number,
    ) -> u64 {
        self.pending.push(Transaction::new(sender, recipient, amount));
        self.chain.len() as u64 + 1
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> Result<&Block, NodeError> {
        self.chain.last().ok_or(NodeError::EmptyChain)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Token cancelled as soon as the tip moves; proof searches poll it.
    pub fn tip_token(&self) -> CancelToken {
        self.tip_token.clone()
    }

    /// Swap in a chain chosen by consensus. The pending pool is kept.
    pub fn replace_chain(&mut self, chain: Chain) -> Result<(), NodeError> {
        if chain.is_empty() {
            return Err(NodeError::EmptyChain);
        }
        self.chain = chain;
        self.rotate_tip_token();
        Ok(())
    }

    fn rotate_tip_token(&mut self) {
        self.tip_token.cancel();
        self.tip_token = CancelToken::new();
    }

    /// Validate linkage and proof of work from the second block onward.
    /// Empty and single-block chains are trivially valid.
    pub fn is_valid(chain: &[Block]) -> bool {
        chain.windows(2).all(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            let prev_hash = prev.digest();
            current.previous_hash == prev_hash
                && pow::valid_proof(prev.proof, current.proof, &prev_hash)
        })
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Extend `ledger` by `blocks` properly mined blocks.
    pub(crate) fn mine_blocks(ledger: &mut Ledger, blocks: usize) {
        for _ in 0..blocks {
            let last = ledger.last_block().unwrap().clone();
            let proof = pow::solve_blocking(&last);
            ledger.new_block(proof, Some(last.digest()));
        }
    }

    #[test]
    fn fresh_ledger_holds_only_genesis() {
        let ledger = Ledger::new();
        assert_eq!(ledger.len(), 1);
        let genesis = ledger.last_block().unwrap();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.previous_hash, "1");
        assert_eq!(genesis.proof, 100);
        assert!(genesis.transactions.is_empty());
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn new_block_drains_pending_in_order() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.new_transaction("a", "b", Number::from(1)), 2);
        assert_eq!(ledger.new_transaction("b", "c", Number::from(2)), 2);
        let expected = ledger.pending().to_vec();

        let genesis_hash = ledger.last_block().unwrap().digest();
        let block = ledger.new_block(42, None).clone();

        assert_eq!(block.index, 2);
        assert_eq!(block.proof, 42);
        assert_eq!(block.previous_hash, genesis_hash);
        assert_eq!(block.transactions, expected);
        assert!(ledger.pending().is_empty());
        assert_eq!(ledger.new_transaction("c", "d", Number::from(3)), 3);
    }

    #[test]
    fn explicit_previous_hash_is_kept() {
        let mut ledger = Ledger::new();
        let block = ledger.new_block(7, Some("custom".into()));
        assert_eq!(block.previous_hash, "custom");
    }

    #[test]
    fn empty_previous_hash_falls_back_to_tip() {
        let mut ledger = Ledger::new();
        let genesis_hash = ledger.last_block().unwrap().digest();
        let block = ledger.new_block(7, Some(String::new()));
        assert_eq!(block.previous_hash, genesis_hash);
    }

    #[test]
    fn mined_chain_is_valid() {
        let mut ledger = Ledger::new();
        ledger.new_transaction("a", "b", Number::from(3));
        mine_blocks(&mut ledger, 3);
        assert_eq!(ledger.len(), 4);
        assert!(Ledger::is_valid(ledger.chain()));
    }

    #[test]
    fn tampered_previous_hash_is_invalid() {
        let mut ledger = Ledger::new();
        mine_blocks(&mut ledger, 2);
        let mut chain = ledger.chain().to_vec();
        chain[2].previous_hash = "deadbeef".into();
        assert!(!Ledger::is_valid(&chain));
    }

    #[test]
    fn unmined_block_is_invalid() {
        let mut ledger = Ledger::new();
        let genesis = ledger.last_block().unwrap().clone();
        let hash = genesis.digest();
        let bad_proof = (0..).find(|p| !pow::valid_proof(genesis.proof, *p, &hash)).unwrap();
        ledger.new_block(bad_proof, None);
        assert!(!Ledger::is_valid(ledger.chain()));
    }

    #[test]
    fn short_chains_are_trivially_valid() {
        assert!(Ledger::is_valid(&[]));
        assert!(Ledger::is_valid(&[Block::genesis()]));
    }

    #[test]
    fn tip_changes_cancel_outstanding_token() {
        let mut ledger = Ledger::new();
        let token = ledger.tip_token();
        ledger.new_block(1, None);
        assert!(token.is_cancelled());
        assert!(!ledger.tip_token().is_cancelled());

        let token = ledger.tip_token();
        ledger.replace_chain(vec![Block::genesis()]).unwrap();
        assert!(token.is_cancelled());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn empty_replacement_is_rejected() {
        let mut ledger = Ledger::new();
        assert!(matches!(
            ledger.replace_chain(Vec::new()),
            Err(NodeError::EmptyChain)
        ));
        assert_eq!(ledger.len(), 1);
    }
}
