use log::debug;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::{Block, POW_PREFIX};

/// How many attempts pass between two cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 1_024;

/// Shared flag used to abandon a running search.
///
/// Clones observe the same flag; once cancelled a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Check whether `proof` solves the puzzle posed by the previous block:
/// `sha256("{last_proof}{proof}{last_hash}")` must start with [`POW_PREFIX`].
pub fn valid_proof(last_proof: u64, proof: u64, last_hash: &str) -> bool {
    let guess = format!("{last_proof}{proof}{last_hash}");
    let mut hasher = Sha256::new();
    hasher.update(guess.as_bytes());
    hex::encode(hasher.finalize()).starts_with(POW_PREFIX)
}

/// Search proofs `0, 1, 2, ...` for the first one valid on top of `last_block`.
///
/// Returns `None` if `cancel` fires before a solution is found.
pub fn solve(last_block: &Block, cancel: &CancelToken) -> Option<u64> {
    let started = Instant::now();
    let last_hash = last_block.digest();
    let mut proof: u64 = 0;

    loop {
        if proof % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            debug!(
                "POW - search on block #{} cancelled after {} attempts",
                last_block.index, proof
            );
            return None;
        }
        if valid_proof(last_block.proof, proof, &last_hash) {
            debug!(
                "POW - solved block #{} with proof {} in {} ms",
                last_block.index,
                proof,
                started.elapsed().as_millis()
            );
            return Some(proof);
        }
        proof += 1;
    }
}

/// Search without a way to stop it; used where nothing can move the tip.
pub fn solve_blocking(last_block: &Block) -> u64 {
    solve(last_block, &CancelToken::new())
        .expect("a token nobody else holds is never cancelled")
}
