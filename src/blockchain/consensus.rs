use futures::future::join_all;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use super::{Block, Chain, Ledger};
use crate::error::NodeError;

/// Label of the local chain among the voting candidates.
pub const LOCAL: &str = "local";

/// Source of peer chains (the HTTP client in production, a fake in tests).
pub trait ChainProvider {
    fn fetch_chain(&self, peer: &str) -> impl Future<Output = Result<Chain, NodeError>>;
}

/// Outcome of a consensus round.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub replaced: bool,
    pub chain: Chain,
}

/// Fetch every peer's chain concurrently, keeping peer order.
///
/// Unreachable peers and chains that are empty or fail validation are
/// logged and left out.
pub async fn fetch_peer_chains<P: ChainProvider>(
    peers: &BTreeSet<String>,
    provider: &P,
) -> Vec<(String, Chain)> {
    let fetches = peers
        .iter()
        .map(|peer| async move { (peer, provider.fetch_chain(peer).await) });

    join_all(fetches)
        .await
        .into_iter()
        .filter_map(|(peer, fetched)| {
            let checked = fetched.and_then(|chain| {
                if chain.is_empty() || !Ledger::is_valid(&chain) {
                    Err(NodeError::InvalidPeerChain(peer.clone()))
                } else {
                    Ok(chain)
                }
            });
            match checked {
                Ok(chain) => {
                    debug!("CONSENSUS - {} sent {} blocks", peer, chain.len());
                    Some((peer.clone(), chain))
                }
                Err(err) => {
                    warn!("CONSENSUS - skipping peer {}: {}", peer, err);
                    None
                }
            }
        })
        .collect()
}

/// Decide whether `local` should be replaced by one of `peer_chains`.
///
/// Candidates ("local" first, then peers in the given order) vote block by
/// block on `previous_hash`. At each position only the candidates carrying
/// the most common value survive; ties go to the lexicographically smallest
/// hash. Voting stops once one candidate is left or no candidate has a block
/// at the current position. The first survivor wins, and the local chain is
/// replaced only if it is not itself among the survivors.
pub fn resolve(local: &[Block], peer_chains: Vec<(String, Chain)>) -> Resolution {
    let mut chains: Vec<(String, Chain)> = Vec::with_capacity(peer_chains.len() + 1);
    chains.push((LOCAL.to_string(), local.to_vec()));
    chains.extend(peer_chains);

    let mut winner: Option<Chain> = None;
    let mut block_index = 0;

    while let Some(hash) = most_common_previous_hash(&chains, block_index) {
        chains.retain(|(_, chain)| {
            chain
                .get(block_index)
                .is_some_and(|block| block.previous_hash == hash)
        });
        debug!(
            "CONSENSUS - block {}: most common previous_hash {} ({} candidates left)",
            block_index + 1,
            hash,
            chains.len()
        );

        if chains.len() == 1 || chains.iter().all(|(_, chain)| block_index >= chain.len()) {
            winner = chains.first().map(|(_, chain)| chain.clone());
            break;
        }
        block_index += 1;
    }

    if chains.len() > 1 {
        winner = chains.first().map(|(_, chain)| chain.clone());
    }

    let local_in_contention = chains.iter().any(|(_, chain)| chain.as_slice() == local);
    match winner {
        Some(chain) if !local_in_contention => {
            let source = chains
                .iter()
                .find(|(_, candidate)| *candidate == chain)
                .map(|(id, _)| id.as_str())
                .unwrap_or(LOCAL);
            info!(
                "CONSENSUS - replacing local chain with {} blocks from {}",
                chain.len(),
                source
            );
            Resolution {
                replaced: true,
                chain,
            }
        }
        _ => {
            info!("CONSENSUS - local chain is authoritative");
            Resolution {
                replaced: false,
                chain: local.to_vec(),
            }
        }
    }
}

/// Tally `previous_hash` at `block_index` over every candidate long enough.
fn most_common_previous_hash(chains: &[(String, Chain)], block_index: usize) -> Option<String> {
    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, chain) in chains {
        if let Some(block) = chain.get(block_index) {
            if !block.previous_hash.is_empty() {
                *tally.entry(block.previous_hash.as_str()).or_insert(0) += 1;
            }
        }
    }

    // BTreeMap iterates in key order, so a strict `>` keeps the smallest
    // hash among equal counts.
    let mut best: Option<(&str, usize)> = None;
    for (hash, count) in tally {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((hash, count));
        }
    }
    best.map(|(hash, _)| hash.to_string())
}
