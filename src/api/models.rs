use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::blockchain::{Block, Ledger};
use crate::network::PeerSet;

/// Per-process node state handed to every handler.
pub struct NodeContext {
    /// Recipient of this node's mining rewards.
    pub node_id: String,
    pub ledger: Mutex<Ledger>,
    pub peers: Mutex<PeerSet>,
    /// Bound on each outbound call to a peer.
    pub peer_timeout: Duration,
}

impl NodeContext {
    pub fn new(peers: PeerSet, peer_timeout: Duration) -> Self {
        Self {
            node_id: Uuid::new_v4().simple().to_string(),
            ledger: Mutex::new(Ledger::new()),
            peers: Mutex::new(peers),
            peer_timeout,
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub chain: &'a [Block],
    pub length: usize,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub block: Block,
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: Number,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub index: u64,
}

/* ---------- Nodes API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct RegisterNodesResponse {
    pub message: &'static str,
    pub total_nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub message: &'static str,
    pub replaced: bool,
    pub chain: Vec<Block>,
}
