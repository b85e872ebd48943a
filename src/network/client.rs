use actix_web::http::StatusCode;
use awc::Client;
use log::debug;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::blockchain::Chain;
use crate::blockchain::consensus::ChainProvider;
use crate::error::NodeError;

/// Upper bound on a peer's `/chain` payload.
const CHAIN_BODY_LIMIT: usize = 64 * 1024 * 1024;

#[derive(Deserialize)]
struct ChainPayload {
    chain: Chain,
}

/// Outbound HTTP calls to other nodes, each bounded by the same timeout.
pub struct HttpPeerClient {
    client: Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).finish(),
        }
    }

    /// Ask `peer` to register `self_url` as one of its nodes.
    pub async fn announce(&self, peer: &str, self_url: &str) -> Result<(), NodeError> {
        let url = format!("{}/nodes/register", base_url(peer));
        let response = self
            .client
            .post(&url)
            .send_json(&json!({ "nodes": [self_url] }))
            .await
            .map_err(|err| peer_error(peer, err))?;

        if response.status() != StatusCode::CREATED {
            return Err(peer_error(peer, format!("status {}", response.status())));
        }
        debug!("PEER - announced {} to {}", self_url, peer);
        Ok(())
    }
}

impl ChainProvider for HttpPeerClient {
    async fn fetch_chain(&self, peer: &str) -> Result<Chain, NodeError> {
        let url = format!("{}/chain", base_url(peer));
        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| peer_error(peer, err))?;

        if !response.status().is_success() {
            return Err(peer_error(peer, format!("status {}", response.status())));
        }
        let payload: ChainPayload = response
            .json()
            .limit(CHAIN_BODY_LIMIT)
            .await
            .map_err(|err| peer_error(peer, err))?;
        Ok(payload.chain)
    }
}

/// Peers are stored as netlocs; directory entries may already carry a scheme.
fn base_url(peer: &str) -> String {
    let peer = peer.trim_end_matches('/');
    if peer.contains("://") {
        peer.to_string()
    } else {
        format!("http://{peer}")
    }
}

fn peer_error(peer: &str, reason: impl ToString) -> NodeError {
    NodeError::PeerUnreachable {
        peer: peer.to_string(),
        reason: reason.to_string(),
    }
}
