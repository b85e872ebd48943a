use actix_web::{HttpResponse, get, post, web};
use log::{debug, info};

use super::models::{NodeContext, RegisterNodesRequest, RegisterNodesResponse, ResolveResponse};
use crate::blockchain::consensus::{self, ChainProvider, Resolution};
use crate::error::NodeError;
use crate::network::HttpPeerClient;
use crate::network::peers::parse_address;

/// Register peers. Either every address is accepted or none is.
#[post("/nodes/register")]
pub async fn register_nodes(
    state: web::Data<NodeContext>,
    body: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse, NodeError> {
    let nodes = body.into_inner().nodes;
    for address in &nodes {
        parse_address(address)?;
    }

    let total_nodes = {
        let mut peers = state.peers.lock().expect("mutex poisoned");
        for address in &nodes {
            let netloc = peers.register(address)?;
            debug!("POST /nodes/register - registered {}", netloc);
        }
        peers.all().into_iter().collect::<Vec<_>>()
    };
    info!(
        "POST /nodes/register - {} submitted, {} known",
        nodes.len(),
        total_nodes.len()
    );

    Ok(HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added",
        total_nodes,
    }))
}

/// Run a consensus round against every known peer.
#[get("/nodes/resolve")]
pub async fn resolve(state: web::Data<NodeContext>) -> Result<HttpResponse, NodeError> {
    let client = HttpPeerClient::new(state.peer_timeout);
    let Resolution { replaced, chain } = resolve_conflicts(&state, &client).await?;

    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    Ok(HttpResponse::Ok().json(ResolveResponse {
        message,
        replaced,
        chain,
    }))
}

/// Fetch peer chains without holding any lock, then vote against the chain
/// the ledger holds at that moment and apply the outcome.
pub async fn resolve_conflicts<P: ChainProvider>(
    state: &NodeContext,
    provider: &P,
) -> Result<Resolution, NodeError> {
    let peers = state.peers.lock().expect("mutex poisoned").all();
    let fetched = consensus::fetch_peer_chains(&peers, provider).await;
    debug!(
        "CONSENSUS - collected {} of {} peer chains",
        fetched.len(),
        peers.len()
    );

    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    let resolution = consensus::resolve(ledger.chain(), fetched);
    if resolution.replaced {
        ledger.replace_chain(resolution.chain.clone())?;
    }
    Ok(resolution)
}
