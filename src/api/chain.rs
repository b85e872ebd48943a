use actix_web::{HttpResponse, get, web};
use log::{debug, info};
use serde_json::Number;
use std::time::Instant;

use super::models::{ChainResponse, MineResponse, NodeContext};
use crate::blockchain::pow::{self, CancelToken};
use crate::blockchain::{Block, MINING_REWARD, REWARD_SENDER};
use crate::error::NodeError;

/// Get the full chain.
#[get("/chain")]
pub async fn get_chain(state: web::Data<NodeContext>) -> HttpResponse {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ChainResponse {
        chain: ledger.chain(),
        length: ledger.len(),
    })
}

/// Mine a new block on top of the current tip:
/// - Solve the proof of work on the blocking pool, without the ledger lock
/// - Restart if the tip moved (new block or consensus) during the search
/// - Queue the reward for this node and seal the pending pool
#[get("/mine")]
pub async fn mine(state: web::Data<NodeContext>) -> Result<HttpResponse, NodeError> {
    let t0 = Instant::now();
    let block = forge_block(&state).await?;
    info!(
        "MINER - sealed block #{} (proof={}, txs={}) in {} ms",
        block.index,
        block.proof,
        block.transactions.len(),
        t0.elapsed().as_millis()
    );

    Ok(HttpResponse::Ok().json(MineResponse {
        message: "New block forged",
        block,
    }))
}

/// Keep searching until a proof is committed on a tip that did not move.
async fn forge_block(state: &NodeContext) -> Result<Block, NodeError> {
    loop {
        let (last, token) = mining_snapshot(state)?;

        let search_from = last.clone();
        let solved = web::block(move || pow::solve(&search_from, &token))
            .await
            .map_err(|err| NodeError::Mining(err.to_string()))?;
        let Some(proof) = solved else {
            debug!("MINER - tip moved while solving on #{}, restarting", last.index);
            continue;
        };

        if let Some(block) = commit_proof(state, &last, proof)? {
            return Ok(block);
        }
    }
}

/// Current tip plus the token that fires when it stops being the tip.
fn mining_snapshot(state: &NodeContext) -> Result<(Block, CancelToken), NodeError> {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    Ok((ledger.last_block()?.clone(), ledger.tip_token()))
}

/// Append the rewarded block if `last` is still the tip; `None` when stale.
fn commit_proof(
    state: &NodeContext,
    last: &Block,
    proof: u64,
) -> Result<Option<Block>, NodeError> {
    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    if ledger.last_block()? != last {
        debug!("MINER - proof for #{} is stale, restarting", last.index);
        return Ok(None);
    }

    ledger.new_transaction(
        REWARD_SENDER,
        state.node_id.as_str(),
        Number::from(MINING_REWARD),
    );
    Ok(Some(ledger.new_block(proof, Some(last.digest())).clone()))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use serde_json::Value;
    use std::time::Duration;

    use super::{commit_proof, forge_block, mining_snapshot};
    use crate::api::{NodeContext, init_routes};
    use crate::blockchain::ledger::tests::mine_blocks;
    use crate::blockchain::{Ledger, pow};
    use crate::network::PeerSet;

    fn context() -> web::Data<NodeContext> {
        web::Data::new(NodeContext::new(PeerSet::new(), Duration::from_secs(1)))
    }

    #[actix_web::test]
    async fn chain_starts_with_genesis() {
        let state = context();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/chain").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["length"], 1);
        assert_eq!(body["chain"][0]["index"], 1);
        assert_eq!(body["chain"][0]["proof"], 100);
        assert_eq!(body["chain"][0]["previous_hash"], "1");
    }

    #[actix_web::test]
    async fn mine_seals_pending_and_reward() {
        let state = context();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(serde_json::json!({ "sender": "a", "recipient": "b", "amount": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let req = test::TestRequest::get().uri("/mine").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;

        assert_eq!(body["message"], "New block forged");
        assert_eq!(body["index"], 2);
        let txs = body["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0]["sender"], "a");
        assert_eq!(txs[1]["sender"], "0");
        assert_eq!(txs[1]["recipient"], state.node_id.as_str());
        assert_eq!(txs[1]["amount"], 1);

        let ledger = state.ledger.lock().unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.pending().is_empty());
        assert!(Ledger::is_valid(ledger.chain()));
    }

    #[actix_web::test]
    async fn moved_tip_restarts_search_on_new_tip() {
        let state = context();
        let (stale_tip, token) = mining_snapshot(&state).unwrap();
        let stale_proof = pow::solve_blocking(&stale_tip);

        mine_blocks(&mut state.ledger.lock().unwrap(), 1);

        assert!(token.is_cancelled());
        assert_eq!(pow::solve(&stale_tip, &token), None);
        assert_eq!(commit_proof(&state, &stale_tip, stale_proof).unwrap(), None);
        assert_eq!(state.ledger.lock().unwrap().len(), 2);

        let block = forge_block(&state).await.unwrap();
        let ledger = state.ledger.lock().unwrap();
        assert_eq!(block.index, 3);
        assert_eq!(block.previous_hash, ledger.chain()[1].digest());
        assert_eq!(ledger.len(), 3);
        assert!(Ledger::is_valid(ledger.chain()));
    }
}
