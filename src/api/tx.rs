use actix_web::{HttpResponse, Responder, post, web};
use log::{debug, info};

use super::models::{NewTxRequest, NewTxResponse, NodeContext};

/// Queue a transaction for the next mined block.
#[post("/transactions/new")]
pub async fn new_transaction(
    state: web::Data<NodeContext>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let NewTxRequest {
        sender,
        recipient,
        amount,
    } = body.into_inner();
    debug!(
        "POST /transactions/new - {} -> {} ({})",
        sender, recipient, amount
    );

    let (index, pending) = {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        let index = ledger.new_transaction(sender, recipient, amount);
        (index, ledger.pending().len())
    };
    info!(
        "POST /transactions/new - queued for block #{} (pool size {})",
        index, pending
    );

    HttpResponse::Created().json(NewTxResponse {
        message: format!("Transaction will be added to Block {index}"),
        index,
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use serde_json::{Value, json};
    use std::time::Duration;

    use crate::api::{NodeContext, init_routes};
    use crate::network::PeerSet;

    #[actix_web::test]
    async fn queued_transaction_targets_next_block() {
        let state = web::Data::new(NodeContext::new(PeerSet::new(), Duration::from_secs(1)));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(json!({ "sender": "alice", "recipient": "bob", "amount": 2.5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["index"], 2);
        assert_eq!(body["message"], "Transaction will be added to Block 2");

        let ledger = state.ledger.lock().unwrap();
        assert_eq!(ledger.pending().len(), 1);
        assert_eq!(ledger.pending()[0].recipient, "bob");
    }

    #[actix_web::test]
    async fn missing_field_is_rejected() {
        let state = web::Data::new(NodeContext::new(PeerSet::new(), Duration::from_secs(1)));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(json!({ "sender": "alice", "amount": 2 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        assert!(state.ledger.lock().unwrap().pending().is_empty());
    }
}
