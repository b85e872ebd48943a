mod api;
mod blockchain;
mod config;
mod error;
mod network;
mod transaction;

use actix_web::{App, HttpServer, rt, web};
use clap::Parser;
use dotenvy::dotenv;
use log::{error, info, warn};

use api::NodeContext;
use config::NodeConfig;
use network::{FilePeerDirectory, HttpPeerClient, PeerSet, bootstrap};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = NodeConfig::parse();
    let self_url = config.self_url();
    let peer_timeout = config.peer_timeout();

    let mut peers = PeerSet::new();
    let mut announce_to = Vec::new();
    if !config.standalone {
        let directory = FilePeerDirectory::new(&config.nodes_file);
        match bootstrap::seed_peers(&directory, &mut peers, &self_url) {
            Ok(others) => announce_to = others,
            Err(err) => warn!("BOOTSTRAP - {}", err),
        }
    }

    if peers.is_empty() {
        info!("No peers known yet; waiting for POST /nodes/register");
    }
    let known_peers = peers.len();

    let state = web::Data::new(NodeContext::new(peers, peer_timeout));
    info!(
        "⛓️ Starting ledger node {} at {} ({} known peers)",
        state.node_id, self_url, known_peers
    );

    let app_state = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(api::cors())
            .app_data(app_state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    if !announce_to.is_empty() {
        let self_url = self_url.clone();
        rt::spawn(async move {
            let client = HttpPeerClient::new(peer_timeout);
            bootstrap::announce(&client, &announce_to, &self_url).await;
        });
    }

    if let Some(period) = config.resolve_interval() {
        info!("CONSENSUS - resolving every {} s", period.as_secs());
        rt::spawn(async move {
            let client = HttpPeerClient::new(peer_timeout);
            let mut ticker = rt::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = api::resolve_conflicts(&state, &client).await {
                    error!("CONSENSUS - background round failed: {}", err);
                }
            }
        });
    }

    server.await
}
