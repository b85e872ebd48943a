mod chain;
pub mod models;
mod nodes;
mod tx;

use actix_cors::Cors;
use actix_web::web::{self, ServiceConfig};
use log::warn;

use crate::error::NodeError;

pub use models::NodeContext;
pub use nodes::resolve_conflicts;

/// Browser dashboards talk to every node from their own origin.
pub fn cors() -> Cors {
    Cors::permissive()
}

pub fn init_routes(cfg: &mut ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, req| {
        warn!("{} {} - rejected body: {}", req.method(), req.path(), err);
        NodeError::BadRequest(format!("Missing values: {err}")).into()
    });

    cfg.app_data(json_config)
        .service(chain::get_chain)
        .service(chain::mine)
        .service(tx::new_transaction)
        .service(nodes::register_nodes)
        .service(nodes::resolve);
}
