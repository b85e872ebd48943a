use log::{info, warn};

use super::peers::parse_address;
use super::{HttpPeerClient, PeerDirectory, PeerSet};
use crate::error::NodeError;

/// Load the directory into `peers` and make sure this node is listed in it.
///
/// Returns the addresses of the other nodes, which should be told about us
/// once the server is accepting requests.
pub fn seed_peers<D: PeerDirectory>(
    directory: &D,
    peers: &mut PeerSet,
    self_url: &str,
) -> Result<Vec<String>, NodeError> {
    let known = directory.list_known_peers()?;
    let self_netloc = parse_address(self_url)?;

    let mut others = Vec::new();
    for address in &known {
        match parse_address(address) {
            Ok(netloc) if netloc == self_netloc => {}
            Ok(netloc) if peers.contains(&netloc) => {}
            Ok(_) => {
                peers.register(address)?;
                others.push(address.clone());
            }
            Err(err) => warn!("BOOTSTRAP - ignoring directory entry: {}", err),
        }
    }

    let already_listed = known
        .iter()
        .any(|address| parse_address(address).is_ok_and(|netloc| netloc == self_netloc));
    if !already_listed {
        directory.append_peer(self_url)?;
        info!("BOOTSTRAP - recorded {} in the peer directory", self_url);
    }
    Ok(others)
}

/// Register `self_url` with every listed node; failures are only logged.
pub async fn announce(client: &HttpPeerClient, others: &[String], self_url: &str) {
    for peer in others {
        match client.announce(peer, self_url).await {
            Ok(()) => info!("BOOTSTRAP - registered with {}", peer),
            Err(err) => warn!("BOOTSTRAP - {}", err),
        }
    }
}
