use actix_web::http::Uri;
use std::collections::BTreeSet;

use crate::error::NodeError;

/// Known peers of this node, keyed by their network location (`host:port`).
#[derive(Debug, Default, Clone)]
pub struct PeerSet {
    nodes: BTreeSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peer; returns the stored netloc. Registering twice is a no-op.
    pub fn register(&mut self, address: &str) -> Result<String, NodeError> {
        let netloc = parse_address(address)?;
        self.nodes.insert(netloc.clone());
        Ok(netloc)
    }

    /// Snapshot of the current membership.
    pub fn all(&self) -> BTreeSet<String> {
        self.nodes.clone()
    }

    pub fn contains(&self, netloc: &str) -> bool {
        self.nodes.contains(netloc)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Reduce a peer address to its netloc.
///
/// Full URLs (`http://host:port/...`) keep only their authority; bare
/// `host:port` strings are kept verbatim. Anything else is rejected.
pub fn parse_address(address: &str) -> Result<String, NodeError> {
    let invalid = || NodeError::InvalidAddress(address.to_string());
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    if trimmed.contains("://") {
        let uri: Uri = trimmed.parse().map_err(|_| invalid())?;
        return uri
            .authority()
            .map(|authority| authority.as_str().to_string())
            .filter(|netloc| !netloc.is_empty())
            .ok_or_else(invalid);
    }

    let uri: Uri = format!("http://{trimmed}").parse().map_err(|_| invalid())?;
    match uri.authority() {
        Some(_) if matches!(uri.path(), "" | "/") && uri.query().is_none() => {
            Ok(trimmed.to_string())
        }
        _ => Err(invalid()),
    }
}
