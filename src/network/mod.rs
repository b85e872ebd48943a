pub mod bootstrap;
pub mod client;
pub mod directory;
pub mod peers;

pub use client::HttpPeerClient;
pub use directory::{FilePeerDirectory, PeerDirectory};
pub use peers::PeerSet;
