use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings, read from the command line with environment fallbacks
/// (a `.env` file is loaded first).
#[derive(Debug, Clone, Parser)]
#[command(name = "ledger-node", version, about = "Proof-of-work ledger node")]
pub struct NodeConfig {
    /// Interface to bind and to advertise to peers.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Shared file listing node URLs, one per line.
    #[arg(long, env = "NODES_FILE", default_value = "nodes.txt")]
    pub nodes_file: PathBuf,

    /// Timeout for every outbound peer request.
    #[arg(long, env = "PEER_TIMEOUT_SECS", default_value_t = 5)]
    pub peer_timeout_secs: u64,

    /// Run consensus in the background every N seconds (0 disables).
    #[arg(long, env = "RESOLVE_INTERVAL_SECS", default_value_t = 0)]
    pub resolve_interval_secs: u64,

    /// Ignore the peer file and do not announce this node.
    #[arg(long, env = "STANDALONE")]
    pub standalone: bool,
}

impl NodeConfig {
    pub fn self_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_timeout_secs.max(1))
    }

    pub fn resolve_interval(&self) -> Option<Duration> {
        (self.resolve_interval_secs > 0).then(|| Duration::from_secs(self.resolve_interval_secs))
    }
}
