use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "shopsite")]
#[command(about = "Shop back office with request throttling and CSV/JSON bulk import")]
pub struct Args {
    // Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Minimum gap between two requests from one client address, in milliseconds
    #[arg(long, default_value_t = 10)]
    pub throttle_interval_ms: u64,

    // Throttle entries idle for longer than this many seconds get evicted
    #[arg(long, default_value_t = 300)]
    pub throttle_ttl: u64,

    // How often the sweeper looks for stale throttle entries, in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub sweep_interval: u64,

    // Largest accepted upload, in megabytes
    #[arg(long, default_value_t = 10)]
    pub max_upload_mb: usize,

    // Users created at start-up (comma-separated)
    // Example: "alice,bob"
    #[arg(long, default_value = "")]
    pub seed_users: String,

    // CSV or JSON product file imported at start-up
    #[arg(long)]
    pub seed_products: Option<PathBuf>,
}

impl Args {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }

    pub fn throttle_ttl(&self) -> Duration {
        Duration::from_secs(self.throttle_ttl)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
