use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// CSV file holding the permit dataset; re-read in full on every reload.
    pub data_path: PathBuf,
    pub reload_interval_secs: u64,
    /// How often the scheduler checks whether a reload is due.
    pub reload_poll_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_interval_secs)
    }

    #[must_use]
    pub fn reload_poll(&self) -> Duration {
        Duration::from_secs(self.reload_poll_secs)
    }
}
