mod app_config;
mod config;
pub mod permits;
pub mod search;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use permits::{PermitStatus, Record, StatusFilter};
pub use search::{
    Coordinates, SearchCriteria, SearchMetadata, SearchQuery, SearchRequest, SearchResult,
    SearchType, DEFAULT_LIMIT, DEFAULT_PROXIMITY_LIMIT, MAX_LIMIT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
