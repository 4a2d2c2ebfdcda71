//! Configuration for the union office service
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Union office administrative service
///
/// Serves the citizen registry, certificate lifecycle, holding tax ledger
/// and public verification endpoint over JSON/HTTP, backed by MongoDB.
#[derive(Parser, Debug, Clone)]
#[command(name = "union-office")]
#[command(about = "Union office administration service")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "union_office")]
    pub mongodb_db: String,

    /// Enable development mode (MongoDB optional, admin key not required)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// API key for the admin surface (required in production)
    #[arg(long, env = "ADMIN_API_KEY")]
    pub admin_api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Storage request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            match &self.admin_api_key {
                None => {
                    return Err("ADMIN_API_KEY is required in production mode".to_string());
                }
                Some(key) if key.len() < 16 => {
                    return Err("ADMIN_API_KEY must be at least 16 characters".to_string());
                }
                Some(_) => {}
            }
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Check whether a presented admin key is acceptable.
    ///
    /// Dev mode accepts any request; production requires an exact match
    /// against the configured key.
    pub fn admin_key_matches(&self, presented: Option<&str>) -> bool {
        if self.dev_mode {
            return true;
        }
        match (&self.admin_api_key, presented) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["union-office", "--admin-api-key", "0123456789abcdef"])
    }

    #[test]
    fn test_validate_requires_admin_key_in_production() {
        let args = Args::parse_from(["union-office"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from(["union-office", "--dev-mode"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_admin_key() {
        let args = Args::parse_from(["union-office", "--admin-api-key", "short"]);
        assert!(args.validate().is_err());

        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_admin_key_matching() {
        let args = base_args();
        assert!(args.admin_key_matches(Some("0123456789abcdef")));
        assert!(!args.admin_key_matches(Some("wrong-key")));
        assert!(!args.admin_key_matches(None));
    }

    #[test]
    fn test_dev_mode_accepts_any_key() {
        let args = Args::parse_from(["union-office", "--dev-mode"]);
        assert!(args.admin_key_matches(None));
        assert!(args.admin_key_matches(Some("anything")));
    }
}
