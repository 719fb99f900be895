//! Server configuration types
//!
//! Contains all configuration structures for the Scholia server.

use scholia_core::RewardConfig;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gamification: GamificationConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: AuthConfig::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the identity provider's user id
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
    /// Shared secret for the sign-in sync endpoint (empty = open)
    #[serde(default)]
    pub sync_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_header: default_identity_header(),
            sync_secret: String::new(),
        }
    }
}

fn default_identity_header() -> String {
    "x-user-id".to_string()
}

/// SQLite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_db_path() -> String {
    "data/scholia.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Gamification rules plus the badge catalog location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamificationConfig {
    /// Point values, watch threshold and notification policy
    #[serde(flatten)]
    pub rewards: RewardConfig,
    /// Badge catalog TOML; empty uses the built-in catalog
    #[serde(default)]
    pub catalog_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_deserialize() {
        let config: AppConfig = toml::from_str(super::super::loader::DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.server.auth.identity_header, "x-user-id");
        assert_eq!(config.gamification.rewards, RewardConfig::default());
        assert!(config.gamification.catalog_path.is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("[gamification.points]\nlesson = 15\n").unwrap();
        assert_eq!(config.gamification.rewards.points.lesson, 15);
        assert_eq!(config.gamification.rewards.points.course, 100);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_gamification_section_shares_reward_keys() {
        let config: AppConfig = toml::from_str(
            r#"
            [gamification]
            watch_completion_threshold = 90.0
            notify_points = true
            catalog_path = "config/badges.toml"

            [gamification.points]
            forum_reply = 4
            "#,
        )
        .unwrap();

        let rewards = &config.gamification.rewards;
        assert_eq!(rewards.watch_completion_threshold, 90.0);
        assert!(rewards.notify_points);
        assert_eq!(rewards.points.forum_reply, 4);
        assert_eq!(rewards.points.lesson, 10);
        assert_eq!(config.gamification.catalog_path, "config/badges.toml");
    }
}
