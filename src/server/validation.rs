//! Production configuration validation
//!
//! Security checks for production deployments.

use super::config::AppConfig;
use super::loader::environment;
use tracing::warn;

/// Warnings for settings that are unsafe in production
pub fn production_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.server.host == "0.0.0.0" {
        warnings.push(
            "Server is binding to all interfaces (0.0.0.0) in production. \
             The identity header must only be set by a trusted gateway."
                .to_string(),
        );
    }

    if config.server.auth.sync_secret.is_empty() {
        warnings.push(
            "[server.auth] sync_secret is empty: anyone can create users through /api/v1/auth/sync."
                .to_string(),
        );
    }

    if config.gamification.rewards.watch_completion_threshold <= 0.0 {
        warnings.push(
            "watch_completion_threshold is 0: opening a lesson completes it.".to_string(),
        );
    }

    warnings
}

/// Validate configuration for production security
pub fn validate_production_config(config: &AppConfig) {
    if !environment().eq_ignore_ascii_case("production") {
        return;
    }

    for warning in production_warnings(config) {
        warn!("SECURITY WARNING: {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_flag_missing_sync_secret() {
        let warnings = production_warnings(&AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("sync_secret"));
    }

    #[test]
    fn test_hardened_config_is_clean() {
        let mut config = AppConfig::default();
        config.server.auth.sync_secret = "s3cret".to_string();
        assert!(production_warnings(&config).is_empty());

        config.server.host = "0.0.0.0".to_string();
        assert_eq!(production_warnings(&config).len(), 1);
    }
}
