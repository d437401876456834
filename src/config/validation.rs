//! Configuration validation functions.

use super::Config;

/// Validate the merged configuration; `main` refuses to start on error.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    config.game.validate()?;

    if config.protocol.max_player_name_length == 0 {
        anyhow::bail!("protocol.max_player_name_length must be at least 1");
    }
    if config.protocol.max_room_id_length == 0 {
        anyhow::bail!("protocol.max_room_id_length must be at least 1");
    }
    if config.rate_limit.time_window == 0 {
        anyhow::bail!("rate_limit.time_window must be at least 1 second");
    }

    if config.security.require_metrics_auth {
        let token_present = config
            .security
            .metrics_auth_token
            .as_ref()
            .is_some_and(|t| !t.trim().is_empty());

        if !token_present {
            anyhow::bail!(
                "security.require_metrics_auth is enabled but no token is configured.\n\
                 Set one with:\n\
                 export STEAL_ARENA__SECURITY__METRICS_AUTH_TOKEN=\"$(openssl rand -hex 32)\""
            );
        }
    } else if is_production_mode() {
        eprintln!(
            "WARNING: /metrics is publicly accessible. Set \
             STEAL_ARENA__SECURITY__REQUIRE_METRICS_AUTH=true and a token to protect it."
        );
    }

    config.websocket.validate()?;

    Ok(())
}

/// Detect if we're running in production mode.
///
/// Checks `STEAL_ARENA__ENVIRONMENT`, then the generic `PRODUCTION` / `PROD` markers.
pub fn is_production_mode() -> bool {
    use std::env;

    if let Ok(mode) = env::var("STEAL_ARENA__ENVIRONMENT") {
        let mode = mode.to_lowercase();
        return mode == "production" || mode == "prod";
    }

    env::var("PRODUCTION").is_ok() || env::var("PROD").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let mut config = Config::default();
        config.game.initial_guns_min = 5;
        config.game.initial_guns_max = 2;
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("initial_guns_min"));

        let mut config = Config::default();
        config.game.initial_ammo_min = 20;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_capacity_room_is_rejected() {
        let mut config = Config::default();
        config.game.max_players_per_room = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn spawn_area_must_be_positive() {
        let mut config = Config::default();
        config.game.spawn_width = 0.0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.game.spawn_height = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn metrics_auth_requires_token() {
        let mut config = Config::default();
        config.security.require_metrics_auth = true;
        assert!(validate_config(&config).is_err());

        config.security.metrics_auth_token = Some("   ".to_string());
        assert!(validate_config(&config).is_err());

        config.security.metrics_auth_token = Some("a-long-enough-token".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_outbound_queue_is_rejected() {
        let mut config = Config::default();
        config.websocket.outbound_queue_capacity = 0;
        assert!(validate_config(&config).is_err());
    }
}
