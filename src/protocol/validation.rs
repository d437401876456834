use crate::config::ProtocolConfig;

/// Validate a display name and return it trimmed.
///
/// Length is counted in characters after trimming, so multi-byte names are
/// not penalised for their encoding.
pub fn validate_player_name_with_config(
    name: &str,
    config: &ProtocolConfig,
) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Please enter your name".to_string());
    }
    if trimmed.chars().count() > config.max_player_name_length {
        return Err(format!(
            "Name too long (max {} characters)",
            config.max_player_name_length
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err("Name contains invalid characters".to_string());
    }
    Ok(trimmed.to_string())
}

/// Check that a position update carries finite coordinates.
pub fn validate_coordinates(x: f64, y: f64) -> Result<(), String> {
    if !x.is_finite() || !y.is_finite() {
        return Err("Position must be finite numbers".to_string());
    }
    Ok(())
}

pub fn validate_player_name(name: &str) -> Result<String, String> {
    validate_player_name_with_config(name, &ProtocolConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn expected_player_name_ok(candidate: &str, config: &ProtocolConfig) -> bool {
        let trimmed = candidate.trim();
        !trimmed.is_empty()
            && trimmed.chars().count() <= config.max_player_name_length
            && !trimmed.chars().any(char::is_control)
    }

    #[test]
    fn player_name_is_trimmed() {
        assert_eq!(validate_player_name("  Alice ").unwrap(), "Alice");
    }

    #[test]
    fn empty_or_blank_name_is_rejected() {
        assert_eq!(
            validate_player_name("").unwrap_err(),
            "Please enter your name"
        );
        assert!(validate_player_name("   ").is_err());
    }

    #[test]
    fn name_length_counts_characters() {
        assert!(validate_player_name(&"a".repeat(20)).is_ok());
        assert!(validate_player_name(&"a".repeat(21)).is_err());
        // 20 two-byte characters are still 20 characters
        assert!(validate_player_name(&"é".repeat(20)).is_ok());
    }

    #[test]
    fn name_length_obeys_config() {
        let config = ProtocolConfig {
            max_player_name_length: 4,
            ..ProtocolConfig::default()
        };
        assert!(validate_player_name_with_config("Bob", &config).is_ok());
        let err = validate_player_name_with_config("Alice", &config).unwrap_err();
        assert!(err.contains("max 4"));
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(validate_player_name("Al\u{0007}ice").is_err());
        assert!(validate_player_name("Al\tice").is_err());
    }

    #[test]
    fn coordinates_must_be_finite() {
        assert!(validate_coordinates(10.0, -3.5).is_ok());
        assert!(validate_coordinates(1e12, 1e12).is_ok());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::INFINITY).is_err());
    }

    proptest! {
        #[test]
        fn player_name_validation_matches_predicate(raw in proptest::collection::vec(any::<char>(), 0..=32)) {
            let candidate: String = raw.into_iter().collect();
            let config = ProtocolConfig::default();
            let result = validate_player_name_with_config(&candidate, &config);
            prop_assert_eq!(result.is_ok(), expected_player_name_ok(&candidate, &config));
            if let Ok(name) = result {
                prop_assert_eq!(name.as_str(), candidate.trim());
            }
        }
    }
}
