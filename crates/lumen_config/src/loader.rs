//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ServiceConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Largest accepted dependency re-check interval.
///
/// Anything beyond this is almost certainly a unit typo ("500m" written
/// where "500ms" was meant) and would effectively disable staleness
/// detection for the lifetime of the session.
const MAX_CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// On-disk shape of `lumen.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    service: Option<ServiceConfig>,
}

/// Loads and validates a `lumen.toml` configuration from a project directory.
///
/// A missing file is not an error: the defaults apply.
pub fn load_config(project_dir: &Path) -> Result<ServiceConfig, ConfigError> {
    let config_path = project_dir.join("lumen.toml");
    if !config_path.exists() {
        return Ok(ServiceConfig::default());
    }
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `lumen.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ServiceConfig, ConfigError> {
    let file: ConfigFile =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    let config = file.service.unwrap_or_default();
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are within sane bounds.
fn validate_config(config: &ServiceConfig) -> Result<(), ConfigError> {
    if config.dependency_check_interval > MAX_CHECK_INTERVAL {
        return Err(ConfigError::ValidationError(format!(
            "dependency_check_interval of {:?} exceeds the maximum of {:?}",
            config.dependency_check_interval, MAX_CHECK_INTERVAL
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
[service]
max_ast_reuse_count = 10
dependency_check_interval = "250ms"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.max_ast_reuse_count, 10);
        assert_eq!(
            config.dependency_check_interval,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let toml = r#"
[service]
max_ast_reuse_count = 3
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.max_ast_reuse_count, 3);
        assert_eq!(
            config.dependency_check_interval,
            ServiceConfig::default().dependency_check_interval
        );
    }

    #[test]
    fn zero_values_are_accepted() {
        let toml = r#"
[service]
max_ast_reuse_count = 0
dependency_check_interval = 0
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.max_ast_reuse_count, 0);
        assert_eq!(config.dependency_check_interval, Duration::ZERO);
    }

    #[test]
    fn oversized_interval_rejected() {
        let toml = r#"
[service]
dependency_check_interval = "500m"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_field_rejected() {
        let toml = r#"
[service]
max_reuse = 3
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn bad_duration_string_rejected() {
        let toml = r#"
[service]
dependency_check_interval = "soon"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
