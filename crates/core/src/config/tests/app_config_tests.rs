use crate::config::models::AppConfig;

#[test]
fn test_default_config() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());

    assert_eq!(config.engine.processing_time_ms, 10_000);
    assert_eq!(config.engine.processing_time().as_secs(), 10);
    assert!(config.api.enabled);
    assert_eq!(config.api.bind_address, "0.0.0.0:3000");
    assert_eq!(config.observability.log_format, "pretty");
}

#[test]
fn test_config_from_toml() {
    let toml_content = r#"
[engine]
processing_time_ms = 2500
command_buffer = 64
snapshot_buffer = 32

[api]
enabled = true
bind_address = "127.0.0.1:9090"
cors_enabled = false
request_timeout_seconds = 15

[observability]
log_level = "debug"
log_format = "json"
metrics_enabled = false
metrics_endpoint = "/metrics"
"#;

    let config = AppConfig::from_toml(toml_content).unwrap();

    assert_eq!(config.engine.processing_time_ms, 2500);
    assert_eq!(config.engine.command_buffer, 64);
    assert_eq!(config.api.bind_address, "127.0.0.1:9090");
    assert!(!config.api.cors_enabled);
    assert_eq!(config.observability.log_level, "debug");
    assert!(!config.observability.metrics_enabled);
}

#[test]
fn test_partial_toml_falls_back_to_defaults() {
    let toml_content = r#"
[engine]
processing_time_ms = 500
command_buffer = 8
snapshot_buffer = 8
"#;

    let config = AppConfig::from_toml(toml_content).unwrap();

    assert_eq!(config.engine.processing_time_ms, 500);
    assert_eq!(config.api.bind_address, "0.0.0.0:3000");
    assert_eq!(config.observability.metrics_endpoint, "/metrics");
}

#[test]
fn test_config_to_toml() {
    let config = AppConfig::default();
    let toml_str = config.to_toml().unwrap();

    assert!(toml_str.contains("[engine]"));
    assert!(toml_str.contains("processing_time_ms = 10000"));

    let parsed = AppConfig::from_toml(&toml_str).unwrap();
    assert_eq!(parsed.api.bind_address, config.api.bind_address);
}
