use std::io::Write;

use dispatch_core::config::AppConfig;

// 环境变量是进程级的，所有覆盖场景放在同一个测试里顺序执行
#[test]
fn test_environment_overrides_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[engine]\nprocessing_time_ms = 2000\n\n[observability]\nlog_format = \"json\""
    )
    .unwrap();
    let path = file.path().to_str().unwrap().to_string();

    std::env::set_var("DISPATCH_ENGINE__PROCESSING_TIME_MS", "750");
    std::env::set_var("DISPATCH_API__CORS_ENABLED", "false");
    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.engine.processing_time_ms, 750);
    assert!(!config.api.cors_enabled);
    assert_eq!(config.observability.log_format, "json");

    std::env::set_var("DISPATCH_ENGINE__PROCESSING_TIME_MS", "0");
    assert!(AppConfig::load(Some(&path)).is_err());

    std::env::remove_var("DISPATCH_ENGINE__PROCESSING_TIME_MS");
    std::env::remove_var("DISPATCH_API__CORS_ENABLED");
    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.engine.processing_time_ms, 2000);
    assert!(config.api.cors_enabled);
}
