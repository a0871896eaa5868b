use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dispatch_core::{config::AppConfig, LogFormat, LogLevel};

/// 初始化日志系统，`RUST_LOG` 优先于传入的级别
pub fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let level: LogLevel = log_level.parse()?;
    let format: LogFormat = log_format.parse()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        LogFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
    }

    Ok(())
}

/// 加载应用配置，未指定路径时搜索默认位置
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => {
            AppConfig::load(Some(path)).with_context(|| format!("加载配置文件失败: {path}"))
        }
        None => AppConfig::load(None).context("加载默认配置失败"),
    }
}

/// 等待 Ctrl+C 或 SIGTERM
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
