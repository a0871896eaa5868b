use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Arg, Command};
use tracing::{error, info, warn};

use order_dispatch::{
    app::Application,
    common::{init_logging, load_config, wait_for_shutdown_signal},
    shutdown::ShutdownManager,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("order-dispatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("订单派发模拟系统")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，未指定时搜索默认位置"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "pretty"]),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let config = load_config(config_path)?;

    let log_level = matches
        .get_one::<String>("log-level")
        .unwrap_or(&config.observability.log_level);
    let log_format = matches
        .get_one::<String>("log-format")
        .unwrap_or(&config.observability.log_format);
    init_logging(log_level, log_format)?;

    info!("启动订单派发系统");
    if let Some(path) = config_path {
        info!("配置文件: {path}");
    }

    let app = Arc::new(Application::new(config)?);
    let shutdown_manager = ShutdownManager::new();

    let mut app_handle = {
        let shutdown_rx = shutdown_manager.subscribe().await;
        let app = Arc::clone(&app);

        tokio::spawn(async move {
            if let Err(e) = app.run(shutdown_rx).await {
                error!("应用运行失败: {e:#}");
            }
        })
    };

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("收到关闭信号，开始优雅关闭...");
        }
        result = &mut app_handle => {
            if let Err(e) = result {
                error!("应用任务异常退出: {e}");
            }
            return Err(anyhow::anyhow!("应用提前退出"));
        }
    }
    shutdown_manager.shutdown().await;

    if shutdown_manager
        .wait_with_timeout(app_handle, Duration::from_secs(30))
        .await
    {
        info!("应用已优雅关闭");
    } else {
        warn!("应用关闭超时，强制退出");
    }

    info!("订单派发系统已退出");
    Ok(())
}
