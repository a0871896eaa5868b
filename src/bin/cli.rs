use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, Response};
use serde_json::{json, Value};

use dispatch_core::models::DispatchCommand;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub api_base_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = CliApp::parse();
    cli.run().await
}

/// CLI应用程序主结构
#[derive(Parser, Debug)]
#[command(name = "order-dispatch-cli")]
#[command(version)]
#[command(about = "订单派发模拟系统 - 命令行客户端")]
#[command(long_about = "提交订单、增减机器人并查看派发状态")]
struct CliApp {
    #[command(subcommand)]
    command: Commands,

    /// API服务器基础URL
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    api_url: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 订单管理
    Order(OrderCommands),
    /// 机器人管理
    Bot(BotCommands),
    /// 发送原始命令 (SubmitNormalOrder, SubmitVIPOrder, AddBot, RemoveBot)
    Send {
        /// 未知命令在发送前被拒绝
        command: DispatchCommand,
    },
    /// 派发统计
    Stats,
    /// 健康检查
    Health,
    /// 持续输出快照事件
    Watch,
}

#[derive(Args, Debug)]
struct OrderCommands {
    #[command(subcommand)]
    action: OrderActions,
}

#[derive(Subcommand, Debug)]
enum OrderActions {
    /// 提交订单
    Submit {
        /// 提交VIP订单
        #[arg(long)]
        vip: bool,
    },
    /// 查看订单快照
    List,
    /// 查看单个订单
    Get {
        /// 订单ID
        order_id: u64,
    },
}

#[derive(Args, Debug)]
struct BotCommands {
    #[command(subcommand)]
    action: BotActions,
}

#[derive(Subcommand, Debug)]
enum BotActions {
    /// 添加机器人
    Add,
    /// 移除最后添加的机器人
    Remove,
    /// 查看机器人列表
    List,
}

impl CliApp {
    async fn run(self) -> Result<()> {
        let config = CliConfig {
            api_base_url: self.api_url.trim_end_matches('/').to_string(),
        };
        let client = create_http_client()?;

        match self.command {
            Commands::Order(order_cmd) => handle_order_commands(order_cmd, &client, &config).await,
            Commands::Bot(bot_cmd) => handle_bot_commands(bot_cmd, &client, &config).await,
            Commands::Send { command } => {
                let response = client
                    .post(format!("{}/api/commands", config.api_base_url))
                    .json(&json!({ "command": command }))
                    .send()
                    .await
                    .context("发送命令失败")?;
                let data = read_data(response).await?;
                println!("命令 {} 已执行", command);
                println!("{}", serde_json::to_string_pretty(&data)?);
                Ok(())
            }
            Commands::Stats => {
                let response = client
                    .get(format!("{}/api/stats", config.api_base_url))
                    .send()
                    .await
                    .context("获取派发统计失败")?;
                print_stats(&read_data(response).await?);
                Ok(())
            }
            Commands::Health => {
                let response = client
                    .get(format!("{}/health", config.api_base_url))
                    .send()
                    .await
                    .context("健康检查请求失败")?;
                let health: Value = response.json().await?;
                println!("服务状态: {}", health["status"].as_str().unwrap_or("N/A"));
                println!("版本: {}", health["version"].as_str().unwrap_or("N/A"));
                Ok(())
            }
            Commands::Watch => watch_events(&config).await,
        }
    }
}

// 订单命令处理
async fn handle_order_commands(
    order_cmd: OrderCommands,
    client: &Client,
    config: &CliConfig,
) -> Result<()> {
    match order_cmd.action {
        OrderActions::Submit { vip } => {
            let priority = if vip { "VIP" } else { "Normal" };
            let response = client
                .post(format!("{}/api/orders", config.api_base_url))
                .json(&json!({ "priority": priority }))
                .send()
                .await
                .context("发送订单提交请求失败")?;

            let order = read_data(response).await?;
            println!("订单提交成功!");
            println!("订单ID: {}", order["id"]);
            println!("优先级: {}", order["priority"].as_str().unwrap_or("N/A"));
        }
        OrderActions::List => {
            let response = client
                .get(format!("{}/api/orders", config.api_base_url))
                .send()
                .await
                .context("获取订单快照失败")?;
            print_orders(&read_data(response).await?);
        }
        OrderActions::Get { order_id } => {
            let response = client
                .get(format!("{}/api/orders/{}", config.api_base_url, order_id))
                .send()
                .await
                .context("获取订单失败")?;
            let order = read_data(response).await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
    }

    Ok(())
}

// 机器人命令处理
async fn handle_bot_commands(bot_cmd: BotCommands, client: &Client, config: &CliConfig) -> Result<()> {
    let url = format!("{}/api/bots", config.api_base_url);

    match bot_cmd.action {
        BotActions::Add => {
            let response = client.post(&url).send().await.context("添加机器人失败")?;
            let bot = read_data(response).await?;
            println!("机器人 {} 已添加", bot["id"]);
            if let Some(order_id) = bot["order_id"].as_u64() {
                println!("正在处理订单: {}", order_id);
            }
        }
        BotActions::Remove => {
            let response = client.delete(&url).send().await.context("移除机器人失败")?;
            let bot = read_data(response).await?;
            if bot.is_null() {
                println!("没有可移除的机器人");
            } else {
                println!("机器人 {} 已移除", bot["id"]);
            }
        }
        BotActions::List => {
            let response = client.get(&url).send().await.context("获取机器人列表失败")?;
            print_bots(&read_data(response).await?);
        }
    }

    Ok(())
}

/// 读取 SSE 流并逐条输出事件，事件流没有超时
async fn watch_events(config: &CliConfig) -> Result<()> {
    let client = Client::builder().build().context("创建HTTP客户端失败")?;
    let mut response = client
        .get(format!("{}/api/events", config.api_base_url))
        .send()
        .await
        .context("连接事件流失败")?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!("连接事件流失败: {}", response.status()));
    }

    println!("正在监听快照事件，按 Ctrl+C 退出");
    let mut buffer = Vec::new();
    while let Some(chunk) = response.chunk().await.context("读取事件流失败")? {
        buffer.extend_from_slice(&chunk);
        for frame in drain_frames(&mut buffer) {
            print_event(&frame)?;
        }
    }

    println!("事件流已结束");
    Ok(())
}

/// 从缓冲区取出所有以空行结尾的完整事件帧，剩余字节留待下一块数据
fn drain_frames(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut frames = Vec::new();
    while let Some(end) = buffer.windows(2).position(|window| window == b"\n\n") {
        let frame: Vec<u8> = buffer.drain(..end + 2).collect();
        frames.push(String::from_utf8_lossy(&frame).into_owned());
    }
    frames
}

fn print_event(frame: &str) -> Result<()> {
    let mut event = "message";
    let mut data = String::new();
    for line in frame.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
        } else if let Some(payload) = line.strip_prefix("data:") {
            data.push_str(payload.trim());
        }
    }
    if data.is_empty() {
        return Ok(());
    }

    let payload: Value = serde_json::from_str(&data).context("解析事件数据失败")?;
    match event {
        "orders" => print_orders(&payload),
        "bots" => print_bots(&payload),
        other => println!("[{}] {}", other, payload),
    }
    Ok(())
}

fn create_http_client() -> Result<Client> {
    let builder = Client::builder().timeout(std::time::Duration::from_secs(30));

    let client = builder.build().context("创建HTTP客户端失败")?;
    Ok(client)
}

/// 解析统一响应格式，返回 `data` 字段
async fn read_data(response: Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.context("解析响应失败")?;

    if status.is_success() {
        Ok(body["data"].clone())
    } else {
        let message = body["error"]["message"].as_str().unwrap_or("未知错误");
        Err(anyhow::anyhow!("请求失败 ({}): {}", status, message))
    }
}

fn format_orders(orders: &Value) -> String {
    orders
        .as_array()
        .map(|orders| {
            orders
                .iter()
                .map(|order| {
                    format!(
                        "#{}({})",
                        order["id"],
                        order["priority"].as_str().unwrap_or("?")
                    )
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn print_orders(snapshot: &Value) {
    println!("{:<12} {}", "PENDING", format_orders(&snapshot["pending"]));
    println!("{:<12} {}", "PROCESSING", format_orders(&snapshot["processing"]));
    println!("{:<12} {}", "COMPLETED", format_orders(&snapshot["completed"]));
    println!("{}", "-".repeat(60));
}

fn print_bots(snapshot: &Value) {
    println!("{:<8} {:<8} {:<10}", "机器人", "状态", "订单");
    if let Some(bots) = snapshot["bots"].as_array() {
        for bot in bots {
            let idle = bot["is_idle"].as_bool().unwrap_or(true);
            let order = bot["order_id"]
                .as_u64()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<8} {:<8} {:<10}",
                bot["id"],
                if idle { "IDLE" } else { "BUSY" },
                order
            );
        }
    }
    println!("{}", "-".repeat(60));
}

fn print_stats(stats: &Value) {
    println!("已提交: {}", stats["submitted"]);
    println!("待处理: {} (VIP {})", stats["pending"], stats["pending_vip"]);
    println!("处理中: {}", stats["processing"]);
    println!("已完成: {}", stats["completed"]);
    println!("被抢占: {}", stats["preempted"]);
    println!("机器人: {} (空闲 {})", stats["bots"], stats["idle_bots"]);
}
