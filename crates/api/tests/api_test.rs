use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;

use dispatch_api::{
    create_app,
    routes::{create_routes, AppState},
};
use dispatch_core::{
    config::ApiConfig,
    models::{
        Bot, BotsSnapshot, DispatchStats, Order, OrderId, OrderPriority, OrdersSnapshot,
    },
    traits::{OrderDispatchService, Subscription},
    DispatchError, DispatchResult,
};
use dispatch_engine::DispatchService;

/// 记录调用的派发服务
#[derive(Default)]
struct MockDispatchService {
    calls: Mutex<Vec<String>>,
    unavailable: bool,
}

impl MockDispatchService {
    fn unavailable() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            unavailable: true,
        }
    }

    fn record(&self, call: &str) -> DispatchResult<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.unavailable {
            Err(DispatchError::EngineUnavailable)
        } else {
            Ok(())
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderDispatchService for MockDispatchService {
    async fn submit_order(&self, priority: OrderPriority) -> DispatchResult<Order> {
        self.record(&format!("submit_order:{}", priority))?;
        Ok(Order::new(1, priority))
    }

    async fn add_bot(&self) -> DispatchResult<Bot> {
        self.record("add_bot")?;
        Ok(Bot::new(1))
    }

    async fn remove_bot(&self) -> DispatchResult<Option<Bot>> {
        self.record("remove_bot")?;
        Ok(None)
    }

    async fn orders_snapshot(&self) -> DispatchResult<OrdersSnapshot> {
        self.record("orders_snapshot")?;
        Ok(OrdersSnapshot::default())
    }

    async fn bots_snapshot(&self) -> DispatchResult<BotsSnapshot> {
        self.record("bots_snapshot")?;
        Ok(BotsSnapshot::default())
    }

    async fn get_order(&self, order_id: OrderId) -> DispatchResult<Option<Order>> {
        self.record("get_order")?;
        Ok((order_id == 1).then(|| Order::new(1, OrderPriority::Normal)))
    }

    async fn stats(&self) -> DispatchResult<DispatchStats> {
        self.record("stats")?;
        Ok(DispatchStats::default())
    }

    async fn subscribe(&self) -> DispatchResult<Subscription> {
        self.record("subscribe")?;
        let (_sender, receiver) = broadcast::channel(1);
        Ok(Subscription {
            orders: OrdersSnapshot::default(),
            receiver,
        })
    }
}

fn mock_app(service: Arc<MockDispatchService>) -> Router {
    create_routes(AppState::new(service), "/metrics")
}

fn engine_app(processing_time: Duration) -> Router {
    let (service, handle) = DispatchService::builder()
        .processing_time(processing_time)
        .build();
    service.spawn();
    create_app(
        AppState::new(Arc::new(handle)),
        &ApiConfig::default(),
        "/metrics",
    )
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let app = mock_app(Arc::new(MockDispatchService::default()));
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "order-dispatch");
}

#[tokio::test]
async fn test_submit_order_forwards_priority() {
    let service = Arc::new(MockDispatchService::default());
    let app = mock_app(service.clone());

    let (status, body) = send(&app, "POST", "/api/orders", Some(r#"{"priority":"VIP"}"#)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["priority"], "VIP");
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(service.calls(), vec!["submit_order:VIP"]);
}

#[tokio::test]
async fn test_malformed_bodies_never_reach_the_engine() {
    let service = Arc::new(MockDispatchService::default());
    let app = mock_app(service.clone());

    let cases = [
        ("/api/orders", None),
        ("/api/orders", Some("not json")),
        ("/api/orders", Some(r#"{"priority":"Urgent"}"#)),
        ("/api/orders", Some(r#"{}"#)),
        ("/api/commands", None),
        ("/api/commands", Some(r#"{"command":"Shutdown"}"#)),
        ("/api/commands", Some(r#"{"cmd":"AddBot"}"#)),
    ];

    for (uri, body) in cases {
        let (status, json) = send(&app, "POST", uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {:?}", uri, body);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["type"], "BAD_REQUEST");
    }
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_command_endpoint_dispatches_each_command() {
    let service = Arc::new(MockDispatchService::default());
    let app = mock_app(service.clone());

    for command in ["SubmitNormalOrder", "SubmitVIPOrder", "AddBot", "RemoveBot"] {
        let body = format!(r#"{{"command":"{}"}}"#, command);
        let (status, json) = send(&app, "POST", "/api/commands", Some(&body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
    }

    let body = r#"{"command":"SubmitVIPOrder"}"#;
    let (_, json) = send(&app, "POST", "/api/commands", Some(body)).await;
    assert_eq!(json["message"], "VIP 订单 1 已提交");
    assert_eq!(json["data"]["outcome"], "order_submitted");

    assert_eq!(
        service.calls(),
        vec![
            "submit_order:Normal",
            "submit_order:VIP",
            "add_bot",
            "remove_bot",
            "submit_order:VIP"
        ]
    );
}

#[tokio::test]
async fn test_remove_bot_without_bots_returns_message() {
    let app = mock_app(Arc::new(MockDispatchService::default()));
    let (status, body) = send(&app, "DELETE", "/api/bots", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
    assert_eq!(body["message"], "没有可移除的机器人");
}

#[tokio::test]
async fn test_get_order_not_found() {
    let app = mock_app(Arc::new(MockDispatchService::default()));

    let (status, _) = send(&app, "GET", "/api/orders/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/orders/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unavailable_engine_maps_to_503() {
    let app = mock_app(Arc::new(MockDispatchService::unavailable()));
    let (status, body) = send(&app, "GET", "/api/orders", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "ENGINE_UNAVAILABLE");
}

#[tokio::test]
async fn test_metrics_route_requires_handle() {
    let app = mock_app(Arc::new(MockDispatchService::default()));
    let (status, _) = send(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let app = create_routes(
        AppState::new(Arc::new(MockDispatchService::default())).with_metrics(handle),
        "/metrics",
    );
    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_with_engine() {
    let processing_time = Duration::from_millis(10_000);
    let app = engine_app(processing_time);

    send(&app, "POST", "/api/orders", Some(r#"{"priority":"Normal"}"#)).await;
    send(&app, "POST", "/api/orders", Some(r#"{"priority":"VIP"}"#)).await;

    let (_, body) = send(&app, "GET", "/api/orders", None).await;
    let pending: Vec<u64> = body["data"]["pending"]
        .as_array()
        .unwrap()
        .iter()
        .map(|order| order["id"].as_u64().unwrap())
        .collect();
    assert_eq!(pending, vec![2, 1]);

    let (status, body) = send(&app, "POST", "/api/bots", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["order_id"], 2);

    tokio::time::sleep(processing_time + Duration::from_millis(1)).await;
    let (_, body) = send(&app, "GET", "/api/orders", None).await;
    assert_eq!(body["data"]["completed"][0]["id"], 2);
    assert_eq!(body["data"]["processing"][0]["id"], 1);

    let (_, body) = send(&app, "DELETE", "/api/bots", None).await;
    assert_eq!(body["data"]["id"], 1);

    let (_, body) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(body["data"]["submitted"], 2);
    assert_eq!(body["data"]["pending"], 1);
    assert_eq!(body["data"]["completed"], 1);
    assert_eq!(body["data"]["preempted"], 1);
}

#[tokio::test]
async fn test_event_stream_starts_with_orders_snapshot() {
    let app = engine_app(Duration::from_millis(10_000));
    send(&app, "POST", "/api/orders", Some(r#"{"priority":"VIP"}"#)).await;

    let response = app
        .clone()
        .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut body = response.into_body().into_data_stream();
    let first = body.next().await.unwrap().unwrap();
    let first = String::from_utf8(first.to_vec()).unwrap();
    assert!(first.contains("event: orders"));
    assert!(first.contains(r#""pending":[{"id":1,"priority":"VIP","status":"PENDING"}]"#));

    send(&app, "POST", "/api/bots", None).await;
    let next = body.next().await.unwrap().unwrap();
    let next = String::from_utf8(next.to_vec()).unwrap();
    assert!(next.contains("event: bots"));
}
