use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use dispatch_core::{models::Snapshot, traits::Subscription};

use crate::{error::ApiResult, routes::AppState};

fn snapshot_event(snapshot: &Snapshot) -> Event {
    let event = Event::default().event(snapshot.event_name());
    let event = match snapshot {
        Snapshot::Orders(orders) => event.json_data(orders),
        Snapshot::Bots(bots) => event.json_data(bots),
    };
    event.unwrap_or_else(|e| {
        warn!("快照序列化失败: {}", e);
        Event::default().event("error").data(e.to_string())
    })
}

/// 快照事件流，首个事件为当前订单快照
pub async fn stream_events(
    State(state): State<AppState>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Subscription { orders, receiver } = state.dispatch.subscribe().await?;
    debug!("新的事件流订阅者");

    let initial = snapshot_event(&Snapshot::Orders(orders));
    let updates = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(snapshot) => return Some((snapshot_event(&snapshot), receiver)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("事件流订阅者落后，跳过了 {} 个快照", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("快照通道已关闭，结束事件流");
                    return None;
                }
            }
        }
    });

    let events = stream::once(async move { initial })
        .chain(updates)
        .map(Ok::<Event, Infallible>);

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
