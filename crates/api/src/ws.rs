use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use runtime::journal::DiscardJournal;
use runtime::source::TapeSource;
use runtime::stream::{
    run_stream, ChannelSink, SinkMessage, StopFlag, StreamEnd, DEFAULT_SINK_CAPACITY,
};

use crate::state::{AppState, StreamEvent};

pub async fn prices_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_prices(socket, state))
}

/// One streaming run is exclusively owned by this connection for its
/// lifetime. The socket loop raises the stop flag as soon as the consumer
/// goes away, so the driver never starts another step for a dead peer.
async fn stream_prices(mut socket: WebSocket, state: AppState) {
    let Ok(run_id) = state.begin_run() else {
        return;
    };
    if send_event(&mut socket, &StreamEvent::connected(run_id))
        .await
        .is_err()
    {
        return;
    }

    let (sink, mut updates) = ChannelSink::bounded(DEFAULT_SINK_CAPACITY);
    let stop = StopFlag::new();
    let driver = tokio::spawn(run_stream(
        state.sim_config(),
        TapeSource::new(state.tape()),
        sink,
        state.pace(),
        stop.clone(),
        DiscardJournal,
    ));

    loop {
        tokio::select! {
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => {
                        stop.stop();
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) => {
                        stop.stop();
                        break;
                    }
                }
            }
            update = updates.recv() => {
                match update {
                    Some(SinkMessage::Step(step)) => {
                        if send_event(&mut socket, &StreamEvent::price_update(&step))
                            .await
                            .is_err()
                        {
                            stop.stop();
                            break;
                        }
                    }
                    Some(SinkMessage::Failed { message }) => {
                        let _ = send_event(&mut socket, &StreamEvent::run_failed(message)).await;
                    }
                    None => break,
                }
            }
        }
    }

    drop(updates);
    if let Ok(StreamEnd::Exhausted { steps, trades }) = driver.await {
        let _ = send_event(&mut socket, &StreamEvent::run_complete(steps, trades)).await;
    }
    let _ = socket.send(Message::Close(None)).await;
}

async fn send_event(socket: &mut WebSocket, event: &StreamEvent) -> Result<(), ()> {
    let payload = serde_json::to_string(event).map_err(|_| ())?;
    socket.send(Message::Text(payload)).await.map_err(|_| ())
}
