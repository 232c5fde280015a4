//! End-to-end tests: real server, real WebSocket clients.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tenpercent::prelude::*;
use tenpercent::room::{GameHandle, RoomPhase};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const START_WARNING: &str = "Not enough players to start the round (minimum 2 required).";

/// The lowest player id (the earliest connection) always loses.
struct FirstLoses;

impl LoserSelector for FirstLoses {
    fn select(&mut self, _candidates: &[PlayerId]) -> usize {
        0
    }
}

/// Starts a server on a random port and returns its address.
async fn start_server() -> (String, GameHandle) {
    start_with(TenPercentServer::builder()).await
}

async fn start_with(builder: tenpercent::TenPercentServerBuilder) -> (String, GameHandle) {
    let server = builder
        .bind("127.0.0.1:0")
        .selector(FirstLoses)
        .build()
        .await
        .expect("server should build");

    let addr = server.local_addr().expect("should have local addr").to_string();
    let game = server.game();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    (addr, game)
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, value: Value) {
    ws.send(Message::text(value.to_string())).await.expect("send");
}

/// Next `{"event", "data"}` frame, or a panic after two seconds.
async fn next_event(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for an event")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("server sent invalid JSON");
        }
    }
}

/// Skips events until one named `name` arrives; returns its data.
async fn wait_for(ws: &mut ClientWs, name: &str) -> Value {
    loop {
        let event = next_event(ws).await;
        if event["event"] == name {
            return event["data"].clone();
        }
    }
}

fn join(room: &str, name: &str, bet: f64) -> Value {
    json!({"event": "joinRoom", "data": {"roomId": room, "name": name, "startingBet": bet}})
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_join_sends_timers_snapshot_and_warning() {
    let (addr, _game) = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, join("table", "Ada", 5.0)).await;

    let first = next_event(&mut ws).await;
    assert_eq!(first["event"], "allowedTimers");
    assert_eq!(first["data"], json!({"options": [0.1, 1.0, 10.0, 60.0], "current": 10.0}));

    let second = next_event(&mut ws).await;
    assert_eq!(second["event"], "playersUpdate");
    let players = second["data"].as_object().unwrap();
    assert_eq!(players.len(), 1);
    let ada = players.values().next().unwrap();
    assert_eq!(ada["name"], "Ada");
    assert_eq!(ada["balance"], 0.0);
    assert!(ada["lastResult"].is_null());
    assert!(ada.get("declaredBet").is_none());

    let third = next_event(&mut ws).await;
    assert_eq!(third, json!({"event": "warning", "data": START_WARNING}));
}

#[tokio::test]
async fn test_two_players_play_a_round() {
    let (addr, _game) = start_server().await;
    let mut ada = connect(&addr).await;
    send(&mut ada, join("table", "Ada", 4.0)).await;
    wait_for(&mut ada, "warning").await;

    send(&mut ada, json!({"event": "setTimer", "data": {"roomId": "table", "timer": 0.1}})).await;
    let timers = wait_for(&mut ada, "allowedTimers").await;
    assert_eq!(timers["current"], 0.1);

    let mut bob = connect(&addr).await;
    send(&mut bob, join("table", "Bob", 6.0)).await;

    let result = wait_for(&mut bob, "roundResult").await;
    assert_eq!(result["roomId"], "table");
    assert_eq!(result["roundIndex"], 1);

    let loser = result["loser"].as_u64().unwrap().to_string();
    let players = result["players"].as_object().unwrap();
    assert_eq!(players[&loser]["name"], "Ada");
    assert_eq!(players[&loser]["balance"], -4.0);
    assert_eq!(players[&loser]["lastResult"]["win"], false);
    assert_eq!(players[&loser]["lastResult"]["lastBet"], 4.0);

    let (_, winner) = players.iter().find(|(id, _)| **id != loser).unwrap();
    assert_eq!(winner["name"], "Bob");
    assert_eq!(winner["balance"], 4.0);
    assert_eq!(winner["lastResult"]["delta"], 4.0);
    assert_eq!(winner["lastResult"]["avgOthers"], 4.0);

    // Ada hears the same round.
    let seen = wait_for(&mut ada, "roundResult").await;
    assert_eq!(seen["roundIndex"], 1);
}

#[tokio::test]
async fn test_countdown_reaches_zero_before_result() {
    let (addr, _game) = start_server().await;
    let mut ada = connect(&addr).await;
    send(&mut ada, join("table", "Ada", 5.0)).await;
    wait_for(&mut ada, "warning").await;
    send(&mut ada, json!({"event": "setTimer", "data": {"roomId": "table", "timer": "1"}})).await;
    assert_eq!(wait_for(&mut ada, "allowedTimers").await["current"], 1.0);
    let mut bob = connect(&addr).await;
    send(&mut bob, join("table", "Bob", 5.0)).await;

    let mut readings = Vec::new();
    loop {
        let event = next_event(&mut bob).await;
        match event["event"].as_str() {
            Some("timer") => readings.push(event["data"].as_f64().unwrap()),
            Some("roundResult") => break,
            _ => {}
        }
    }
    assert_eq!(readings.first(), Some(&1.0));
    assert_eq!(readings.last(), Some(&0.0));
    assert!(readings.windows(2).all(|w| w[1] < w[0]), "{readings:?}");
}

#[tokio::test]
async fn test_rejected_timer_answers_requester() {
    let (addr, game) = start_server().await;
    let mut ws = connect(&addr).await;
    send(&mut ws, join("table", "Ada", 5.0)).await;
    wait_for(&mut ws, "warning").await;

    send(&mut ws, json!({"event": "setTimer", "data": {"roomId": "table", "timer": 7}})).await;
    let reply = next_event(&mut ws).await;
    assert_eq!(reply["event"], "allowedTimers");
    assert_eq!(reply["data"]["current"], 10.0);

    let info = game.room_info(RoomId::from("table")).await.unwrap().unwrap();
    assert_eq!(info.round_timer_secs, 10.0);
}

#[tokio::test]
async fn test_garbage_frames_are_ignored() {
    let (addr, game) = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::text("not json".to_string())).await.unwrap();
    send(&mut ws, json!({"event": "teleport", "data": {}})).await;
    send(&mut ws, json!({"event": "setBet"})).await;
    ws.send(Message::binary(join("bin", "Bin", 5.0).to_string().into_bytes()))
        .await
        .unwrap();
    send(&mut ws, json!({"event": "joinRoom", "data": {"roomId": 42}})).await;

    assert_eq!(wait_for(&mut ws, "allowedTimers").await["current"], 10.0);
    assert_eq!(wait_for(&mut ws, "allowedTimers").await["current"], 10.0);

    let numeric = game.room_info(RoomId::from("42")).await.unwrap().unwrap();
    assert_eq!(numeric.player_count, 1);
    assert!(game.room_info(RoomId::from("bin")).await.unwrap().is_some());
}

#[tokio::test]
async fn test_disconnect_pauses_the_room() {
    let (addr, game) = start_server().await;
    let mut ada = connect(&addr).await;
    send(&mut ada, join("table", "Ada", 5.0)).await;
    let mut bob = connect(&addr).await;
    send(&mut bob, join("table", "Bob", 5.0)).await;
    wait_for(&mut ada, "timer").await;

    bob.close(None).await.unwrap();

    let players = wait_for(&mut ada, "playersUpdate").await;
    assert_eq!(players.as_object().unwrap().len(), 1);
    assert_eq!(wait_for(&mut ada, "warning").await, START_WARNING);

    let info = game.room_info(RoomId::from("table")).await.unwrap().unwrap();
    assert_eq!(info.phase, RoomPhase::Paused);
    assert_eq!(info.player_count, 1);
}

#[tokio::test]
async fn test_idle_connection_is_closed() {
    let (addr, _game) =
        start_with(TenPercentServer::builder().idle_timeout(Duration::from_millis(200))).await;
    let mut ws = connect(&addr).await;

    let ended = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "server kept an idle connection open");
}
