//! Per-connection handler: the event gateway.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Derive the player id from the connection id, register an
//!      outbound channel with the game actor
//!   2. Loop: decode inbound frames into intents and forward them, while
//!      encoding and sending whatever the actor pushes back
//!   3. On close (or idle timeout), disconnect the player from every room

use std::sync::Arc;

use tenpercent_protocol::{ClientIntent, Codec, PlayerId};
use tenpercent_room::GameHandle;
use tenpercent_transport::{Connection, TransportError};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::TenPercentError;
use crate::server::ServerState;

/// Drop guard that disconnects the player when the handler exits.
///
/// Runs on every exit path, errors and panics included. `Drop` is
/// synchronous, so the disconnect is sent from a spawned task.
struct DisconnectGuard {
    player_id: PlayerId,
    game: GameHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let game = self.game.clone();
        tokio::spawn(async move {
            let _ = game.disconnect(player_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: C,
    state: Arc<ServerState>,
) -> Result<(), TenPercentError>
where
    C: Connection<Error = TransportError>,
{
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());

    let (tx, mut outbound) = mpsc::unbounded_channel();
    state.game.connect(player_id, tx).await?;
    let _guard = DisconnectGuard {
        player_id,
        game: state.game.clone(),
    };
    tracing::info!(
        %conn_id,
        %player_id,
        peer = ?conn.peer_addr(),
        "player connected"
    );

    let mut deadline = state.idle_timeout.map(|timeout| Instant::now() + timeout);

    loop {
        let idle = async move {
            match deadline {
                Some(at) => time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            inbound = conn.recv() => match inbound? {
                Some(data) => {
                    deadline = state.idle_timeout.map(|timeout| Instant::now() + timeout);
                    forward_frame(&state, player_id, &data).await?;
                }
                None => {
                    tracing::info!(%player_id, "connection closed");
                    break;
                }
            },
            event = outbound.recv() => {
                let Some(event) = event else {
                    tracing::debug!(%player_id, "game actor gone, closing");
                    let _ = conn.close().await;
                    break;
                };
                let text = state.codec.encode(&event)?;
                conn.send_text(&text).await?;
            }
            () = idle => {
                tracing::info!(%player_id, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        }
    }

    // _guard drops here → disconnect fires.
    Ok(())
}

/// Decodes one inbound frame and hands it to the game actor. Frames
/// that aren't a known intent are dropped.
async fn forward_frame(
    state: &ServerState,
    player_id: PlayerId,
    data: &[u8],
) -> Result<(), TenPercentError> {
    let intent: ClientIntent = match state.codec.decode(data) {
        Ok(intent) => intent,
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "ignoring undecodable frame");
            return Ok(());
        }
    };
    tracing::debug!(%player_id, intent = intent.name(), room_id = %intent.room_id(), "intent");
    state.game.send_intent(player_id, intent).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tenpercent_protocol::{JsonCodec, RoomId};
    use tenpercent_room::{GameConfig, UniformSelector, spawn_game};
    use tenpercent_transport::ConnectionId;
    use tokio::sync::Mutex;

    use super::*;

    /// A connection whose far end is a pair of channels.
    struct MemoryConnection {
        id: ConnectionId,
        inbound: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
        outbound: mpsc::UnboundedSender<String>,
    }

    impl Connection for MemoryConnection {
        type Error = TransportError;

        async fn send_text(&self, text: &str) -> Result<(), TransportError> {
            self.outbound
                .send(text.to_owned())
                .map_err(|_| TransportError::ConnectionClosed("client dropped".into()))
        }

        async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
            Ok(self.inbound.lock().await.recv().await)
        }

        async fn close(&self) -> Result<(), TransportError> {
            Ok(())
        }

        fn id(&self) -> ConnectionId {
            self.id
        }
    }

    struct Client {
        to_server: mpsc::UnboundedSender<Vec<u8>>,
        from_server: mpsc::UnboundedReceiver<String>,
    }

    fn pair(id: u64) -> (MemoryConnection, Client) {
        let (to_server, inbound) = mpsc::unbounded_channel();
        let (outbound, from_server) = mpsc::unbounded_channel();
        let conn = MemoryConnection {
            id: ConnectionId::new(id),
            inbound: Mutex::new(inbound),
            outbound,
        };
        (conn, Client { to_server, from_server })
    }

    fn state(idle_timeout: Option<Duration>) -> Arc<ServerState> {
        Arc::new(ServerState {
            game: spawn_game(GameConfig::default(), UniformSelector::seeded(3), 16),
            codec: JsonCodec,
            idle_timeout,
        })
    }

    const JOIN: &[u8] = br#"{"event":"joinRoom","data":{"roomId":"t","name":"Ada"}}"#;

    #[tokio::test(start_paused = true)]
    async fn test_frames_flow_both_ways() {
        let state = state(None);
        let (conn, mut client) = pair(1);
        let task = tokio::spawn(handle_connection(conn, Arc::clone(&state)));

        client.to_server.send(b"{oops".to_vec()).unwrap();
        client.to_server.send(JOIN.to_vec()).unwrap();

        let first = client.from_server.recv().await.unwrap();
        assert!(first.starts_with(r#"{"event":"allowedTimers""#), "{first}");
        let second = client.from_server.recv().await.unwrap();
        assert!(second.contains(r#""1":{"name":"Ada""#), "{second}");

        drop(client.to_server);
        task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_disconnects_player() {
        let state = state(None);
        let (conn, mut client) = pair(7);
        let task = tokio::spawn(handle_connection(conn, Arc::clone(&state)));

        client.to_server.send(JOIN.to_vec()).unwrap();
        client.from_server.recv().await.unwrap();
        drop(client.to_server);
        task.await.unwrap().unwrap();

        // The guard disconnects from a spawned task.
        let mut count = 1;
        for _ in 0..10 {
            tokio::task::yield_now().await;
            let info = state.game.room_info(RoomId::from("t")).await.unwrap().unwrap();
            count = info.player_count;
            if count == 0 {
                break;
            }
        }
        assert_eq!(count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_ends_connection() {
        let state = state(Some(Duration::from_secs(30)));
        let (conn, _client) = pair(2);
        let started = Instant::now();

        handle_connection(conn, state).await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(30), "closed after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(31), "closed after {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_to_vanished_client_is_an_error() {
        let state = state(None);
        let (conn, client) = pair(3);
        let Client { to_server, from_server } = client;
        drop(from_server);

        to_server.send(JOIN.to_vec()).unwrap();
        let result = handle_connection(conn, state).await;
        assert!(matches!(
            result,
            Err(TenPercentError::Transport(TransportError::ConnectionClosed(_)))
        ));
    }
}
