//! Per-connection handler: decode inbound frames, route them, and
//! drain the connection's outbound channel.
//!
//! Each accepted socket gets its own Tokio task running this handler,
//! plus a writer task that serializes queued [`ServerEvent`]s onto the
//! socket. The split means the router never blocks on a slow client.

use std::sync::Arc;

use hotseat_protocol::{ClientEvent, Codec, ServerEvent};
use hotseat_store::{QuizCatalog, SessionStore};
use hotseat_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::router::EventRouter;
use crate::HotseatError;

/// Drop guard that applies the disconnect when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct DisconnectGuard<C: QuizCatalog, S: SessionStore> {
    connection: ConnectionId,
    router: Arc<EventRouter<C, S>>,
}

impl<C: QuizCatalog, S: SessionStore> Drop for DisconnectGuard<C, S> {
    fn drop(&mut self) {
        let connection = self.connection;
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            router.handle_disconnect(connection).await;
            router.unregister(connection).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C, S, K>(
    conn: WebSocketConnection,
    router: Arc<EventRouter<C, S>>,
    codec: K,
) -> Result<(), HotseatError>
where
    C: QuizCatalog,
    S: SessionStore,
    K: Codec + Clone,
{
    let connection = conn.id();
    tracing::debug!(%connection, "handling new connection");

    let mut outbound = router.register(connection).await;
    let _guard = DisconnectGuard {
        connection,
        router: Arc::clone(&router),
    };

    let conn = Arc::new(conn);

    // Writer task: channel → socket. Exits when the channel closes
    // (unregister) or the socket rejects a frame.
    let writer = {
        let conn = Arc::clone(&conn);
        let codec = codec.clone();
        tokio::spawn(async move {
            while let Some(event) = outbound.recv().await {
                let frame = match codec.encode(&event) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!(
                            %connection,
                            error = %e,
                            "failed to encode outbound event"
                        );
                        continue;
                    }
                };
                if conn.send(&frame).await.is_err() {
                    break;
                }
            }
        })
    };

    // Read loop: socket → router.
    loop {
        match conn.recv().await {
            Ok(Some(frame)) => match codec.decode::<ClientEvent>(&frame) {
                Ok(event) => router.handle_event(connection, event).await,
                Err(e) => {
                    tracing::debug!(
                        %connection,
                        error = %e,
                        "malformed client event"
                    );
                    router
                        .send_to(
                            connection,
                            ServerEvent::GameError {
                                code: "malformed_event".into(),
                                message: "could not parse event".into(),
                            },
                        )
                        .await;
                }
            },
            Ok(None) => {
                tracing::info!(%connection, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%connection, error = %e, "recv error");
                break;
            }
        }
    }

    writer.abort();
    let _ = conn.close().await;

    // _guard drops here → disconnect handling fires.
    Ok(())
}
