//! Message socket server
//!
//! Router-style semantics over TCP: every connection is a client identity,
//! frames are length-prefixed envelopes, and responses go back to the
//! connection that asked. All requests funnel into one engine task that
//! owns the lifecycle and processes them strictly serially; nothing
//! suspends between reading a request and sending its responses.

use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};

use crate::error::GatewayError;
use crate::lifecycle::Lifecycle;
use crate::metrics::EngineMetrics;
use crate::models::Envelope;
use crate::protocol::{self, MAX_FRAME_LEN};

/// One decoded request on its way to the engine task
struct EngineRequest {
    client: String,
    envelope: Envelope,
    reply: mpsc::UnboundedSender<Vec<u8>>,
}

/// Accept connections and serve until `shutdown` flips.
///
/// In-flight requests always run to completion; the engine task drains its
/// queue after the last connection goes away, then reports what it booked.
pub async fn run(
    bind_address: &str,
    lifecycle: Lifecycle,
    metrics: Arc<EngineMetrics>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), GatewayError> {
    let listener = TcpListener::bind(bind_address).await?;
    tracing::info!(address = bind_address, "listening");

    let (request_tx, request_rx) = mpsc::channel::<EngineRequest>(1024);
    let engine = tokio::spawn(engine_task(lifecycle, request_rx, metrics.clone()));

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(client = %peer, "client connected");
                        tokio::spawn(handle_connection(
                            stream,
                            peer.to_string(),
                            request_tx.clone(),
                            metrics.clone(),
                            shutdown.clone(),
                        ));
                    }
                    Err(error) => tracing::warn!(%error, "accept failed"),
                }
            }
            _ = shutdown.changed() => {
                tracing::info!("shutdown requested, no longer accepting");
                break;
            }
        }
    }

    // Connections drop their senders as they observe the shutdown flag;
    // once the last one is gone the engine task drains and exits.
    drop(request_tx);
    if let Ok(lifecycle) = engine.await {
        tracing::info!(
            trades_booked = lifecycle.book_keeper().trade_count(),
            orders_seen = lifecycle.order_count(),
            "engine stopped"
        );
    }

    Ok(())
}

/// The single owner of all engine state
async fn engine_task(
    mut lifecycle: Lifecycle,
    mut requests: mpsc::Receiver<EngineRequest>,
    metrics: Arc<EngineMetrics>,
) -> Lifecycle {
    while let Some(request) = requests.recv().await {
        tracing::debug!(
            client = %request.client,
            body = request.envelope.body.tag(),
            "request received"
        );

        let started = Instant::now();
        let responses = lifecycle.handle(&request.envelope);
        metrics.record_latency_us(started.elapsed().as_micros() as u64);

        for response in responses {
            match protocol::encode_frame(&response) {
                Ok(frame) => {
                    metrics.record_message_out();
                    // A send failure just means the client went away
                    let _ = request.reply.send(frame);
                }
                Err(error) => {
                    tracing::error!(%error, "failed to encode response frame");
                }
            }
        }
    }
    lifecycle
}

async fn handle_connection(
    stream: TcpStream,
    client: String,
    request_tx: mpsc::Sender<EngineRequest>,
    metrics: Arc<EngineMetrics>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<Vec<u8>>();

    // Writer drains responses for this client until its channel closes,
    // then shuts the socket down so every queued frame is flushed first
    let writer = tokio::spawn(async move {
        while let Some(frame) = reply_rx.recv().await {
            if write_half.write_all(&frame).await.is_err() {
                break;
            }
        }
        let _ = write_half.shutdown().await;
    });

    let mut reader = BufReader::new(read_half);
    loop {
        tokio::select! {
            frame = read_frame(&mut reader) => {
                match frame {
                    Ok(Some(payload)) => {
                        metrics.record_message_in();
                        match protocol::decode_envelope(&payload) {
                            Ok(envelope) => {
                                let request = EngineRequest {
                                    client: client.clone(),
                                    envelope,
                                    reply: reply_tx.clone(),
                                };
                                if request_tx.send(request).await.is_err() {
                                    break;
                                }
                            }
                            // Malformed envelope: log and drop, there is
                            // nothing to address a reject to
                            Err(error) => {
                                tracing::warn!(client = %client, %error, "dropping malformed envelope");
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(error) => {
                        tracing::warn!(client = %client, %error, "read failed, closing connection");
                        break;
                    }
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    drop(reply_tx);
    let _ = writer.await;
    tracing::debug!(client = %client, "client disconnected");
}

/// Read one length-prefixed frame. `None` on clean EOF.
async fn read_frame(
    reader: &mut BufReader<OwnedReadHalf>,
) -> Result<Option<Vec<u8>>, GatewayError> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(error) => return Err(error.into()),
    }

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len > MAX_FRAME_LEN {
        return Err(GatewayError::FrameTooLarge(len));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}
