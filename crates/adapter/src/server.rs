//! TCP server for the adapter
//!
//! One task per connection parses lines and forwards commands over a bounded
//! channel to the session task, the only owner of the Engine. Replies come
//! back through a per-client unbounded channel drained by a writer task.

use std::collections::BTreeMap;
use std::future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::AdapterConfig;
use crate::protocol::*;
use crate::session::Session;

/// Event delivered to the session task.
#[derive(Debug)]
pub enum SessionEvent {
    /// Client finished its handshake and wants replies and broadcasts.
    Joined {
        client_id: u64,
        tx: mpsc::UnboundedSender<ServerMessage>,
    },
    Command {
        client_id: u64,
        seq: u64,
        action: CommandAction,
    },
    Left {
        client_id: u64,
    },
}

/// Start the TCP server and the session task.
///
/// `ready_tx`, when given, receives the bound address once the listener is up.
pub async fn run_server(
    config: AdapterConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let session = Session::new(config.board.clone())?;
    let board = BoardInfo {
        height: config.board.height,
        width: config.board.width,
    };

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    info!(%bound, seed = session.seed(), "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let max_pending = config.server.max_pending_commands.max(1);
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(max_pending);
    tokio::spawn(run_session(session, event_rx, config.server.rise_interval()));

    let mut client_id_counter = 0u64;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let event_tx = event_tx.clone();
        let protocol_version = config.server.protocol_version.clone();
        tokio::spawn(async move {
            if let Err(e) =
                handle_client(socket, client_id, board, protocol_version, event_tx).await
            {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Single writer over the Engine.
pub async fn run_session(
    mut session: Session,
    mut event_rx: mpsc::Receiver<SessionEvent>,
    rise_interval: Option<Duration>,
) {
    let mut clients: BTreeMap<u64, mpsc::UnboundedSender<ServerMessage>> = BTreeMap::new();
    let mut ticker = rise_interval.map(|period| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    let mut rise_seq = 0u64;

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    SessionEvent::Joined { client_id, tx } => {
                        clients.insert(client_id, tx);
                    }
                    SessionEvent::Left { client_id } => {
                        clients.remove(&client_id);
                    }
                    SessionEvent::Command { client_id, seq, action } => {
                        debug!(client_id, seq, ?action, "command");
                        let reply = session.handle(seq, action);
                        let restarted = action == CommandAction::Restart
                            && matches!(reply, ServerMessage::Observation(_));
                        if restarted {
                            // A new game gets a full interval before its first raise.
                            if let Some(interval) = ticker.as_mut() {
                                interval.reset();
                            }
                        }
                        if let Some(tx) = clients.get(&client_id) {
                            let _ = tx.send(reply);
                        }
                    }
                }
            }
            _ = next_tick(&mut ticker), if !session.is_game_over() => {
                rise_seq += 1;
                let raised = ServerMessage::Raised(session.raise(rise_seq));
                for tx in clients.values() {
                    let _ = tx.send(raised.clone());
                }
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: u64,
    board: BoardInfo,
    protocol_version: String,
    event_tx: mpsc::Sender<SessionEvent>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let line = match msg.to_line() {
                Ok(line) => line,
                Err(e) => {
                    warn!(client_id, error = %e, "failed to encode reply");
                    continue;
                }
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut handshaken = false;
    let mut last_seq: Option<u64> = None;
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(client_id, error = %e, "read failed");
                break;
            }
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if handshaken && !seq_advances(&mut last_seq, hello.seq) {
                    let _ = tx.send(seq_error(hello.seq));
                    continue;
                }
                if !same_major(&hello.protocol_version, &protocol_version) {
                    warn!(client_id, version = %hello.protocol_version, "protocol mismatch");
                    let _ = tx.send(create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    ));
                    break;
                }

                last_seq = Some(hello.seq);
                let _ = tx.send(create_welcome(hello.seq, &protocol_version, client_id, board));
                if !handshaken {
                    handshaken = true;
                    info!(client_id, name = %hello.client.name, "client handshaken");
                    let joined = SessionEvent::Joined {
                        client_id,
                        tx: tx.clone(),
                    };
                    if event_tx.send(joined).await.is_err() {
                        break;
                    }
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !handshaken {
                    let _ = tx.send(create_error(
                        cmd.seq,
                        ErrorCode::HandshakeRequired,
                        "Send hello before command",
                    ));
                    continue;
                }
                if !seq_advances(&mut last_seq, cmd.seq) {
                    let _ = tx.send(seq_error(cmd.seq));
                    continue;
                }

                // Backpressure: bounded queue.
                if event_tx
                    .try_send(SessionEvent::Command {
                        client_id,
                        seq: cmd.seq,
                        action: cmd.action,
                    })
                    .is_err()
                {
                    let _ = tx.send(create_error(
                        cmd.seq,
                        ErrorCode::Backpressure,
                        "Command queue is full",
                    ));
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                warn!(client_id, seq = unknown.seq, "unknown message type");
                let _ = tx.send(create_error(
                    unknown.seq,
                    ErrorCode::InvalidMessage,
                    "Unknown message type",
                ));
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                warn!(client_id, seq, error = %e, "malformed message");
                let _ = tx.send(create_error(
                    seq,
                    ErrorCode::InvalidMessage,
                    &format!("JSON parse error: {}", e),
                ));
            }
        }
    }

    if handshaken {
        let _ = event_tx.send(SessionEvent::Left { client_id }).await;
    }

    // The session holds a clone of `tx` until it sees `Left`; the writer ends
    // once every sender is gone.
    drop(tx);
    let _ = write_task.await;
    Ok(())
}

fn seq_advances(last_seq: &mut Option<u64>, seq: u64) -> bool {
    match *last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            *last_seq = Some(seq);
            true
        }
    }
}

fn seq_error(seq: u64) -> ServerMessage {
    create_error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing")
}

fn same_major(requested: &str, supported: &str) -> bool {
    let major = |v: &str| v.trim().split('.').next().unwrap_or("").to_string();
    let requested = major(requested);
    !requested.is_empty() && requested == major(supported)
}
