//! TCP server for the match adapter
//!
//! Handles incoming connections and manages client lifecycle. Each client gets a reader
//! loop and a writer task; match events fan out from the engine sink to every subscribed
//! client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::engine::{Engine, EngineConfig, MatchConfig, MatchEvent};
use crate::protocol::*;
use crate::types::MatchMode;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory for log files; terminal only when unset
    pub log_dir: Option<String>,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            log_dir: None,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create from `TETROMATCH_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let host = env::var("TETROMATCH_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("TETROMATCH_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7878);

        let log_dir = env::var("TETROMATCH_LOG_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            log_dir,
            engine: EngineConfig::from_env(),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    subscribed: bool,
    tx: mpsc::UnboundedSender<String>,
}

/// Shared server state
struct ServerState {
    engine: Engine,
    clients: RwLock<Vec<ClientHandle>>,
}

impl ServerState {
    async fn subscribe(&self, client_id: usize) {
        let mut clients = self.clients.write().await;
        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
            client.subscribed = true;
        }
    }

    async fn broadcast(&self, line: &str) {
        let clients = self.clients.read().await;
        for client in clients.iter().filter(|c| c.subscribed) {
            let _ = client.tx.send(line.to_string());
        }
    }

    async fn disconnect(&self, client_id: usize) {
        self.clients.write().await.retain(|c| c.id != client_id);
    }
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address once the listener is up (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    let bound = listener.local_addr()?;
    log::info!("[adapter] listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<MatchEvent>();
    let state = Arc::new(ServerState {
        engine: Engine::new(config.engine.clone(), events_tx),
        clients: RwLock::new(Vec::new()),
    });

    // Event fan-out.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                match (ServerMessage::Event { event }).to_line() {
                    Ok(line) => state.broadcast(&line).await,
                    Err(e) => log::warn!("[adapter] could not encode event: {}", e),
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("[adapter] client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, Arc::clone(&state)).await {
                log::warn!("[adapter] client {} error: {}", client_id, e);
            }
            state.disconnect(client_id).await;
            log::info!("[adapter] client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        subscribed: false,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = match parse_message(trimmed) {
            Ok(message) => handle_message(message, client_id, &state).await,
            Err(e) => ServerMessage::error(
                extract_seq_best_effort(trimmed).unwrap_or(0),
                ErrorCode::InvalidMessage,
                e.to_string(),
            ),
        };
        let _ = tx.send(reply.to_line()?);
    }

    drop(tx);
    state.disconnect(client_id).await;
    let _ = write_task.await;
    Ok(())
}

async fn handle_message(
    message: ParsedMessage,
    client_id: usize,
    state: &ServerState,
) -> ServerMessage {
    match message {
        ParsedMessage::Create(m) => {
            let mode = match MatchMode::from_str(&m.mode) {
                Some(mode @ (MatchMode::Solo | MatchMode::Open)) => mode,
                _ => {
                    return ServerMessage::error(
                        m.seq,
                        ErrorCode::InvalidConfig,
                        format!("mode {:?} is not solo or open", m.mode),
                    )
                }
            };
            let mut config = MatchConfig {
                mode,
                ..MatchConfig::solo(m.channel, m.player)
            };
            config.start_delay = m.start_delay_ms.map(Duration::from_millis);

            match state.engine.create_match(config).await {
                Ok(id) => ServerMessage::Created {
                    seq: m.seq,
                    matches: vec![id],
                },
                Err(e) => ServerMessage::engine_error(m.seq, &e),
            }
        }
        ParsedMessage::CreatePair(m) => {
            let [player_a, player_b] = m.players;
            let delay = m.start_delay_ms.map(Duration::from_millis);
            let side = |player: String| {
                let config = MatchConfig::paired(m.channel.clone(), player, m.pair_id.clone());
                match delay {
                    Some(delay) => config.with_start_delay(delay),
                    None => config,
                }
            };

            match state
                .engine
                .create_paired_matches(side(player_a), side(player_b))
                .await
            {
                Ok((a, b)) => ServerMessage::Created {
                    seq: m.seq,
                    matches: vec![a, b],
                },
                Err(e) => ServerMessage::engine_error(m.seq, &e),
            }
        }
        ParsedMessage::Action(m) => {
            match state
                .engine
                .submit_raw(m.match_id, &m.player, &m.action)
                .await
            {
                Ok(outcome) => ServerMessage::outcome(m.seq, outcome.as_str()),
                Err(e) => ServerMessage::engine_error(m.seq, &e),
            }
        }
        ParsedMessage::Subscribe(m) => {
            state.subscribe(client_id).await;
            log::debug!("[adapter] client {} subscribed", client_id);
            ServerMessage::ok(m.seq)
        }
        ParsedMessage::Unknown(m) => {
            ServerMessage::error(m.seq, ErrorCode::InvalidMessage, "unknown message type")
        }
    }
}
