//! TCP server for the controller adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Append every line sent and received to this file
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7788,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from `TILES2048_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("TILES2048_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("TILES2048_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let max_pending_commands = env::var("TILES2048_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        let log_path = env::var("TILES2048_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            log_path,
        }
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    /// Lock order: `controller` before `clients`.
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("TILES2048_DISABLED")
            .map(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            })
            .unwrap_or(false)
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Enforce strictly increasing seq per client
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };

        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    /// Asked for the observer role; never promoted to controller
    pub observer_only: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
    Observation(ObservationMessage),
}

impl ClientOutbound {
    fn write_json(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        match self {
            ClientOutbound::Ack(m) => serde_json::to_writer(buf, m),
            ClientOutbound::Error(m) => serde_json::to_writer(buf, m),
            ClientOutbound::Welcome(m) => serde_json::to_writer(buf, m),
            ClientOutbound::Observation(m) => serde_json::to_writer(buf, m),
        }
    }
}

type WireLog = mpsc::UnboundedSender<Vec<u8>>;

fn spawn_wire_log(path: String) -> WireLog {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path, error = %e, "wire log disabled");
                return;
            }
        };

        while let Some(mut line) = rx.recv().await {
            line.push(b'\n');
            if file.write_all(&line).await.is_err() {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log = config.log_path.clone().map(spawn_wire_log);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Ack(ack));
                        }
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Error(err));
                        }
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs));
                        }
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log = wire_log.clone();

        tokio::spawn(async move {
            if let Err(e) =
                handle_client(socket, addr, client_id, state, command_tx, wire_log).await
            {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

enum Flow {
    Continue,
    Disconnect,
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log: Option<WireLog>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            stream_observations: false,
            handshaken: false,
            observer_only: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    let wire_log_out = wire_log.clone();

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if msg.write_json(&mut buf).is_err() {
                continue;
            }
            if let Some(log) = wire_log_out.as_ref() {
                let _ = log.send(buf.clone());
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    // Cleanup below runs on EOF and on I/O errors alike.
    let result = read_loop(
        &mut reader,
        client_id,
        &state,
        &tx,
        &command_tx,
        wire_log.as_ref(),
    )
    .await;

    remove_client(&state, client_id).await;

    drop(tx);
    let _ = write_task.await;

    result
}

async fn read_loop(
    reader: &mut BufReader<OwnedReadHalf>,
    client_id: usize,
    state: &ServerState,
    tx: &mpsc::UnboundedSender<ClientOutbound>,
    command_tx: &mpsc::Sender<InboundCommand>,
    wire_log: Option<&WireLog>,
) -> anyhow::Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }

        let raw_line = line.trim_end_matches(|c| c == '\n' || c == '\r');
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(log) = wire_log {
            let _ = log.send(raw_line.as_bytes().to_vec());
        }

        if let Flow::Disconnect = handle_line(trimmed, client_id, state, tx, command_tx).await {
            return Ok(());
        }
    }
}

fn send_error(
    tx: &mpsc::UnboundedSender<ClientOutbound>,
    seq: u64,
    code: ErrorCode,
    message: &str,
) {
    let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
}

async fn handle_line(
    line: &str,
    client_id: usize,
    state: &ServerState,
    tx: &mpsc::UnboundedSender<ClientOutbound>,
    command_tx: &mpsc::Sender<InboundCommand>,
) -> Flow {
    match parse_message(line) {
        Ok(ParsedMessage::Hello(hello)) => {
            handle_hello(hello, client_id, state, tx, command_tx).await
        }

        Ok(ParsedMessage::Command(cmd)) => {
            if !state.is_handshaken(client_id).await {
                send_error(tx, cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                return Flow::Continue;
            }
            if !state.check_and_update_seq(client_id, cmd.seq).await {
                send_error(
                    tx,
                    cmd.seq,
                    ErrorCode::InvalidCommand,
                    "seq must be strictly increasing",
                );
                return Flow::Continue;
            }
            if !state.is_controller(client_id).await {
                send_error(
                    tx,
                    cmd.seq,
                    ErrorCode::NotController,
                    "Only controller may send commands",
                );
                return Flow::Continue;
            }
            if cmd.actions.0.is_empty() {
                send_error(tx, cmd.seq, ErrorCode::InvalidCommand, "Missing actions");
                return Flow::Continue;
            }

            // Backpressure: bounded queue. The game loop acks after applying.
            let inbound = InboundCommand {
                client_id,
                seq: cmd.seq,
                payload: InboundPayload::Command(ClientCommand {
                    actions: cmd.actions.0,
                }),
            };
            if command_tx.try_send(inbound).is_err() {
                debug!(client_id, seq = cmd.seq, "command queue full");
                send_error(tx, cmd.seq, ErrorCode::Backpressure, "Command queue is full");
            }
            Flow::Continue
        }

        Ok(ParsedMessage::Control(ctrl)) => {
            if !state.is_handshaken(client_id).await {
                send_error(tx, ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
                return Flow::Continue;
            }
            if !state.check_and_update_seq(client_id, ctrl.seq).await {
                send_error(
                    tx,
                    ctrl.seq,
                    ErrorCode::InvalidCommand,
                    "seq must be strictly increasing",
                );
                return Flow::Continue;
            }

            let mut controller = state.controller.write().await;
            match ctrl.action {
                ControlAction::Claim => match *controller {
                    None => {
                        *controller = Some(client_id);
                        info!(client_id, "controller claimed");
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                    }
                    Some(id) if id == client_id => {
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                    }
                    Some(_) => {
                        send_error(
                            tx,
                            ctrl.seq,
                            ErrorCode::ControllerActive,
                            "Controller already assigned",
                        );
                    }
                },
                ControlAction::Release => {
                    if *controller == Some(client_id) {
                        *controller = None;
                        info!(client_id, "controller released");
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                    } else {
                        send_error(
                            tx,
                            ctrl.seq,
                            ErrorCode::NotController,
                            "Only controller may release",
                        );
                    }
                }
            }
            Flow::Continue
        }

        Ok(ParsedMessage::Unknown(m)) => {
            send_error(tx, m.seq, ErrorCode::InvalidCommand, "Unknown message type");
            Flow::Continue
        }

        Err(e) => {
            let seq = extract_seq_best_effort(line).unwrap_or(0);
            send_error(tx, seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            Flow::Continue
        }
    }
}

async fn handle_hello(
    hello: HelloMessage,
    client_id: usize,
    state: &ServerState,
    tx: &mpsc::UnboundedSender<ClientOutbound>,
    command_tx: &mpsc::Sender<InboundCommand>,
) -> Flow {
    if state.is_handshaken(client_id).await
        && !state.check_and_update_seq(client_id, hello.seq).await
    {
        send_error(tx, hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
        return Flow::Continue;
    }

    if !hello.is_compatible() {
        warn!(client_id, version = %hello.protocol_version, "protocol mismatch");
        send_error(
            tx,
            hello.seq,
            ErrorCode::ProtocolMismatch,
            &format!("Protocol version {} not supported", hello.protocol_version),
        );
        return Flow::Disconnect;
    }

    let wants_observer = hello.requested.role == Some(RequestedRole::Observer);

    let (role, controller_id) = {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
            client.handshaken = true;
            client.last_seq = Some(hello.seq);
            client.stream_observations = hello.requested.stream_observations;
            client.observer_only = wants_observer;
        }

        if controller.is_none() && !wants_observer {
            *controller = Some(client_id);
            info!(client_id, name = %hello.client.name, "client is now controller");
        }

        let role = if *controller == Some(client_id) {
            AssignedRole::Controller
        } else {
            AssignedRole::Observer
        };
        (role, controller.map(|id| id as u64))
    };

    let welcome = create_welcome(
        hello.seq,
        &state.config.protocol_version,
        client_id as u64,
        role,
        controller_id,
    );
    let _ = tx.send(ClientOutbound::Welcome(welcome));

    // Ask the game loop for an immediate observation for this client.
    if hello.requested.stream_observations {
        let request = InboundCommand {
            client_id,
            seq: hello.seq,
            payload: InboundPayload::SnapshotRequest,
        };
        if command_tx.try_send(request).is_err() {
            debug!(client_id, "snapshot request dropped, queue full");
        }
    }

    Flow::Continue
}

/// Remove a client and promote a new controller if it held control.
async fn remove_client(state: &ServerState, client_id: usize) {
    let mut controller = state.controller.write().await;
    let mut clients = state.clients.write().await;

    clients.retain(|c| c.id != client_id);

    if *controller == Some(client_id) {
        let next_id = clients
            .iter()
            .filter(|c| c.handshaken && !c.observer_only)
            .map(|c| c.id)
            .min();
        *controller = next_id;
        match next_id {
            Some(new_id) => info!(client_id = new_id, "controller promoted"),
            None => info!(client_id, "controller released on disconnect"),
        }
    }
}
