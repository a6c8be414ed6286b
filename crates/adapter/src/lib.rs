//! Adapter module - external control via TCP socket with JSON protocol
//!
//! This crate lets an external presentation layer, bot, or test harness drive
//! a running game through a TCP socket. The engine stays pure; the adapter
//! only forwards actions to the game loop and streams observations back.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7788)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//!    unless it asks for `role: "observer"`
//! 4. **Observation Streaming**: Server sends an observation after every
//!    applied command to clients that asked for a stream
//! 5. **Commanding**: Controller sends commands with up to 32 actions
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: Apply actions (`left`, `up`, `right`, `down`, `restart`)
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with assigned role and capabilities
//! - **observation**: Full game state snapshot (grid, tiles, score, status)
//! - **ack**: Command applied
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `TILES2048_HOST`: Bind address (default: "127.0.0.1")
//! - `TILES2048_PORT`: Port number (default: 7788)
//! - `TILES2048_MAX_PENDING`: Bounded command queue size (default: 10)
//! - `TILES2048_LOG_PATH`: Append every wire line to this file
//! - `TILES2048_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1700000000000,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000001,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1700000000002,"board":{"size":4,"cells":[[0,2,0,0],...]},...}
//! Client -> Server: {"type":"command","seq":2,"ts":1700000000010,"actions":["left","up"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000011,"status":"ok"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7788
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tiles2048_core as core;
pub use tiles2048_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerState};
