//! Adapter module - drive a dig/chain session over a TCP socket with JSON
//!
//! This crate lets an external renderer or agent play one Engine session
//! through a line-delimited JSON protocol. The core stays free of I/O and
//! timing; pacing (the rise timer), board seeding and the game-over policy
//! live here.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Commanding**: Client sends `command` messages; each gets exactly one reply
//! 4. **Rise**: Every rise interval the server raises one row and broadcasts `raised`
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Handshake with client info and protocol version
//! - **command**: One of `dig`, `place`, `raise`, `init_colors`,
//!   `refresh_colors`, `observe`, `restart`
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with the board dimensions
//! - **outcome**: Chain result of a `dig` or `place`, with the new observation
//! - **raised**: Upward moves of a raise, overflow flag, new observation
//! - **observation**: Full board state, Power, score and color queue
//! - **ack**: Color queue command applied
//! - **error**: Error response with a stable code and a message
//!
//! # Environment Variables
//!
//! - `DIG_CHAIN_HOST`: Bind address (default: "127.0.0.1")
//! - `DIG_CHAIN_PORT`: Port number (default: 7878)
//! - `DIG_CHAIN_MAX_PENDING`: Bounded command queue length (default: 16)
//! - `DIG_CHAIN_RISE_MS`: Milliseconds between raises, 0 disables (default: 5000)
//! - `DIG_CHAIN_HEIGHT` / `DIG_CHAIN_WIDTH`: Board size (default: 40 x 10)
//! - `DIG_CHAIN_FILLED_ROWS`: Random bottom rows at start (default: 3)
//! - `DIG_CHAIN_COLORS`: Seed colors `1..=n` (default: 4)
//! - `DIG_CHAIN_SEED`: RNG seed (default: taken from the clock)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":{"name":"my-bot","version":"1.0.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000000,"protocol_version":"1.0.0","client_id":1,"board":{"height":40,"width":10}}
//! Client -> Server: {"type":"command","seq":2,"action":{"kind":"dig","row":39,"col":4}}
//! Server -> Client: {"type":"outcome","seq":2,"ts":1700000000001,"result":{...},"observation":{...}}
//! ```
//!
//! # Testing
//!
//! ```bash
//! DIG_CHAIN_RISE_MS=0 cargo run
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0"}
//! ```

pub mod config;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod session;

pub use dig_chain_core as core;
pub use dig_chain_types as types;

pub use config::{AdapterConfig, BoardConfig, ServerConfig, PROTOCOL_VERSION};
pub use runtime::run_blocking;
pub use server::{run_server, run_session, SessionEvent};
pub use session::Session;
