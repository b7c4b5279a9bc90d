//! Protocol module - JSON message types for the adapter
//!
//! Line-delimited JSON. Every message carries `type` and `seq`; `ts` (unix
//! milliseconds) is stamped on everything the server sends and is optional
//! from clients. Replies echo the `seq` of the command they answer.

use serde::{Deserialize, Serialize};

use crate::core::EngineSnapshot;
use crate::types::{Cell, ChainResult, ColorQueueState, FallRecord, Position, Step};

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandType {
    #[default]
    #[serde(rename = "command")]
    Command,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: CommandAction,
}

/// Board command carried by a `command` message.
///
/// ```text
/// {"type":"command","seq":2,"action":{"kind":"dig","row":37,"col":4}}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandAction {
    Dig { row: usize, col: usize },
    Place { row: usize, col: usize, color: Cell },
    Raise,
    InitColors,
    RefreshColors,
    Observe,
    Restart,
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    InvalidMessage,
    InvalidCommand,
    GameOver,
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfo {
    pub height: usize,
    pub width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub board: BoardInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    pub seq: u64,
    pub ts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireColors {
    pub current: Cell,
    pub next: Cell,
    pub next_next: Cell,
}

impl From<ColorQueueState> for WireColors {
    fn from(s: ColorQueueState) -> Self {
        Self {
            current: s.current,
            next: s.next,
            next_next: s.next_next,
        }
    }
}

/// Full board state as seen by an observer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    pub seq: u64,
    pub ts: u64,
    pub height: usize,
    pub width: usize,
    /// Rows top to bottom.
    pub cells: Vec<Vec<Cell>>,
    pub power: u64,
    pub total_score: u64,
    pub last_chain: u32,
    pub colors: WireColors,
    pub board_hash: u64,
    pub game_over: bool,
}

/// `[row, col]`
pub type WirePos = [usize; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    pub from: WirePos,
    pub to: WirePos,
}

impl From<&FallRecord> for WireMove {
    fn from(r: &FallRecord) -> Self {
        Self {
            from: [r.from_row, r.from_col],
            to: [r.to_row, r.to_col],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireStep {
    pub removed: Vec<WirePos>,
    pub falls: Vec<WireMove>,
}

impl From<&Step> for WireStep {
    fn from(s: &Step) -> Self {
        Self {
            removed: s.removed.iter().map(|p: &Position| [p.row, p.col]).collect(),
            falls: s.falls.iter().map(WireMove::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireResult {
    pub steps: Vec<WireStep>,
    pub chain_count: u32,
    pub total_crushed: usize,
    pub power_gained: u64,
}

impl From<&ChainResult> for WireResult {
    fn from(r: &ChainResult) -> Self {
        Self {
            steps: r.steps.iter().map(WireStep::from).collect(),
            chain_count: r.chain_count,
            total_crushed: r.total_crushed,
            power_gained: r.power_gained,
        }
    }
}

/// Reply to `dig` and `place`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeMessage {
    pub seq: u64,
    pub ts: u64,
    pub result: WireResult,
    pub observation: ObservationMessage,
}

/// Reply to `raise`, also broadcast by the rise timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaisedMessage {
    pub seq: u64,
    pub ts: u64,
    pub moves: Vec<WireMove>,
    pub overflow: bool,
    pub observation: ObservationMessage,
}

/// Anything the server writes to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome(WelcomeMessage),
    Outcome(OutcomeMessage),
    Raised(RaisedMessage),
    Observation(ObservationMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
}

impl ServerMessage {
    pub fn seq(&self) -> u64 {
        match self {
            Self::Welcome(m) => m.seq,
            Self::Outcome(m) => m.seq,
            Self::Raised(m) => m.seq,
            Self::Observation(m) => m.seq,
            Self::Ack(m) => m.seq,
            Self::Error(m) => m.seq,
        }
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============== Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one line.
///
/// A well-formed object with an unrecognised `type` is not a hard error; it
/// comes back as [`ParsedMessage::Unknown`] so the server can answer it.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum InboundMessage {
        Hello(HelloMessage),
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let env = serde_json::from_str::<Envelope>(json)?;
            match env.msg_type {
                Some("hello") | Some("command") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: env.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Best-effort `seq` for a line that failed to parse, so the error can echo it.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Utility Functions ==============

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
    }
}

pub fn create_command(seq: u64, action: CommandAction) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        action,
    }
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    board: BoardInfo,
) -> ServerMessage {
    ServerMessage::Welcome(WelcomeMessage {
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        board,
    })
}

pub fn create_ack(seq: u64) -> ServerMessage {
    ServerMessage::Ack(AckMessage {
        seq,
        ts: current_timestamp_ms(),
    })
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ServerMessage {
    ServerMessage::Error(ErrorMessage {
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    })
}

pub fn build_observation(
    seq: u64,
    snapshot: &EngineSnapshot,
    game_over: bool,
) -> ObservationMessage {
    ObservationMessage {
        seq,
        ts: current_timestamp_ms(),
        height: snapshot.height,
        width: snapshot.width,
        cells: snapshot.rows().map(<[Cell]>::to_vec).collect(),
        power: snapshot.power,
        total_score: snapshot.total_score,
        last_chain: snapshot.last_chain,
        colors: snapshot.colors.into(),
        board_hash: snapshot.board_hash,
        game_over,
    }
}

/// Current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
