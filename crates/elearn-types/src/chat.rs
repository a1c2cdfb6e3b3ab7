use std::fmt;

use serde::{Deserialize, Serialize};

/// Who a conversation is with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatTarget {
    /// A named group room
    Room(String),
    /// A direct conversation with another user
    Peer(String),
}

impl ChatTarget {
    pub fn name(&self) -> &str {
        match self {
            ChatTarget::Room(name) | ChatTarget::Peer(name) => name,
        }
    }

    /// Direct conversations authenticate the socket with the access token.
    pub fn sends_token(&self) -> bool {
        matches!(self, ChatTarget::Peer(_))
    }
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatTarget::Room(name) => write!(f, "room {}", name),
            ChatTarget::Peer(name) => write!(f, "@{}", name),
        }
    }
}

/// A message in a conversation log, in arrival order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Resolved server-side; absent on the room variant
    pub sender: Option<String>,
    pub text: String,
    /// Server-assigned, e.g. `2024-05-01 12:00:00`
    pub timestamp: Option<String>,
}

/// Inbound frame. The room variant only carries `message`; direct chats
/// add `username` and `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundFrame {
    pub message: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl From<InboundFrame> for ChatMessage {
    fn from(frame: InboundFrame) -> Self {
        Self {
            sender: frame.username,
            text: frame.message,
            timestamp: frame.timestamp,
        }
    }
}

/// Outbound frame. Sender identity comes from the authenticated connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundFrame {
    pub message: String,
}

/// Lifecycle of one chat connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelState::Connecting => "connecting",
            ChannelState::Open => "open",
            ChannelState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Identifies one socket for the lifetime of a chat view; a new one is
/// issued on every (re)connect so late events from a superseded socket can
/// be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

/// Transport-level events from a socket adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Opened,
    /// A text frame, unparsed
    Frame(String),
    /// Transport error; a `Closed` normally follows
    Error(String),
    Closed { code: u16, reason: String, clean: bool },
}
