//! Chat channel: one socket per conversation, `Connecting → Open → Closed`.
//!
//! `ChatChannel` owns a single socket and enforces the send guards.
//! `ChatView` is what a mounted chat screen holds: the per-target message
//! logs plus at most one live channel. Selecting another target closes the
//! current channel before the next one is opened. There is no automatic
//! reconnect.

use std::collections::HashMap;
use std::rc::Rc;

use elearn_types::{
    chat::{
        ChannelState, ChatMessage, ChatTarget, ConnectionId, InboundFrame, OutboundFrame,
        SocketEvent,
    },
    config::ClientConfig,
    event::ClientEvent,
    ClientError, Result,
};

use crate::event_bus::EventBus;
use crate::ports::{SocketConnector, SocketEvents, SocketHandle};
use crate::session::TokenStore;

// ─── Conversation ────────────────────────────────────────────

/// Append-only message log for one chat target
#[derive(Debug, Clone)]
pub struct Conversation {
    pub target: ChatTarget,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(target: ChatTarget) -> Self {
        Self {
            target,
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ─── ChatChannel ─────────────────────────────────────────────

pub struct ChatChannel {
    id: ConnectionId,
    target: ChatTarget,
    state: ChannelState,
    socket: Box<dyn SocketHandle>,
}

impl ChatChannel {
    /// Open a socket to `url`. The channel starts in `Connecting`.
    pub fn connect(
        connector: &dyn SocketConnector,
        url: &str,
        target: ChatTarget,
        id: ConnectionId,
    ) -> Result<(Self, SocketEvents)> {
        let (socket, events) = connector.connect(url)?;
        let channel = Self {
            id,
            target,
            state: ChannelState::Connecting,
            socket,
        };
        Ok((channel, events))
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn target(&self) -> &ChatTarget {
        &self.target
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// Apply a transport event. Returns the parsed message for inbound frames.
    pub fn on_event(&mut self, event: SocketEvent) -> Option<ChatMessage> {
        match event {
            SocketEvent::Opened => {
                if self.state == ChannelState::Connecting {
                    log::info!("WebSocket connection opened ({})", self.target);
                    self.state = ChannelState::Open;
                }
                None
            }
            SocketEvent::Frame(text) => {
                if self.state != ChannelState::Open {
                    log::warn!("Dropping frame on {} channel ({})", self.state, self.target);
                    return None;
                }
                match serde_json::from_str::<InboundFrame>(&text) {
                    Ok(frame) => Some(frame.into()),
                    Err(e) => {
                        log::warn!("Unparsable chat frame from {}: {}", self.target, e);
                        None
                    }
                }
            }
            SocketEvent::Error(message) => {
                log::error!("Chat socket error ({}): {}", self.target, message);
                None
            }
            SocketEvent::Closed { code, reason, clean } => {
                if self.state != ChannelState::Closed {
                    if clean {
                        log::info!("Chat socket closed ({}): {} {}", self.target, code, reason);
                    } else {
                        log::error!(
                            "Chat socket closed unexpectedly ({}): {} {}",
                            self.target,
                            code,
                            reason
                        );
                    }
                }
                self.state = ChannelState::Closed;
                None
            }
        }
    }

    /// Send `body` as `{"message": body}`. Only allowed while open and only
    /// for bodies that are non-empty after trimming.
    pub fn send(&self, body: &str) -> Result<()> {
        if self.state != ChannelState::Open {
            log::error!("WebSocket is not open. Cannot send message.");
            return Err(ClientError::ChannelNotOpen {
                state: self.state.to_string(),
            });
        }
        if body.trim().is_empty() {
            log::error!("Cannot send an empty message");
            return Err(ClientError::EmptyMessage);
        }
        let frame = serde_json::to_string(&OutboundFrame {
            message: body.to_string(),
        })?;
        self.socket.send_text(&frame)
    }

    /// Client-initiated close. No-op once closed.
    pub fn close(&mut self) {
        if self.state != ChannelState::Closed {
            self.socket.close();
            self.state = ChannelState::Closed;
        }
    }
}

impl Drop for ChatChannel {
    fn drop(&mut self) {
        self.close();
    }
}

// ─── ChatView ────────────────────────────────────────────────

/// State behind a mounted chat screen: every conversation opened so far and
/// the single live channel for the selected target.
pub struct ChatView {
    ws_base: String,
    connector: Rc<dyn SocketConnector>,
    tokens: TokenStore,
    bus: EventBus,
    conversations: HashMap<ChatTarget, Conversation>,
    channel: Option<ChatChannel>,
    next_id: u64,
}

impl ChatView {
    pub fn new(
        config: &ClientConfig,
        connector: Rc<dyn SocketConnector>,
        tokens: TokenStore,
        bus: EventBus,
    ) -> Self {
        Self {
            ws_base: config.ws_base(),
            connector,
            tokens,
            bus,
            conversations: HashMap::new(),
            channel: None,
            next_id: 1,
        }
    }

    /// `<ws-base>/ws/chat/<target>/`, plus `?token=<access>` for direct chats.
    pub fn endpoint(&self, target: &ChatTarget) -> String {
        let mut url = format!(
            "{}/ws/chat/{}/",
            self.ws_base,
            urlencoding::encode(target.name())
        );
        if target.sends_token() {
            if let Some(token) = self.tokens.access_token() {
                url.push_str("?token=");
                url.push_str(&urlencoding::encode(&token));
            }
        }
        url
    }

    /// Make `target` the active conversation and connect to it.
    ///
    /// Returns the new connection's id and event stream; the caller pumps the
    /// stream into `handle_event`. Returns `None` when `target` already has a
    /// live channel.
    pub fn select(&mut self, target: ChatTarget) -> Result<Option<(ConnectionId, SocketEvents)>> {
        if let Some(ch) = &self.channel {
            if ch.target() == &target && ch.state() != ChannelState::Closed {
                return Ok(None);
            }
        }

        // Teardown precedes setup.
        self.close();

        self.conversations
            .entry(target.clone())
            .or_insert_with(|| Conversation::new(target.clone()));

        let id = ConnectionId(self.next_id);
        self.next_id += 1;

        let url = self.endpoint(&target);
        log::info!("Connecting chat socket for {}", target);
        let (channel, events) =
            ChatChannel::connect(self.connector.as_ref(), &url, target.clone(), id).map_err(|e| {
                log::error!("Failed to open chat socket for {}: {}", target, e);
                self.bus.emit(ClientEvent::error(format!("Could not connect to chat: {}", e)));
                e
            })?;

        self.channel = Some(channel);
        self.bus.emit(ClientEvent::ChannelState {
            target,
            state: ChannelState::Connecting,
        });
        Ok(Some((id, events)))
    }

    /// Feed a transport event from connection `id`. Events from superseded
    /// connections are ignored. Returns true when a message was appended.
    pub fn handle_event(&mut self, id: ConnectionId, event: SocketEvent) -> bool {
        let Some(channel) = self.channel.as_mut().filter(|ch| ch.id() == id) else {
            log::debug!("Ignoring event from stale connection {:?}", id);
            return false;
        };

        let before = channel.state();
        let message = channel.on_event(event);
        let after = channel.state();
        let target = channel.target().clone();

        if before != after {
            self.bus.emit(ClientEvent::ChannelState {
                target: target.clone(),
                state: after,
            });
        }

        match message {
            Some(message) => {
                self.conversations
                    .entry(target.clone())
                    .or_insert_with(|| Conversation::new(target.clone()))
                    .push(message.clone());
                self.bus.emit(ClientEvent::ChatMessage { target, message });
                true
            }
            None => false,
        }
    }

    /// Send on the active channel.
    pub fn send(&self, body: &str) -> Result<()> {
        let Some(channel) = &self.channel else {
            log::error!("WebSocket is not open. Cannot send message.");
            self.bus
                .emit(ClientEvent::error("Message not sent: the chat is not connected."));
            return Err(ClientError::ChannelNotOpen {
                state: ChannelState::Closed.to_string(),
            });
        };
        let result = channel.send(body);
        match &result {
            Err(ClientError::EmptyMessage) => {
                self.bus.emit(ClientEvent::error("Cannot send an empty message"));
            }
            Err(ClientError::ChannelNotOpen { .. }) => {
                self.bus
                    .emit(ClientEvent::error("Message not sent: the chat is not connected."));
            }
            _ => {}
        }
        result
    }

    /// Close the active channel (view teardown). Logs are kept.
    pub fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            let was_live = channel.state() != ChannelState::Closed;
            channel.close();
            if was_live {
                self.bus.emit(ClientEvent::ChannelState {
                    target: channel.target().clone(),
                    state: ChannelState::Closed,
                });
            }
        }
    }

    /// State of the active channel; `Closed` when there is none.
    pub fn state(&self) -> ChannelState {
        self.channel
            .as_ref()
            .map(|ch| ch.state())
            .unwrap_or(ChannelState::Closed)
    }

    pub fn conversation(&self, target: &ChatTarget) -> Option<&Conversation> {
        self.conversations.get(target)
    }
}

impl Drop for ChatView {
    fn drop(&mut self) {
        self.close();
    }
}
