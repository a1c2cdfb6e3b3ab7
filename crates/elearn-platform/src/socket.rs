//! `SocketConnector` over the browser `WebSocket` API.
//!
//! Browser callbacks are bridged into an unbounded channel; the receiving
//! half is the `SocketEvents` stream handed back to the caller. The stream
//! ends after the close event, or when the handle is dropped.

use futures::channel::mpsc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use elearn_core::ports::{SocketConnector, SocketEvents, SocketHandle};
use elearn_types::{chat::SocketEvent, ClientError, Result};

#[derive(Default)]
pub struct BrowserSocketConnector;

impl BrowserSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

impl SocketConnector for BrowserSocketConnector {
    fn connect(&self, url: &str) -> Result<(Box<dyn SocketHandle>, SocketEvents)> {
        let (handle, events) = BrowserSocket::open(url)?;
        Ok((Box::new(handle), Box::pin(events)))
    }
}

/// A live `WebSocket` plus the callbacks feeding its event channel.
/// Dropping it detaches the callbacks.
pub struct BrowserSocket {
    ws: WebSocket,
    _onopen: Closure<dyn FnMut(Event)>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(Event)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
}

impl BrowserSocket {
    pub fn open(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<SocketEvent>)> {
        let ws = WebSocket::new(url)
            .map_err(|e| ClientError::Socket(format!("Failed to open {}: {:?}", url, e)))?;

        let (tx, rx) = mpsc::unbounded::<SocketEvent>();

        let tx_open = tx.clone();
        let onopen = Closure::wrap(Box::new(move |_event: Event| {
            let _ = tx_open.unbounded_send(SocketEvent::Opened);
        }) as Box<dyn FnMut(Event)>);

        let tx_message = tx.clone();
        let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => {
                    let _ = tx_message.unbounded_send(SocketEvent::Frame(text));
                }
                None => log::warn!("Ignoring non-text WebSocket frame"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);

        let tx_error = tx.clone();
        let error_url = url.to_string();
        let onerror = Closure::wrap(Box::new(move |_event: Event| {
            let _ = tx_error.unbounded_send(SocketEvent::Error(format!(
                "WebSocket error on {}",
                error_url
            )));
        }) as Box<dyn FnMut(Event)>);

        let tx_close = tx;
        let onclose = Closure::wrap(Box::new(move |event: CloseEvent| {
            let _ = tx_close.unbounded_send(SocketEvent::Closed {
                code: event.code(),
                reason: event.reason(),
                clean: event.was_clean(),
            });
            tx_close.close_channel();
        }) as Box<dyn FnMut(CloseEvent)>);

        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        let socket = Self {
            ws,
            _onopen: onopen,
            _onmessage: onmessage,
            _onerror: onerror,
            _onclose: onclose,
        };
        Ok((socket, rx))
    }
}

impl SocketHandle for BrowserSocket {
    fn send_text(&self, text: &str) -> Result<()> {
        self.ws
            .send_with_str(text)
            .map_err(|e| ClientError::Socket(format!("send failed: {:?}", e)))
    }

    fn close(&self) {
        let state = self.ws.ready_state();
        if state == WebSocket::CLOSING || state == WebSocket::CLOSED {
            return;
        }
        if let Err(e) = self.ws.close() {
            log::warn!("WebSocket close failed: {:?}", e);
        }
    }
}

impl Drop for BrowserSocket {
    fn drop(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        self.close();
    }
}
