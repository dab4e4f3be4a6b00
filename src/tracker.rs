use gazeplay_core::{EventSink, ReadyState, Transport, TransportError, TransportEvent};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

struct SocketHandlers {
    _open: Closure<dyn FnMut(web::Event)>,
    _message: Closure<dyn FnMut(web::MessageEvent)>,
    _error: Closure<dyn FnMut(web::Event)>,
    _close: Closure<dyn FnMut(web::CloseEvent)>,
}

/// Tracker stream over a browser `WebSocket`.
#[derive(Default)]
pub struct WebSocketTransport {
    socket: Option<web::WebSocket>,
    handlers: Option<SocketHandlers>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Silence and close the previous socket so stale events never reach the sink.
    fn detach(&mut self) {
        if let Some(socket) = self.socket.take() {
            socket.set_onopen(None);
            socket.set_onmessage(None);
            socket.set_onerror(None);
            socket.set_onclose(None);
            _ = socket.close();
        }
        if let Some(handlers) = self.handlers.take() {
            spawn_local(async move {
                drop(handlers);
            });
        }
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, url: &str, sink: EventSink) -> Result<(), TransportError> {
        self.detach();
        let socket = web::WebSocket::new(url).map_err(|e| TransportError::Open {
            url: url.to_string(),
            reason: format!("{:?}", e),
        })?;

        let s = sink.clone();
        let open = Closure::wrap(Box::new(move |_: web::Event| {
            s(TransportEvent::Opened);
        }) as Box<dyn FnMut(_)>);

        let s = sink.clone();
        let message = Closure::wrap(Box::new(move |ev: web::MessageEvent| {
            match ev.data().as_string() {
                Some(text) => s(TransportEvent::Message(text)),
                None => log::debug!("[tracker] non-text frame ignored"),
            }
        }) as Box<dyn FnMut(_)>);

        let s = sink.clone();
        let error = Closure::wrap(Box::new(move |_: web::Event| {
            s(TransportEvent::Error("websocket error".to_string()));
        }) as Box<dyn FnMut(_)>);

        let s = sink;
        let close = Closure::wrap(Box::new(move |ev: web::CloseEvent| {
            log::debug!("[tracker] close code={} reason={:?}", ev.code(), ev.reason());
            s(TransportEvent::Closed);
        }) as Box<dyn FnMut(_)>);

        socket.set_onopen(Some(open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(message.as_ref().unchecked_ref()));
        socket.set_onerror(Some(error.as_ref().unchecked_ref()));
        socket.set_onclose(Some(close.as_ref().unchecked_ref()));

        self.socket = Some(socket);
        self.handlers = Some(SocketHandlers {
            _open: open,
            _message: message,
            _error: error,
            _close: close,
        });
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        match self.socket.as_ref().map(|s| s.ready_state()) {
            Some(web::WebSocket::CONNECTING) => ReadyState::Connecting,
            Some(web::WebSocket::OPEN) => ReadyState::Open,
            Some(web::WebSocket::CLOSING) => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }

    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotOpen)?;
        socket
            .send_with_str(text)
            .map_err(|e| TransportError::Send(format!("{:?}", e)))
    }

    fn close(&mut self) {
        self.detach();
    }
}
