//! Lifecycle of the tracker stream.
//!
//! ```text
//!   Connecting ──open──▶ Connected
//!       │                    │
//!  open failed          error / close
//!       ▼                    ▼
//!   Disconnected ◀───────────┘
//!       │
//!   after reconnect delay ──▶ Connecting
//! ```
//!
//! While Connected the tracker stream feeds the hub and a keep-alive ping runs;
//! everywhere else the pointer fallback is live and one retry is pending.

use crate::constants::{DEFAULT_TRACKER_URL, PING_INTERVAL_MS, RECONNECT_DELAY_MS};
use crate::error::TransportError;
use crate::hub::{GazeHub, SampleSource};
use crate::protocol::{parse_inbound, Inbound, Outbound};
use crate::scheduler::{Scheduler, TaskHandle, TaskSet};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Connected => "Eye Tracker Connected",
            ConnectionState::Disconnected => "Eye Tracker Disconnected (Using Mouse)",
        }
    }
}

/// Readiness reported by the underlying transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Error(String),
    Closed,
}

pub type EventSink = Rc<dyn Fn(TransportEvent)>;

/// Duplex text stream to the tracker.
///
/// Implementations deliver events through the sink given to `open`, and never
/// from inside `open`, `send` or `close` themselves.
pub trait Transport {
    fn open(&mut self, url: &str, sink: EventSink) -> Result<(), TransportError>;
    fn ready_state(&self) -> ReadyState;
    fn send(&mut self, text: &str) -> Result<(), TransportError>;
    fn close(&mut self);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    pub url: String,
    pub ping_interval_ms: u32,
    pub reconnect_delay_ms: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TRACKER_URL.to_string(),
            ping_interval_ms: PING_INTERVAL_MS,
            reconnect_delay_ms: RECONNECT_DELAY_MS,
        }
    }
}

type StateListener = Rc<dyn Fn(ConnectionState)>;

struct Inner {
    config: TrackerConfig,
    transport: Box<dyn Transport>,
    scheduler: Rc<dyn Scheduler>,
    hub: GazeHub,
    state: ConnectionState,
    attempts: u32,
    ping: Option<TaskHandle>,
    reconnect: Option<TaskHandle>,
    tasks: TaskSet,
    listeners: Vec<StateListener>,
    shut_down: bool,
}

#[derive(Clone)]
pub struct ConnectionSupervisor {
    inner: Rc<RefCell<Inner>>,
}

impl ConnectionSupervisor {
    pub fn new(
        config: TrackerConfig,
        transport: Box<dyn Transport>,
        scheduler: Rc<dyn Scheduler>,
        hub: GazeHub,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                config,
                transport,
                tasks: TaskSet::new(scheduler.clone()),
                scheduler,
                hub,
                state: ConnectionState::Connecting,
                attempts: 0,
                ping: None,
                reconnect: None,
                listeners: Vec::new(),
                shut_down: false,
            })),
        }
    }

    /// First connection attempt. Later attempts are scheduled internally.
    pub fn start(&self) {
        if self.inner.borrow().attempts > 0 {
            log::warn!("[tracker] supervisor already started");
            return;
        }
        connect(&self.inner);
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.borrow().state
    }

    pub fn attempts(&self) -> u32 {
        self.inner.borrow().attempts
    }

    pub fn on_state_change(&self, listener: impl Fn(ConnectionState) + 'static) {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    /// Tear the connection down for good: no ping, no further retries.
    pub fn shutdown(&self) {
        let hub = {
            let mut st = self.inner.borrow_mut();
            if st.shut_down {
                return;
            }
            st.shut_down = true;
            st.ping = None;
            st.reconnect = None;
            let cancelled = st.tasks.cancel_all();
            st.transport.close();
            log::info!("[tracker] shut down ({} task(s) cancelled)", cancelled);
            st.hub.clone()
        };
        hub.activate(SampleSource::Fallback);
        set_state(&self.inner, ConnectionState::Disconnected);
    }
}

fn connect(inner: &Rc<RefCell<Inner>>) {
    let sink = event_sink(Rc::downgrade(inner));
    let result = {
        let mut st = inner.borrow_mut();
        if st.shut_down {
            return;
        }
        if let Some(h) = st.reconnect.take() {
            st.tasks.release(h);
        }
        st.attempts += 1;
        let url = st.config.url.clone();
        log::info!("[tracker] connecting to {} (attempt {})", url, st.attempts);
        st.transport.open(&url, sink)
    };
    set_state(inner, ConnectionState::Connecting);

    if let Err(e) = result {
        log::warn!("[tracker] {}", e);
        disconnect(inner);
    }
}

fn event_sink(weak: Weak<RefCell<Inner>>) -> EventSink {
    Rc::new(move |event| {
        if let Some(inner) = weak.upgrade() {
            handle_event(&inner, event);
        }
    })
}

fn handle_event(inner: &Rc<RefCell<Inner>>, event: TransportEvent) {
    if inner.borrow().shut_down {
        return;
    }
    match event {
        TransportEvent::Opened => on_open(inner),
        TransportEvent::Message(text) => on_message(inner, &text),
        TransportEvent::Error(reason) => {
            log::warn!("[tracker] stream error: {}", reason);
            disconnect(inner);
        }
        TransportEvent::Closed => {
            log::info!("[tracker] stream closed");
            disconnect(inner);
        }
    }
}

fn on_open(inner: &Rc<RefCell<Inner>>) {
    let hub = {
        let mut st = inner.borrow_mut();
        if st.state == ConnectionState::Connected {
            return;
        }
        log::info!("[tracker] connected to {}", st.config.url);
        let weak = Rc::downgrade(inner);
        let period = st.config.ping_interval_ms;
        let handle = st.scheduler.set_interval(
            period,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    send_ping(&inner);
                }
            }),
        );
        st.ping = Some(st.tasks.track(handle));
        st.hub.clone()
    };
    hub.activate(SampleSource::Stream);
    set_state(inner, ConnectionState::Connected);
}

fn send_ping(inner: &Rc<RefCell<Inner>>) {
    let mut st = inner.borrow_mut();
    if st.transport.ready_state() != ReadyState::Open {
        log::trace!("[tracker] ping skipped, stream not open");
        return;
    }
    if let Err(e) = st.transport.send(&Outbound::Ping.to_json()) {
        log::warn!("[tracker] ping failed: {}", e);
    }
}

fn on_message(inner: &Rc<RefCell<Inner>>, text: &str) {
    let (hub, now) = {
        let st = inner.borrow();
        (st.hub.clone(), st.scheduler.now_ms())
    };
    match parse_inbound(text, now) {
        Ok(Inbound::Gaze(sample)) => {
            hub.ingest(&sample);
        }
        Ok(Inbound::Pong) => log::trace!("[tracker] pong"),
        Ok(Inbound::Ignored) => log::trace!("[tracker] message without coordinates ignored"),
        Err(e) => log::warn!("[tracker] {}", e),
    }
}

fn disconnect(inner: &Rc<RefCell<Inner>>) {
    let hub = {
        let mut st = inner.borrow_mut();
        if st.state == ConnectionState::Disconnected {
            return;
        }
        if let Some(h) = st.ping.take() {
            st.tasks.cancel(h);
        }
        st.hub.clone()
    };
    hub.activate(SampleSource::Fallback);
    set_state(inner, ConnectionState::Disconnected);
    schedule_reconnect(inner);
}

fn schedule_reconnect(inner: &Rc<RefCell<Inner>>) {
    let weak = Rc::downgrade(inner);
    let mut st = inner.borrow_mut();
    if st.shut_down || st.reconnect.is_some() {
        return;
    }
    let delay = st.config.reconnect_delay_ms;
    log::info!("[tracker] retrying in {} ms", delay);
    let handle = st.scheduler.set_timeout(
        delay,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                connect(&inner);
            }
        }),
    );
    st.reconnect = Some(st.tasks.track(handle));
}

fn set_state(inner: &Rc<RefCell<Inner>>, next: ConnectionState) {
    let listeners = {
        let mut st = inner.borrow_mut();
        if st.state == next {
            return;
        }
        log::debug!("[tracker] {:?} -> {:?}", st.state, next);
        st.state = next;
        st.listeners.clone()
    };
    for listener in listeners {
        listener(next);
    }
}
