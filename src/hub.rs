//! Hub Client
//!
//! Browser transport for the real-time channel. Negotiates through the
//! host, opens the WebSocket, performs the JSON handshake and forwards
//! pushed events to the registered handler. Reconnect timing and state
//! transitions are decided by [`HubChannel`].

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo_timers::callback::{Interval, Timeout};
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use list_sync_core::hub::protocol::{
    decode_frames, handshake_request, parse_handshake, ping_frame, websocket_url, Handshake,
    KEEPALIVE_INTERVAL,
};
use list_sync_core::{
    ClientConfig, ConnectionState, HubChannel, HubEvent, HubFrame, HubHandlers, SyncError,
};

use crate::commands;

/// Snapshot reported to the UI after every transition
#[derive(Debug, Clone, PartialEq)]
pub struct HubStatus {
    pub state: ConnectionState,
    pub error: Option<String>,
    /// Failed attempts since the last successful connection
    pub failures: usize,
    /// Set once per successful reconnection; pushes may have been missed
    pub resync: bool,
}

type StatusCallback = Rc<dyn Fn(HubStatus)>;

/// Socket plus the JS callbacks bound to it
struct ActiveSocket {
    socket: WebSocket,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl Drop for ActiveSocket {
    fn drop(&mut self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onclose(None);
        let _ = self.socket.close();
    }
}

struct HubInner {
    config: ClientConfig,
    channel: RefCell<HubChannel>,
    handlers: HubHandlers,
    socket: RefCell<Option<ActiveSocket>>,
    keepalive: RefCell<Option<Interval>>,
    retry: RefCell<Option<Timeout>>,
    on_status: RefCell<Option<StatusCallback>>,
    /// Bumped per attempt; callbacks from older sockets are ignored
    attempt: Cell<u64>,
    handshaken: Cell<bool>,
}

impl Drop for HubInner {
    fn drop(&mut self) {
        self.handlers.clear();
    }
}

#[derive(Clone)]
pub struct HubClient {
    inner: Rc<HubInner>,
}

impl HubClient {
    pub fn new(config: ClientConfig) -> Self {
        let channel = HubChannel::new(&config);
        Self {
            inner: Rc::new(HubInner {
                config,
                channel: RefCell::new(channel),
                handlers: HubHandlers::new(),
                socket: RefCell::new(None),
                keepalive: RefCell::new(None),
                retry: RefCell::new(None),
                on_status: RefCell::new(None),
                attempt: Cell::new(0),
                handshaken: Cell::new(false),
            }),
        }
    }

    /// Register the push handler, replacing any previous one
    pub fn set_handler(&self, handler: impl Fn(HubEvent) + 'static) {
        self.inner.handlers.replace(handler);
    }

    pub fn on_status(&self, callback: impl Fn(HubStatus) + 'static) {
        *self.inner.on_status.borrow_mut() = Some(Rc::new(callback));
    }

    /// Connect unless already connecting or connected
    pub fn start(&self) {
        if !self.inner.channel.borrow_mut().request_connect() {
            return;
        }
        self.inner.publish(false);
        HubInner::open(&self.inner);
    }

    /// Close the socket, cancel any pending retry and unregister handlers
    pub fn stop(&self) {
        self.inner.channel.borrow_mut().stop();
        self.inner.attempt.set(self.inner.attempt.get() + 1);
        self.inner.retry.borrow_mut().take();
        self.inner.teardown_socket();
        self.inner.handlers.clear();
        self.inner.publish(false);
    }
}

impl HubInner {
    fn publish(&self, resync: bool) {
        let status = {
            let channel = self.channel.borrow();
            HubStatus {
                state: channel.state(),
                error: channel.last_error().map(|e| e.to_string()),
                failures: channel.consecutive_failures(),
                resync,
            }
        };
        let callback = self.on_status.borrow().clone();
        if let Some(callback) = callback {
            callback(status);
        }
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.attempt.get() == attempt
    }

    /// Drop the socket and keepalive outside the current JS callback
    fn teardown_socket(&self) {
        self.keepalive.borrow_mut().take();
        let retired = self.socket.borrow_mut().take();
        if retired.is_some() {
            spawn_local(async move {
                drop(retired);
            });
        }
    }

    fn open(this: &Rc<Self>) {
        let attempt = this.attempt.get() + 1;
        this.attempt.set(attempt);
        this.handshaken.set(false);
        let weak = Rc::downgrade(this);

        spawn_local(async move {
            let Some(hub_url) = weak.upgrade().map(|inner| inner.config.hub_url.clone()) else {
                return;
            };
            let negotiated = commands::negotiate_hub(&hub_url).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.is_current(attempt) {
                return;
            }
            let origin = web_sys::window()
                .and_then(|w| w.location().origin().ok())
                .unwrap_or_default();
            let url = match negotiated.and_then(|n| websocket_url(&hub_url, &n, &origin)) {
                Ok(url) => url,
                Err(e) => return HubInner::lost(&inner, attempt, e),
            };
            match WebSocket::new(&url) {
                Ok(socket) => {
                    tracing::debug!(%url, attempt, "hub socket opening");
                    let active = HubInner::bind(&inner, socket, attempt);
                    *inner.socket.borrow_mut() = Some(active);
                }
                Err(e) => HubInner::lost(&inner, attempt, SyncError::connection(format!("{:?}", e))),
            }
        });
    }

    fn bind(this: &Rc<Self>, socket: WebSocket, attempt: u64) -> ActiveSocket {
        let weak = Rc::downgrade(this);
        let open_socket = socket.clone();
        let on_open = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            if let Err(e) = open_socket.send_with_str(&handshake_request()) {
                tracing::warn!(error = ?e, "hub handshake send failed");
            }
        });

        let message_weak = weak.clone();
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
            let Some(inner) = message_weak.upgrade() else {
                return;
            };
            if !inner.is_current(attempt) {
                return;
            }
            if let Some(payload) = ev.data().as_string() {
                HubInner::receive(&inner, attempt, &payload);
            }
        });

        let close_weak: Weak<Self> = weak;
        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
            let Some(inner) = close_weak.upgrade() else {
                return;
            };
            let error = SyncError::connection(format!("socket closed ({})", ev.code()));
            HubInner::lost(&inner, attempt, error);
        });

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        ActiveSocket {
            socket,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
        }
    }

    fn receive(this: &Rc<Self>, attempt: u64, payload: &str) {
        let frames = if this.handshaken.get() {
            payload
        } else {
            match parse_handshake(payload) {
                Ok(Handshake::Accepted(rest)) => {
                    this.handshaken.set(true);
                    let resync = this.channel.borrow_mut().connected();
                    this.start_keepalive();
                    this.publish(resync);
                    rest
                }
                Ok(Handshake::Closed {
                    error,
                    allow_reconnect,
                }) => return HubInner::closed(this, attempt, error, allow_reconnect),
                Err(e) => return HubInner::fail(this, attempt, e),
            }
        };

        for frame in decode_frames(frames) {
            match frame {
                HubFrame::Event(event) => {
                    this.handlers.dispatch(event);
                }
                HubFrame::Close {
                    error,
                    allow_reconnect,
                } => return HubInner::closed(this, attempt, error, allow_reconnect),
                HubFrame::Ping | HubFrame::Ignored => {}
            }
        }
    }

    /// Close record from the hub, before or after the handshake
    fn closed(this: &Rc<Self>, attempt: u64, error: Option<String>, allow_reconnect: bool) {
        if !this.is_current(attempt) {
            return;
        }
        this.attempt.set(attempt + 1);
        this.teardown_socket();
        let error = SyncError::connection(error.unwrap_or_else(|| "server closed the connection".to_string()));
        let delay = this.channel.borrow_mut().closed(error, allow_reconnect);
        this.publish(false);
        if let Some(delay) = delay {
            HubInner::schedule_retry(this, delay);
        }
    }

    /// Unrecoverable: retire the socket and stay disconnected
    fn fail(this: &Rc<Self>, attempt: u64, error: SyncError) {
        if !this.is_current(attempt) {
            return;
        }
        this.attempt.set(attempt + 1);
        this.teardown_socket();
        this.channel.borrow_mut().fail(error);
        this.publish(false);
    }

    fn start_keepalive(&self) {
        let socket = self.socket.borrow().as_ref().map(|active| active.socket.clone());
        let Some(socket) = socket else {
            return;
        };
        let millis = KEEPALIVE_INTERVAL.as_millis() as u32;
        let interval = Interval::new(millis, move || {
            let _ = socket.send_with_str(&ping_frame());
        });
        *self.keepalive.borrow_mut() = Some(interval);
    }

    /// Transient loss: retire the socket and schedule the next attempt
    fn lost(this: &Rc<Self>, attempt: u64, error: SyncError) {
        if !this.is_current(attempt) {
            return;
        }
        this.attempt.set(attempt + 1);
        this.teardown_socket();
        let delay = this.channel.borrow_mut().connection_lost(error);
        let Some(delay) = delay else {
            return;
        };
        this.publish(false);
        HubInner::schedule_retry(this, delay);
    }

    fn schedule_retry(this: &Rc<Self>, delay: Duration) {
        let weak = Rc::downgrade(this);
        let timeout = Timeout::new(delay.as_millis() as u32, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.channel.borrow_mut().begin_retry() {
                HubInner::open(&inner);
            }
        });
        *this.retry.borrow_mut() = Some(timeout);
    }
}
