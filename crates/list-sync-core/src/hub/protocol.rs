//! Hub Wire Protocol
//!
//! JSON hub protocol: every record is a JSON document terminated by the
//! ASCII record separator (0x1E). The client only consumes invocations of
//! the three item events; it never invokes anything on the hub.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::CacheEvent;
use crate::error::{SyncError, SyncResult};
use crate::item::{Item, ItemId};

pub const RECORD_SEPARATOR: char = '\u{1e}';

/// How often the client pings so the hub does not time it out
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

const INVOCATION: u8 = 1;
const PING: u8 = 6;
const CLOSE: u8 = 7;

/// Server-confirmed change pushed to every connected client
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    Created(Item),
    Updated(Item),
    Deleted(ItemId),
}

impl From<HubEvent> for CacheEvent {
    fn from(event: HubEvent) -> Self {
        match event {
            HubEvent::Created(item) => CacheEvent::Created(item),
            HubEvent::Updated(item) => CacheEvent::Updated(item),
            HubEvent::Deleted(id) => CacheEvent::Deleted(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HubFrame {
    Event(HubEvent),
    Ping,
    Close {
        error: Option<String>,
        allow_reconnect: bool,
    },
    /// Valid frame the client has no use for
    Ignored,
}

// ========================
// Negotiation
// ========================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiateResponse {
    #[serde(default)]
    pub connection_token: Option<String>,
    #[serde(default)]
    pub connection_id: Option<String>,
    /// Redirect to another endpoint (e.g. a managed hub service)
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `{hub}/negotiate?negotiateVersion=1`, keeping any query on the hub URL
pub fn negotiate_url(hub_url: &str) -> String {
    let (path, query) = split_query(hub_url);
    let mut url = format!("{}/negotiate?negotiateVersion=1", path.trim_end_matches('/'));
    if let Some(query) = query {
        url.push('&');
        url.push_str(query);
    }
    url
}

/// Resolve the WebSocket URL from the hub URL, the negotiation result and
/// the page origin (used when the hub URL is relative).
pub fn websocket_url(hub_url: &str, negotiated: &NegotiateResponse, origin: &str) -> SyncResult<String> {
    if let Some(error) = &negotiated.error {
        return Err(SyncError::Connection(format!("negotiation refused: {}", error)));
    }
    let base = negotiated.url.as_deref().unwrap_or(hub_url);
    let absolute = if base.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), base)
    } else {
        base.to_string()
    };

    let mut url = if let Some(rest) = absolute.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = absolute.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if absolute.starts_with("ws://") || absolute.starts_with("wss://") {
        absolute
    } else {
        return Err(SyncError::Connection(format!("unsupported hub url: {}", base)));
    };

    let id = negotiated
        .connection_token
        .as_deref()
        .or(negotiated.connection_id.as_deref());
    for (key, value) in [("id", id), ("access_token", negotiated.access_token.as_deref())] {
        if let Some(value) = value {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(key);
            url.push('=');
            url.extend(utf8_percent_encode(value, NON_ALPHANUMERIC));
        }
    }
    Ok(url)
}

fn split_query(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

// ========================
// Handshake
// ========================

pub fn handshake_request() -> String {
    format!("{}{}", r#"{"protocol":"json","version":1}"#, RECORD_SEPARATOR)
}

pub fn ping_frame() -> String {
    format!("{{\"type\":{}}}{}", PING, RECORD_SEPARATOR)
}

/// How the hub answered the handshake
#[derive(Debug, Clone, PartialEq)]
pub enum Handshake<'a> {
    /// Accepted; carries whatever frames followed the reply in the same message
    Accepted(&'a str),
    /// The hub sent a close record instead of a reply
    Closed {
        error: Option<String>,
        allow_reconnect: bool,
    },
}

/// Consume the handshake reply at the head of `payload`.
///
/// A reply is an object without a `type` field. Anything typed is a frame:
/// a close is reported as [`Handshake::Closed`], other frames are an error.
pub fn parse_handshake(payload: &str) -> SyncResult<Handshake<'_>> {
    let (reply, rest) = payload
        .split_once(RECORD_SEPARATOR)
        .ok_or_else(|| SyncError::Connection("incomplete handshake reply".into()))?;

    #[derive(Deserialize)]
    struct HandshakeReply {
        #[serde(default, rename = "type")]
        kind: Option<u8>,
        #[serde(default)]
        error: Option<String>,
    }

    let parsed: HandshakeReply = serde_json::from_str(reply).map_err(SyncError::connection)?;
    if parsed.kind.is_some() {
        return match decode_frame(reply)? {
            HubFrame::Close {
                error,
                allow_reconnect,
            } => Ok(Handshake::Closed {
                error,
                allow_reconnect,
            }),
            other => Err(SyncError::Connection(format!(
                "expected handshake reply, got {:?}",
                other
            ))),
        };
    }
    match parsed.error {
        Some(error) => Err(SyncError::Connection(format!("handshake refused: {}", error))),
        None => Ok(Handshake::Accepted(rest)),
    }
}

// ========================
// Frames
// ========================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    arguments: Vec<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    allow_reconnect: Option<bool>,
}

/// Decode every record in one socket message. Malformed records and
/// unknown targets are logged and skipped.
pub fn decode_frames(payload: &str) -> Vec<HubFrame> {
    payload
        .split(RECORD_SEPARATOR)
        .filter(|record| !record.trim().is_empty())
        .filter_map(|record| match decode_frame(record) {
            Ok(frame) => Some(frame),
            Err(error) => {
                warn!(%error, "skipping malformed hub frame");
                None
            }
        })
        .collect()
}

pub fn decode_frame(record: &str) -> SyncResult<HubFrame> {
    let raw: RawFrame = serde_json::from_str(record).map_err(SyncError::connection)?;
    match raw.kind {
        INVOCATION => {
            let target = raw
                .target
                .ok_or_else(|| SyncError::Connection("invocation without target".into()))?;
            let argument = raw.arguments.into_iter().next().unwrap_or(Value::Null);
            decode_invocation(&target, argument)
        }
        PING => Ok(HubFrame::Ping),
        CLOSE => Ok(HubFrame::Close {
            error: raw.error,
            allow_reconnect: raw.allow_reconnect.unwrap_or(false),
        }),
        other => {
            debug!(kind = other, "ignoring hub frame");
            Ok(HubFrame::Ignored)
        }
    }
}

/// "item-created", "ItemCreated" and "item_created" all name the same event
fn canonical_target(target: &str) -> String {
    target
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn decode_invocation(target: &str, argument: Value) -> SyncResult<HubFrame> {
    let item = |argument: Value| serde_json::from_value::<Item>(argument).map_err(SyncError::connection);
    let event = match canonical_target(target).as_str() {
        "itemcreated" => HubEvent::Created(item(argument)?),
        "itemupdated" => HubEvent::Updated(item(argument)?),
        "itemdeleted" => HubEvent::Deleted(deleted_id(argument)?),
        _ => {
            debug!(event = target, "ignoring unknown hub event");
            return Ok(HubFrame::Ignored);
        }
    };
    Ok(HubFrame::Event(event))
}

/// Deletions carry the bare id, or an object with an `id` field
fn deleted_id(argument: Value) -> SyncResult<ItemId> {
    let argument = match argument {
        Value::Object(mut fields) => fields.remove("id").unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(argument).map_err(SyncError::connection)
}
