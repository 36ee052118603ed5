//! Wire codec for the `~m~<len>~m~<payload>` framing.
//!
//! Outbound calls are compact JSON envelopes `{"m":<method>,"p":<params>}`
//! prefixed with their UTF-8 byte length. Inbound buffers may hold any number
//! of concatenated frames; they are split on the header pattern and every
//! payload is decoded on its own. A payload that does not decode becomes an
//! empty [`Frame`] so one corrupt frame never costs the rest of the batch.
//!
//! The declared length is not used to bound decoding. A payload containing the
//! header pattern would be split in two; slicing by length instead would change
//! behaviour against the live service, so splitting is kept as is.
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FeedError;
use crate::method::Method;
use crate::result::Result;

/// Literal that opens and closes a frame header.
pub const HEADER_MARK: &str = "~m~";
/// Prefix of heartbeat payloads that must be echoed back to the peer.
pub const HEARTBEAT_MARK: &str = "~h~";

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~m~[0-9]+~m~").expect("frame header pattern is valid"));

/// One decoded protocol message.
///
/// `Frame::default()` is the empty record that stands in for an undecodable
/// payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Frame {
    /// Method tag, absent on server hello and other untagged envelopes.
    #[serde(rename = "m", default)]
    pub method: Option<String>,
    /// Positional parameters.
    #[serde(rename = "p", default)]
    pub params: Vec<Value>,
}

impl Frame {
    /// Known method of this frame, if it has one.
    pub fn method(&self) -> Option<Method> {
        self.method.as_deref().and_then(Method::parse)
    }

    /// Parameter at `index`.
    pub fn param(&self, index: usize) -> Option<&Value> {
        self.params.get(index)
    }

    /// `true` for the empty record.
    pub fn is_empty(&self) -> bool {
        self.method.is_none() && self.params.is_empty()
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    m: &'a str,
    p: &'a [Value],
}

/// Wraps an already serialized payload in the length header.
pub fn frame(payload: &str) -> String {
    format!("{HEADER_MARK}{}{HEADER_MARK}{payload}", payload.len())
}

/// Encodes a call into a complete wire frame.
pub fn encode(method: Method, params: &[Value]) -> Result<String> {
    let payload = serde_json::to_string(&Envelope {
        m: method.as_ref(),
        p: params,
    })?;
    Ok(frame(&payload))
}

/// Splits a raw buffer into candidate payloads.
///
/// Leading text before the first header is kept only when it is not empty.
pub fn split_payloads(buf: &str) -> Vec<&str> {
    let mut parts = HEADER.split(buf);
    let mut payloads = Vec::new();
    if let Some(first) = parts.next() {
        if !first.is_empty() {
            payloads.push(first);
        }
    }
    payloads.extend(parts);
    payloads
}

/// Decodes a single payload.
///
/// Only a JSON object is a record; arrays and scalars are rejected even when
/// their shape would fit the envelope positionally.
pub fn decode_payload(payload: &str) -> Result<Frame> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| FeedError::Protocol(e.to_string()))?;
    if !value.is_object() {
        return Err(FeedError::Protocol("payload is not a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| FeedError::Protocol(e.to_string()))
}

/// Decodes every frame in `buf`, in order, substituting the empty record for
/// payloads that fail to decode.
pub fn decode(buf: &str) -> Vec<Frame> {
    split_payloads(buf)
        .into_iter()
        .map(|payload| {
            decode_payload(payload).unwrap_or_else(|e| {
                if !is_heartbeat(payload) {
                    debug!("Dropping undecodable frame ({}): {:.80}", e, payload);
                }
                Frame::default()
            })
        })
        .collect()
}

/// `true` when the payload is a keep-alive heartbeat.
pub fn is_heartbeat(payload: &str) -> bool {
    payload.starts_with(HEARTBEAT_MARK)
}
