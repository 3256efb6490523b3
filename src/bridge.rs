//! Bridge wire contract
//!
//! A development server pushes edited documents to the running app. Two payload dialects
//! exist:
//!
//! - socket: `{ "layoutName": "login.json", "layout": <document> }`, where the document is an
//!   embedded JSON value, document text, or base64 of the document bytes. Any file extension
//!   on the name is dropped.
//! - raw stream: the payload is the complete new document and its top-level `name` is the
//!   layout it replaces.
//!
//! Decoded updates are published on an [`UpdateChannel`]; layouts pick them up from there.

use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use thiserror::Error;

use crate::hot_reload::{LayoutUpdate, UpdateChannel};
use crate::report::Report;

pub const KEY_SOCKET_NAME: &str = "layoutName";
pub const KEY_SOCKET_LAYOUT: &str = "layout";
pub const KEY_RAW_NAME: &str = "name";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bridge payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bridge payload has no '{0}' field")]
    MissingField(&'static str),

    #[error("layout payload is neither a document nor base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("layout payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("unsupported layout value for '{0}'")]
    UnsupportedLayout(String),
}

/// Wire dialect of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireDialect {
    Socket,
    Raw,
}

/// Decode either dialect, telling them apart by the socket name key
pub fn decode_message(payload: &str) -> Result<(WireDialect, LayoutUpdate), BridgeError> {
    let value: Value = serde_json::from_str(payload)?;
    if value.get(KEY_SOCKET_NAME).is_some() {
        Ok((WireDialect::Socket, decode_socket(&value)?))
    } else {
        Ok((WireDialect::Raw, decode_raw(payload, &value)?))
    }
}

fn decode_socket(value: &Value) -> Result<LayoutUpdate, BridgeError> {
    let name = value
        .get(KEY_SOCKET_NAME)
        .and_then(Value::as_str)
        .ok_or(BridgeError::MissingField(KEY_SOCKET_NAME))?;
    let layout = value
        .get(KEY_SOCKET_LAYOUT)
        .ok_or(BridgeError::MissingField(KEY_SOCKET_LAYOUT))?;
    let document = match layout {
        Value::Object(_) => serde_json::to_string(layout)?,
        Value::String(text) => document_text(text)?,
        _ => return Err(BridgeError::UnsupportedLayout(name.to_string())),
    };
    Ok(LayoutUpdate::new(strip_extension(name), document))
}

fn decode_raw(payload: &str, value: &Value) -> Result<LayoutUpdate, BridgeError> {
    let name = value
        .get(KEY_RAW_NAME)
        .and_then(Value::as_str)
        .ok_or(BridgeError::MissingField(KEY_RAW_NAME))?;
    Ok(LayoutUpdate::new(name, payload))
}

/// Document text as sent, or decoded from base64
fn document_text(text: &str) -> Result<String, BridgeError> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('<') {
        return Ok(text.to_string());
    }
    let bytes = STANDARD.decode(text.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// `login.json` names the layout `login`
fn strip_extension(name: &str) -> String {
    Path::new(name).with_extension("").to_string_lossy().into_owned()
}

/// Message sent back to the bridge for one report
pub fn encode_report(report: &Report) -> String {
    serde_json::json!({
        "message": report.message,
        "level": report.severity.label(),
    })
    .to_string()
}

/// Publishes decoded payloads on an update channel
#[derive(Clone)]
pub struct Bridge {
    channel: Arc<dyn UpdateChannel>,
}

impl Bridge {
    pub fn new(channel: Arc<dyn UpdateChannel>) -> Self {
        Self { channel }
    }

    /// Decode `payload` and publish it; returns how many layouts were listening
    pub fn dispatch(&self, payload: &str) -> Result<usize, BridgeError> {
        let (dialect, update) = decode_message(payload)?;
        log::debug!(
            "bridge {:?} update for '{}' ({} bytes)",
            dialect,
            update.layout_name,
            update.document.len()
        );
        Ok(self.channel.publish(&update.channel(), update))
    }
}
