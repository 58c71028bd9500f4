//! Wallet messaging envelope.
//!
//! Every message exchanged with the wallet's content script has the
//! shape `{ route: {wallet, source, target}, data: {serialNumber, method, data} }`.
//! Outbound requests are routed `SDK → contentscript`; responses come
//! back `contentscript → SDK`. The shape is fixed by the extension.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wallet tag carried in every route.
pub const WALLET: &str = "qtum";
/// Route endpoint name of this SDK.
pub const SDK: &str = "SDK";
/// Route endpoint name of the extension's content script.
pub const CONTENT_SCRIPT: &str = "contentscript";

/// Length of a correlation id.
pub const CORRELATION_ID_LEN: usize = 32;

/// Opaque token matching a response to its pending request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// 32 characters drawn uniformly from `[a-zA-Z0-9]`.
    pub fn random() -> Self {
        let id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CORRELATION_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Routing header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub wallet: String,
    pub source: String,
    pub target: String,
}

impl Route {
    /// Route of requests leaving the SDK.
    pub fn outbound() -> Self {
        Self {
            wallet: WALLET.to_string(),
            source: SDK.to_string(),
            target: CONTENT_SCRIPT.to_string(),
        }
    }

    /// Route of responses coming back from the wallet.
    pub fn inbound() -> Self {
        Self {
            wallet: WALLET.to_string(),
            source: CONTENT_SCRIPT.to_string(),
            target: SDK.to_string(),
        }
    }

    /// Exact match on all three fields of the inbound route.
    pub fn is_inbound(&self) -> bool {
        self.wallet == WALLET && self.source == CONTENT_SCRIPT && self.target == SDK
    }
}

/// Message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData {
    #[serde(rename = "serialNumber")]
    pub serial_number: CorrelationId,
    /// Wallet method name; responses may omit it.
    #[serde(default)]
    pub method: String,
    /// Method payload or response value.
    #[serde(default)]
    pub data: Value,
}

/// Complete message as posted on the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub route: Route,
    pub data: EnvelopeData,
}

impl Envelope {
    /// Build an outbound request.
    pub fn request(id: CorrelationId, method: &str, payload: Value) -> Self {
        Self {
            route: Route::outbound(),
            data: EnvelopeData {
                serial_number: id,
                method: method.to_string(),
                data: payload,
            },
        }
    }

    /// Build an inbound response, as the wallet would send it.
    pub fn response(id: CorrelationId, method: &str, result: Value) -> Self {
        Self {
            route: Route::inbound(),
            data: EnvelopeData {
                serial_number: id,
                method: method.to_string(),
                data: result,
            },
        }
    }

    /// Parse a raw channel message if it is a wallet response.
    ///
    /// Returns `None` for anything that lacks a route, carries a route
    /// other than `qtum / contentscript → SDK`, or lacks a body.
    pub fn parse_inbound(message: &Value) -> Option<Self> {
        let route: Route = serde_json::from_value(message.get("route")?.clone()).ok()?;
        if !route.is_inbound() {
            return None;
        }
        let data: EnvelopeData = serde_json::from_value(message.get("data")?.clone()).ok()?;
        Some(Self { route, data })
    }

    pub fn to_value(&self) -> Value {
        // Envelope only holds strings and JSON values.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
