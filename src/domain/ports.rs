use super::order::OrderRequest;
use super::telemetry::TrackEvent;
use crate::error::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Browser name and version as reported by the platform probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Ambient facts about the embedding page.
pub trait Platform: Send + Sync {
    fn is_ie_intranet(&self) -> bool;
    fn is_eligible(&self) -> bool;
    fn is_recognized_browser(&self) -> bool;
    fn browser(&self) -> BrowserInfo;
    fn is_device(&self) -> bool;
    fn is_child_frame(&self) -> bool;
}

/// Fire-and-forget logging and tracking with an explicit flush.
pub trait Telemetry: Send + Sync {
    fn info(&self, event: &str);
    fn warn(&self, event: &str);
    fn error(&self, event: &str);
    fn track(&self, event: TrackEvent);
    /// Pushes everything buffered so far; returns once the buffer is drained.
    fn flush(&self);
}

/// A message received over a cross-domain channel.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossDomainMessage {
    pub origin: String,
    pub data: Value,
}

/// Resolves when the awaited message arrives.
pub type MessageListener = BoxFuture<'static, Result<CrossDomainMessage>>;

#[async_trait]
pub trait CrossDomainBridge: Send + Sync {
    /// Whether the page can open a bridge at all.
    fn is_supported(&self) -> bool;

    /// Registers a one-shot listener for `name` messages from `domain`.
    fn once(&self, name: &str, domain: &str) -> MessageListener;

    /// Opens the bridge frame. Opening an already open or opening bridge reuses it.
    async fn open_bridge(&self, url: &str, domain: &str) -> Result<()>;
}

/// Target of a page redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WindowRef {
    #[default]
    Top,
    Parent,
    Current,
    Named(String),
}

impl fmt::Display for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowRef::Top => f.write_str("top"),
            WindowRef::Parent => f.write_str("parent"),
            WindowRef::Current => f.write_str("self"),
            WindowRef::Named(name) => f.write_str(name),
        }
    }
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn redirect(&self, url: &str, window: WindowRef) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    pub method: Method,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub json: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

/// Generic network request capability exposed to merchant callbacks.
#[async_trait]
pub trait HttpRequest: Send + Sync {
    async fn request(&self, options: RequestOptions) -> Result<Response>;
}

#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Creates an order and returns its identifier.
    async fn create_order(&self, client_id: &str, order: OrderRequest) -> Result<String>;
}

pub type PlatformRef = Arc<dyn Platform>;
pub type TelemetryRef = Arc<dyn Telemetry>;
pub type BridgeRef = Arc<dyn CrossDomainBridge>;
pub type NavigatorRef = Arc<dyn Navigator>;
pub type HttpRequestRef = Arc<dyn HttpRequest>;
pub type OrderApiRef = Arc<dyn OrderApi>;

/// Bundle of collaborators a button is wired to.
#[derive(Clone)]
pub struct Ports {
    pub platform: PlatformRef,
    pub telemetry: TelemetryRef,
    pub bridge: BridgeRef,
    pub navigator: NavigatorRef,
    pub request: HttpRequestRef,
    pub orders: OrderApiRef,
}
