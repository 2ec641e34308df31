use crate::domain::order::OrderRequest;
use crate::domain::ports::{
    BrowserInfo, CrossDomainBridge, CrossDomainMessage, HttpRequest, MessageListener, Navigator,
    OrderApi, Platform, RequestOptions, Response, WindowRef,
};
use crate::error::{ButtonError, Result};
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{OnceCell, oneshot};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fixed answers to every platform probe.
#[derive(Debug, Clone)]
pub struct StaticPlatform {
    pub ie_intranet: bool,
    pub eligible: bool,
    pub recognized_browser: bool,
    pub browser: BrowserInfo,
    pub device: bool,
    pub child_frame: bool,
}

impl Default for StaticPlatform {
    fn default() -> Self {
        Self {
            ie_intranet: false,
            eligible: true,
            recognized_browser: true,
            browser: BrowserInfo {
                name: Some("chrome".to_string()),
                version: Some("120".to_string()),
            },
            device: false,
            child_frame: false,
        }
    }
}

impl Platform for StaticPlatform {
    fn is_ie_intranet(&self) -> bool {
        self.ie_intranet
    }

    fn is_eligible(&self) -> bool {
        self.eligible
    }

    fn is_recognized_browser(&self) -> bool {
        self.recognized_browser
    }

    fn browser(&self) -> BrowserInfo {
        self.browser.clone()
    }

    fn is_device(&self) -> bool {
        self.device
    }

    fn is_child_frame(&self) -> bool {
        self.child_frame
    }
}

/// Shared, ordered record of side effects.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        lock(&self.0).push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.0).clone()
    }
}

struct Registration {
    name: String,
    domain: String,
    sender: oneshot::Sender<CrossDomainMessage>,
}

/// An in-process bridge that answers registered listeners once it is opened.
///
/// Replies are delivered a single time, to listeners registered before the
/// bridge opened. A listener with no matching reply never resolves.
pub struct LoopbackBridge {
    supported: bool,
    replies: Vec<(String, Value)>,
    open_error: Option<String>,
    latency: Duration,
    listeners: Mutex<Vec<Registration>>,
    opened: OnceCell<Result<()>>,
    opens: AtomicUsize,
    registrations: AtomicUsize,
}

impl LoopbackBridge {
    pub fn new() -> Self {
        Self {
            supported: true,
            replies: Vec::new(),
            open_error: None,
            latency: Duration::ZERO,
            listeners: Mutex::new(Vec::new()),
            opened: OnceCell::new(),
            opens: AtomicUsize::new(0),
            registrations: AtomicUsize::new(0),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Posts `data` as a `name` message when the bridge opens.
    pub fn reply(mut self, name: &str, data: Value) -> Self {
        self.replies.push((name.to_string(), data));
        self
    }

    pub fn fail_open(mut self, reason: &str) -> Self {
        self.open_error = Some(reason.to_string());
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    async fn connect(&self, domain: &str) -> Result<()> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(reason) = &self.open_error {
            return Err(ButtonError::Bridge(reason.clone()));
        }

        let mut listeners = lock(&self.listeners);
        for (name, data) in &self.replies {
            let (matching, rest): (Vec<_>, Vec<_>) = listeners
                .drain(..)
                .partition(|r| &r.name == name && r.domain == domain);
            *listeners = rest;
            for registration in matching {
                let _ = registration.sender.send(CrossDomainMessage {
                    origin: domain.to_string(),
                    data: data.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for LoopbackBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrossDomainBridge for LoopbackBridge {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn once(&self, name: &str, domain: &str) -> MessageListener {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = oneshot::channel();
        lock(&self.listeners).push(Registration {
            name: name.to_string(),
            domain: domain.to_string(),
            sender,
        });
        async move {
            receiver
                .await
                .map_err(|_| ButtonError::Bridge("bridge closed before message arrived".to_string()))
        }
        .boxed()
    }

    async fn open_bridge(&self, _url: &str, domain: &str) -> Result<()> {
        self.opened
            .get_or_init(|| self.connect(domain))
            .await
            .clone()
    }
}

/// Records redirects in a [`Journal`] instead of navigating.
pub struct RecordingNavigator {
    journal: Journal,
    latency: Duration,
}

impl RecordingNavigator {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            latency: Duration::ZERO,
        }
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn redirect(&self, url: &str, window: WindowRef) -> Result<()> {
        if !self.latency.is_zero() {
            self.journal.record(format!("redirect:start {window} {url}"));
            tokio::time::sleep(self.latency).await;
        }
        self.journal.record(format!("redirect {window} {url}"));
        Ok(())
    }
}

/// Serves canned JSON bodies keyed by url; anything else is a 404.
#[derive(Default)]
pub struct InMemoryHttp {
    routes: HashMap<String, Value>,
    requests: Mutex<Vec<RequestOptions>>,
}

impl InMemoryHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, body: Value) -> Self {
        self.routes.insert(url.to_string(), body);
        self
    }

    pub fn requests(&self) -> Vec<RequestOptions> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl HttpRequest for InMemoryHttp {
    async fn request(&self, options: RequestOptions) -> Result<Response> {
        let response = match self.routes.get(&options.url) {
            Some(body) => Response {
                status: 200,
                body: body.clone(),
            },
            None => Response {
                status: 404,
                body: json!({ "error": "not_found" }),
            },
        };
        lock(&self.requests).push(options);
        Ok(response)
    }
}

/// Issues sequential order ids and keeps every request it received.
#[derive(Default)]
pub struct InMemoryOrderApi {
    orders: Mutex<Vec<(String, OrderRequest)>>,
}

impl InMemoryOrderApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> Vec<(String, OrderRequest)> {
        lock(&self.orders).clone()
    }
}

#[async_trait]
impl OrderApi for InMemoryOrderApi {
    async fn create_order(&self, client_id: &str, order: OrderRequest) -> Result<String> {
        if client_id.is_empty() {
            return Err(ButtonError::Configuration(
                "Client ID required to create an order".to_string(),
            ));
        }
        let mut orders = lock(&self.orders);
        let id = format!("ORDER-{:04}", orders.len() + 1);
        orders.push((client_id.to_string(), order));
        Ok(id)
    }
}
