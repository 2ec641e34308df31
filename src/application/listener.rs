use std::sync::OnceLock;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedOrder {
    pub order_id: String,
}

/// Process-wide notification that an order has been authorized.
#[derive(Clone)]
pub struct AuthorizeListener {
    sender: broadcast::Sender<AuthorizedOrder>,
}

impl AuthorizeListener {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    /// The listener shared by every button in the process.
    pub fn global() -> &'static AuthorizeListener {
        static LISTENER: OnceLock<AuthorizeListener> = OnceLock::new();
        LISTENER.get_or_init(AuthorizeListener::new)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthorizedOrder> {
        self.sender.subscribe()
    }

    /// Fire-and-forget: having no subscribers is not an error.
    pub fn trigger(&self, order: AuthorizedOrder) {
        let _ = self.sender.send(order);
    }
}

impl Default for AuthorizeListener {
    fn default() -> Self {
        Self::new()
    }
}
