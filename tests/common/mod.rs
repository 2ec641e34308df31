#![allow(dead_code)]

use paybutton::application::actions::{HostActions, action};
use paybutton::application::button::{ButtonBuilder, Button};
use paybutton::application::listener::AuthorizeListener;
use paybutton::application::meta::MetaBridge;
use paybutton::config::{Config, Env};
use paybutton::domain::ports::Ports;
use paybutton::infrastructure::in_memory::{
    InMemoryHttp, InMemoryOrderApi, Journal, LoopbackBridge, RecordingNavigator, StaticPlatform,
};
use paybutton::infrastructure::telemetry::BufferedTelemetry;
use std::sync::Arc;
use std::time::Duration;

/// In-memory ports plus handles to inspect what the button did with them.
pub struct Fixture {
    pub config: Config,
    pub telemetry: Arc<BufferedTelemetry>,
    pub bridge: Arc<LoopbackBridge>,
    pub orders: Arc<InMemoryOrderApi>,
    pub journal: Journal,
    pub ports: Ports,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(Env::Test, StaticPlatform::default(), LoopbackBridge::new(), Duration::ZERO)
    }

    pub fn with(
        env: Env,
        platform: StaticPlatform,
        bridge: LoopbackBridge,
        redirect_latency: Duration,
    ) -> Self {
        let mut config = Config::for_env(env);
        config.client_id = Some("client-test".to_string());

        let journal = Journal::default();
        let telemetry = Arc::new(BufferedTelemetry::new());
        let bridge = Arc::new(bridge);
        let orders = Arc::new(InMemoryOrderApi::new());
        let ports = Ports {
            platform: Arc::new(platform),
            telemetry: telemetry.clone(),
            bridge: bridge.clone(),
            navigator: Arc::new(RecordingNavigator::new(journal.clone()).latency(redirect_latency)),
            request: Arc::new(InMemoryHttp::new()),
            orders: orders.clone(),
        };

        Self {
            config,
            telemetry,
            bridge,
            orders,
            journal,
            ports,
        }
    }

    pub fn meta(&self) -> Arc<MetaBridge> {
        Arc::new(MetaBridge::new(
            &self.config,
            self.ports.platform.clone(),
            self.ports.bridge.clone(),
        ))
    }

    /// A builder isolated from the process-wide meta bridge and listener.
    pub fn builder(&self) -> ButtonBuilder {
        Button::builder(self.config.clone(), self.ports.clone())
            .meta(self.meta())
            .listener(AuthorizeListener::new())
    }
}

/// Host actions that record `restart` and `close` in `journal`.
pub fn host(journal: &Journal) -> HostActions {
    host_with_close_latency(journal, Duration::ZERO)
}

/// Like [`host`], but closing takes `latency` and records when it starts.
pub fn host_with_close_latency(journal: &Journal, latency: Duration) -> HostActions {
    let restarts = journal.clone();
    let closes = journal.clone();
    HostActions::new(
        action(move || {
            restarts.record("restart");
            async { Ok(()) }
        }),
        action(move || {
            let closes = closes.clone();
            async move {
                if !latency.is_zero() {
                    closes.record("close:start");
                    tokio::time::sleep(latency).await;
                }
                closes.record("close");
                Ok(())
            }
        }),
    )
}
