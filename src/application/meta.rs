use crate::config::Config;
use crate::domain::meta::{BridgeConnection, BridgeState, META_MESSAGE, MetaFrameData, MetaState};
use crate::domain::ports::{BridgeRef, PlatformRef};
use crate::error::{ButtonError, Result};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::runtime::Handle;
use tracing::{debug, warn};

static GLOBAL: OnceLock<Arc<MetaBridge>> = OnceLock::new();

type Lookup = Shared<BoxFuture<'static, Result<MetaFrameData>>>;

/// Lazily opens the meta bridge and resolves its payload exactly once.
///
/// The lookup runs on its own task, so concurrent and later callers all
/// observe the outcome of the first lookup, failures included, even when the
/// caller that started it stops waiting.
pub struct MetaBridge {
    platform: PlatformRef,
    bridge: BridgeRef,
    connection: Arc<Mutex<BridgeConnection>>,
    lookup: OnceLock<Lookup>,
}

impl MetaBridge {
    pub fn new(config: &Config, platform: PlatformRef, bridge: BridgeRef) -> Self {
        Self {
            platform,
            bridge,
            connection: Arc::new(Mutex::new(BridgeConnection {
                url: config.meta_url.clone(),
                domain: config.meta_domain.clone(),
                state: BridgeState::Unopened,
            })),
            lookup: OnceLock::new(),
        }
    }

    /// Makes `bridge` the process-wide instance. Fails if one is already installed.
    pub fn install(bridge: MetaBridge) -> Result<Arc<MetaBridge>> {
        let mut installed = false;
        let global = GLOBAL.get_or_init(|| {
            installed = true;
            Arc::new(bridge)
        });
        if !installed {
            return Err(ButtonError::Configuration(
                "Meta bridge is already installed".to_string(),
            ));
        }
        Ok(global.clone())
    }

    pub fn global() -> Option<Arc<MetaBridge>> {
        GLOBAL.get().cloned()
    }

    /// The process-wide instance, created from these ports on first use.
    pub fn global_or_init(config: &Config, platform: PlatformRef, bridge: BridgeRef) -> Arc<MetaBridge> {
        GLOBAL
            .get_or_init(|| {
                debug!(url = %config.meta_url, "creating process-wide meta bridge");
                Arc::new(MetaBridge::new(config, platform, bridge))
            })
            .clone()
    }

    pub async fn open_meta(&self) -> Result<MetaFrameData> {
        self.lookup()?.await
    }

    fn lookup(&self) -> Result<Lookup> {
        if let Some(lookup) = self.lookup.get() {
            return Ok(lookup.clone());
        }
        let runtime = Handle::try_current().map_err(|_| {
            ButtonError::Configuration("Meta lookup requires a tokio runtime".to_string())
        })?;

        let lookup = self.lookup.get_or_init(|| {
            let lookup = load(
                self.platform.clone(),
                self.bridge.clone(),
                self.connection.clone(),
            )
            .boxed()
            .shared();
            runtime.spawn(lookup.clone().map(|_| ()));
            lookup
        });
        Ok(lookup.clone())
    }

    pub fn connection(&self) -> BridgeConnection {
        lock(&self.connection).clone()
    }

    pub fn state(&self) -> MetaState {
        match self.lookup.get().and_then(Shared::peek) {
            Some(Ok(_)) => MetaState::Resolved,
            Some(Err(_)) => MetaState::Failed,
            None => match self.connection().state {
                BridgeState::Unopened => MetaState::Unopened,
                BridgeState::Opening => MetaState::Opening,
                BridgeState::Open => MetaState::AwaitingMessage,
                BridgeState::Failed => MetaState::Failed,
            },
        }
    }
}

fn lock(connection: &Mutex<BridgeConnection>) -> MutexGuard<'_, BridgeConnection> {
    connection.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn load(
    platform: PlatformRef,
    bridge: BridgeRef,
    connection: Arc<Mutex<BridgeConnection>>,
) -> Result<MetaFrameData> {
    if platform.is_ie_intranet() {
        debug!("ie intranet mode, skipping meta bridge");
        return Ok(MetaFrameData::ie_intranet());
    }

    if !bridge.is_supported() {
        warn!("meta bridge requested without bridge support");
        return Err(ButtonError::BridgeUnsupported);
    }

    let BridgeConnection { url, domain, .. } = lock(&connection).clone();
    let listener = bridge.once(META_MESSAGE, &domain);

    lock(&connection).state = BridgeState::Opening;
    if let Err(err) = bridge.open_bridge(&url, &domain).await {
        warn!(error = %err, %url, "failed to open meta bridge");
        lock(&connection).state = BridgeState::Failed;
        return Err(err);
    }
    lock(&connection).state = BridgeState::Open;
    debug!(%url, "meta bridge open, awaiting meta message");

    // No deadline: if the frame never posts, the lookup stays pending.
    let message = listener.await?;
    let data: MetaFrameData = serde_json::from_value(message.data)?;
    debug!(origin = %message.origin, eligible = data.iframe_eligible, "meta resolved");
    Ok(data)
}
