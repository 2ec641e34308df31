use super::actions::{ActionRewriter, AuthorizeHandler, CancelHandler, HostActions};
use super::decorator::{
    AuthorizeCallback, CallbackDecorator, CancelCallback, ClickCallback, ErrorCallback,
    PaymentCallback, RenderCallback,
};
use super::eligibility::EligibilityGate;
use super::listener::AuthorizeListener;
use super::meta::MetaBridge;
use super::payment::{PaymentActions, PaymentTokenBroker, TokenFuture};
use crate::config::Config;
use crate::domain::callback::{AuthorizeData, CancelData, ClickData};
use crate::domain::funding::{Funding, FundingConfig};
use crate::domain::ports::Ports;
use crate::error::Result;
use futures::future::BoxFuture;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// A random identifier in the `uid_xxxxxxxxxx` form used for sessions.
pub fn unique_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("uid_{suffix}")
}

/// Merchant-supplied callbacks; absent optional ones become no-ops.
#[derive(Clone, Default)]
pub struct MerchantCallbacks {
    pub on_render: Option<RenderCallback>,
    pub on_click: Option<ClickCallback>,
    pub payment: Option<PaymentCallback>,
    pub on_authorize: Option<AuthorizeCallback>,
    pub on_cancel: Option<CancelCallback>,
    pub on_error: Option<ErrorCallback>,
}

/// Per-instance properties.
#[derive(Debug, Clone)]
pub struct ButtonProps {
    pub session_id: Option<String>,
    pub button_session_id: Option<String>,
    pub source: Option<String>,
    pub funding: FundingConfig,
    pub commit: bool,
}

impl Default for ButtonProps {
    fn default() -> Self {
        Self {
            session_id: None,
            button_session_id: None,
            source: None,
            funding: FundingConfig::default(),
            commit: true,
        }
    }
}

type ChildHook = Box<dyn FnOnce(&Button) + Send>;

pub struct ButtonBuilder {
    config: Config,
    ports: Ports,
    props: ButtonProps,
    callbacks: MerchantCallbacks,
    meta: Option<Arc<MetaBridge>>,
    listener: Option<AuthorizeListener>,
    child_hook: Option<ChildHook>,
}

impl ButtonBuilder {
    pub fn props(mut self, props: ButtonProps) -> Self {
        self.props = props;
        self
    }

    pub fn callbacks(mut self, callbacks: MerchantCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Uses `meta` instead of the process-wide bridge.
    pub fn meta(mut self, meta: Arc<MetaBridge>) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn listener(mut self, listener: AuthorizeListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Runs once after creation when the button lives in a child frame.
    pub fn child_hook(mut self, hook: impl FnOnce(&Button) + Send + 'static) -> Self {
        self.child_hook = Some(Box::new(hook));
        self
    }

    /// Validates the environment and decorates every callback.
    pub fn create(self) -> Result<Button> {
        let Self {
            config,
            ports,
            props,
            callbacks,
            meta,
            listener,
            child_hook,
        } = self;

        let gate = EligibilityGate::new(ports.platform.clone(), ports.telemetry.clone());
        gate.validate()?;
        props.funding.validate()?;

        let session_id = props.session_id.clone().unwrap_or_else(unique_id);
        let button_session_id = props.button_session_id.clone().unwrap_or_else(unique_id);

        let decorator = CallbackDecorator::new(
            ports.platform.clone(),
            ports.telemetry.clone(),
            button_session_id.clone(),
            props.source.clone(),
        );
        let rewriter = ActionRewriter::new(
            decorator.clone(),
            gate,
            ports.navigator.clone(),
            ports.request.clone(),
            listener.unwrap_or_else(|| AuthorizeListener::global().clone()),
            callbacks.on_error,
        );
        let payment_actions = PaymentActions::new(
            ports.request.clone(),
            ports.orders.clone(),
            config.client_id.clone(),
        );

        let render = decorator.decorate_render(callbacks.on_render)?;
        let click = decorator.decorate_click(callbacks.on_click)?;
        let broker = PaymentTokenBroker::new(
            callbacks.payment,
            payment_actions,
            decorator,
            config.payment_timeout(),
        )?;
        let authorize = rewriter.decorate_authorize(callbacks.on_authorize)?;
        let cancel = rewriter.decorate_cancel(callbacks.on_cancel)?;

        let meta = meta.unwrap_or_else(|| {
            MetaBridge::global_or_init(&config, ports.platform.clone(), ports.bridge.clone())
        });

        let button = Button {
            config,
            ports,
            props,
            session_id,
            button_session_id,
            meta,
            render,
            click,
            broker,
            authorize,
            cancel,
            remembered: Mutex::new(Vec::new()),
        };

        if button.ports.platform.is_child_frame()
            && let Some(hook) = child_hook
        {
            debug!("running child frame setup");
            hook(&button);
        }

        Ok(button)
    }
}

/// One rendered pay button.
pub struct Button {
    config: Config,
    ports: Ports,
    props: ButtonProps,
    session_id: String,
    button_session_id: String,
    meta: Arc<MetaBridge>,
    render: RenderCallback,
    click: ClickCallback,
    broker: PaymentTokenBroker,
    authorize: AuthorizeHandler,
    cancel: CancelHandler,
    remembered: Mutex<Vec<String>>,
}

impl Button {
    pub fn builder(config: Config, ports: Ports) -> ButtonBuilder {
        ButtonBuilder {
            config,
            ports,
            props: ButtonProps::default(),
            callbacks: MerchantCallbacks::default(),
            meta: None,
            listener: None,
            child_hook: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn button_session_id(&self) -> &str {
        &self.button_session_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn platform(&self) -> &'static str {
        if self.ports.platform.is_device() {
            "mobile"
        } else {
            "desktop"
        }
    }

    /// Parameters forwarded to the button frame.
    pub fn query_params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("sessionID", self.session_id.clone());
        params.insert("buttonSessionID", self.button_session_id.clone());
        params.insert("env", self.config.env.as_str().to_string());
        params.insert("platform", self.platform().to_string());
        params.insert("locale.x", self.config.locale_tag());
        params.insert("commit", self.props.commit.to_string());
        if let Some(stage) = self.config.stage() {
            params.insert("stage", stage.to_string());
        }
        if let Some(stage_domain) = self.config.stage_domain() {
            params.insert("stageDomain", stage_domain.to_string());
        }
        params
    }

    pub fn render(&self) -> BoxFuture<'static, Result<()>> {
        (self.render)(())
    }

    pub fn click(&self, data: Option<ClickData>) -> BoxFuture<'static, Result<()>> {
        (self.click)(data)
    }

    pub fn payment(&self) -> TokenFuture {
        self.broker.request_token()
    }

    pub fn authorize(&self, data: AuthorizeData, actions: HostActions) -> BoxFuture<'static, Result<()>> {
        (self.authorize)(data, actions)
    }

    pub fn cancel(&self, data: CancelData, actions: HostActions) -> BoxFuture<'static, Result<()>> {
        (self.cancel)(data, actions)
    }

    pub fn meta(&self) -> &Arc<MetaBridge> {
        &self.meta
    }

    /// Funding lists for the checkout frame, including remembered sources.
    ///
    /// A failed meta lookup leaves only the sources remembered locally.
    pub async fn funding(&self) -> Funding {
        let mut remembered = match self.meta.open_meta().await {
            Ok(meta) => meta.remembered_funding,
            Err(err) => {
                debug!(error = %err, "meta lookup failed");
                self.ports.telemetry.warn("remembered_funding_unavailable");
                Vec::new()
            }
        };

        let local = self.remembered.lock().unwrap_or_else(PoisonError::into_inner);
        for source in local.iter() {
            if !remembered.contains(source) {
                remembered.push(source.clone());
            }
        }

        Funding {
            allowed: self.props.funding.allowed.clone(),
            disallowed: self.props.funding.disallowed.clone(),
            remembered,
        }
    }

    pub fn remember(&self, sources: &[&str]) {
        let mut remembered = self.remembered.lock().unwrap_or_else(PoisonError::into_inner);
        for source in sources {
            if !remembered.iter().any(|s| s == source) {
                remembered.push(source.to_string());
            }
        }
    }
}
