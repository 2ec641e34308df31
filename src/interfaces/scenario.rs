use super::csv::scenario_reader::{EventType, ScenarioEvent};
use crate::application::actions::{AuthorizeActions, CancelActions, HostActions, action};
use crate::application::button::{Button, ButtonProps, MerchantCallbacks};
use crate::application::decorator::callback;
use crate::application::listener::AuthorizeListener;
use crate::application::meta::MetaBridge;
use crate::application::payment::PaymentActions;
use crate::config::Config;
use crate::domain::callback::{AuthorizeData, CancelData, ClickData, PaymentContext};
use crate::domain::order::{Amount, OrderRequest};
use crate::domain::ports::Ports;
use crate::error::{ButtonError, Result};
use crate::infrastructure::in_memory::Journal;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Drives a button through scripted lifecycle events, playing both the host
/// framework and a merchant integration.
pub struct Simulator {
    button: Button,
    current: Arc<Mutex<ScenarioEvent>>,
    host: HostActions,
}

impl Simulator {
    pub fn new(config: Config, ports: Ports, props: ButtonProps, journal: Journal) -> Result<Self> {
        let current = Arc::new(Mutex::new(ScenarioEvent::new(EventType::Render)));

        let script = current.clone();
        let payment = callback(move |(_, actions): (PaymentContext, PaymentActions)| {
            let event = script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            async move {
                match (event.token, event.amount) {
                    (Some(token), _) => Ok(Some(token)),
                    (None, Some(amount)) => {
                        let order = OrderRequest::new(Amount::new(amount)?, "USD");
                        actions.create_order(order).await.map(Some)
                    }
                    (None, None) => Ok::<_, ButtonError>(None),
                }
            }
        });

        let on_authorize = callback(|(data, actions): (AuthorizeData, AuthorizeActions)| async move {
            match data.return_url {
                Some(_) => actions.redirect(None, None).await,
                None => Ok(()),
            }
        });

        let on_cancel = callback(|(data, actions): (CancelData, CancelActions)| async move {
            match data.cancel_url {
                Some(url) => actions.redirect(&url, None).await,
                None => Ok(()),
            }
        });

        let callbacks = MerchantCallbacks {
            payment: Some(payment),
            on_authorize: Some(on_authorize),
            on_cancel: Some(on_cancel),
            ..Default::default()
        };

        let restarts = journal.clone();
        let closes = journal;
        let host = HostActions::new(
            action(move || {
                restarts.record("restart");
                async { Ok(()) }
            }),
            action(move || {
                closes.record("close");
                async { Ok(()) }
            }),
        );

        let meta = MetaBridge::new(&config, ports.platform.clone(), ports.bridge.clone());
        let button = Button::builder(config, ports)
            .props(props)
            .meta(Arc::new(meta))
            .listener(AuthorizeListener::new())
            .callbacks(callbacks)
            .create()?;

        Ok(Self {
            button,
            current,
            host,
        })
    }

    pub fn button(&self) -> &Button {
        &self.button
    }

    pub async fn process(&self, event: ScenarioEvent) -> Result<()> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = event.clone();
        debug!(event = ?event.r#type, "processing scenario event");

        match event.r#type {
            EventType::Render => self.button.render().await,
            EventType::Click => {
                let data = ClickData {
                    funding_source: event.funding,
                    card: None,
                };
                self.button.click(Some(data)).await
            }
            EventType::Payment => self.button.payment().await.map(|_| ()),
            EventType::Authorize => {
                let data = AuthorizeData {
                    order_id: event.order.unwrap_or_default(),
                    payer_id: None,
                    return_url: event.return_url,
                };
                self.button.authorize(data, self.host.clone()).await
            }
            EventType::Cancel => {
                let data = CancelData {
                    order_id: event.order.unwrap_or_default(),
                    cancel_url: event.return_url,
                };
                self.button.cancel(data, self.host.clone()).await
            }
            EventType::Meta => {
                let meta = self.button.meta().open_meta().await?;
                debug!(
                    eligible = meta.iframe_eligible,
                    reason = %meta.iframe_eligible_reason,
                    "meta resolved"
                );
                Ok(())
            }
        }
    }
}
