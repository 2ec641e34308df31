use super::decorator::{CallbackDecorator, PaymentCallback, resolve};
use crate::domain::callback::{CallbackSpec, PaymentContext};
use crate::domain::order::OrderRequest;
use crate::domain::ports::{HttpRequestRef, OrderApiRef, RequestOptions, Response};
use crate::domain::telemetry::{ContextType, FptiState, FptiTransition};
use crate::error::{ButtonError, Result};
use futures::FutureExt;
use futures::future::{self, BoxFuture, Shared};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

/// Capabilities offered to the merchant's payment callback.
#[derive(Clone)]
pub struct PaymentActions {
    request: HttpRequestRef,
    orders: OrderApiRef,
    client_id: Option<String>,
}

impl PaymentActions {
    pub fn new(request: HttpRequestRef, orders: OrderApiRef, client_id: Option<String>) -> Self {
        Self {
            request,
            orders,
            client_id,
        }
    }

    pub async fn request(&self, options: RequestOptions) -> Result<Response> {
        self.request.request(options).await
    }

    /// Creates an order under the configured client id and returns its id.
    pub async fn create_order(&self, order: OrderRequest) -> Result<String> {
        let client_id = self.client_id.as_deref().ok_or_else(|| {
            ButtonError::Configuration("Client ID required to create an order".to_string())
        })?;
        self.orders.create_order(client_id, order).await
    }
}

/// The shared outcome of one payment-callback invocation.
///
/// Clones observe the same result; the first settlement is final.
#[derive(Clone)]
pub struct TokenFuture(Shared<BoxFuture<'static, Result<String>>>);

impl TokenFuture {
    pub fn is_pending(&self) -> bool {
        self.0.peek().is_none()
    }

    /// True when both handles refer to the same invocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Future for TokenFuture {
    type Output = Result<String>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().0.poll_unpin(cx)
    }
}

/// Decorates the "produce a payment token" callback.
pub struct PaymentTokenBroker {
    original: PaymentCallback,
    actions: PaymentActions,
    decorator: CallbackDecorator,
    timeout: Option<Duration>,
    current: Mutex<Option<TokenFuture>>,
}

impl PaymentTokenBroker {
    pub fn new(
        original: Option<PaymentCallback>,
        actions: PaymentActions,
        decorator: CallbackDecorator,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self {
            original: resolve(CallbackSpec::PAYMENT, original)?,
            actions,
            decorator,
            timeout,
            current: Mutex::new(None),
        })
    }

    /// Returns the in-flight token future, invoking the merchant callback only
    /// when nothing is pending.
    ///
    /// The invocation is driven on a spawned task so that it settles even if
    /// every caller drops its handle. Outside a tokio runtime the returned
    /// future fails with a configuration error instead.
    pub fn request_token(&self) -> TokenFuture {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = current.as_ref().filter(|token| token.is_pending()) {
            debug!("payment already in flight, reusing token future");
            return pending.clone();
        }

        let Ok(runtime) = Handle::try_current() else {
            let err = ButtonError::Configuration("Payment requires a tokio runtime".to_string());
            return TokenFuture(future::ready(Err(err)).boxed().shared());
        };

        let token = self.invoke(&runtime);
        *current = Some(token.clone());
        token
    }

    fn invoke(&self, runtime: &Handle) -> TokenFuture {
        let mut pending = (self.original)((PaymentContext::default(), self.actions.clone()));

        if let Some(limit) = self.timeout {
            let timed = tokio::time::timeout(limit, pending);
            pending = async move {
                timed
                    .await
                    .map_err(|_| ButtonError::Timeout(limit.as_millis() as u64))?
            }
            .boxed();
        }

        let decorator = self.decorator.clone();
        let shared = async move {
            let token = match pending.await? {
                Some(token) if !token.is_empty() => token,
                _ => {
                    decorator.telemetry().error("no_token_passed_to_payment");
                    return Err(ButtonError::MissingToken);
                }
            };

            let event = decorator
                .event(FptiState::Checkout, FptiTransition::ReceivePayment)
                .with_context(ContextType::EcToken, token.clone());
            decorator.telemetry().track(event);
            decorator.telemetry().flush();

            Ok(token)
        }
        .boxed()
        .shared();

        runtime.spawn(shared.clone().map(|_| ()));
        TokenFuture(shared)
    }
}
