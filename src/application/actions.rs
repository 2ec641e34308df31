//! Action handles for the authorize and cancel callbacks.
//!
//! The host hands over a plain `HostActions` value. `ActionRewriter` builds a
//! fresh `AuthorizeActions` or `CancelActions` around it, overriding
//! `restart`, `redirect` and `request` so they behave across frame boundaries.
//! The host value itself is never modified.

use super::decorator::{AuthorizeCallback, CallbackDecorator, CancelCallback, ErrorCallback, resolve};
use super::eligibility::EligibilityGate;
use super::listener::{AuthorizeListener, AuthorizedOrder};
use crate::domain::callback::{AuthorizeData, CallbackSpec, CancelData};
use crate::domain::ports::{HttpRequestRef, NavigatorRef, RequestOptions, Response, WindowRef};
use crate::domain::telemetry::{FptiState, FptiTransition};
use crate::error::{ButtonError, Result};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// A host-side operation such as `close` or `restart`.
pub type Action = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Decorated authorize entry point called by the host.
pub type AuthorizeHandler =
    Arc<dyn Fn(AuthorizeData, HostActions) -> BoxFuture<'static, Result<()>> + Send + Sync>;
/// Decorated cancel entry point called by the host.
pub type CancelHandler =
    Arc<dyn Fn(CancelData, HostActions) -> BoxFuture<'static, Result<()>> + Send + Sync>;

pub fn action<F, Fut>(f: F) -> Action
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Operations supplied by the host framework.
#[derive(Clone)]
pub struct HostActions {
    pub restart: Action,
    pub close: Action,
}

impl HostActions {
    pub fn new(restart: Action, close: Action) -> Self {
        Self { restart, close }
    }
}

enum NavigationState {
    Restarting(BoxFuture<'static, Result<()>>),
    Navigating,
}

/// Result of a restart.
///
/// Fails if the restart itself fails. Once the restart completes the page is
/// navigating away, and the future stays pending forever. Success is
/// uninhabited, so there is nothing to wait for.
#[must_use = "a restart only fails early; it never completes successfully"]
pub struct NavigationFuture {
    state: NavigationState,
}

impl NavigationFuture {
    fn new(restart: BoxFuture<'static, Result<()>>) -> Self {
        Self {
            state: NavigationState::Restarting(restart),
        }
    }

    pub fn is_navigating(&self) -> bool {
        matches!(self.state, NavigationState::Navigating)
    }
}

impl Future for NavigationFuture {
    type Output = Result<Infallible>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let NavigationState::Restarting(restart) = &mut this.state {
            match restart.poll_unpin(cx) {
                Poll::Ready(Ok(())) => this.state = NavigationState::Navigating,
                Poll::Ready(Err(err)) => return Poll::Ready(Err(err)),
                Poll::Pending => return Poll::Pending,
            }
        }
        Poll::Pending
    }
}

/// Actions handed to the merchant's authorize callback.
#[derive(Clone)]
pub struct AuthorizeActions {
    host: HostActions,
    navigator: NavigatorRef,
    request: HttpRequestRef,
    return_url: Option<String>,
}

impl AuthorizeActions {
    pub fn restart(&self) -> NavigationFuture {
        NavigationFuture::new((self.host.restart)())
    }

    /// Closes the checkout, then sends `window` (top by default) to `url`.
    ///
    /// Without an explicit url the authorize data's return url is used.
    pub async fn redirect(&self, url: Option<&str>, window: Option<WindowRef>) -> Result<()> {
        let url = url
            .map(str::to_string)
            .or_else(|| self.return_url.clone())
            .ok_or_else(|| {
                ButtonError::Configuration("No url passed to redirect".to_string())
            })?;
        self.close().await?;
        self.navigator
            .redirect(&url, window.unwrap_or_default())
            .await
    }

    pub async fn close(&self) -> Result<()> {
        (self.host.close)().await
    }

    pub async fn request(&self, options: RequestOptions) -> Result<Response> {
        self.request.request(options).await
    }
}

/// Actions handed to the merchant's cancel callback.
#[derive(Clone)]
pub struct CancelActions {
    host: HostActions,
    navigator: NavigatorRef,
}

impl CancelActions {
    /// Redirects and closes concurrently; done once both are.
    pub async fn redirect(&self, url: &str, window: Option<WindowRef>) -> Result<()> {
        let window = window.unwrap_or_default();
        future::try_join(self.navigator.redirect(url, window), self.close()).await?;
        Ok(())
    }

    pub async fn close(&self) -> Result<()> {
        (self.host.close)().await
    }
}

/// Decorates the authorize and cancel callbacks.
#[derive(Clone)]
pub struct ActionRewriter {
    decorator: CallbackDecorator,
    gate: EligibilityGate,
    navigator: NavigatorRef,
    request: HttpRequestRef,
    listener: AuthorizeListener,
    on_error: Option<ErrorCallback>,
}

impl ActionRewriter {
    pub fn new(
        decorator: CallbackDecorator,
        gate: EligibilityGate,
        navigator: NavigatorRef,
        request: HttpRequestRef,
        listener: AuthorizeListener,
        on_error: Option<ErrorCallback>,
    ) -> Self {
        Self {
            decorator,
            gate,
            navigator,
            request,
            listener,
            on_error,
        }
    }

    pub fn authorize_actions(&self, data: &AuthorizeData, host: HostActions) -> AuthorizeActions {
        AuthorizeActions {
            host,
            navigator: self.navigator.clone(),
            request: self.request.clone(),
            return_url: data.return_url.clone(),
        }
    }

    pub fn cancel_actions(&self, host: HostActions) -> CancelActions {
        CancelActions {
            host,
            navigator: self.navigator.clone(),
        }
    }

    pub fn decorate_authorize(&self, original: Option<AuthorizeCallback>) -> Result<AuthorizeHandler> {
        let original = resolve(CallbackSpec::AUTHORIZE, original)?;
        let rewriter = self.clone();

        Ok(Arc::new(move |data: AuthorizeData, host: HostActions| {
            let telemetry = rewriter.decorator.telemetry();
            telemetry.info("button_authorize");
            telemetry.track(
                rewriter
                    .decorator
                    .event(FptiState::Checkout, FptiTransition::CheckoutAuthorize),
            );
            if !rewriter.gate.is_eligible() {
                telemetry.info("button_authorize_ineligible");
            }
            rewriter.gate.check_recognized_browser("authorize");
            telemetry.flush();

            let actions = rewriter.authorize_actions(&data, host);
            rewriter.listener.trigger(AuthorizedOrder {
                order_id: data.order_id.clone(),
            });

            let outcome = original((data, actions));
            let on_error = rewriter.on_error.clone();
            async move {
                match (outcome.await, on_error) {
                    (Ok(()), _) => Ok(()),
                    (Err(err), Some(on_error)) => on_error(err).await,
                    (Err(err), None) => Err(err),
                }
            }
            .boxed()
        }))
    }

    pub fn decorate_cancel(&self, original: Option<CancelCallback>) -> Result<CancelHandler> {
        let original = resolve(CallbackSpec::CANCEL, original)?;
        let rewriter = self.clone();

        Ok(Arc::new(move |data: CancelData, host: HostActions| {
            let event = rewriter
                .decorator
                .event(FptiState::Checkout, FptiTransition::CheckoutCancel);
            rewriter.decorator.announce("button_cancel", event);

            original((data, rewriter.cancel_actions(host)))
        }))
    }
}
