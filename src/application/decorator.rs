use super::actions::{AuthorizeActions, CancelActions};
use super::payment::PaymentActions;
use crate::domain::callback::{
    AuthorizeData, CallbackSpec, CancelData, ClickData, PaymentContext,
};
use crate::domain::ports::{PlatformRef, TelemetryRef};
use crate::domain::telemetry::{ButtonType, FptiState, FptiTransition, TrackEvent};
use crate::error::{ButtonError, Result};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::future::Future;
use std::sync::Arc;

/// A lifecycle callback: one argument bundle in, a future result out.
pub type Callback<A, T> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T>> + Send + Sync>;

pub type RenderCallback = Callback<(), ()>;
pub type ClickCallback = Callback<Option<ClickData>, ()>;
pub type PaymentCallback = Callback<(PaymentContext, PaymentActions), Option<String>>;
pub type AuthorizeCallback = Callback<(AuthorizeData, AuthorizeActions), ()>;
pub type CancelCallback = Callback<(CancelData, CancelActions), ()>;
pub type ErrorCallback = Callback<ButtonError, ()>;

/// Lifts an async closure into a [`Callback`].
pub fn callback<A, T, F, Fut>(f: F) -> Callback<A, T>
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Arc::new(move |args| f(args).boxed())
}

/// Stand-in for an optional callback the merchant left out.
pub fn noop<A, T>() -> Callback<A, T>
where
    A: Send + 'static,
    T: Default + Send + 'static,
{
    Arc::new(|_| future::ready(Ok(T::default())).boxed())
}

/// Resolves the callback to wrap, substituting a no-op for absent optional ones.
pub fn resolve<A, T>(spec: CallbackSpec, original: Option<Callback<A, T>>) -> Result<Callback<A, T>>
where
    A: Send + 'static,
    T: Default + Send + 'static,
{
    match original {
        Some(original) => Ok(original),
        None if spec.required => Err(ButtonError::Configuration(format!(
            "Missing required callback: {}",
            spec.name
        ))),
        None => Ok(noop()),
    }
}

/// Wraps `original` so that `before` runs ahead of every invocation.
///
/// The wrapped callback takes the same arguments and yields the original
/// result unchanged.
pub fn decorate<A, T, H>(
    spec: CallbackSpec,
    original: Option<Callback<A, T>>,
    before: H,
) -> Result<Callback<A, T>>
where
    A: Send + 'static,
    T: Default + Send + 'static,
    H: Fn(&A) + Send + Sync + 'static,
{
    let original = resolve(spec, original)?;
    Ok(Arc::new(move |args: A| {
        before(&args);
        original(args)
    }))
}

/// Telemetry pre-hooks shared by every decorated lifecycle callback.
#[derive(Clone)]
pub struct CallbackDecorator {
    platform: PlatformRef,
    telemetry: TelemetryRef,
    button_session_id: String,
    button_source: Option<String>,
}

impl CallbackDecorator {
    pub fn new(
        platform: PlatformRef,
        telemetry: TelemetryRef,
        button_session_id: impl Into<String>,
        button_source: Option<String>,
    ) -> Self {
        Self {
            platform,
            telemetry,
            button_session_id: button_session_id.into(),
            button_source,
        }
    }

    pub fn button_session_id(&self) -> &str {
        &self.button_session_id
    }

    pub fn telemetry(&self) -> &TelemetryRef {
        &self.telemetry
    }

    /// Logs `info`, tracks `event` and flushes before returning.
    pub fn announce(&self, info: &str, event: TrackEvent) {
        self.telemetry.info(info);
        self.telemetry.track(event);
        self.telemetry.flush();
    }

    pub fn event(&self, state: FptiState, transition: FptiTransition) -> TrackEvent {
        TrackEvent::new(state, transition, self.button_session_id.clone())
    }

    pub fn decorate_render(&self, original: Option<RenderCallback>) -> Result<RenderCallback> {
        let hooks = self.clone();
        decorate(CallbackSpec::RENDER, original, move |_: &()| {
            let browser = hooks.platform.browser();
            hooks.telemetry.info(&format!(
                "button_render_browser_{}_{}",
                browser.name.as_deref().unwrap_or("unrecognized"),
                browser.version.as_deref().unwrap_or("unrecognized")
            ));
            let event = hooks
                .event(FptiState::Load, FptiTransition::ButtonRender)
                .with_button_type(ButtonType::Iframe)
                .with_button_source(hooks.button_source.clone());
            hooks.telemetry.track(event);
            hooks.telemetry.flush();
        })
    }

    pub fn decorate_click(&self, original: Option<ClickCallback>) -> Result<ClickCallback> {
        let hooks = self.clone();
        decorate(CallbackSpec::CLICK, original, move |data: &Option<ClickData>| {
            let funding = data
                .as_ref()
                .and_then(|d| d.chosen_funding())
                .map(str::to_string);
            let event = hooks
                .event(FptiState::Button, FptiTransition::ButtonClick)
                .with_button_type(ButtonType::Iframe)
                .with_chosen_funding(funding);
            hooks.announce("button_click", event);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::callback::CallbackName;
    use crate::domain::telemetry::Beacon;
    use crate::infrastructure::in_memory::StaticPlatform;
    use crate::infrastructure::telemetry::BufferedTelemetry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn decorator() -> (CallbackDecorator, Arc<BufferedTelemetry>) {
        let telemetry = Arc::new(BufferedTelemetry::new());
        let decorator = CallbackDecorator::new(
            Arc::new(StaticPlatform::default()),
            telemetry.clone(),
            "uid_test",
            Some("merchant".to_string()),
        );
        (decorator, telemetry)
    }

    #[tokio::test]
    async fn test_missing_required_callback_fails() {
        let result = decorate::<(), (), _>(CallbackSpec::PAYMENT, None, |_| {});
        match result {
            Err(ButtonError::Configuration(msg)) => {
                assert!(msg.contains(&CallbackName::Payment.to_string()))
            }
            _ => panic!("expected configuration error"),
        }
    }

    #[tokio::test]
    async fn test_absent_optional_callback_resolves_empty() {
        let wrapped = decorate::<(), (), _>(CallbackSpec::CANCEL, None, |_| {}).unwrap();
        assert_eq!(wrapped(()).await, Ok(()));
    }

    #[tokio::test]
    async fn test_result_propagates_unchanged() {
        let original: Callback<u32, u32> = callback(|n: u32| async move {
            if n == 0 {
                Err(ButtonError::callback("zero"))
            } else {
                Ok(n * 2)
            }
        });
        let wrapped = decorate(CallbackSpec::RENDER, Some(original), |_| {}).unwrap();
        assert_eq!(wrapped(21).await, Ok(42));
        assert_eq!(wrapped(0).await, Err(ButtonError::callback("zero")));
    }

    #[tokio::test]
    async fn test_click_flushes_before_original_runs() {
        let (decorator, telemetry) = decorator();
        let observed = telemetry.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let original: ClickCallback = callback(move |_| {
            // Telemetry must already be out by the time the merchant code runs.
            assert!(observed.pending().is_empty());
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        });

        let wrapped = decorator.decorate_click(Some(original)).unwrap();
        wrapped(Some(ClickData::funding("venmo"))).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let tracks = telemetry.flushed_tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].transition, FptiTransition::ButtonClick);
        assert_eq!(tracks[0].chosen_funding.as_deref(), Some("venmo"));
        assert_eq!(tracks[0].button_session_uid, "uid_test");
    }

    #[tokio::test]
    async fn test_render_noop_still_tracks() {
        let (decorator, telemetry) = decorator();
        let wrapped = decorator.decorate_render(None).unwrap();
        wrapped(()).await.unwrap();

        let flushed = telemetry.flushed();
        assert!(flushed.iter().any(|b| matches!(
            b,
            Beacon::Log(entry) if entry.event.starts_with("button_render_browser_")
        )));
        let tracks = telemetry.flushed_tracks();
        assert_eq!(tracks[0].state, FptiState::Load);
        assert_eq!(tracks[0].button_source.as_deref(), Some("merchant"));
    }
}
