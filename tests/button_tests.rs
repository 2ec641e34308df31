mod common;

use common::Fixture;
use paybutton::application::button::{Button, ButtonProps, MerchantCallbacks, unique_id};
use paybutton::application::decorator::callback;
use paybutton::config::Env;
use paybutton::domain::callback::ClickData;
use paybutton::domain::funding::FundingConfig;
use paybutton::domain::meta::META_MESSAGE;
use paybutton::domain::telemetry::{ButtonType, FptiState, FptiTransition, LogLevel};
use paybutton::error::ButtonError;
use paybutton::infrastructure::in_memory::{LoopbackBridge, StaticPlatform};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn required() -> MerchantCallbacks {
    MerchantCallbacks {
        payment: Some(callback(|_| async { Ok(Some("EC-1".to_string())) })),
        on_authorize: Some(callback(|_| async { Ok(()) })),
        ..Default::default()
    }
}

#[test]
fn test_unique_id_shape() {
    let id = unique_id();
    assert!(id.starts_with("uid_"));
    assert_eq!(id.len(), 14);
    assert!(id[4..].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    assert_ne!(unique_id(), unique_id());
}

#[test]
fn test_missing_payment_callback_is_a_configuration_error() {
    let fixture = Fixture::new();
    let result = fixture
        .builder()
        .callbacks(MerchantCallbacks {
            on_authorize: Some(callback(|_| async { Ok(()) })),
            ..Default::default()
        })
        .create();

    match result {
        Err(err) => assert_eq!(
            err.to_string(),
            "Configuration error: Missing required callback: payment"
        ),
        Ok(_) => panic!("expected a configuration error"),
    }
}

#[test]
fn test_ie_intranet_refuses_to_render() {
    let fixture = Fixture::with(
        Env::Test,
        StaticPlatform {
            ie_intranet: true,
            ..Default::default()
        },
        LoopbackBridge::new(),
        Duration::ZERO,
    );
    let result = fixture.builder().callbacks(required()).create();
    assert!(matches!(result, Err(ButtonError::IeIntranet)));
}

#[test]
fn test_ineligible_platform_warns_but_renders() {
    let fixture = Fixture::with(
        Env::Test,
        StaticPlatform {
            eligible: false,
            ..Default::default()
        },
        LoopbackBridge::new(),
        Duration::ZERO,
    );
    fixture.builder().callbacks(required()).create().unwrap();

    let logs = fixture.telemetry.pending_logs();
    assert!(logs
        .iter()
        .any(|log| log.level == LogLevel::Warn && log.event == "button_render_ineligible"));
}

#[test]
fn test_invalid_funding_is_rejected() {
    let fixture = Fixture::new();
    let props = ButtonProps {
        funding: FundingConfig {
            allowed: vec!["venmo".to_string()],
            disallowed: vec!["venmo".to_string()],
        },
        ..Default::default()
    };
    let result = fixture.builder().props(props).callbacks(required()).create();
    assert!(matches!(result, Err(ButtonError::Configuration(_))));
}

#[test]
fn test_child_hook_runs_only_in_child_frames() {
    for child_frame in [false, true] {
        let fixture = Fixture::with(
            Env::Test,
            StaticPlatform {
                child_frame,
                ..Default::default()
            },
            LoopbackBridge::new(),
            Duration::ZERO,
        );
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        fixture
            .builder()
            .callbacks(required())
            .child_hook(move |button: &Button| {
                assert!(button.button_session_id().starts_with("uid_"));
                flag.store(true, Ordering::SeqCst);
            })
            .create()
            .unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), child_frame);
    }
}

#[test]
fn test_query_params() {
    let mut fixture = Fixture::with(
        Env::Stage,
        StaticPlatform {
            device: true,
            ..Default::default()
        },
        LoopbackBridge::new(),
        Duration::ZERO,
    );
    fixture.config.stage = Some("msmaster".to_string());
    fixture.config.stage_domain = Some("msmaster.qa.paypal.com".to_string());
    let props = ButtonProps {
        session_id: Some("uid_session".to_string()),
        button_session_id: Some("uid_button".to_string()),
        commit: false,
        ..Default::default()
    };
    let button = fixture
        .builder()
        .props(props)
        .callbacks(required())
        .create()
        .unwrap();

    let params = button.query_params();
    assert_eq!(params["sessionID"], "uid_session");
    assert_eq!(params["buttonSessionID"], "uid_button");
    assert_eq!(params["env"], "stage");
    assert_eq!(params["platform"], "mobile");
    assert_eq!(params["locale.x"], "en_US");
    assert_eq!(params["commit"], "false");
    assert_eq!(params["stage"], "msmaster");
    assert_eq!(params["stageDomain"], "msmaster.qa.paypal.com");
}

#[test]
fn test_query_params_omit_stage_in_production() {
    let mut fixture = Fixture::with(
        Env::Production,
        StaticPlatform::default(),
        LoopbackBridge::new(),
        Duration::ZERO,
    );
    fixture.config.stage = Some("msmaster".to_string());
    fixture.config.stage_domain = Some("msmaster.qa.paypal.com".to_string());
    let button = fixture.builder().callbacks(required()).create().unwrap();

    let params = button.query_params();
    assert!(!params.contains_key("stage"));
    assert!(!params.contains_key("stageDomain"));
    assert_eq!(params["platform"], "desktop");
}

#[tokio::test]
async fn test_render_and_click_telemetry() {
    let fixture = Fixture::new();
    let props = ButtonProps {
        button_session_id: Some("uid_button".to_string()),
        source: Some("smart".to_string()),
        ..Default::default()
    };
    let button = fixture
        .builder()
        .props(props)
        .callbacks(required())
        .create()
        .unwrap();

    button.render().await.unwrap();
    button.click(Some(ClickData::funding("venmo"))).await.unwrap();

    let logs: Vec<String> = fixture
        .telemetry
        .flushed_logs()
        .into_iter()
        .map(|log| log.event)
        .collect();
    assert_eq!(
        logs,
        vec!["button_render_browser_chrome_120", "button_click"]
    );

    let tracks = fixture.telemetry.flushed_tracks();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].state, FptiState::Load);
    assert_eq!(tracks[0].transition, FptiTransition::ButtonRender);
    assert_eq!(tracks[0].button_type, Some(ButtonType::Iframe));
    assert_eq!(tracks[0].button_source.as_deref(), Some("smart"));
    assert_eq!(tracks[1].transition, FptiTransition::ButtonClick);
    assert_eq!(tracks[1].chosen_funding.as_deref(), Some("venmo"));
    assert!(tracks.iter().all(|t| t.button_session_uid == "uid_button"));
}

#[tokio::test]
async fn test_funding_merges_remembered_sources() {
    let fixture = Fixture::with(
        Env::Test,
        StaticPlatform::default(),
        LoopbackBridge::new().reply(
            META_MESSAGE,
            json!({
                "iframeEligible": true,
                "iframeEligibleReason": "eligible",
                "rememberedFunding": ["venmo"]
            }),
        ),
        Duration::ZERO,
    );
    let props = ButtonProps {
        funding: FundingConfig {
            allowed: vec!["credit".to_string()],
            disallowed: vec!["card".to_string()],
        },
        ..Default::default()
    };
    let button = fixture
        .builder()
        .props(props)
        .callbacks(required())
        .create()
        .unwrap();

    button.remember(&["venmo", "ideal"]);
    let funding = button.funding().await;
    assert_eq!(funding.allowed, vec!["credit"]);
    assert_eq!(funding.disallowed, vec!["card"]);
    assert_eq!(funding.remembered, vec!["venmo", "ideal"]);
}

#[tokio::test]
async fn test_funding_survives_meta_failure() {
    let fixture = Fixture::with(
        Env::Test,
        StaticPlatform::default(),
        LoopbackBridge::new().fail_open("frame blocked"),
        Duration::ZERO,
    );
    let button = fixture.builder().callbacks(required()).create().unwrap();

    button.remember(&["elv"]);
    let funding = button.funding().await;
    assert_eq!(funding.remembered, vec!["elv"]);
    assert!(fixture
        .telemetry
        .pending_logs()
        .iter()
        .any(|log| log.event == "remembered_funding_unavailable"));
}

#[tokio::test]
async fn test_buttons_share_the_process_bridge() {
    let fixture = Fixture::with(
        Env::Test,
        StaticPlatform::default(),
        LoopbackBridge::new().reply(
            META_MESSAGE,
            json!({
                "iframeEligible": true,
                "iframeEligibleReason": "eligible",
                "rememberedFunding": ["venmo"]
            }),
        ),
        Duration::ZERO,
    );
    let first = Button::builder(fixture.config.clone(), fixture.ports.clone())
        .callbacks(required())
        .create()
        .unwrap();
    let second = Button::builder(fixture.config.clone(), fixture.ports.clone())
        .callbacks(required())
        .create()
        .unwrap();
    assert!(Arc::ptr_eq(first.meta(), second.meta()));

    let lookups = tokio::time::timeout(Duration::from_secs(5), async {
        (first.funding().await, second.funding().await)
    })
    .await
    .unwrap();
    assert_eq!(lookups.0.remembered, vec!["venmo"]);
    assert_eq!(lookups.1.remembered, vec!["venmo"]);
    assert_eq!(fixture.bridge.registration_count(), 1);
    assert_eq!(fixture.bridge.open_count(), 1);
}
