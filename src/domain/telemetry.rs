use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FptiState {
    Load,
    Button,
    Checkout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FptiTransition {
    ButtonRender,
    ButtonClick,
    CheckoutAuthorize,
    CheckoutCancel,
    ReceivePayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    Iframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextType {
    #[serde(rename = "EC-Token")]
    EcToken,
}

/// A single tracking beacon.
///
/// Every event carries the button session identifier; the optional fields are
/// only populated at the transitions that have them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub state: FptiState,
    pub transition: FptiTransition,
    pub button_session_uid: String,
    pub button_type: Option<ButtonType>,
    pub button_source: Option<String>,
    pub context_type: Option<ContextType>,
    pub context_id: Option<String>,
    pub chosen_funding: Option<String>,
}

impl TrackEvent {
    pub fn new(
        state: FptiState,
        transition: FptiTransition,
        button_session_uid: impl Into<String>,
    ) -> Self {
        Self {
            state,
            transition,
            button_session_uid: button_session_uid.into(),
            button_type: None,
            button_source: None,
            context_type: None,
            context_id: None,
            chosen_funding: None,
        }
    }

    pub fn with_button_type(mut self, button_type: ButtonType) -> Self {
        self.button_type = Some(button_type);
        self
    }

    pub fn with_button_source(mut self, source: Option<String>) -> Self {
        self.button_source = source;
        self
    }

    pub fn with_context(mut self, context_type: ContextType, id: impl Into<String>) -> Self {
        self.context_type = Some(context_type);
        self.context_id = Some(id.into());
        self
    }

    pub fn with_chosen_funding(mut self, funding: Option<String>) -> Self {
        self.chosen_funding = funding;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => f.write_str("info"),
            LogLevel::Warn => f.write_str("warn"),
            LogLevel::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub event: String,
}

/// Anything the telemetry buffer holds until the next flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Beacon {
    Log(LogEntry),
    Track(TrackEvent),
}
