use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle points a merchant can hook into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackName {
    Render,
    Click,
    Payment,
    Authorize,
    Cancel,
}

impl fmt::Display for CallbackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallbackName::Render => "onRender",
            CallbackName::Click => "onClick",
            CallbackName::Payment => "payment",
            CallbackName::Authorize => "onAuthorize",
            CallbackName::Cancel => "onCancel",
        };
        f.write_str(name)
    }
}

/// Static declaration of a lifecycle callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackSpec {
    pub name: CallbackName,
    pub required: bool,
}

impl CallbackSpec {
    pub const RENDER: Self = Self::optional(CallbackName::Render);
    pub const CLICK: Self = Self::optional(CallbackName::Click);
    pub const PAYMENT: Self = Self::required(CallbackName::Payment);
    pub const AUTHORIZE: Self = Self::required(CallbackName::Authorize);
    pub const CANCEL: Self = Self::optional(CallbackName::Cancel);

    const fn required(name: CallbackName) -> Self {
        Self {
            name,
            required: true,
        }
    }

    const fn optional(name: CallbackName) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// Payload handed to the click callback by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickData {
    pub funding_source: Option<String>,
    pub card: Option<String>,
}

impl ClickData {
    pub fn funding(source: impl Into<String>) -> Self {
        Self {
            funding_source: Some(source.into()),
            card: None,
        }
    }

    /// The funding source recorded for the click; a chosen card wins.
    pub fn chosen_funding(&self) -> Option<&str> {
        self.card.as_deref().or(self.funding_source.as_deref())
    }
}

/// Fresh context object passed to every payment invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentContext {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeData {
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(rename = "payerID")]
    pub payer_id: Option<String>,
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelData {
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub cancel_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_flags() {
        assert!(CallbackSpec::PAYMENT.required);
        assert!(CallbackSpec::AUTHORIZE.required);
        assert!(!CallbackSpec::RENDER.required);
        assert!(!CallbackSpec::CLICK.required);
        assert!(!CallbackSpec::CANCEL.required);
    }

    #[test]
    fn test_card_wins_over_funding_source() {
        let data = ClickData {
            funding_source: Some("card".to_string()),
            card: Some("visa".to_string()),
        };
        assert_eq!(data.chosen_funding(), Some("visa"));
        assert_eq!(ClickData::funding("venmo").chosen_funding(), Some("venmo"));
        assert_eq!(ClickData::default().chosen_funding(), None);
    }

    #[test]
    fn test_authorize_data_wire_names() {
        let data: AuthorizeData =
            serde_json::from_str(r#"{"orderID": "O-1", "returnUrl": "https://m/x"}"#).unwrap();
        assert_eq!(data.order_id, "O-1");
        assert_eq!(data.return_url.as_deref(), Some("https://m/x"));
    }
}
