use serde::{Deserialize, Serialize};

/// Name of the one-time message the meta frame posts back.
pub const META_MESSAGE: &str = "meta";

/// Eligibility and funding data resolved once through the meta bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaFrameData {
    pub iframe_eligible: bool,
    pub iframe_eligible_reason: String,
    #[serde(default)]
    pub remembered_funding: Vec<String>,
}

impl MetaFrameData {
    /// Result used when the page runs in IE intranet mode and no bridge is attempted.
    pub fn ie_intranet() -> Self {
        Self {
            iframe_eligible: false,
            iframe_eligible_reason: "ie_intranet".to_string(),
            remembered_funding: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeState {
    #[default]
    Unopened,
    Opening,
    Open,
    Failed,
}

/// The process-wide connection to the meta domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConnection {
    pub url: String,
    pub domain: String,
    pub state: BridgeState,
}

/// Observable progress of the meta lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaState {
    Unopened,
    Opening,
    AwaitingMessage,
    Resolved,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_deserialization() {
        let json = r#"{
            "iframeEligible": true,
            "iframeEligibleReason": "eligible",
            "rememberedFunding": ["venmo", "credit"]
        }"#;
        let data: MetaFrameData = serde_json::from_str(json).unwrap();
        assert!(data.iframe_eligible);
        assert_eq!(data.remembered_funding, vec!["venmo", "credit"]);
    }

    #[test]
    fn test_missing_remembered_funding_defaults_empty() {
        let json = r#"{"iframeEligible": false, "iframeEligibleReason": "x"}"#;
        let data: MetaFrameData = serde_json::from_str(json).unwrap();
        assert!(data.remembered_funding.is_empty());
    }
}
