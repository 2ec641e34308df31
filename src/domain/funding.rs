use crate::error::{ButtonError, Result};
use serde::{Deserialize, Serialize};

/// Funding sources the checkout flow knows how to render.
pub const KNOWN_FUNDING: &[&str] = &[
    "paypal",
    "venmo",
    "credit",
    "card",
    "elv",
    "ideal",
    "bancontact",
    "giropay",
    "sofort",
    "eps",
    "mybank",
];

/// Merchant-supplied funding allow/disallow lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingConfig {
    pub allowed: Vec<String>,
    pub disallowed: Vec<String>,
}

impl FundingConfig {
    pub fn validate(&self) -> Result<()> {
        for source in self.allowed.iter().chain(&self.disallowed) {
            if !KNOWN_FUNDING.contains(&source.as_str()) {
                return Err(ButtonError::Configuration(format!(
                    "Invalid funding source: {source}"
                )));
            }
        }

        if let Some(source) = self.allowed.iter().find(|s| self.disallowed.contains(s)) {
            return Err(ButtonError::Configuration(format!(
                "Can not allow and disallow funding source: {source}"
            )));
        }

        Ok(())
    }
}

/// Funding view handed to the checkout frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Funding {
    pub allowed: Vec<String>,
    pub disallowed: Vec<String>,
    pub remembered: Vec<String>,
}
