use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Payment-token deadline in a production deployment.
pub const PAYMENT_TIMEOUT: Duration = Duration::from_millis(10 * 1000);
/// Payment-token deadline when running under the test harness.
pub const TEST_PAYMENT_TIMEOUT: Duration = Duration::from_millis(500);

/// Deployment environment the button is running in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    #[default]
    Production,
    Sandbox,
    Stage,
    Local,
    Test,
}

impl Env {
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Production => "production",
            Env::Sandbox => "sandbox",
            Env::Stage => "stage",
            Env::Local => "local",
            Env::Test => "test",
        }
    }

    /// Base domain the checkout and meta frames are served from.
    pub fn paypal_domain(&self) -> &'static str {
        match self {
            Env::Production => "https://www.paypal.com",
            Env::Sandbox => "https://www.sandbox.paypal.com",
            Env::Stage => "https://www.stage.paypal.com",
            Env::Local => "http://localhost.paypal.com:8000",
            Env::Test => "mock://www.paypal.com",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub lang: String,
    pub country: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            country: "US".to_string(),
        }
    }
}

/// Resolved runtime configuration for a button.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub env: Env,
    /// Shortens the production payment deadline for test builds.
    pub test_mode: bool,
    pub client_id: Option<String>,
    pub meta_url: String,
    pub meta_domain: String,
    pub stage: Option<String>,
    pub stage_domain: Option<String>,
    pub locale: Locale,
    pub log_level: String,
}

/// On-disk shape of the configuration; anything omitted falls back to the
/// defaults of the selected environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    env: Option<Env>,
    test_mode: Option<bool>,
    client_id: Option<String>,
    meta_url: Option<String>,
    meta_domain: Option<String>,
    stage: Option<String>,
    stage_domain: Option<String>,
    locale: Option<Locale>,
    log_level: Option<String>,
}

impl Config {
    /// Defaults for the given environment.
    pub fn for_env(env: Env) -> Self {
        let domain = env.paypal_domain();
        Self {
            env,
            test_mode: false,
            client_id: None,
            meta_url: format!("{domain}/webapps/hermes/meta"),
            meta_domain: domain.to_string(),
            stage: None,
            stage_domain: None,
            locale: Locale::default(),
            log_level: "info".to_string(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;
        let mut config = Self::for_env(file.env.unwrap_or_default());
        if let Some(test_mode) = file.test_mode {
            config.test_mode = test_mode;
        }
        if let Some(meta_domain) = file.meta_domain {
            config.meta_domain = meta_domain;
        }
        if let Some(meta_url) = file.meta_url {
            config.meta_url = meta_url;
        }
        if let Some(locale) = file.locale {
            config.locale = locale;
        }
        if let Some(log_level) = file.log_level {
            config.log_level = log_level;
        }
        config.client_id = file.client_id;
        config.stage = file.stage;
        config.stage_domain = file.stage_domain;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Deadline attached to the payment-token future, if any.
    ///
    /// Only production deployments time out; test builds use the shorter value.
    pub fn payment_timeout(&self) -> Option<Duration> {
        if self.env != Env::Production {
            return None;
        }
        Some(if self.test_mode {
            TEST_PAYMENT_TIMEOUT
        } else {
            PAYMENT_TIMEOUT
        })
    }

    /// Stage name forwarded to the checkout frame; only meaningful off production.
    pub fn stage(&self) -> Option<&str> {
        match self.env {
            Env::Stage | Env::Local => self.stage.as_deref(),
            _ => None,
        }
    }

    pub fn stage_domain(&self) -> Option<&str> {
        match self.env {
            Env::Stage | Env::Local => self.stage_domain.as_deref(),
            _ => None,
        }
    }

    pub fn locale_tag(&self) -> String {
        format!("{}_{}", self.locale.lang, self.locale.country)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_env(Env::default())
    }
}
