use crate::domain::ports::{PlatformRef, TelemetryRef};
use crate::error::{ButtonError, Result};

/// Synchronous pre-flight checks run before the button renders.
#[derive(Clone)]
pub struct EligibilityGate {
    platform: PlatformRef,
    telemetry: TelemetryRef,
}

impl EligibilityGate {
    pub fn new(platform: PlatformRef, telemetry: TelemetryRef) -> Self {
        Self {
            platform,
            telemetry,
        }
    }

    /// Runs once at setup.
    ///
    /// An ineligible context is only reported; IE intranet mode aborts setup.
    pub fn validate(&self) -> Result<()> {
        if !self.platform.is_eligible() {
            self.telemetry.warn("button_render_ineligible");
        }

        if self.platform.is_ie_intranet() {
            return Err(ButtonError::IeIntranet);
        }

        Ok(())
    }

    pub fn is_eligible(&self) -> bool {
        self.platform.is_eligible()
    }

    /// Logs `{state}_unrecognized_browser` when the browser is not recognized.
    pub fn check_recognized_browser(&self, state: &str) -> bool {
        let recognized = self.platform.is_recognized_browser();
        if !recognized {
            self.telemetry.info(&format!("{state}_unrecognized_browser"));
        }
        recognized
    }
}
