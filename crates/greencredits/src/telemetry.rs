use std::fmt;

use serde_json::Value;
use tracing::info;

use crate::error::TelemetryError;

/// Sink for product analytics events.
pub(crate) trait Telemetry: Send + Sync + fmt::Debug {
    fn track(&self, event: &str, data: Value) -> Result<(), TelemetryError>;
}

/// Emits analytics as `tracing` events under the `telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn track(&self, event: &str, data: Value) -> Result<(), TelemetryError> {
        info!(
            target: "telemetry",
            event,
            %data,
            at = %chrono::Utc::now().to_rfc3339(),
            "Analytics event"
        );

        Ok(())
    }
}
