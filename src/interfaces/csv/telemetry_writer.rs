use crate::domain::telemetry::TrackEvent;
use crate::error::Result;
use std::io::Write;

/// Writes flushed track events as CSV, one row per beacon.
pub struct TelemetryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TelemetryWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_events(&mut self, events: impl IntoIterator<Item = TrackEvent>) -> Result<()> {
        for event in events {
            self.writer.serialize(event)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
