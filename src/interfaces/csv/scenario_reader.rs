use crate::error::{ButtonError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// Lifecycle events a scripted host can fire at a button.
#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Render,
    Click,
    Payment,
    Authorize,
    Cancel,
    Meta,
}

/// One row of a scenario file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScenarioEvent {
    pub r#type: EventType,
    pub funding: Option<String>,
    pub token: Option<String>,
    pub amount: Option<Decimal>,
    pub order: Option<String>,
    pub return_url: Option<String>,
}

impl ScenarioEvent {
    pub fn new(r#type: EventType) -> Self {
        Self {
            r#type,
            funding: None,
            token: None,
            amount: None,
            order: None,
            return_url: None,
        }
    }
}

/// Reads scenario events from a CSV source.
///
/// Whitespace is trimmed and short rows are accepted, so trailing empty
/// columns can be left out.
pub struct ScenarioReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScenarioReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes events, one `Result` per row.
    pub fn events(self) -> impl Iterator<Item = Result<ScenarioEvent>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(ButtonError::from))
    }
}
