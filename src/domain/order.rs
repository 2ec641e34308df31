use crate::error::ButtonError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A positive order amount.
///
/// Wraps `rust_decimal::Decimal` so that an order can never be created for a
/// zero or negative value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, ButtonError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(ButtonError::Validation(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ButtonError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Order-creation request issued from inside the payment callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub amount: Amount,
    pub currency: String,
}

impl OrderRequest {
    pub fn new(amount: Amount, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}
