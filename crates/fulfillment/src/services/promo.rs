//! Promo code validator trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{read, write};
use crate::error::ServiceError;

/// Verdict of the promo service on a code.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoValidation {
    pub is_valid: bool,
    /// Percentage off the unit price; absent means no discount.
    pub discount_percentage: Option<f64>,
}

impl PromoValidation {
    pub fn valid(discount_percentage: f64) -> Self {
        Self {
            is_valid: true,
            discount_percentage: Some(discount_percentage),
        }
    }

    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            discount_percentage: None,
        }
    }
}

/// Trait for promotional code validation.
#[async_trait]
pub trait PromoCodeValidator: Send + Sync {
    /// Returns `None` when the service knows nothing about the code.
    async fn validate_code(&self, code: &str) -> Result<Option<PromoValidation>, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryPromoState {
    codes: HashMap<String, PromoValidation>,
    checked: Vec<String>,
}

/// In-memory promo validator for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPromoCodeValidator {
    state: Arc<RwLock<InMemoryPromoState>>,
}

impl InMemoryPromoCodeValidator {
    /// Creates a validator that knows no codes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the verdict for a code.
    pub fn add_code(&self, code: impl Into<String>, validation: PromoValidation) {
        write(&self.state).codes.insert(code.into(), validation);
    }

    /// Builder-style variant of [`Self::add_code`].
    pub fn with_code(self, code: impl Into<String>, validation: PromoValidation) -> Self {
        self.add_code(code, validation);
        self
    }

    /// Codes checked so far, in order.
    pub fn checked_codes(&self) -> Vec<String> {
        read(&self.state).checked.clone()
    }
}

#[async_trait]
impl PromoCodeValidator for InMemoryPromoCodeValidator {
    async fn validate_code(&self, code: &str) -> Result<Option<PromoValidation>, ServiceError> {
        let mut state = write(&self.state);
        state.checked.push(code.to_string());
        Ok(state.codes.get(code).cloned())
    }
}
