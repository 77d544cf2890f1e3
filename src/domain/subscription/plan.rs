//! Subscription plans (reference data).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, ValidationError};

/// A purchasable subscription plan.
///
/// Money is stored as integer cents, never floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub price_cents: i64,
}

impl Plan {
    /// Creates a plan, validating its fields.
    pub fn new(
        id: PlanId,
        name: impl Into<String>,
        price_cents: i64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if price_cents < 0 {
            return Err(ValidationError::out_of_range(
                "price_cents",
                0,
                i64::MAX,
                price_cents,
            ));
        }
        Ok(Self {
            id,
            name,
            price_cents,
        })
    }
}
