use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for adding a player to the roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlayerRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}

impl CreatePlayerRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Request payload for editing a player. Absent fields are left as they are;
/// an empty `bio` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlayerRequest {
    #[validate(length(min = 1, max = 100))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,

    #[validate(range(max = 150))]
    pub age: Option<u32>,

    /// Centimetres
    pub height: Option<Decimal>,

    /// Kilograms
    pub weight: Option<Decimal>,

    #[validate(length(max = 2000))]
    pub bio: Option<String>,
}

impl UpdatePlayerRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.bio.is_none()
    }

    pub fn validate_measurements(&self) -> Result<(), &'static str> {
        if let Some(height) = self.height
            && height.is_sign_negative()
        {
            return Err("Height cannot be negative");
        }
        if let Some(weight) = self.weight
            && weight.is_sign_negative()
        {
            return Err("Weight cannot be negative");
        }
        Ok(())
    }
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        Err(validator::ValidationError::new("blank"))
    } else {
        Ok(())
    }
}
