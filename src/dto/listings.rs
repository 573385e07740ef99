use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::lifecycle::check_amount;
use crate::models::{Listing, PickupOrder};

/// Editable content of a listing, shared by create and update.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ListingFields {
    pub category_id: Uuid,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "valid_amount"))]
    pub quantity_kg: Decimal,
    #[validate(custom(function = "valid_amount"))]
    pub price_per_kg: Decimal,
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub location: String,
}

impl ListingFields {
    pub fn trimmed(mut self) -> Self {
        self.description = self.description.trim().to_string();
        self.location = self.location.trim().to_string();
        self
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("This field is required.".into()));
    }
    Ok(())
}

fn valid_amount(value: &Decimal) -> Result<(), ValidationError> {
    check_amount(value).map_err(|message| ValidationError::new("amount").with_message(message.into()))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListingList {
    pub items: Vec<Listing>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerDashboard {
    pub total_listings_count: u64,
    pub available_listings_count: u64,
    pub bookings_count: u64,
    pub listings: Vec<Listing>,
    /// Most recent non-cancelled bookings.
    pub bookings: Vec<PickupOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn fields(quantity: &str, price: &str) -> ListingFields {
        ListingFields {
            category_id: Uuid::new_v4(),
            description: "PET bottles".into(),
            quantity_kg: Decimal::from_str(quantity).unwrap(),
            price_per_kg: Decimal::from_str(price).unwrap(),
            location: "Block A".into(),
        }
    }

    #[test]
    fn accepts_positive_two_place_amounts() {
        assert!(fields("20.00", "12.50").validate().is_ok());
    }

    #[test]
    fn rejects_zero_quantity_and_price() {
        let errors = fields("0", "0").validate().unwrap_err();
        let by_field = errors.field_errors();
        assert!(by_field.contains_key("quantity_kg"));
        assert!(by_field.contains_key("price_per_kg"));
    }

    #[test]
    fn rejects_blank_text() {
        let mut input = fields("1", "1");
        input.description = "   ".into();
        input.location = String::new();
        let errors = input.validate().unwrap_err();
        let by_field = errors.field_errors();
        assert!(by_field.contains_key("description"));
        assert!(by_field.contains_key("location"));
    }
}
