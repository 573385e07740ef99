use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::listings::not_blank;
use crate::models::{BuyerProfile, SellerProfile, User};

#[derive(Deserialize, Debug, Clone, ToSchema, Validate)]
#[validate(schema(function = "passwords_match"))]
pub struct RegisterBuyerRequest {
    #[validate(length(max = 150), custom(function = "not_blank"))]
    pub username: String,
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub full_name: String,
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub business_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(max = 20), custom(function = "not_blank"))]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, Debug, Clone, ToSchema, Validate)]
#[validate(schema(function = "seller_passwords_match"))]
pub struct RegisterSellerRequest {
    #[validate(length(max = 150), custom(function = "not_blank"))]
    pub username: String,
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub full_name: String,
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub business_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(max = 20), custom(function = "not_blank"))]
    pub phone_number: String,
    #[serde(default)]
    pub pickup_address: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    pub confirm_password: String,
}

fn passwords_match(request: &RegisterBuyerRequest) -> Result<(), ValidationError> {
    same_password(&request.password, &request.confirm_password)
}

fn seller_passwords_match(request: &RegisterSellerRequest) -> Result<(), ValidationError> {
    same_password(&request.password, &request.confirm_password)
}

fn same_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::new("password_mismatch")
            .with_message("Password and confirm password do not match.".into()));
    }
    Ok(())
}

/// Fields shared by both registration forms once validated.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub full_name: String,
    pub business_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub password: String,
}

impl From<RegisterBuyerRequest> for NewAccount {
    fn from(r: RegisterBuyerRequest) -> Self {
        Self {
            username: r.username,
            full_name: r.full_name,
            business_name: r.business_name,
            email: r.email,
            phone_number: r.phone_number,
            address: r.address,
            password: r.password,
        }
    }
}

impl From<RegisterSellerRequest> for NewAccount {
    fn from(r: RegisterSellerRequest) -> Self {
        Self {
            username: r.username,
            full_name: r.full_name,
            business_name: r.business_name,
            email: r.email,
            phone_number: r.phone_number,
            address: r.pickup_address,
            password: r.password,
        }
    }
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(max = 254), custom(function = "not_blank"))]
    pub username_or_email: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerAccount {
    pub user: User,
    pub profile: BuyerProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerAccount {
    pub user: User,
    pub profile: SellerProfile,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
