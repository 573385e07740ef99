use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::{
        buyer_profiles::{self, Column as BuyerCol, Entity as BuyerProfiles},
        seller_profiles::{self, Column as SellerCol, Entity as SellerProfiles},
        users::Role,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub const BUYER_LOGIN_PATH: &str = "/api/auth/buyer/login";
pub const SELLER_LOGIN_PATH: &str = "/api/auth/seller/login";

/// Caller identity, resolved once per request from the bearer token.
#[derive(Debug, Clone)]
pub enum Principal {
    Guest,
    Buyer(buyer_profiles::Model),
    Seller(seller_profiles::Model),
}

impl Principal {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Principal::Guest => None,
            Principal::Buyer(profile) => Some(profile.user_id),
            Principal::Seller(profile) => Some(profile.user_id),
        }
    }
}

pub fn require_buyer(principal: &Principal) -> AppResult<&buyer_profiles::Model> {
    match principal {
        Principal::Buyer(profile) => Ok(profile),
        _ => Err(AppError::Unauthorized {
            message: "Buyer access required.".into(),
            login_path: Some(BUYER_LOGIN_PATH),
        }),
    }
}

pub fn require_seller(principal: &Principal) -> AppResult<&seller_profiles::Model> {
    match principal {
        Principal::Seller(profile) => Ok(profile),
        _ => Err(AppError::Unauthorized {
            message: "Seller access required.".into(),
            login_path: Some(SELLER_LOGIN_PATH),
        }),
    }
}

/// Attach the profile matching `role`; a user without one stays a guest.
pub async fn resolve_principal<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    role: Role,
) -> AppResult<Principal> {
    let principal = match role {
        Role::Buyer => BuyerProfiles::find()
            .filter(BuyerCol::UserId.eq(user_id))
            .one(conn)
            .await?
            .map(Principal::Buyer),
        Role::Seller => SellerProfiles::find()
            .filter(SellerCol::UserId.eq(user_id))
            .one(conn)
            .await?
            .map(Principal::Seller),
    };
    Ok(principal.unwrap_or(Principal::Guest))
}

pub fn decode_claims(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Principal::Guest);
        };

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization scheme"))?
            .trim();

        let claims = decode_claims(token, &state.auth.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid user id in token"))?;

        let role = match claims.role.as_str() {
            "buyer" => Role::Buyer,
            "seller" => Role::Seller,
            _ => return Ok(Principal::Guest),
        };

        resolve_principal(&state.orm, user_id, role).await
    }
}
