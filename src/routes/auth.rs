use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::auth::{
        BuyerAccount, LoginRequest, LoginResponse, RegisterBuyerRequest, RegisterSellerRequest,
        SellerAccount,
    },
    entity::users::Role,
    error::AppResult,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/buyer/register", post(register_buyer))
        .route("/buyer/login", post(login_buyer))
        .route("/seller/register", post(register_seller))
        .route("/seller/login", post(login_seller))
}

#[utoipa::path(
    post,
    path = "/api/auth/buyer/register",
    request_body = RegisterBuyerRequest,
    responses(
        (status = 201, description = "Buyer account created", body = ApiResponse<BuyerAccount>),
        (status = 422, description = "Invalid registration form")
    ),
    tag = "Auth"
)]
pub async fn register_buyer(
    State(state): State<AppState>,
    Json(payload): Json<RegisterBuyerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BuyerAccount>>)> {
    let resp = auth_service::register_buyer(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/buyer/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Buyer token", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or not a buyer")
    ),
    tag = "Auth"
)]
pub async fn login_buyer(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login(&state, payload, Role::Buyer).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/seller/register",
    request_body = RegisterSellerRequest,
    responses(
        (status = 201, description = "Seller account created", body = ApiResponse<SellerAccount>),
        (status = 422, description = "Invalid registration form")
    ),
    tag = "Auth"
)]
pub async fn register_seller(
    State(state): State<AppState>,
    Json(payload): Json<RegisterSellerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SellerAccount>>)> {
    let resp = auth_service::register_seller(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/seller/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Seller token", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or not a seller")
    ),
    tag = "Auth"
)]
pub async fn login_seller(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login(&state, payload, Role::Seller).await?;
    Ok(Json(resp))
}
