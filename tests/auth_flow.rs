mod common;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use scrap_market_api::{
    dto::auth::{LoginRequest, RegisterBuyerRequest, RegisterSellerRequest},
    entity::users::{ActiveModel as UserActive, Role},
    error::AppError,
    middleware::auth::{Principal, decode_claims, resolve_principal},
    services::auth_service,
};
use uuid::Uuid;

use common::setup_state;

fn buyer_form(username: &str, email: &str) -> RegisterBuyerRequest {
    RegisterBuyerRequest {
        username: username.into(),
        full_name: "Asha Rao".into(),
        business_name: "Rao Traders".into(),
        email: email.into(),
        phone_number: "9822000000".into(),
        address: "Baner Road".into(),
        password: "buyerpass123".into(),
        confirm_password: "buyerpass123".into(),
    }
}

fn login(username_or_email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username_or_email: username_or_email.into(),
        password: password.into(),
    }
}

fn field_error(err: AppError, field: &str) -> bool {
    match err {
        AppError::Validation(errors) => errors.field_errors().contains_key(field),
        _ => false,
    }
}

#[tokio::test]
async fn buyer_registers_and_logs_in_by_email() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let account = auth_service::register_buyer(&state, buyer_form("asha", "Asha@Example.com"))
        .await?
        .data
        .expect("account");
    assert_eq!(account.user.email, "asha@example.com");
    assert_eq!(account.user.first_name, "Asha");
    assert_eq!(account.user.last_name, "Rao");
    assert_eq!(account.user.role, Role::Buyer);
    assert_eq!(account.profile.address, "Baner Road");

    let token = auth_service::login(&state, login("ASHA@example.com", "buyerpass123"), Role::Buyer)
        .await?
        .data
        .expect("token")
        .token;

    let claims = decode_claims(&token, &state.auth.jwt_secret)?;
    assert_eq!(claims.role, "buyer");
    let user_id = Uuid::parse_str(&claims.sub)?;
    let principal = resolve_principal(&state.orm, user_id, Role::Buyer).await?;
    assert!(matches!(principal, Principal::Buyer(profile) if profile.id == account.profile.id));
    Ok(())
}

#[tokio::test]
async fn duplicate_username_and_email_are_rejected() -> anyhow::Result<()> {
    let state = setup_state().await?;
    auth_service::register_buyer(&state, buyer_form("asha", "asha@example.com")).await?;

    let same_name = auth_service::register_buyer(&state, buyer_form("ASHA", "other@example.com"))
        .await
        .unwrap_err();
    assert!(field_error(same_name, "username"));

    let same_email = auth_service::register_buyer(&state, buyer_form("ravi", "asha@example.com"))
        .await
        .unwrap_err();
    assert!(field_error(same_email, "email"));

    let mut mismatch = buyer_form("meera", "meera@example.com");
    mismatch.confirm_password = "different".into();
    let mismatch = auth_service::register_buyer(&state, mismatch).await;
    assert!(matches!(mismatch, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn login_is_scoped_to_the_role_profile() -> anyhow::Result<()> {
    let state = setup_state().await?;
    auth_service::register_seller(
        &state,
        RegisterSellerRequest {
            username: "kabir".into(),
            full_name: "Kabir Shah".into(),
            business_name: "Shah Metals".into(),
            email: "kabir@example.com".into(),
            phone_number: "9833000000".into(),
            pickup_address: "Plot 4, Bhosari MIDC".into(),
            password: "sellerpass123".into(),
            confirm_password: "sellerpass123".into(),
        },
    )
    .await?;

    let as_seller = auth_service::login(&state, login("kabir", "sellerpass123"), Role::Seller).await;
    assert!(as_seller.is_ok());

    let as_buyer = auth_service::login(&state, login("kabir", "sellerpass123"), Role::Buyer).await;
    match as_buyer {
        Err(AppError::Unauthorized { message, .. }) => {
            assert_eq!(message, "This account is not registered as a buyer.")
        }
        other => panic!("expected unauthorized, got {other:?}"),
    }

    let wrong = auth_service::login(&state, login("kabir", "nope"), Role::Seller).await;
    match wrong {
        Err(AppError::Unauthorized { message, .. }) => {
            assert_eq!(message, "Invalid login credentials.")
        }
        other => panic!("expected unauthorized, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn username_with_at_sign_still_logs_in() -> anyhow::Result<()> {
    let state = setup_state().await?;
    auth_service::register_buyer(&state, buyer_form("ravi@yard", "ravi@example.com")).await?;

    let token = auth_service::login(&state, login("ravi@yard", "buyerpass123"), Role::Buyer)
        .await?
        .data
        .expect("token")
        .token;
    assert_eq!(decode_claims(&token, &state.auth.jwt_secret)?.role, "buyer");

    let unknown = auth_service::login(&state, login("nobody@yard", "buyerpass123"), Role::Buyer).await;
    assert!(matches!(unknown, Err(AppError::Unauthorized { .. })));
    Ok(())
}

fn user_row(username: &str, email: &str) -> UserActive {
    UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.into()),
        email: Set(email.into()),
        first_name: Set("Asha".into()),
        last_name: Set(String::new()),
        password_hash: Set("not-a-real-hash".into()),
        role: Set(Role::Buyer),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test]
async fn colliding_user_insert_names_the_duplicate_field() -> anyhow::Result<()> {
    let state = setup_state().await?;
    user_row("asha", "asha@example.com").insert(&state.orm).await?;

    let same_email = user_row("other", "asha@example.com")
        .insert(&state.orm)
        .await
        .unwrap_err();
    assert_eq!(auth_service::duplicate_account_field(&same_email), Some("email"));

    let same_name = user_row("asha", "fresh@example.com")
        .insert(&state.orm)
        .await
        .unwrap_err();
    assert_eq!(auth_service::duplicate_account_field(&same_name), Some("username"));
    Ok(())
}
