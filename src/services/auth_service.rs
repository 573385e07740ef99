use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::log_audit,
    dto::auth::{
        BuyerAccount, Claims, LoginRequest, LoginResponse, NewAccount, RegisterBuyerRequest,
        RegisterSellerRequest, SellerAccount,
    },
    entity::{
        buyer_profiles::ActiveModel as BuyerActive,
        seller_profiles::ActiveModel as SellerActive,
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users, Role},
    },
    error::{AppError, AppResult},
    middleware::auth::{BUYER_LOGIN_PATH, Principal, SELLER_LOGIN_PATH, resolve_principal},
    response::{ApiResponse, Meta},
    state::AppState,
};

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// "Asha Rao Kulkarni" -> ("Asha", "Rao Kulkarni").
fn split_full_name(full_name: &str) -> (String, String) {
    let full_name = full_name.trim();
    match full_name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (full_name.to_string(), String::new()),
    }
}

async fn find_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> AppResult<Option<users::Model>> {
    Ok(Users::find()
        .filter(Expr::expr(Func::lower(Expr::col(UserCol::Username))).eq(username.to_lowercase()))
        .one(conn)
        .await?)
}

async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> AppResult<Option<users::Model>> {
    Ok(Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(conn)
        .await?)
}

async fn create_user<C: ConnectionTrait>(
    conn: &C,
    account: &NewAccount,
    role: Role,
) -> AppResult<users::Model> {
    let username = account.username.trim();
    let email = account.email.trim().to_lowercase();

    if find_by_username(conn, username).await?.is_some() {
        return Err(AppError::field("username", "Username already exists."));
    }
    if find_by_email(conn, &email).await?.is_some() {
        return Err(AppError::field("email", "Email already exists."));
    }

    let (first_name, last_name) = split_full_name(&account.full_name);
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email),
        first_name: Set(first_name),
        last_name: Set(last_name),
        password_hash: Set(hash_password(&account.password)?),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
    .map_err(|err| match duplicate_account_field(&err) {
        Some("email") => AppError::field("email", "Email already exists."),
        Some(_) => AppError::field("username", "Username already exists."),
        None => AppError::OrmError(err),
    })?;

    Ok(user)
}

/// Which account field a failed user insert collided on, if any. Covers a
/// concurrent registration that slipped past the lookups in `create_user`.
pub fn duplicate_account_field(err: &DbErr) -> Option<&'static str> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
            Some("email")
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => Some("username"),
        _ => None,
    }
}

async fn audit_account(state: &AppState, user_id: Uuid, action: &str) {
    if let Err(err) = log_audit(
        &state.orm,
        Some(user_id),
        action,
        Some("users"),
        Some(serde_json::json!({ "user_id": user_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}

pub async fn register_buyer(
    state: &AppState,
    payload: RegisterBuyerRequest,
) -> AppResult<ApiResponse<BuyerAccount>> {
    payload.validate()?;
    let account = NewAccount::from(payload);

    let txn = state.orm.begin().await?;
    let user = create_user(&txn, &account, Role::Buyer).await?;
    let now = Utc::now();
    let profile = BuyerActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        business_name: Set(account.business_name.trim().to_string()),
        phone_number: Set(account.phone_number.trim().to_string()),
        address: Set(account.address.trim().to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(user_id = %user.id, "buyer registered");
    audit_account(state, user.id, "buyer_register").await;

    Ok(ApiResponse::success(
        "Buyer account created",
        BuyerAccount {
            user: user.into(),
            profile: profile.into(),
        },
        None,
    ))
}

pub async fn register_seller(
    state: &AppState,
    payload: RegisterSellerRequest,
) -> AppResult<ApiResponse<SellerAccount>> {
    payload.validate()?;
    let account = NewAccount::from(payload);

    let txn = state.orm.begin().await?;
    let user = create_user(&txn, &account, Role::Seller).await?;
    let now = Utc::now();
    let profile = SellerActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        business_name: Set(account.business_name.trim().to_string()),
        phone_number: Set(account.phone_number.trim().to_string()),
        pickup_address: Set(account.address.trim().to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(user_id = %user.id, "seller registered");
    audit_account(state, user.id, "seller_register").await;

    Ok(ApiResponse::success(
        "Seller account created",
        SellerAccount {
            user: user.into(),
            profile: profile.into(),
        },
        None,
    ))
}

/// Authenticate by username or email and issue a token scoped to `role`.
pub async fn login(
    state: &AppState,
    payload: LoginRequest,
    role: Role,
) -> AppResult<ApiResponse<LoginResponse>> {
    payload.validate()?;
    let login_path = match role {
        Role::Buyer => BUYER_LOGIN_PATH,
        Role::Seller => SELLER_LOGIN_PATH,
    };
    let rejected = |message: &str| AppError::Unauthorized {
        message: message.to_string(),
        login_path: Some(login_path),
    };

    let identifier = payload.username_or_email.trim();
    // Usernames may contain '@', so an email miss still tries the username.
    let by_email = if identifier.contains('@') {
        find_by_email(&state.orm, identifier).await?
    } else {
        None
    };
    let user = match by_email {
        Some(user) => Some(user),
        None => find_by_username(&state.orm, identifier).await?,
    };
    let user = user.ok_or_else(|| rejected("Invalid login credentials."))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(rejected("Invalid login credentials."));
    }

    if let Principal::Guest = resolve_principal(&state.orm, user.id, role).await? {
        return Err(rejected(&format!(
            "This account is not registered as a {}.",
            role.as_str()
        )));
    }

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(state.auth.token_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "login succeeded");
    audit_account(state, user.id, "user_login").await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token },
        Some(Meta::empty()),
    ))
}
