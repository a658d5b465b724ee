use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::auth::{
        Claims, LoginRequest, LoginResponse, RegisterRequest, RegisteredUser, SetPasswordRequest,
        validate_password,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(FromRow)]
struct Credentials {
    id: Uuid,
    password_hash: String,
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<RegisteredUser>> {
    payload.validate()?;
    let RegisterRequest {
        email,
        username,
        first_name,
        last_name,
        password,
    } = payload;

    let email_taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if email_taken.is_some() {
        return Err(AppError::BadRequest("This email is already in use.".to_string()));
    }

    let username_taken: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(username.as_str())
            .fetch_optional(&state.pool)
            .await?;
    if username_taken.is_some() {
        return Err(AppError::BadRequest("This user is already in use.".to_string()));
    }

    let password_hash = hash_password(&password)?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, username, first_name, last_name, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(email.as_str())
    .bind(username.as_str())
    .bind(first_name.as_str())
    .bind(last_name.as_str())
    .bind(password_hash)
    .execute(&state.pool)
    .await?;

    tracing::info!(user_id = %id, "user registered");
    let user = RegisteredUser {
        id,
        email,
        username,
        first_name,
        last_name,
    };
    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = credentials_by_email(&state.pool, email.as_str())
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid email or password".into()))?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(user.id, &state.config.jwt_secret)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { auth_token: token },
        Some(Meta::empty()),
    ))
}

pub async fn set_password(
    state: &AppState,
    user: &AuthUser,
    payload: SetPasswordRequest,
) -> AppResult<()> {
    let credentials = credentials_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !verify_password(&payload.current_password, &credentials.password_hash)? {
        return Err(AppError::BadRequest("current_password: Invalid password".into()));
    }
    validate_password(&payload.new_password)?;

    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(credentials.id)
        .bind(hash_password(&payload.new_password)?)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id = %credentials.id, "password changed");
    Ok(())
}

pub fn issue_token(user_id: Uuid, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

async fn credentials_by_email(pool: &DbPool, email: &str) -> AppResult<Option<Credentials>> {
    let row = sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn credentials_by_id(pool: &DbPool, id: Uuid) -> AppResult<Option<Credentials>> {
    let row = sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_token;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &hash).unwrap());
        assert!(!verify_password("wrong-pass", &hash).unwrap());
    }

    #[test]
    fn issued_token_round_trips_user_id() {
        let id = Uuid::new_v4();
        let token = issue_token(id, "test-secret").unwrap();
        assert_eq!(decode_token(&token, "test-secret").unwrap().user_id, id);
    }
}
