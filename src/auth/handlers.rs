use crate::{
    auth::{
        jwt::{TokenSubject, generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::StoreError,
    model::role::Role,
    models::{Claims, LoginReqDto, TokenPair, TokenType, UserReq},
    store::AccountStore,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn expiry(claims: &Claims) -> DateTime<Utc> {
    DateTime::from_timestamp(claims.exp as i64, 0).unwrap_or_else(Utc::now)
}

/// User registration handler
#[instrument(name = "auth_register", skip(user, accounts), fields(username = %user.username))]
pub async fn register(
    user: web::Json<UserReq>,
    accounts: web::Data<dyn AccountStore>,
) -> impl Responder {
    let username = user.username.trim().to_lowercase();

    if username.is_empty() || user.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "message": "Username and password must not be empty"
        }));
    }

    if Role::from_id(user.role_id).is_none() {
        return HttpResponse::BadRequest().json(json!({
            "message": "Unknown role_id"
        }));
    }

    let hashed = match hash_password(&user.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match accounts
        .insert_user(&username, &hashed, user.role_id, user.employee_id)
        .await
    {
        Ok(user_id) => {
            info!(user_id, "User registered");
            HttpResponse::Created().json(json!({
                "message": "User registered successfully"
            }))
        }
        Err(StoreError::Constraint(_)) => HttpResponse::Conflict().json(json!({
            "message": "Username already taken"
        })),
        Err(e) => {
            error!(error = %e, "Failed to register user");
            HttpResponse::InternalServerError().json(json!({
                "message": "Failed to register user"
            }))
        }
    }
}

#[instrument(
    name = "auth_login",
    skip(accounts, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    accounts: web::Data<dyn AccountStore>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    let username = user.username.trim().to_lowercase();
    let db_user = match accounts.find_by_username(&username).await {
        Ok(Some(user)) if user.is_active => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(_) => {
            info!("Invalid credentials: user not found or disabled");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Store error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let subject = TokenSubject {
        user_id: db_user.id,
        username: db_user.username.clone(),
        role: db_user.role_id,
        employee_id: db_user.employee_id,
    };

    let tokens = generate_access_token(&subject, &config.jwt_secret, config.access_token_ttl)
        .and_then(|access| {
            generate_refresh_token(&subject, &config.jwt_secret, config.refresh_token_ttl)
                .map(|refresh| (access, refresh))
        });
    let (access_token, (refresh_token, refresh_claims)) = match tokens {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Token generation failed");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!(user_id = db_user.id, jti = %refresh_claims.jti, "Storing refresh token");
    if let Err(e) = accounts
        .store_refresh_token(db_user.id, &refresh_claims.jti, expiry(&refresh_claims))
        .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    if let Err(e) = accounts.touch_last_login(db_user.id, Utc::now()).await {
        // not fatal for the login itself
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    HttpResponse::Ok().json(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Exchanges a refresh token for a new pair. The presented token is revoked.
pub async fn refresh_token(
    req: HttpRequest,
    accounts: web::Data<dyn AccountStore>,
    config: web::Data<Config>,
) -> impl Responder {
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::Unauthorized().body("No token");
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::Unauthorized().finish(),
    };

    match accounts.find_refresh_token(&claims.jti).await {
        Ok(Some(record)) if record.is_usable_by(claims.user_id, chrono::Utc::now()) => {}
        Ok(_) => {
            warn!(user_id = claims.user_id, jti = %claims.jti, "Refresh with unknown, expired or revoked token");
            return HttpResponse::Unauthorized().finish();
        }
        Err(e) => {
            error!(error = %e, "Store error while loading refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    }

    let subject = TokenSubject::from(&claims);
    let tokens = generate_refresh_token(&subject, &config.jwt_secret, config.refresh_token_ttl)
        .and_then(|refresh| {
            generate_access_token(&subject, &config.jwt_secret, config.access_token_ttl)
                .map(|access| (access, refresh))
        });
    let (access_token, (new_refresh_token, new_claims)) = match tokens {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Token generation failed");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match accounts
        .rotate_refresh_token(&claims.jti, claims.user_id, &new_claims.jti, expiry(&new_claims))
        .await
    {
        Ok(true) => HttpResponse::Ok().json(TokenPair {
            access_token,
            refresh_token: new_refresh_token,
        }),
        // Lost a race with another refresh or a logout.
        Ok(false) => HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to rotate refresh token");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Revokes the presented refresh token. Always answers 204.
pub async fn logout(
    req: HttpRequest,
    accounts: web::Data<dyn AccountStore>,
    config: web::Data<Config>,
) -> impl Responder {
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::NoContent().finish();
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::NoContent().finish(),
    };

    if let Err(e) = accounts.revoke_refresh_token(&claims.jti).await {
        error!(error = %e, "Failed to revoke refresh token");
    }

    HttpResponse::NoContent().finish()
}
