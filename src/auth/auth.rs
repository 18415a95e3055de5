use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::{model::role::Role, models::TokenType};
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorForbidden,
    error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

/// Resolves the caller from a `Bearer` access token.
pub fn authenticate(req: &HttpRequest) -> actix_web::Result<AuthUser> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ErrorUnauthorized("Missing token"))?;

    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Config missing"))?;

    let claims =
        verify_token(token, &config.jwt_secret).map_err(|_| ErrorUnauthorized("Invalid token"))?;

    if claims.token_type != TokenType::Access {
        return Err(ErrorUnauthorized("Access token required"));
    }

    let role = Role::from_id(claims.role).ok_or_else(|| ErrorUnauthorized("Invalid role"))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    })
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // The middleware has usually resolved the caller already.
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }
        ready(authenticate(req))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin only"))
        }
    }

    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::HrManager) {
            Ok(())
        } else {
            Err(ErrorForbidden("HR/Admin only"))
        }
    }

    /// Admin, HR manager or line manager.
    pub fn require_approver(&self) -> actix_web::Result<()> {
        if self.role.can_approve() {
            Ok(())
        } else {
            Err(ErrorForbidden("Approver only"))
        }
    }

    /// The caller's own employee id, for self-service endpoints.
    pub fn employee_id(&self) -> actix_web::Result<u64> {
        self.employee_id
            .ok_or_else(|| ErrorForbidden("No employee profile"))
    }

    /// The caller is `employee_id`, or holds a role that may look at others.
    pub fn require_self_or_approver(&self, employee_id: u64) -> actix_web::Result<()> {
        if self.employee_id == Some(employee_id) {
            return Ok(());
        }
        self.require_approver()
    }

    pub fn require_self_or_hr(&self, employee_id: u64) -> actix_web::Result<()> {
        if self.employee_id == Some(employee_id) {
            return Ok(());
        }
        self.require_hr_or_admin()
    }
}
