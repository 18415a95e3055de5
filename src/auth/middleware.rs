use crate::auth::auth::authenticate;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
};
use serde_json::json;
use tracing::debug;

/// Rejects requests without a valid access token and stores the resolved
/// [`AuthUser`](crate::auth::auth::AuthUser) in the request extensions.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let auth_user = match authenticate(req.request()) {
        Ok(user) => user,
        Err(err) => {
            debug!(path = %req.path(), error = %err, "Rejected unauthenticated request");
            let resp = HttpResponse::build(err.as_response_error().status_code())
                .json(json!({"message": err.to_string()}));
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    debug!(
        user_id = auth_user.user_id,
        username = %auth_user.username,
        role = ?auth_user.role,
        path = %req.path(),
        "Authenticated request"
    );
    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
