use crate::auth::auth::AuthUser;
use crate::model::leave_request::{LeaveApplication, LeaveRemarks, LeaveStatus};
use crate::service::LeaveWorkflow;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// Filter by leave status
    #[param(inline, example = "pending")]
    pub status: Option<LeaveStatus>,
}

/* =========================
Submit leave request (self)
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeaveApplication,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid dates or reason, or employee not active"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Overlaps an existing pending or approved leave", body = Object, example = json!({
            "message": "Leave request overlaps with an existing leave"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    payload: web::Json<LeaveApplication>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let leave = workflow.request_leave(employee_id, &payload).await?;
    Ok(HttpResponse::Created().json(leave))
}

/* =========================
Approve leave (approver)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body(content = Option<LeaveRemarks>, description = "Optional approver remarks"),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 400, description = "Leave request not found or is not pending", body = Object, example = json!({
            "message": "Leave request 1 not found or is not pending"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
    payload: Option<web::Json<LeaveRemarks>>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    let approver_id = auth.employee_id()?;
    let remarks = payload.and_then(|p| p.into_inner().remarks);

    let leave = workflow
        .approve_leave(path.into_inner(), approver_id, remarks)
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Reject leave (approver)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body(content = Option<LeaveRemarks>, description = "Optional approver remarks"),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 400, description = "Leave request not found or is not pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
    payload: Option<web::Json<LeaveRemarks>>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    let approver_id = auth.employee_id()?;
    let remarks = payload.and_then(|p| p.into_inner().remarks);

    let leave = workflow
        .reject_leave(path.into_inner(), approver_id, remarks)
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Cancel own leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave cancelled", body = Object, example = json!({
            "message": "Leave cancelled"
        })),
        (status = 400, description = "Leave is already rejected or cancelled"),
        (status = 401, description = "Not the owner of the leave request"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    if workflow.cancel_leave(path.into_inner(), employee_id).await? {
        Ok(HttpResponse::Ok().json(json!({ "message": "Leave cancelled" })))
    } else {
        Ok(HttpResponse::NotFound().json(json!({ "message": "Leave request not found" })))
    }
}

/// Leave request details, visible to its owner and to approvers
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    match workflow.get(path.into_inner()).await? {
        Some(leave) => {
            auth.require_self_or_approver(leave.employee_id)?;
            Ok(HttpResponse::Ok().json(leave))
        }
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Leave request not found"
        }))),
    }
}

/// All leave requests, newest first, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Leave list", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leaves = match query.status {
        Some(status) => workflow.list_by_status(status).await?,
        None => workflow.list_all().await?,
    };
    Ok(HttpResponse::Ok().json(leaves))
}

/// The caller's own leave requests, newest first
#[utoipa::path(
    get,
    path = "/api/leave/mine",
    responses(
        (status = 200, description = "Own leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    Ok(HttpResponse::Ok().json(workflow.list_for_employee(employee_id).await?))
}

/// Approval queue, oldest first
#[utoipa::path(
    get,
    path = "/api/leave/pending",
    responses(
        (status = 200, description = "Pending leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    Ok(HttpResponse::Ok().json(workflow.list_pending().await?))
}

#[utoipa::path(
    get,
    path = "/api/leave/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Leave requests of the employee", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn employee_leaves(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    Ok(HttpResponse::Ok().json(workflow.list_for_employee(path.into_inner()).await?))
}

/// Approved days per leave type for a calendar year
#[utoipa::path(
    get,
    path = "/api/leave/balance/{employee_id}/{year}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        ("year" = i32, Path, description = "Calendar year", example = 2026)
    ),
    responses(
        (status = 200, description = "Leave balance", body = LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<(u64, i32)>,
) -> actix_web::Result<impl Responder> {
    let (employee_id, year) = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    Ok(HttpResponse::Ok().json(workflow.leave_balance(employee_id, year).await?))
}
