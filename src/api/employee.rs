use crate::auth::auth::AuthUser;
use crate::model::employee::{EmployeeFilter, EmployeeProfile, EmployeeStatus};
use crate::service::EmployeeService;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct EmployeeStatusUpdate {
    pub status: EmployeeStatus,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = EmployeeProfile,
    responses(
        (status = 201, description = "Employee created, code assigned", body = Employee),
        (status = 400, description = "Invalid profile, department, designation or manager"),
        (status = 409, description = "Email already in use", body = Object, example = json!({
            "message": "Email john@email.com is already in use"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    employees: web::Data<EmployeeService>,
    payload: web::Json<EmployeeProfile>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee = employees.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employee",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "Employees ordered by code", body = [Employee])
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    employees: web::Data<EmployeeService>,
    query: web::Query<EmployeeFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    Ok(HttpResponse::Ok().json(employees.list(&query).await?))
}

#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    employees: web::Data<EmployeeService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;
    Ok(HttpResponse::Ok().json(employees.get(employee_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/employee/code/{employee_code}",
    params(
        ("employee_code", Path, description = "Employee code", example = "EMP-0001")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee_by_code(
    auth: AuthUser,
    employees: web::Data<EmployeeService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    Ok(HttpResponse::Ok().json(employees.get_by_code(&path).await?))
}

#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = EmployeeProfile,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Invalid profile or manager cycle"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already in use")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    employees: web::Data<EmployeeService>,
    path: web::Path<u64>,
    payload: web::Json<EmployeeProfile>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee = employees
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}/status",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = EmployeeStatusUpdate,
    responses(
        (status = 200, description = "Status changed", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_employee_status(
    auth: AuthUser,
    employees: web::Data<EmployeeService>,
    path: web::Path<u64>,
    payload: web::Json<EmployeeStatusUpdate>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee = employees
        .set_status(path.into_inner(), payload.status)
        .await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    delete,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = Object, example = json!({
            "message": "Employee deleted"
        })),
        (status = 400, description = "Employee has approved leave that has not ended"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee still has leave or attendance records")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    employees: web::Data<EmployeeService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if employees.delete(path.into_inner()).await? {
        Ok(HttpResponse::Ok().json(json!({ "message": "Employee deleted" })))
    } else {
        Ok(HttpResponse::NotFound().json(json!({ "message": "Employee not found" })))
    }
}

/// Direct reports of an employee
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}/subordinates",
    params(
        ("employee_id", Path, description = "Manager's employee ID")
    ),
    responses(
        (status = 200, description = "Direct reports", body = [Employee]),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn subordinates(
    auth: AuthUser,
    employees: web::Data<EmployeeService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    Ok(HttpResponse::Ok().json(employees.subordinates(path.into_inner()).await?))
}
