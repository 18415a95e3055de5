use crate::auth::auth::AuthUser;
use crate::model::department::DepartmentInput;
use crate::model::designation::DesignationInput;
use crate::service::DepartmentService;
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/department",
    request_body = DepartmentInput,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Name must be 2 to 100 characters"),
        (status = 409, description = "Department already exists")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_department(
    auth: AuthUser,
    departments: web::Data<DepartmentService>,
    payload: web::Json<DepartmentInput>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let department = departments.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(department))
}

/// All departments with their head count
#[utoipa::path(
    get,
    path = "/api/department",
    responses(
        (status = 200, description = "Departments ordered by name", body = [DepartmentWithCount])
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_departments(
    departments: web::Data<DepartmentService>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(departments.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/department/active",
    responses(
        (status = 200, description = "Active departments", body = [Department])
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn active_departments(
    departments: web::Data<DepartmentService>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(departments.list_active().await?))
}

#[utoipa::path(
    get,
    path = "/api/department/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department found", body = Department),
        (status = 404, description = "Department not found")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_department(
    departments: web::Data<DepartmentService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(departments.get(path.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/department/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    request_body = DepartmentInput,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 400, description = "Name must be 2 to 100 characters"),
        (status = 404, description = "Department not found")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_department(
    auth: AuthUser,
    departments: web::Data<DepartmentService>,
    path: web::Path<u64>,
    payload: web::Json<DepartmentInput>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let department = departments
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(department))
}

#[utoipa::path(
    delete,
    path = "/api/department/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department deleted", body = Object, example = json!({
            "message": "Department deleted"
        })),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still has employees")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_department(
    auth: AuthUser,
    departments: web::Data<DepartmentService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if departments.delete(path.into_inner()).await? {
        Ok(HttpResponse::Ok().json(json!({ "message": "Department deleted" })))
    } else {
        Ok(HttpResponse::NotFound().json(json!({ "message": "Department not found" })))
    }
}

#[utoipa::path(
    post,
    path = "/api/designation",
    request_body = DesignationInput,
    responses(
        (status = 201, description = "Designation created", body = Designation),
        (status = 400, description = "Invalid title, level or salary band")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_designation(
    auth: AuthUser,
    departments: web::Data<DepartmentService>,
    payload: web::Json<DesignationInput>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let designation = departments.create_designation(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(designation))
}

#[utoipa::path(
    get,
    path = "/api/designation",
    responses(
        (status = 200, description = "Designations ordered by level", body = [Designation])
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_designations(
    departments: web::Data<DepartmentService>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(departments.list_designations().await?))
}

#[utoipa::path(
    get,
    path = "/api/designation/{designation_id}",
    params(
        ("designation_id", Path, description = "Designation ID")
    ),
    responses(
        (status = 200, description = "Designation found", body = Designation),
        (status = 404, description = "Designation not found")
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_designation(
    departments: web::Data<DepartmentService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(departments.get_designation(path.into_inner()).await?))
}
