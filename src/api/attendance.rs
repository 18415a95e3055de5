use crate::auth::auth::AuthUser;
use crate::error::ServiceError;
use crate::model::attendance::{DateRange, MarkAttendance};
use crate::service::AttendanceService;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;

fn explicit_range(range: &DateRange) -> Result<Option<(NaiveDate, NaiveDate)>, ServiceError> {
    match (range.start, range.end) {
        (Some(start), Some(end)) => Ok(Some((start, end))),
        (None, None) => Ok(None),
        _ => Err(ServiceError::InvalidInput(
            "start and end must be given together".into(),
        )),
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Checked in successfully", body = Attendance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    attendance: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    Ok(HttpResponse::Ok().json(attendance.check_in(employee_id).await?))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Checked out successfully", body = Attendance),
        (status = 400, description = "No open check-in for today", body = Object, example = json!({
            "message": "No open check-in for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    attendance: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    Ok(HttpResponse::Ok().json(attendance.check_out(employee_id).await?))
}

/// Record attendance on an employee's behalf (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/attendance/mark",
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Attendance recorded", body = Attendance),
        (status = 400, description = "Future date or check-out before check-in"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    auth: AuthUser,
    attendance: web::Data<AttendanceService>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    Ok(HttpResponse::Ok().json(attendance.mark(payload.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/attendance/mine",
    params(DateRange),
    responses(
        (status = 200, description = "Own attendance, newest first", body = [Attendance]),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    attendance: web::Data<AttendanceService>,
    query: web::Query<DateRange>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let range = explicit_range(&query)?;
    Ok(HttpResponse::Ok().json(attendance.list(employee_id, range).await?))
}

#[utoipa::path(
    get,
    path = "/api/attendance/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        DateRange
    ),
    responses(
        (status = 200, description = "Attendance of the employee, newest first", body = [Attendance]),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn employee_attendance(
    auth: AuthUser,
    attendance: web::Data<AttendanceService>,
    path: web::Path<u64>,
    query: web::Query<DateRange>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    let range = explicit_range(&query)?;
    Ok(HttpResponse::Ok().json(attendance.list(path.into_inner(), range).await?))
}

/// Per-status counts; defaults to the current month when no range is given
#[utoipa::path(
    get,
    path = "/api/attendance/summary/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        DateRange
    ),
    responses(
        (status = 200, description = "Attendance summary", body = AttendanceSummary),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_summary(
    auth: AuthUser,
    attendance: web::Data<AttendanceService>,
    path: web::Path<u64>,
    query: web::Query<DateRange>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_approver(employee_id)?;

    let (start, end) = match explicit_range(&query)? {
        Some(range) => range,
        None => attendance.month_to_date(),
    };

    Ok(HttpResponse::Ok().json(attendance.summary(employee_id, start, end).await?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{bearer, test_app};
    use crate::clock::FixedClock;
    use crate::model::attendance::Attendance;
    use crate::model::employee::EmployeeStatus;
    use crate::model::role::Role;
    use crate::service::Services;
    use crate::store::memory::MemoryStore;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[actix_web::test]
    async fn self_service_check_in_and_out() {
        let store = Arc::new(MemoryStore::new());
        let ann = store.seed_employee("Ann", EmployeeStatus::Active);
        let app = test_app!(Services::in_memory(store.clone(), Arc::new(FixedClock::on("2025-06-10"))));

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .insert_header(bearer(Role::Employee, Some(ann.id)))
            .to_request();
        let record: Attendance = test::call_and_read_body_json(&app, req).await;
        assert!(record.check_out.is_none());

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .insert_header(bearer(Role::Employee, Some(ann.id)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::put()
            .uri("/api/attendance")
            .insert_header(bearer(Role::Employee, Some(ann.id)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::put()
            .uri("/api/attendance")
            .insert_header(bearer(Role::Employee, Some(ann.id)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .insert_header(bearer(Role::Admin, None))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn hr_marks_and_summarises() {
        let store = Arc::new(MemoryStore::new());
        let ann = store.seed_employee("Ann", EmployeeStatus::Active);
        let app = test_app!(Services::in_memory(store.clone(), Arc::new(FixedClock::on("2025-06-10"))));

        let req = test::TestRequest::post()
            .uri("/api/attendance/mark")
            .insert_header(bearer(Role::HrManager, None))
            .set_json(json!({
                "employee_id": ann.id,
                "date": "2025-06-09",
                "check_in": "09:15:00",
                "status": "late"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/attendance/mark")
            .insert_header(bearer(Role::HrManager, None))
            .set_json(json!({
                "employee_id": ann.id,
                "date": "2025-06-11",
                "status": "present"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/attendance/summary/{}?start=2025-06-01&end=2025-06-30",
                ann.id
            ))
            .insert_header(bearer(Role::Employee, Some(ann.id)))
            .to_request();
        let summary: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["counts"]["late"], 1);
        assert_eq!(summary["counts"]["half_day"], 0);
        assert_eq!(summary["total"], 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/attendance/summary/{}", ann.id))
            .insert_header(bearer(Role::Employee, Some(ann.id)))
            .to_request();
        let summary: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["start"], "2025-06-01");
        assert_eq!(summary["end"], "2025-06-10");

        let req = test::TestRequest::get()
            .uri(&format!("/api/attendance/employee/{}?start=2025-06-01", ann.id))
            .insert_header(bearer(Role::Manager, Some(99)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
