use crate::api::employee::EmployeeStatusUpdate;
use crate::model::attendance::{Attendance, AttendanceStatus, AttendanceSummary, MarkAttendance};
use crate::model::department::{Department, DepartmentInput, DepartmentWithCount};
use crate::model::designation::{Designation, DesignationInput};
use crate::model::employee::{Employee, EmployeeProfile, EmployeeStatus};
use crate::model::leave_request::{
    LeaveApplication, LeaveBalance, LeaveRemarks, LeaveRequest, LeaveStatus, LeaveType,
};
use crate::model::role::Role;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Portal API",
        version = "1.0.0",
        description = r#"
## Employee Portal

Self-service portal for employees, their managers and HR staff.

### 🔹 Key Features
- **Leave Management**
  - Apply for leave, approve/reject/cancel requests, view history and yearly balance
- **Employee Directory**
  - Create, update, list and deactivate employee profiles with a management chain
- **Departments & Designations**
  - Organisation taxonomy used by employee profiles
- **Attendance**
  - Daily check-in and check-out, HR corrections and per-period summaries

### 🔐 Security
Every `/api` endpoint requires a **JWT Bearer** access token obtained from `/auth/login`.
Approvals need a Manager, HR manager or Admin role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::pending_leaves,
        crate::api::leave_request::employee_leaves,
        crate::api::leave_request::leave_balance,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::get_employee_by_code,
        crate::api::employee::update_employee,
        crate::api::employee::set_employee_status,
        crate::api::employee::delete_employee,
        crate::api::employee::subordinates,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::active_departments,
        crate::api::department::get_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,
        crate::api::department::create_designation,
        crate::api::department::list_designations,
        crate::api::department::get_designation,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::my_attendance,
        crate::api::attendance::employee_attendance,
        crate::api::attendance::attendance_summary
    ),
    components(
        schemas(
            LeaveRequest,
            LeaveApplication,
            LeaveRemarks,
            LeaveBalance,
            LeaveType,
            LeaveStatus,
            Employee,
            EmployeeProfile,
            EmployeeStatus,
            EmployeeStatusUpdate,
            Department,
            DepartmentWithCount,
            DepartmentInput,
            Designation,
            DesignationInput,
            Attendance,
            AttendanceStatus,
            MarkAttendance,
            AttendanceSummary,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Department", description = "Department and designation APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
