use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};
use utoipa::{IntoParams, ToSchema};

use super::text_column;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    OnLeave,
    Terminated,
}

text_column!(EmployeeStatus);

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-0001",
        "first_name": "John",
        "middle_name": null,
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678",
        "department_id": 10,
        "designation_id": 3,
        "hire_date": "2024-01-01",
        "end_date": null,
        "status": "active",
        "manager_id": null,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-0001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(nullable = true)]
    pub middle_name: Option<String>,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = 10)]
    pub department_id: u64,

    #[schema(example = 3)]
    pub designation_id: u64,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,

    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,

    pub status: EmployeeStatus,

    /// Direct manager, by employee id
    #[schema(nullable = true)]
    pub manager_id: Option<u64>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

/// Mutable profile fields shared by create and update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EmployeeProfile {
    #[schema(example = "John")]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    pub phone: Option<String>,
    #[schema(example = 1)]
    pub department_id: u64,
    #[schema(example = 2)]
    pub designation_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub employee_code: String,
    pub profile: EmployeeProfile,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeFilter {
    /// Matches code, first name, last name or email
    pub search: Option<String>,
    /// Filter by department
    pub department_id: Option<u64>,
    /// Filter by status
    #[param(inline)]
    pub status: Option<EmployeeStatus>,
}

/// Next code in the `EMP-NNNN` sequence after `last`.
pub fn next_employee_code(last: Option<&str>) -> String {
    let last_number = last
        .and_then(|code| code.rsplit_once('-'))
        .and_then(|(_, digits)| digits.parse::<u64>().ok())
        .unwrap_or(0);

    format!("EMP-{:04}", last_number.saturating_add(1))
}
