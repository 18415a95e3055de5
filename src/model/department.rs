use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "ENG")]
    pub code: Option<String>,
    pub description: Option<String>,
    /// Department head, by employee id
    pub head_employee_id: Option<u64>,
    pub location: Option<String>,
    pub is_active: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentWithCount {
    #[serde(flatten)]
    pub department: Department,
    #[schema(example = 12)]
    pub employee_count: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DepartmentInput {
    #[schema(example = "Engineering")]
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub head_employee_id: Option<u64>,
    pub location: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

pub(crate) fn default_active() -> bool {
    true
}
