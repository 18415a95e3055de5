use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::department::default_active;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Designation {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = "Software Engineer")]
    pub title: String,
    #[schema(example = "SE")]
    pub code: Option<String>,
    pub description: Option<String>,
    /// 1 is the top of the hierarchy
    #[schema(example = 4)]
    pub level: u32,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub is_active: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DesignationInput {
    #[schema(example = "Software Engineer")]
    pub title: String,
    pub code: Option<String>,
    pub description: Option<String>,
    #[schema(example = 4)]
    pub level: u32,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}
