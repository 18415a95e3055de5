use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
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
    PartialOrd,
    Ord,
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
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
    OnLeave,
}

text_column!(AttendanceStatus);

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "17:30:00")]
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl Attendance {
    /// Hours between check-in and check-out, when both are recorded.
    pub fn working_hours(&self) -> Option<f64> {
        match (self.check_in, self.check_out) {
            (Some(start), Some(end)) => Some((end - start).num_seconds() as f64 / 3600.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttendanceEntry {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Attendance recorded by HR on an employee's behalf.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MarkAttendance {
    pub employee_id: u64,
    #[schema(value_type = String, format = "date", example = "2026-01-05")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "17:30:00")]
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRange {
    /// Inclusive start, `YYYY-MM-DD`
    #[param(value_type = Option<String>, format = "date")]
    pub start: Option<NaiveDate>,
    /// Inclusive end, `YYYY-MM-DD`
    #[param(value_type = Option<String>, format = "date")]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub start: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end: NaiveDate,
    /// Record count per status, every status present
    #[schema(value_type = Object, example = json!({"present": 18, "absent": 1, "late": 2, "half_day": 0, "on_leave": 1}))]
    pub counts: BTreeMap<AttendanceStatus, i64>,
    #[schema(example = 22)]
    pub total: i64,
}
