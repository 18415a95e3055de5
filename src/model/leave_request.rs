use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};
use utoipa::ToSchema;

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
pub enum LeaveType {
    Sick,
    Casual,
    Annual,
    Unpaid,
    Maternity,
    Paternity,
    Emergency,
}

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
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

text_column!(LeaveType);
text_column!(LeaveStatus);

impl LeaveStatus {
    /// Pending -> Approved | Rejected | Cancelled, Approved -> Cancelled.
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        use LeaveStatus::*;

        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Pending, Cancelled) | (Approved, Cancelled)
        )
    }

    /// Pending and approved requests hold their date range against new requests.
    pub fn blocks_overlap(self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family function out of town")]
    pub reason: String,
    pub status: LeaveStatus,
    /// Employee who approved or rejected the request
    pub approved_by: Option<u64>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = Option<String>)]
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_remarks: Option<String>,
    /// Inclusive day count, computed by the store
    #[schema(example = 3)]
    pub total_days: i64,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

/// Inclusive number of calendar days in `[start, end]`. MySQL computes the
/// same through `DATEDIFF`; this one backs the in-memory store.
#[cfg(test)]
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Closed-interval overlap: the ranges share at least one calendar day.
#[cfg(test)]
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Body of a leave submission. The employee comes from the caller's identity.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaveApplication {
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family function out of town")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LeaveRemarks {
    #[schema(example = "Enjoy your trip")]
    pub remarks: Option<String>,
}

/// Approved days per leave type for one calendar year.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveBalance {
    pub employee_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(value_type = Object, example = json!({"sick": 2, "casual": 0, "annual": 5}))]
    pub days: BTreeMap<LeaveType, i64>,
}

/// Terminal decision recorded by an approver.
#[derive(Debug, Clone)]
pub struct LeaveDecision {
    pub status: LeaveStatus,
    pub approver_id: u64,
    pub decided_at: DateTime<Utc>,
    pub remarks: Option<String>,
}
