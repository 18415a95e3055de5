use std::collections::BTreeMap;
use std::sync::Arc;

use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::model::leave_request::{
    LeaveApplication, LeaveBalance, LeaveDecision, LeaveRequest, LeaveStatus, LeaveType,
    NewLeaveRequest,
};
use crate::store::{EmployeeDirectory, InsertOutcome, LeaveStore};

const MAX_REMARKS_LEN: usize = 500;

fn overlap_conflict() -> ServiceError {
    ServiceError::Conflict("Leave request overlaps with an existing leave".into())
}

/// Bounds on the free-text reason of a leave request, in characters after trimming.
#[derive(Debug, Clone, Copy)]
pub struct LeavePolicy {
    pub reason_min: usize,
    pub reason_max: usize,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            reason_min: 10,
            reason_max: 500,
        }
    }
}

impl LeavePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reason_min: config.leave_reason_min_len,
            reason_max: config.leave_reason_max_len,
        }
    }
}

/// Submission, decision and cancellation of leave requests.
///
/// Every status change goes through a conditional write in the [`LeaveStore`],
/// so two callers racing on the same request cannot both succeed.
pub struct LeaveWorkflow {
    directory: Arc<dyn EmployeeDirectory>,
    leaves: Arc<dyn LeaveStore>,
    clock: Arc<dyn Clock>,
    policy: LeavePolicy,
}

impl LeaveWorkflow {
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        leaves: Arc<dyn LeaveStore>,
        clock: Arc<dyn Clock>,
        policy: LeavePolicy,
    ) -> Self {
        Self {
            directory,
            leaves,
            clock,
            policy,
        }
    }

    pub async fn request_leave(
        &self,
        employee_id: u64,
        application: &LeaveApplication,
    ) -> ServiceResult<LeaveRequest> {
        let employee = self
            .directory
            .find(employee_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {employee_id} not found")))?;

        if !employee.is_active() {
            debug!(employee_id, status = employee.status.as_ref(), "Leave refused for non-active employee");
            return Err(ServiceError::InvalidState(format!(
                "Employee {employee_id} is not active"
            )));
        }

        if application.start_date > application.end_date {
            return Err(ServiceError::InvalidInput(
                "start_date cannot be after end_date".into(),
            ));
        }

        let today = self.clock.today();
        if application.start_date < today {
            return Err(ServiceError::InvalidInput(
                "Cannot apply for leave in the past".into(),
            ));
        }

        let reason = application.reason.trim();
        let reason_len = reason.chars().count();
        if reason_len < self.policy.reason_min || reason_len > self.policy.reason_max {
            return Err(ServiceError::InvalidInput(format!(
                "Reason must be between {} and {} characters",
                self.policy.reason_min, self.policy.reason_max
            )));
        }

        // insert_exclusive repeats this check under the employee lock
        if self
            .leaves
            .has_overlap(employee_id, application.start_date, application.end_date, None)
            .await?
        {
            debug!(employee_id, start = %application.start_date, end = %application.end_date, "Overlapping leave request");
            return Err(overlap_conflict());
        }

        let new = NewLeaveRequest {
            employee_id,
            leave_type: application.leave_type,
            start_date: application.start_date,
            end_date: application.end_date,
            reason: reason.to_string(),
            created_at: self.clock.now(),
        };

        match self.leaves.insert_exclusive(&new).await? {
            InsertOutcome::Inserted(leave) => {
                info!(
                    leave_id = leave.id,
                    employee_id,
                    leave_type = leave.leave_type.as_ref(),
                    total_days = leave.total_days,
                    "Leave request submitted"
                );
                Ok(leave)
            }
            InsertOutcome::Overlap => {
                debug!(employee_id, start = %new.start_date, end = %new.end_date, "Overlapping leave request lost the race");
                Err(overlap_conflict())
            }
        }
    }

    pub async fn approve_leave(
        &self,
        leave_id: u64,
        approver_id: u64,
        remarks: Option<String>,
    ) -> ServiceResult<LeaveRequest> {
        self.decide(leave_id, approver_id, remarks, LeaveStatus::Approved)
            .await
    }

    pub async fn reject_leave(
        &self,
        leave_id: u64,
        approver_id: u64,
        remarks: Option<String>,
    ) -> ServiceResult<LeaveRequest> {
        self.decide(leave_id, approver_id, remarks, LeaveStatus::Rejected)
            .await
    }

    async fn decide(
        &self,
        leave_id: u64,
        approver_id: u64,
        remarks: Option<String>,
        status: LeaveStatus,
    ) -> ServiceResult<LeaveRequest> {
        let remarks = remarks
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        if remarks
            .as_deref()
            .is_some_and(|r| r.chars().count() > MAX_REMARKS_LEN)
        {
            return Err(ServiceError::InvalidInput(format!(
                "Remarks cannot exceed {MAX_REMARKS_LEN} characters"
            )));
        }

        let decision = LeaveDecision {
            status,
            approver_id,
            decided_at: self.clock.now(),
            remarks,
        };

        match self.leaves.decide(leave_id, &decision).await? {
            Some(leave) => {
                info!(
                    leave_id,
                    approver_id,
                    employee_id = leave.employee_id,
                    status = status.as_ref(),
                    "Leave request decided"
                );
                Ok(leave)
            }
            None => {
                warn!(leave_id, approver_id, status = status.as_ref(), "Leave decision refused");
                Err(ServiceError::InvalidState(format!(
                    "Leave request {leave_id} not found or is not pending"
                )))
            }
        }
    }

    /// `Ok(false)` when the request does not exist.
    pub async fn cancel_leave(&self, leave_id: u64, employee_id: u64) -> ServiceResult<bool> {
        let Some(leave) = self.leaves.find(leave_id).await? else {
            return Ok(false);
        };

        if leave.employee_id != employee_id {
            warn!(leave_id, employee_id, owner = leave.employee_id, "Cancel by non-owner");
            return Err(ServiceError::Unauthorized(
                "You can only cancel your own leaves".into(),
            ));
        }

        if !leave.status.can_transition_to(LeaveStatus::Cancelled) {
            return Err(ServiceError::InvalidState(format!(
                "Cannot cancel a leave request that is {}",
                leave.status.as_ref()
            )));
        }

        if !self.leaves.cancel(leave_id, self.clock.now()).await? {
            // Decided or cancelled between the read and the write.
            return Err(ServiceError::InvalidState(format!(
                "Leave request {leave_id} changed while cancelling"
            )));
        }

        info!(leave_id, employee_id, previous = leave.status.as_ref(), "Leave request cancelled");
        Ok(true)
    }

    /// Approved days per type for requests starting in `year`. Every type is present.
    pub async fn leave_balance(&self, employee_id: u64, year: i32) -> ServiceResult<LeaveBalance> {
        let mut days: BTreeMap<LeaveType, i64> = LeaveType::iter().map(|t| (t, 0)).collect();

        for (leave_type, total) in self.leaves.approved_days_in_year(employee_id, year).await? {
            days.insert(leave_type, total);
        }

        Ok(LeaveBalance {
            employee_id,
            year,
            days,
        })
    }

    pub async fn get(&self, leave_id: u64) -> ServiceResult<Option<LeaveRequest>> {
        Ok(self.leaves.find(leave_id).await?)
    }

    pub async fn list_for_employee(&self, employee_id: u64) -> ServiceResult<Vec<LeaveRequest>> {
        Ok(self.leaves.list_for_employee(employee_id).await?)
    }

    pub async fn list_pending(&self) -> ServiceResult<Vec<LeaveRequest>> {
        Ok(self.leaves.list_pending().await?)
    }

    pub async fn list_by_status(&self, status: LeaveStatus) -> ServiceResult<Vec<LeaveRequest>> {
        Ok(self.leaves.list_by_status(status).await?)
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<LeaveRequest>> {
        Ok(self.leaves.list_all().await?)
    }
}
