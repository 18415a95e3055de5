use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{ServiceError, ServiceResult};
use crate::model::attendance::{
    Attendance, AttendanceEntry, AttendanceStatus, AttendanceSummary, MarkAttendance,
};
use crate::store::{AttendanceStore, EmployeeDirectory};

pub struct AttendanceService {
    directory: Arc<dyn EmployeeDirectory>,
    attendance: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            attendance,
            clock,
        }
    }

    async fn ensure_employee(&self, employee_id: u64) -> ServiceResult<()> {
        match self.directory.find(employee_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(format!(
                "Employee {employee_id} not found"
            ))),
        }
    }

    /// First of the current month through today.
    pub fn month_to_date(&self) -> (NaiveDate, NaiveDate) {
        let today = self.clock.today();
        (today.with_day(1).unwrap_or(today), today)
    }

    /// Records or overwrites the attendance of one employee on one day.
    pub async fn mark(&self, input: MarkAttendance) -> ServiceResult<Attendance> {
        if input.date > self.clock.today() {
            return Err(ServiceError::InvalidInput(
                "Cannot mark attendance for a future date".into(),
            ));
        }
        if let (Some(check_in), Some(check_out)) = (input.check_in, input.check_out) {
            if check_out < check_in {
                return Err(ServiceError::InvalidInput(
                    "check_out cannot be before check_in".into(),
                ));
            }
        }
        self.ensure_employee(input.employee_id).await?;

        let entry = AttendanceEntry {
            employee_id: input.employee_id,
            date: input.date,
            check_in: input.check_in,
            check_out: input.check_out,
            status: input.status,
            remarks: input.remarks.filter(|r| !r.trim().is_empty()),
            recorded_at: self.clock.now(),
        };

        let record = self.attendance.upsert(&entry).await?;
        info!(
            employee_id = record.employee_id,
            date = %record.date,
            status = record.status.as_ref(),
            "Attendance marked"
        );
        Ok(record)
    }

    pub async fn check_in(&self, employee_id: u64) -> ServiceResult<Attendance> {
        self.ensure_employee(employee_id).await?;

        let now = self.clock.now();
        let today = now.date_naive();
        match self
            .attendance
            .check_in(employee_id, today, now.time(), now)
            .await?
        {
            Some(record) => {
                info!(employee_id, date = %today, "Checked in");
                Ok(record)
            }
            None => {
                debug!(employee_id, date = %today, "Duplicate check-in");
                Err(ServiceError::Conflict("Already checked in today".into()))
            }
        }
    }

    pub async fn check_out(&self, employee_id: u64) -> ServiceResult<Attendance> {
        let now = self.clock.now();
        let today = now.date_naive();
        match self
            .attendance
            .check_out(employee_id, today, now.time(), now)
            .await?
        {
            Some(record) => {
                info!(employee_id, date = %today, hours = ?record.working_hours(), "Checked out");
                Ok(record)
            }
            None => Err(ServiceError::InvalidState(
                "No open check-in for today".into(),
            )),
        }
    }

    pub async fn list(
        &self,
        employee_id: u64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> ServiceResult<Vec<Attendance>> {
        if let Some((start, end)) = range {
            if start > end {
                return Err(ServiceError::InvalidInput(
                    "start cannot be after end".into(),
                ));
            }
        }
        Ok(self.attendance.list(employee_id, range).await?)
    }

    /// Counts per status over `[start, end]`, with every status present.
    pub async fn summary(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<AttendanceSummary> {
        if start > end {
            return Err(ServiceError::InvalidInput(
                "start cannot be after end".into(),
            ));
        }
        self.ensure_employee(employee_id).await?;

        let mut counts: BTreeMap<AttendanceStatus, i64> =
            AttendanceStatus::iter().map(|s| (s, 0)).collect();
        for (status, count) in self.attendance.count_by_status(employee_id, start, end).await? {
            counts.insert(status, count);
        }
        let total = counts.values().sum();

        Ok(AttendanceSummary {
            employee_id,
            start,
            end,
            counts,
            total,
        })
    }
}
