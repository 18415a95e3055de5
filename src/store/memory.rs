//! In-memory implementation of every store trait, used by unit tests. A single
//! mutex around the state gives the same atomicity the MySQL statements give.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use super::{AccountStore, AttendanceStore, DepartmentStore, EmployeeDirectory, InsertOutcome, LeaveStore};
use crate::error::{StoreError, StoreResult};
use crate::model::attendance::{Attendance, AttendanceEntry, AttendanceStatus};
use crate::model::department::{Department, DepartmentInput, DepartmentWithCount};
use crate::model::designation::{Designation, DesignationInput};
use crate::model::employee::{
    Employee, EmployeeFilter, EmployeeProfile, EmployeeStatus, NewEmployee,
};
use crate::model::leave_request::{
    LeaveDecision, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest, inclusive_days,
    ranges_overlap,
};
use crate::model::user::{RefreshTokenRecord, User};

#[derive(Default)]
struct State {
    next_id: u64,
    employees: BTreeMap<u64, Employee>,
    leaves: BTreeMap<u64, LeaveRequest>,
    attendance: BTreeMap<u64, Attendance>,
    departments: BTreeMap<u64, Department>,
    designations: BTreeMap<u64, Designation>,
    users: BTreeMap<u64, User>,
    refresh_tokens: BTreeMap<String, RefreshTokenRecord>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an employee directly, bypassing service validation.
    pub fn seed_employee(&self, first_name: &str, status: EmployeeStatus) -> Employee {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = Utc::now();
        let employee = Employee {
            id,
            employee_code: format!("EMP-{id:04}"),
            first_name: first_name.to_string(),
            middle_name: None,
            last_name: "Tester".to_string(),
            email: format!("{}.{id}@example.com", first_name.to_lowercase()),
            phone: None,
            department_id: 1,
            designation_id: 1,
            hire_date: now.date_naive(),
            end_date: None,
            status,
            manager_id: None,
            created_at: now,
            updated_at: now,
        };
        state.employees.insert(id, employee.clone());
        employee
    }

    pub fn set_manager(&self, employee_id: u64, manager_id: Option<u64>) {
        let mut state = self.state.lock().unwrap();
        if let Some(employee) = state.employees.get_mut(&employee_id) {
            employee.manager_id = manager_id;
        }
    }

    /// Adds a leave request in any status, bypassing the workflow.
    pub fn seed_leave(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        start: NaiveDate,
        end: NaiveDate,
        status: LeaveStatus,
    ) -> LeaveRequest {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = Utc::now();
        let decided = matches!(status, LeaveStatus::Approved | LeaveStatus::Rejected);
        let leave = LeaveRequest {
            id,
            employee_id,
            leave_type,
            start_date: start,
            end_date: end,
            reason: "seeded leave request".to_string(),
            status,
            approved_by: decided.then_some(employee_id),
            approved_at: decided.then_some(now),
            approval_remarks: None,
            total_days: inclusive_days(start, end),
            created_at: now,
            updated_at: now,
        };
        state.leaves.insert(id, leave.clone());
        leave
    }

    pub fn leave_count(&self) -> usize {
        self.state.lock().unwrap().leaves.len()
    }

    pub fn seed_department(&self, name: &str) -> Department {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = Utc::now();
        let department = Department {
            id,
            name: name.to_string(),
            code: None,
            description: None,
            head_employee_id: None,
            location: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.departments.insert(id, department.clone());
        department
    }

    pub fn seed_designation(&self, title: &str) -> Designation {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = Utc::now();
        let designation = Designation {
            id,
            title: title.to_string(),
            code: None,
            description: None,
            level: 1,
            min_salary: None,
            max_salary: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.designations.insert(id, designation.clone());
        designation
    }
}

fn newest_first(leaves: &mut [LeaveRequest]) {
    leaves.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn find(&self, id: u64) -> StoreResult<Option<Employee>> {
        Ok(self.state.lock().unwrap().employees.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        let state = self.state.lock().unwrap();
        Ok(state.employees.values().find(|e| e.email == email).cloned())
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Employee>> {
        let state = self.state.lock().unwrap();
        Ok(state.employees.values().find(|e| e.employee_code == code).cloned())
    }

    async fn last_code(&self) -> StoreResult<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .employees
            .values()
            .next_back()
            .map(|e| e.employee_code.clone()))
    }

    async fn list(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let state = self.state.lock().unwrap();
        let term = filter.search.as_deref().map(str::to_lowercase);
        let mut employees: Vec<Employee> = state
            .employees
            .values()
            .filter(|e| filter.department_id.is_none_or(|d| e.department_id == d))
            .filter(|e| filter.status.is_none_or(|s| e.status == s))
            .filter(|e| match &term {
                Some(term) => [&e.employee_code, &e.first_name, &e.last_name, &e.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(term.as_str())),
                None => true,
            })
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));
        Ok(employees)
    }

    async fn subordinates(&self, manager_id: u64) -> StoreResult<Vec<Employee>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .employees
            .values()
            .filter(|e| e.manager_id == Some(manager_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, new: &NewEmployee) -> StoreResult<Employee> {
        let mut state = self.state.lock().unwrap();
        if state
            .employees
            .values()
            .any(|e| e.email == new.profile.email || e.employee_code == new.employee_code)
        {
            return Err(StoreError::Constraint("duplicate employee".into()));
        }

        let id = state.next_id();
        let p = &new.profile;
        let employee = Employee {
            id,
            employee_code: new.employee_code.clone(),
            first_name: p.first_name.clone(),
            middle_name: p.middle_name.clone(),
            last_name: p.last_name.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
            department_id: p.department_id,
            designation_id: p.designation_id,
            hire_date: p.hire_date,
            end_date: p.end_date,
            status: new.status,
            manager_id: p.manager_id,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        state.employees.insert(id, employee.clone());
        Ok(employee)
    }

    async fn update(
        &self,
        id: u64,
        profile: &EmployeeProfile,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Employee>> {
        let mut state = self.state.lock().unwrap();
        let Some(employee) = state.employees.get_mut(&id) else {
            return Ok(None);
        };
        employee.first_name = profile.first_name.clone();
        employee.middle_name = profile.middle_name.clone();
        employee.last_name = profile.last_name.clone();
        employee.email = profile.email.clone();
        employee.phone = profile.phone.clone();
        employee.department_id = profile.department_id;
        employee.designation_id = profile.designation_id;
        employee.hire_date = profile.hire_date;
        employee.end_date = profile.end_date;
        employee.manager_id = profile.manager_id;
        employee.updated_at = at;
        Ok(Some(employee.clone()))
    }

    async fn set_status(
        &self,
        id: u64,
        status: EmployeeStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Employee>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.employees.get_mut(&id).map(|employee| {
            employee.status = status;
            employee.updated_at = at;
            employee.clone()
        }))
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let referenced = state.leaves.values().any(|l| l.employee_id == id)
            || state.attendance.values().any(|a| a.employee_id == id);
        if referenced {
            return Err(StoreError::Constraint("employee is referenced".into()));
        }
        Ok(state.employees.remove(&id).is_some())
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn find(&self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        Ok(self.state.lock().unwrap().leaves.get(&id).cloned())
    }

    async fn list_for_employee(&self, employee_id: u64) -> StoreResult<Vec<LeaveRequest>> {
        let state = self.state.lock().unwrap();
        let mut leaves: Vec<_> = state
            .leaves
            .values()
            .filter(|l| l.employee_id == employee_id)
            .cloned()
            .collect();
        newest_first(&mut leaves);
        Ok(leaves)
    }

    async fn list_by_status(&self, status: LeaveStatus) -> StoreResult<Vec<LeaveRequest>> {
        let state = self.state.lock().unwrap();
        let mut leaves: Vec<_> = state
            .leaves
            .values()
            .filter(|l| l.status == status)
            .cloned()
            .collect();
        newest_first(&mut leaves);
        Ok(leaves)
    }

    async fn list_pending(&self) -> StoreResult<Vec<LeaveRequest>> {
        let mut leaves = self.list_by_status(LeaveStatus::Pending).await?;
        leaves.reverse();
        Ok(leaves)
    }

    async fn list_all(&self) -> StoreResult<Vec<LeaveRequest>> {
        let state = self.state.lock().unwrap();
        let mut leaves: Vec<_> = state.leaves.values().cloned().collect();
        newest_first(&mut leaves);
        Ok(leaves)
    }

    async fn has_overlap(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<u64>,
    ) -> StoreResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.leaves.values().any(|l| {
            l.employee_id == employee_id
                && l.status.blocks_overlap()
                && Some(l.id) != exclude_id
                && ranges_overlap(l.start_date, l.end_date, start, end)
        }))
    }

    async fn insert_exclusive(&self, new: &NewLeaveRequest) -> StoreResult<InsertOutcome> {
        let mut state = self.state.lock().unwrap();
        let overlaps = state.leaves.values().any(|l| {
            l.employee_id == new.employee_id
                && l.status.blocks_overlap()
                && ranges_overlap(l.start_date, l.end_date, new.start_date, new.end_date)
        });
        if overlaps {
            return Ok(InsertOutcome::Overlap);
        }

        let id = state.next_id();
        let leave = LeaveRequest {
            id,
            employee_id: new.employee_id,
            leave_type: new.leave_type,
            start_date: new.start_date,
            end_date: new.end_date,
            reason: new.reason.clone(),
            status: LeaveStatus::Pending,
            approved_by: None,
            approved_at: None,
            approval_remarks: None,
            total_days: inclusive_days(new.start_date, new.end_date),
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        state.leaves.insert(id, leave.clone());
        Ok(InsertOutcome::Inserted(leave))
    }

    async fn decide(&self, id: u64, decision: &LeaveDecision) -> StoreResult<Option<LeaveRequest>> {
        let mut state = self.state.lock().unwrap();
        match state.leaves.get_mut(&id) {
            Some(leave) if leave.status == LeaveStatus::Pending => {
                leave.status = decision.status;
                leave.approved_by = Some(decision.approver_id);
                leave.approved_at = Some(decision.decided_at);
                leave.approval_remarks = decision.remarks.clone();
                leave.updated_at = decision.decided_at;
                Ok(Some(leave.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn cancel(&self, id: u64, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state.leaves.get_mut(&id) {
            Some(leave) if leave.status.can_transition_to(LeaveStatus::Cancelled) => {
                leave.status = LeaveStatus::Cancelled;
                leave.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn approved_days_in_year(
        &self,
        employee_id: u64,
        year: i32,
    ) -> StoreResult<Vec<(LeaveType, i64)>> {
        let state = self.state.lock().unwrap();
        let mut totals: BTreeMap<LeaveType, i64> = BTreeMap::new();
        for leave in state.leaves.values().filter(|l| {
            l.employee_id == employee_id
                && l.status == LeaveStatus::Approved
                && l.start_date.year() == year
        }) {
            *totals.entry(leave.leave_type).or_default() += leave.total_days;
        }
        Ok(totals.into_iter().collect())
    }

    async fn has_active_approved(&self, employee_id: u64, today: NaiveDate) -> StoreResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.leaves.values().any(|l| {
            l.employee_id == employee_id && l.status == LeaveStatus::Approved && l.end_date >= today
        }))
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn upsert(&self, entry: &AttendanceEntry) -> StoreResult<Attendance> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .attendance
            .values_mut()
            .find(|a| a.employee_id == entry.employee_id && a.date == entry.date);

        if let Some(record) = existing {
            record.check_in = entry.check_in;
            record.check_out = entry.check_out;
            record.status = entry.status;
            record.remarks = entry.remarks.clone();
            record.updated_at = entry.recorded_at;
            return Ok(record.clone());
        }

        let id = state.next_id();
        let record = Attendance {
            id,
            employee_id: entry.employee_id,
            date: entry.date,
            check_in: entry.check_in,
            check_out: entry.check_out,
            status: entry.status,
            remarks: entry.remarks.clone(),
            created_at: entry.recorded_at,
            updated_at: entry.recorded_at,
        };
        state.attendance.insert(id, record.clone());
        Ok(record)
    }

    async fn check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Attendance>> {
        {
            let state = self.state.lock().unwrap();
            if state
                .attendance
                .values()
                .any(|a| a.employee_id == employee_id && a.date == date)
            {
                return Ok(None);
            }
        }

        let entry = AttendanceEntry {
            employee_id,
            date,
            check_in: Some(time),
            check_out: None,
            status: AttendanceStatus::Present,
            remarks: None,
            recorded_at: at,
        };
        self.upsert(&entry).await.map(Some)
    }

    async fn check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Attendance>> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .attendance
            .values_mut()
            .find(|a| {
                a.employee_id == employee_id
                    && a.date == date
                    && a.check_in.is_some()
                    && a.check_out.is_none()
            })
            .map(|record| {
                record.check_out = Some(time);
                record.updated_at = at;
                record.clone()
            }))
    }

    async fn list(
        &self,
        employee_id: u64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> StoreResult<Vec<Attendance>> {
        let state = self.state.lock().unwrap();
        let mut records: Vec<_> = state
            .attendance
            .values()
            .filter(|a| a.employee_id == employee_id)
            .filter(|a| range.is_none_or(|(start, end)| a.date >= start && a.date <= end))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn count_by_status(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<(AttendanceStatus, i64)>> {
        let records = AttendanceStore::list(self, employee_id, Some((start, end))).await?;
        let mut counts: BTreeMap<AttendanceStatus, i64> = BTreeMap::new();
        for record in records {
            *counts.entry(record.status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn find(&self, id: u64) -> StoreResult<Option<Department>> {
        Ok(self.state.lock().unwrap().departments.get(&id).cloned())
    }

    async fn list_with_counts(&self) -> StoreResult<Vec<DepartmentWithCount>> {
        let state = self.state.lock().unwrap();
        let mut departments: Vec<_> = state
            .departments
            .values()
            .map(|d| DepartmentWithCount {
                department: d.clone(),
                employee_count: state
                    .employees
                    .values()
                    .filter(|e| e.department_id == d.id)
                    .count() as i64,
            })
            .collect();
        departments.sort_by(|a, b| a.department.name.cmp(&b.department.name));
        Ok(departments)
    }

    async fn list_active(&self) -> StoreResult<Vec<Department>> {
        let state = self.state.lock().unwrap();
        let mut departments: Vec<_> = state
            .departments
            .values()
            .filter(|d| d.is_active)
            .cloned()
            .collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn insert(&self, input: &DepartmentInput, at: DateTime<Utc>) -> StoreResult<Department> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let department = Department {
            id,
            name: input.name.clone(),
            code: input.code.clone(),
            description: input.description.clone(),
            head_employee_id: input.head_employee_id,
            location: input.location.clone(),
            is_active: input.is_active,
            created_at: at,
            updated_at: at,
        };
        state.departments.insert(id, department.clone());
        Ok(department)
    }

    async fn update(
        &self,
        id: u64,
        input: &DepartmentInput,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Department>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.departments.get_mut(&id).map(|department| {
            department.name = input.name.clone();
            department.code = input.code.clone();
            department.description = input.description.clone();
            department.head_employee_id = input.head_employee_id;
            department.location = input.location.clone();
            department.is_active = input.is_active;
            department.updated_at = at;
            department.clone()
        }))
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.employees.values().any(|e| e.department_id == id) {
            return Err(StoreError::Constraint("department has employees".into()));
        }
        Ok(state.departments.remove(&id).is_some())
    }

    async fn find_designation(&self, id: u64) -> StoreResult<Option<Designation>> {
        Ok(self.state.lock().unwrap().designations.get(&id).cloned())
    }

    async fn list_designations(&self) -> StoreResult<Vec<Designation>> {
        let state = self.state.lock().unwrap();
        let mut designations: Vec<_> = state.designations.values().cloned().collect();
        designations.sort_by(|a, b| a.level.cmp(&b.level).then(a.title.cmp(&b.title)));
        Ok(designations)
    }

    async fn insert_designation(
        &self,
        input: &DesignationInput,
        at: DateTime<Utc>,
    ) -> StoreResult<Designation> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let designation = Designation {
            id,
            title: input.title.clone(),
            code: input.code.clone(),
            description: input.description.clone(),
            level: input.level,
            min_salary: input.min_salary,
            max_salary: input.max_salary,
            is_active: input.is_active,
            created_at: at,
            updated_at: at,
        };
        state.designations.insert(id, designation.clone());
        Ok(designation)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role_id: u8,
        employee_id: Option<u64>,
    ) -> StoreResult<u64> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.username == username) {
            return Err(StoreError::Constraint("duplicate username".into()));
        }
        let id = state.next_id();
        state.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password: password_hash.to_string(),
                role_id,
                employee_id,
                is_active: true,
            },
        );
        Ok(id)
    }

    async fn touch_last_login(&self, _user_id: u64, _at: DateTime<Utc>) -> StoreResult<()> {
        Ok(())
    }

    async fn store_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.refresh_tokens.insert(
            jti.to_string(),
            RefreshTokenRecord {
                user_id,
                revoked: false,
                expires_at,
            },
        );
        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> StoreResult<Option<RefreshTokenRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state.refresh_tokens.get(jti).cloned())
    }

    async fn rotate_refresh_token(
        &self,
        old_jti: &str,
        user_id: u64,
        new_jti: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        {
            let mut state = self.state.lock().unwrap();
            match state
                .refresh_tokens
                .get_mut(old_jti)
                .filter(|t| !t.revoked)
            {
                Some(token) => token.revoked = true,
                None => return Ok(false),
            }
        }
        self.store_refresh_token(user_id, new_jti, expires_at).await?;
        Ok(true)
    }

    async fn revoke_refresh_token(&self, jti: &str) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .refresh_tokens
            .get_mut(jti)
            .map(|token| token.revoked = true)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[actix_web::test]
    async fn overlap_query_ignores_closed_and_excluded_requests() {
        let store = MemoryStore::new();
        let ann = store.seed_employee("Ann", EmployeeStatus::Active);
        let open = store.seed_leave(
            ann.id,
            LeaveType::Annual,
            day("2025-07-05"),
            day("2025-07-07"),
            LeaveStatus::Pending,
        );
        store.seed_leave(
            ann.id,
            LeaveType::Sick,
            day("2025-07-10"),
            day("2025-07-12"),
            LeaveStatus::Rejected,
        );

        let overlaps = |start, end, exclude| {
            LeaveStore::has_overlap(&store, ann.id, day(start), day(end), exclude)
        };
        assert!(overlaps("2025-07-07", "2025-07-08", None).await.unwrap());
        assert!(!overlaps("2025-07-07", "2025-07-08", Some(open.id)).await.unwrap());
        assert!(!overlaps("2025-07-11", "2025-07-11", None).await.unwrap());
        assert!(!overlaps("2025-07-08", "2025-07-09", None).await.unwrap());
    }
}
