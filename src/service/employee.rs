use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::model::employee::{
    Employee, EmployeeFilter, EmployeeProfile, EmployeeStatus, NewEmployee, next_employee_code,
};
use crate::store::{DepartmentStore, EmployeeDirectory, LeaveStore};

pub struct EmployeeService {
    directory: Arc<dyn EmployeeDirectory>,
    departments: Arc<dyn DepartmentStore>,
    leaves: Arc<dyn LeaveStore>,
    clock: Arc<dyn Clock>,
}

fn normalize_email(email: &str) -> ServiceResult<String> {
    let trimmed = email.trim();
    if !email_address::EmailAddress::is_valid(trimmed) {
        return Err(ServiceError::InvalidInput(format!("Invalid email: {trimmed}")));
    }

    // the parser accepts dotless domains
    let has_tld = trimmed
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'));
    if !has_tld {
        return Err(ServiceError::InvalidInput(format!(
            "Invalid email: {trimmed} (domain needs a TLD)"
        )));
    }

    Ok(trimmed.to_lowercase())
}

/// Checks required fields and stores the email in its lowercase form.
fn validate_profile(profile: &mut EmployeeProfile) -> ServiceResult<()> {
    if profile.first_name.trim().is_empty() || profile.last_name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "First name and last name are required".into(),
        ));
    }

    profile.email = normalize_email(&profile.email)?;

    if profile.end_date.is_some_and(|end| end < profile.hire_date) {
        return Err(ServiceError::InvalidInput(
            "end_date cannot be before hire_date".into(),
        ));
    }

    Ok(())
}

impl EmployeeService {
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        departments: Arc<dyn DepartmentStore>,
        leaves: Arc<dyn LeaveStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            departments,
            leaves,
            clock,
        }
    }

    async fn ensure_taxonomy(&self, profile: &EmployeeProfile) -> ServiceResult<()> {
        if self.departments.find(profile.department_id).await?.is_none() {
            return Err(ServiceError::InvalidInput(format!(
                "Department {} does not exist",
                profile.department_id
            )));
        }
        if self
            .departments
            .find_designation(profile.designation_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::InvalidInput(format!(
                "Designation {} does not exist",
                profile.designation_id
            )));
        }
        Ok(())
    }

    /// Walks up from `manager_id` and fails if the chain reaches `employee_id`
    /// or loops.
    async fn ensure_no_cycle(&self, employee_id: Option<u64>, manager_id: u64) -> ServiceResult<()> {
        let mut visited = HashSet::new();
        let mut current = Some(manager_id);

        while let Some(id) = current {
            if Some(id) == employee_id {
                return Err(ServiceError::InvalidInput(
                    "Manager assignment would create a reporting cycle".into(),
                ));
            }
            if !visited.insert(id) {
                return Err(ServiceError::InvalidInput(format!(
                    "Reporting chain above employee {manager_id} is cyclic"
                )));
            }

            current = match self.directory.find(id).await? {
                Some(employee) => employee.manager_id,
                None if id == manager_id => {
                    return Err(ServiceError::InvalidInput(format!(
                        "Manager {manager_id} does not exist"
                    )));
                }
                None => None,
            };
        }

        Ok(())
    }

    pub async fn create(&self, mut profile: EmployeeProfile) -> ServiceResult<Employee> {
        validate_profile(&mut profile)?;

        if self.directory.find_by_email(&profile.email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Email {} is already in use",
                profile.email
            )));
        }

        self.ensure_taxonomy(&profile).await?;
        if let Some(manager_id) = profile.manager_id {
            self.ensure_no_cycle(None, manager_id).await?;
        }

        let last = self.directory.last_code().await?;
        let new = NewEmployee {
            employee_code: next_employee_code(last.as_deref()),
            profile,
            status: EmployeeStatus::Active,
            created_at: self.clock.now(),
        };

        let employee = self.directory.insert(&new).await.map_err(|err| match err {
            StoreError::Constraint(_) => {
                ServiceError::Conflict("Employee code or email already in use".into())
            }
            other => other.into(),
        })?;

        info!(employee_id = employee.id, code = %employee.employee_code, name = %employee.full_name(), "Employee created");
        Ok(employee)
    }

    pub async fn update(&self, id: u64, mut profile: EmployeeProfile) -> ServiceResult<Employee> {
        if self.directory.find(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Employee {id} not found")));
        }

        validate_profile(&mut profile)?;

        if let Some(other) = self.directory.find_by_email(&profile.email).await? {
            if other.id != id {
                return Err(ServiceError::Conflict(format!(
                    "Email {} is already in use",
                    profile.email
                )));
            }
        }

        self.ensure_taxonomy(&profile).await?;
        if let Some(manager_id) = profile.manager_id {
            self.ensure_no_cycle(Some(id), manager_id).await?;
        }

        let employee = self
            .directory
            .update(id, &profile, self.clock.now())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {id} not found")))?;

        info!(employee_id = id, manager_id = ?employee.manager_id, "Employee updated");
        Ok(employee)
    }

    pub async fn set_status(&self, id: u64, status: EmployeeStatus) -> ServiceResult<Employee> {
        let employee = self
            .directory
            .set_status(id, status, self.clock.now())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {id} not found")))?;

        info!(employee_id = id, status = status.as_ref(), "Employee status changed");
        Ok(employee)
    }

    /// `Ok(false)` when the employee does not exist.
    pub async fn delete(&self, id: u64) -> ServiceResult<bool> {
        if self.directory.find(id).await?.is_none() {
            return Ok(false);
        }

        if self.leaves.has_active_approved(id, self.clock.today()).await? {
            warn!(employee_id = id, "Delete refused: employee has approved leave ahead");
            return Err(ServiceError::InvalidState(format!(
                "Employee {id} has approved leave that has not ended"
            )));
        }

        let deleted = self.directory.delete(id).await.map_err(|err| match err {
            StoreError::Constraint(_) => ServiceError::Conflict(format!(
                "Employee {id} still has leave or attendance records"
            )),
            other => other.into(),
        })?;

        if deleted {
            info!(employee_id = id, "Employee deleted");
        }
        Ok(deleted)
    }

    pub async fn get(&self, id: u64) -> ServiceResult<Employee> {
        self.directory
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {id} not found")))
    }

    pub async fn get_by_code(&self, code: &str) -> ServiceResult<Employee> {
        self.directory
            .find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {code} not found")))
    }

    pub async fn list(&self, filter: &EmployeeFilter) -> ServiceResult<Vec<Employee>> {
        Ok(self.directory.list(filter).await?)
    }

    pub async fn subordinates(&self, manager_id: u64) -> ServiceResult<Vec<Employee>> {
        if self.directory.find(manager_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Employee {manager_id} not found"
            )));
        }
        Ok(self.directory.subordinates(manager_id).await?)
    }
}
