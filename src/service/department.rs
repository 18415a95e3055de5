use std::ops::RangeInclusive;
use std::sync::Arc;

use tracing::info;

use crate::clock::Clock;
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::model::department::{Department, DepartmentInput, DepartmentWithCount};
use crate::model::designation::{Designation, DesignationInput};
use crate::store::DepartmentStore;

const NAME_LEN: RangeInclusive<usize> = 2..=100;

fn validate_name(field: &str, value: &str) -> ServiceResult<()> {
    if NAME_LEN.contains(&value.trim().chars().count()) {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "{field} must be between {} and {} characters",
            NAME_LEN.start(),
            NAME_LEN.end()
        )))
    }
}

/// Departments and designations, the taxonomy employees are filed under.
pub struct DepartmentService {
    departments: Arc<dyn DepartmentStore>,
    clock: Arc<dyn Clock>,
}

impl DepartmentService {
    pub fn new(departments: Arc<dyn DepartmentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { departments, clock }
    }

    pub async fn create(&self, mut input: DepartmentInput) -> ServiceResult<Department> {
        validate_name("Department name", &input.name)?;
        input.name = input.name.trim().to_string();

        let department = self
            .departments
            .insert(&input, self.clock.now())
            .await
            .map_err(|err| match err {
                StoreError::Constraint(_) => {
                    ServiceError::Conflict(format!("Department {} already exists", input.name))
                }
                other => other.into(),
            })?;

        info!(department_id = department.id, name = %department.name, "Department created");
        Ok(department)
    }

    pub async fn update(&self, id: u64, mut input: DepartmentInput) -> ServiceResult<Department> {
        validate_name("Department name", &input.name)?;
        input.name = input.name.trim().to_string();

        self.departments
            .update(id, &input, self.clock.now())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Department {id} not found")))
    }

    pub async fn get(&self, id: u64) -> ServiceResult<Department> {
        self.departments
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Department {id} not found")))
    }

    pub async fn list(&self) -> ServiceResult<Vec<DepartmentWithCount>> {
        Ok(self.departments.list_with_counts().await?)
    }

    pub async fn list_active(&self) -> ServiceResult<Vec<Department>> {
        Ok(self.departments.list_active().await?)
    }

    /// `Ok(false)` when the department does not exist.
    pub async fn delete(&self, id: u64) -> ServiceResult<bool> {
        let deleted = self.departments.delete(id).await.map_err(|err| match err {
            StoreError::Constraint(_) => {
                ServiceError::Conflict(format!("Department {id} still has employees"))
            }
            other => other.into(),
        })?;

        if deleted {
            info!(department_id = id, "Department deleted");
        }
        Ok(deleted)
    }

    pub async fn create_designation(&self, mut input: DesignationInput) -> ServiceResult<Designation> {
        validate_name("Designation title", &input.title)?;
        input.title = input.title.trim().to_string();

        if input.level == 0 {
            return Err(ServiceError::InvalidInput("level starts at 1".into()));
        }
        if let (Some(min), Some(max)) = (input.min_salary, input.max_salary) {
            if min > max {
                return Err(ServiceError::InvalidInput(
                    "min_salary cannot exceed max_salary".into(),
                ));
            }
        }

        let designation = self
            .departments
            .insert_designation(&input, self.clock.now())
            .await
            .map_err(|err| match err {
                StoreError::Constraint(_) => {
                    ServiceError::Conflict(format!("Designation {} already exists", input.title))
                }
                other => other.into(),
            })?;

        info!(designation_id = designation.id, title = %designation.title, "Designation created");
        Ok(designation)
    }

    pub async fn get_designation(&self, id: u64) -> ServiceResult<Designation> {
        self.departments
            .find_designation(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Designation {id} not found")))
    }

    pub async fn list_designations(&self) -> ServiceResult<Vec<Designation>> {
        Ok(self.departments.list_designations().await?)
    }
}
